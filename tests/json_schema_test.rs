//! Exported JSON Schemas accept the documents they describe.

use pgsynth::json_schema;
use std::process::Command;

fn validator(name: &str) -> jsonschema::Validator {
    let schema = json_schema::get_schema(name).unwrap();
    let schema = serde_json::to_value(&schema).unwrap();
    jsonschema::Validator::new(&schema).unwrap()
}

#[test]
fn test_templates_match_document_schema() {
    let validator = validator("schema");
    for name in schema_templates::names() {
        let doc = schema_templates::get(name).unwrap();
        assert!(validator.is_valid(&doc), "template {} rejected", name);
    }
}

#[test]
fn test_validate_json_output_matches_schema() {
    let validator = validator("validate");
    let output = Command::new(env!("CARGO_BIN_EXE_pgsynth"))
        .args(["validate", "--template", "ecommerce", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["database"], "ecommerce");
    for error in validator.iter_errors(&report) {
        panic!("validate --json output does not match its schema: {}", error);
    }
}

#[test]
fn test_schema_command_prints_all() {
    let output = Command::new(env!("CARGO_BIN_EXE_pgsynth"))
        .arg("schema")
        .output()
        .unwrap();
    let all: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(all.get("schema").is_some());
    assert!(all.get("validate").is_some());
}
