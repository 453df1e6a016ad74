use super::load_schema;
use pgsynth::validate::ValidationReport;
use std::path::PathBuf;

pub fn run(schema: Option<PathBuf>, template: Option<String>, json: bool) -> anyhow::Result<()> {
    let schema = load_schema(schema.as_deref(), template.as_deref())?;
    let report = ValidationReport::new(&schema);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for error in &report.errors {
            eprintln!("{}", error);
        }
        if !report.errors.is_empty() {
            eprintln!();
        }

        eprintln!("Validation summary:");
        eprintln!("  Database: {}", report.database);
        eprintln!("  Tables: {}", report.tables);
        eprintln!("  Rows requested: {}", report.total_rows);
        eprintln!("  Errors: {}", report.errors.len());
        eprintln!();

        if report.is_valid() {
            eprintln!("Result: PASSED");
        } else {
            eprintln!("Result: FAILED");
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}
