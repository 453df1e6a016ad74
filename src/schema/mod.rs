//! Schema data model.
//!
//! The model is the literal shape of the accepted JSON document: a database
//! descriptor plus a map of table name → table definition. Tables are kept in
//! a `BTreeMap` so every traversal of the schema is deterministic.

mod graph;
mod types;

pub use graph::{DependencyGraph, TopoOrder};
pub use types::{base_type, type_length, TypeFamily};

use crate::error::SchemaError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Free-form generator configuration attached to a column
pub type GeneratorOptions = BTreeMap<String, serde_json::Value>;

/// Complete schema document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    /// Schema document version
    pub version: String,
    pub database: Database,
    /// Table name → table definition
    pub tables: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sequences: BTreeMap<String, Sequence>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_types: BTreeMap<String, CustomType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

/// Target database descriptor
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Database {
    pub name: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_encoding() -> String {
    "UTF8".to_string()
}

fn default_locale() -> String {
    "en_US.UTF-8".to_string()
}

/// Table definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Filled from the key of the `tables` map
    #[serde(skip)]
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_constraints: Vec<CheckConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    /// Number of rows to generate; must be positive
    pub row_count: i64,
}

/// Column definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    /// PostgreSQL type, e.g. `varchar(255)`
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    /// SQL default: strings are emitted verbatim, numbers and booleans as literals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Name of a registered generator to use for this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_config: Option<GeneratorOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Foreign key constraint
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UniqueConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CheckConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub expression: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    /// Index access method, e.g. `btree`, `gin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Sequence {
    #[serde(default = "one")]
    pub start: i64,
    #[serde(default = "one")]
    pub increment: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub cycle: bool,
}

fn one() -> i64 {
    1
}

/// User-defined type. Only `enum` types are emitted and generated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CustomType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl CustomType {
    pub fn is_enum(&self) -> bool {
        self.kind.eq_ignore_ascii_case("enum")
    }
}

/// Referential action of a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FkAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl FkAction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl std::str::FromStr for FkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "NO ACTION" => Ok(FkAction::NoAction),
            "RESTRICT" => Ok(FkAction::Restrict),
            "CASCADE" => Ok(FkAction::Cascade),
            "SET NULL" => Ok(FkAction::SetNull),
            "SET DEFAULT" => Ok(FkAction::SetDefault),
            _ => Err(format!(
                "Unknown referential action: {}. Valid options: NO ACTION, RESTRICT, CASCADE, SET NULL, SET DEFAULT",
                s
            )),
        }
    }
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoding: default_encoding(),
            locale: default_locale(),
        }
    }
}

impl Schema {
    /// An empty version "1.0" schema for `database`.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            database: Database::new(database),
            tables: BTreeMap::new(),
            sequences: BTreeMap::new(),
            custom_types: BTreeMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Parse a schema document from JSON text.
    ///
    /// Fails on malformed JSON and on an empty `version` or database name;
    /// everything else is left to the validator.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let mut schema: Schema = serde_json::from_str(json)?;
        schema.finish()?;
        Ok(schema)
    }

    /// Parse a schema document from a reader (e.g. stdin).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SchemaError> {
        let mut schema: Schema = serde_json::from_reader(reader)?;
        schema.finish()?;
        Ok(schema)
    }

    /// Load a schema document from a file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    fn finish(&mut self) -> Result<(), SchemaError> {
        if self.version.trim().is_empty() {
            return Err(SchemaError::MissingField { field: "version" });
        }
        if self.database.name.trim().is_empty() {
            return Err(SchemaError::MissingField {
                field: "database.name",
            });
        }
        for (name, table) in self.tables.iter_mut() {
            table.name = name.clone();
        }
        Ok(())
    }

    /// Add a table, keyed by its name.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    /// Sum of the row counts of all tables (non-positive counts ignored)
    pub fn total_rows(&self) -> u64 {
        self.tables
            .values()
            .map(|t| t.row_count.max(0) as u64)
            .sum()
    }

    /// Enum values of a custom type, if `type_name` names an enum type.
    pub fn enum_values(&self, type_name: &str) -> Option<&[String]> {
        let key = type_name.trim();
        self.custom_types
            .get(key)
            .or_else(|| {
                self.custom_types
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .filter(|t| t.is_enum())
            .map(|t| t.values.as_slice())
    }

    /// Table names in generation order: referenced tables first, ties broken
    /// by name, tables caught in a cycle last.
    pub fn generation_order(&self) -> Vec<String> {
        DependencyGraph::from_schema(self)
            .topo_order()
            .into_full_order()
    }

    /// Whether `(table, column)` is the target of any foreign key.
    pub fn is_referenced(&self, table: &str, column: &str) -> bool {
        self.tables.values().any(|t| {
            t.foreign_keys.iter().any(|fk| {
                fk.referenced_table == table && fk.referenced_columns.iter().any(|c| c == column)
            })
        })
    }
}

impl Table {
    pub fn new(name: impl Into<String>, row_count: i64) -> Self {
        Self {
            name: name.into(),
            row_count,
            ..Default::default()
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Primary key columns: the explicit list, or else the flagged columns.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        if !self.primary_key.is_empty() {
            return self.primary_key.iter().map(|s| s.as_str()).collect();
        }
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// The foreign key (and its position) whose source columns include `column`.
    pub fn foreign_key_for(&self, column: &str) -> Option<(usize, &ForeignKey)> {
        self.foreign_keys
            .iter()
            .enumerate()
            .find(|(_, fk)| fk.columns.iter().any(|c| c == column))
    }
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn generator_config(mut self, config: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = config {
            self.generator_config = Some(map.into_iter().collect());
        }
        self
    }

    pub fn family(&self) -> Option<TypeFamily> {
        TypeFamily::from_pg_type(&self.type_name)
    }

    pub fn base_type(&self) -> String {
        base_type(&self.type_name)
    }

    /// The default rendered as SQL text.
    pub fn default_sql(&self) -> Option<String> {
        match self.default.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl ForeignKey {
    pub fn new(
        columns: &[&str],
        referenced_table: impl Into<String>,
        referenced_columns: &[&str],
    ) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// The referenced column paired with `column` by position.
    pub fn referenced_column_for(&self, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.referenced_columns.get(idx).map(|s| s.as_str())
    }

    pub fn is_self_reference(&self, owning_table: &str) -> bool {
        self.referenced_table == owning_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = r#"{
        "version": "1.0",
        "database": {"name": "shop"},
        "tables": {
            "users": {
                "columns": [
                    {"name": "id", "type": "serial", "primary_key": true},
                    {"name": "email", "type": "varchar(255)", "unique": true},
                    {"name": "active", "type": "boolean", "default": true}
                ],
                "row_count": 10
            }
        }
    }"#;

    #[test]
    fn test_parse_fills_table_names() {
        let schema = Schema::from_json(USERS).unwrap();
        let users = schema.table("users").unwrap();
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 3);
        assert_eq!(users.row_count, 10);
        assert_eq!(schema.database.encoding, "UTF8");
        assert_eq!(users.primary_key_columns(), vec!["id"]);
    }

    #[test]
    fn test_missing_version_is_schema_error() {
        let json = USERS.replace("\"1.0\"", "\"\"");
        let err = Schema::from_json(&json).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { field: "version" }));
    }

    #[test]
    fn test_malformed_json_is_schema_error() {
        let err = Schema::from_json("{\"version\": ").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_missing_tables_field_is_rejected() {
        let err = Schema::from_json(r#"{"version": "1", "database": {"name": "x"}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_default_sql_rendering() {
        let schema = Schema::from_json(USERS).unwrap();
        let active = schema.table("users").unwrap().get_column("active").unwrap();
        assert_eq!(active.default_sql().as_deref(), Some("TRUE"));
    }

    #[test]
    fn test_fk_action_parsing() {
        assert_eq!("cascade".parse::<FkAction>(), Ok(FkAction::Cascade));
        assert_eq!("set_null".parse::<FkAction>(), Ok(FkAction::SetNull));
        assert_eq!("SET DEFAULT".parse::<FkAction>(), Ok(FkAction::SetDefault));
        assert!("explode".parse::<FkAction>().is_err());
    }

    #[test]
    fn test_referenced_column_lookup() {
        let fk = ForeignKey::new(&["tenant_id", "user_id"], "users", &["tenant_id", "id"]);
        assert_eq!(fk.referenced_column_for("user_id"), Some("id"));
        assert_eq!(fk.referenced_column_for("other"), None);
    }
}
