//! Structural and referential validation of schema documents.
//!
//! This module checks:
//! - row counts and column definitions (names, known types)
//! - primary key, unique constraint and index columns exist
//! - foreign keys: source columns, referenced table and columns, arity,
//!   referential actions
//! - the foreign-key graph is acyclic (self-references allowed)
//!
//! All problems are collected; nothing short-circuits except cycle
//! detection, which reports only the first cycle found.

use crate::schema::{DependencyGraph, FkAction, Schema, Table, TypeFamily};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ValidationError {
    /// Stable machine-readable code, e.g. `fk-missing-table`
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            table: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR [{}]", self.code)?;
        if let Some(ref table) = self.table {
            write!(f, " table={}", table)?;
        }
        if let Some(ref column) = self.column {
            write!(f, " column={}", column)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Outcome of validating a schema document
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidationReport {
    pub database: String,
    pub tables: usize,
    pub total_rows: u64,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new(schema: &Schema) -> Self {
        let errors = validate(schema);
        Self {
            database: schema.database.name.clone(),
            tables: schema.tables.len(),
            total_rows: schema.total_rows(),
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validate `schema`, returning every problem found (empty when valid).
pub fn validate(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, custom) in &schema.custom_types {
        if custom.is_enum() && custom.values.is_empty() {
            errors.push(ValidationError::new(
                "enum-empty",
                format!("enum type '{}' has no values", name),
            ));
        }
    }

    for (name, table) in &schema.tables {
        check_table(schema, name, table, &mut errors);
    }

    if let Some(cycle) = DependencyGraph::from_schema(schema).find_cycle() {
        errors.push(ValidationError::new(
            "fk-cycle",
            format!("circular foreign key dependency: {}", cycle.join(" -> ")),
        ));
    }

    errors
}

fn list(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn check_table(schema: &Schema, name: &str, table: &Table, errors: &mut Vec<ValidationError>) {
    let err =
        |code: &'static str, message: String| ValidationError::new(code, message).with_table(name);

    if table.row_count <= 0 {
        errors.push(err(
            "row-count",
            format!("row_count must be positive, got {}", table.row_count),
        ));
    }
    if table.columns.is_empty() {
        errors.push(err("no-columns", "table has no columns".to_string()));
    }

    let mut seen: Vec<&str> = Vec::with_capacity(table.columns.len());
    for (idx, column) in table.columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            errors.push(err(
                "column-name",
                format!("column #{} has an empty name", idx + 1),
            ));
            continue;
        }
        if seen.contains(&column.name.as_str()) {
            errors.push(
                err("duplicate-column", format!("column '{}' is defined twice", column.name))
                    .with_column(&column.name),
            );
        }
        seen.push(&column.name);

        if column.type_name.trim().is_empty() {
            errors.push(
                err("column-type", "column has an empty type".to_string()).with_column(&column.name),
            );
        } else if TypeFamily::from_pg_type(&column.type_name).is_none()
            && !schema.custom_types.contains_key(column.type_name.trim())
        {
            errors.push(
                err(
                    "unknown-type",
                    format!("unknown column type '{}'", column.type_name),
                )
                .with_column(&column.name),
            );
        }
    }

    let available = table.column_names();
    let mut check_columns = |code: &'static str, what: &str, columns: &[String]| {
        for col in columns {
            if !table.has_column(col) {
                errors.push(
                    err(
                        code,
                        format!(
                            "{} column '{}' does not exist (available columns: {})",
                            what,
                            col,
                            list(&available)
                        ),
                    )
                    .with_column(col),
                );
            }
        }
    };

    check_columns("pk-missing-column", "primary key", table.primary_key.as_slice());
    for uc in &table.unique_constraints {
        check_columns("unique-missing-column", "unique constraint", uc.columns.as_slice());
    }
    for index in &table.indexes {
        check_columns("index-missing-column", "index", index.columns.as_slice());
    }
    for fk in &table.foreign_keys {
        check_columns("fk-missing-column", "foreign key", fk.columns.as_slice());
    }

    for fk in &table.foreign_keys {
        if fk.columns.is_empty() || fk.columns.len() != fk.referenced_columns.len() {
            errors.push(err(
                "fk-arity",
                format!(
                    "foreign key to '{}' maps {} column(s) to {} referenced column(s)",
                    fk.referenced_table,
                    fk.columns.len(),
                    fk.referenced_columns.len()
                ),
            ));
        }

        for action in [&fk.on_delete, &fk.on_update].into_iter().flatten() {
            if let Err(message) = action.parse::<FkAction>() {
                errors.push(err("fk-action", message));
            }
        }

        let Some(referenced) = schema.table(&fk.referenced_table) else {
            let tables: Vec<String> = schema.table_names().map(str::to_string).collect();
            errors.push(err(
                "fk-missing-table",
                format!(
                    "referenced table '{}' does not exist (available tables: {})",
                    fk.referenced_table,
                    list(&tables)
                ),
            ));
            continue;
        };

        let referenced_available = referenced.column_names();
        for col in &fk.referenced_columns {
            if !referenced.has_column(col) {
                errors.push(err(
                    "fk-missing-referenced-column",
                    format!(
                        "referenced column '{}.{}' does not exist (available columns: {})",
                        fk.referenced_table,
                        col,
                        list(&referenced_available)
                    ),
                ));
            }
        }
    }
}
