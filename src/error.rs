//! Error types for the generation engine.
//!
//! One enum per failure class: schema documents that cannot be read,
//! generator configuration that cannot be honoured, generation failures,
//! registry misuse, and pipeline failures. Validation problems are not errors
//! in this sense; they are collected as data by [`crate::validate`].

use std::path::PathBuf;

use thiserror::Error;

/// The schema document could not be read or is missing required fields.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed schema JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema is missing required field '{field}'")]
    MissingField { field: &'static str },
}

/// A column's generator configuration cannot be turned into a generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("generator config is missing the 'type' key")]
    MissingType,

    #[error("unknown generator type '{0}'")]
    UnknownType(String),

    #[error("{generator} generator requires '{key}'")]
    MissingKey {
        generator: &'static str,
        key: &'static str,
    },

    #[error("{generator} generator has invalid '{key}': {message}")]
    InvalidValue {
        generator: &'static str,
        key: &'static str,
        message: String,
    },
}

/// Registration or lookup failure in a generator registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("generator '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("generator '{0}' not found")]
    NotFound(String),
}

/// A value could not be generated.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{generator} generator failed: {message}")]
    Failed {
        generator: &'static str,
        message: String,
    },

    #[error("failed to generate {table}.{column}: {source}")]
    Column {
        table: String,
        column: String,
        #[source]
        source: Box<GenerationError>,
    },
}

impl GenerationError {
    pub fn failed(generator: &'static str, message: impl Into<String>) -> Self {
        GenerationError::Failed {
            generator,
            message: message.into(),
        }
    }

    /// Wrap this error with the table and column it occurred in.
    pub fn in_column(self, table: &str, column: &str) -> Self {
        GenerationError::Column {
            table: table.to_string(),
            column: column.to_string(),
            source: Box::new(self),
        }
    }
}

/// The pipeline could not produce a complete dump.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// The YAML configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid config value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_missing_key_formats_correctly() {
        let err = ConfigError::MissingKey {
            generator: "normal",
            key: "mean",
        };
        assert_eq!(err.to_string(), "normal generator requires 'mean'");
    }

    #[test]
    fn registry_error_formats_correctly() {
        assert_eq!(
            RegistryError::AlreadyRegistered("email".to_owned()).to_string(),
            "generator 'email' is already registered"
        );
        assert_eq!(
            RegistryError::NotFound("ghost".to_owned()).to_string(),
            "generator 'ghost' not found"
        );
    }

    #[test]
    fn column_error_names_table_and_column() {
        let err = GenerationError::from(ConfigError::MissingKey {
            generator: "normal",
            key: "mean",
        })
        .in_column("orders", "total");
        assert_eq!(
            err.to_string(),
            "failed to generate orders.total: normal generator requires 'mean'"
        );
    }

    #[test]
    fn schema_error_missing_field_formats_correctly() {
        let err = SchemaError::MissingField { field: "version" };
        assert_eq!(err.to_string(), "schema is missing required field 'version'");
    }
}
