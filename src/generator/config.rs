//! Configurable generators built from a column's `generator_config`.
//!
//! The `type` key selects a [`ConfigKind`]; the remaining keys are read and
//! checked once, when the column plan is built. Missing required keys are
//! errors. Optional keys that are absent or malformed fall back to defaults.

use super::distribution::{Distribution, DistributionGenerator};
use super::pattern::PatternGenerator;
use super::range::IntRangeGenerator;
use super::reference::{ReferenceGenerator, RowCache};
use super::template::TemplateGenerator;
use super::timeseries::{parse_interval, TimePattern, TimeSeriesGenerator};
use super::weighted::WeightedGenerator;
use super::Generator;
use crate::context::GenerationContext;
use crate::error::{ConfigError, GenerationError};
use crate::schema::{Column, GeneratorOptions, Schema, TypeFamily};
use crate::value::{parse_timestamp, Value};
use serde_json::Value as Json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Kinds of configurable generator, selected by the `type` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    WeightedEnum,
    Pattern,
    Template,
    Range,
    TimeSeries,
    Weighted,
    Normal,
    Poisson,
    Zipf,
    Reference,
}

impl ConfigKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKind::WeightedEnum => "weighted_enum",
            ConfigKind::Pattern => "pattern",
            ConfigKind::Template => "template",
            ConfigKind::Range => "range",
            ConfigKind::TimeSeries => "time_series",
            ConfigKind::Weighted => "weighted",
            ConfigKind::Normal => "normal",
            ConfigKind::Poisson => "poisson",
            ConfigKind::Zipf => "zipf",
            ConfigKind::Reference => "reference",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weighted_enum" | "enum" => ConfigKind::WeightedEnum,
            "pattern" | "regex" => ConfigKind::Pattern,
            "template" => ConfigKind::Template,
            "range" | "int_range" | "integer_range" => ConfigKind::Range,
            "time_series" | "timeseries" => ConfigKind::TimeSeries,
            "weighted" => ConfigKind::Weighted,
            "normal" | "gaussian" => ConfigKind::Normal,
            "poisson" => ConfigKind::Poisson,
            "zipf" => ConfigKind::Zipf,
            "reference" | "foreign_key" => ConfigKind::Reference,
            _ => return Err(ConfigError::UnknownType(s.to_string())),
        };
        Ok(kind)
    }
}

/// Where a configured column lives; needed by kinds whose output depends on
/// the column type or on other tables.
pub struct ColumnScope<'a> {
    pub schema: &'a Schema,
    pub table: &'a str,
    pub column: &'a Column,
    pub cache: &'a Arc<RowCache>,
}

/// A configured generator, one variant per kind
#[derive(Clone)]
pub enum GeneratorConfig {
    WeightedEnum(WeightedGenerator),
    Pattern(PatternGenerator),
    Template(TemplateGenerator),
    Range(IntRangeGenerator),
    TimeSeries(TimeSeriesGenerator),
    Distribution(DistributionGenerator),
    Reference(ReferenceGenerator),
}

impl GeneratorConfig {
    /// Build the generator described by `options`.
    pub fn from_options(
        options: &GeneratorOptions,
        scope: &ColumnScope<'_>,
    ) -> Result<Self, ConfigError> {
        let kind: ConfigKind = options
            .get("type")
            .and_then(Json::as_str)
            .ok_or(ConfigError::MissingType)?
            .parse()?;
        let family = scope.column.family();

        let config = match kind {
            ConfigKind::WeightedEnum => {
                GeneratorConfig::WeightedEnum(weighted_from(options, family, "weighted_enum")?)
            }
            ConfigKind::Weighted => GeneratorConfig::Distribution(DistributionGenerator::new(
                Distribution::Weighted(weighted_from(options, family, "weighted")?),
            )),
            ConfigKind::Pattern => {
                let pattern = require_str(options, "pattern", "pattern")?;
                GeneratorConfig::Pattern(PatternGenerator::new(pattern))
            }
            ConfigKind::Template => {
                let template = require_str(options, "template", "template")?;
                GeneratorConfig::Template(TemplateGenerator::new(template)?)
            }
            ConfigKind::Range => {
                let min = require_i64(options, "range", "min")?;
                let max = require_i64(options, "range", "max")?;
                GeneratorConfig::Range(IntRangeGenerator::new(min, max)?)
            }
            ConfigKind::TimeSeries => GeneratorConfig::TimeSeries(time_series_from(options)?),
            ConfigKind::Normal => {
                let mean = require_f64(options, "normal", "mean")?;
                let std_dev = get_f64(options, "std_dev")
                    .or_else(|| get_f64(options, "stddev"))
                    .unwrap_or(1.0);
                let dist = Distribution::normal(mean, std_dev)?.bounded(
                    get_f64(options, "min"),
                    get_f64(options, "max"),
                    matches!(family, Some(TypeFamily::Integer | TypeFamily::Serial)),
                );
                GeneratorConfig::Distribution(DistributionGenerator::new(dist))
            }
            ConfigKind::Poisson => {
                let lambda = get_f64(options, "lambda")
                    .or_else(|| get_f64(options, "mean"))
                    .ok_or(ConfigError::MissingKey {
                        generator: "poisson",
                        key: "lambda",
                    })?;
                GeneratorConfig::Distribution(DistributionGenerator::new(Distribution::poisson(
                    lambda,
                )?))
            }
            ConfigKind::Zipf => {
                let max = require_i64(options, "zipf", "max")?;
                let min = get_i64(options, "min").unwrap_or(1);
                let alpha = get_f64(options, "alpha").unwrap_or(1.5);
                GeneratorConfig::Distribution(DistributionGenerator::new(Distribution::zipf(
                    alpha, min, max,
                )?))
            }
            ConfigKind::Reference => GeneratorConfig::Reference(reference_from(options, scope)?),
        };
        Ok(config)
    }

    /// The kind this generator was built from
    pub fn kind(&self) -> ConfigKind {
        match self {
            GeneratorConfig::WeightedEnum(_) => ConfigKind::WeightedEnum,
            GeneratorConfig::Pattern(_) => ConfigKind::Pattern,
            GeneratorConfig::Template(_) => ConfigKind::Template,
            GeneratorConfig::Range(_) => ConfigKind::Range,
            GeneratorConfig::TimeSeries(_) => ConfigKind::TimeSeries,
            GeneratorConfig::Distribution(d) => match d.distribution() {
                Distribution::Weighted(_) => ConfigKind::Weighted,
                Distribution::Normal { .. } => ConfigKind::Normal,
                Distribution::Poisson { .. } => ConfigKind::Poisson,
                Distribution::Zipf { .. } => ConfigKind::Zipf,
            },
            GeneratorConfig::Reference(_) => ConfigKind::Reference,
        }
    }

    fn inner(&self) -> &dyn Generator {
        match self {
            GeneratorConfig::WeightedEnum(g) => g,
            GeneratorConfig::Pattern(g) => g,
            GeneratorConfig::Template(g) => g,
            GeneratorConfig::Range(g) => g,
            GeneratorConfig::TimeSeries(g) => g,
            GeneratorConfig::Distribution(g) => g,
            GeneratorConfig::Reference(g) => g,
        }
    }
}

impl Generator for GeneratorConfig {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        self.inner().generate(ctx)
    }

    fn name(&self) -> &str {
        self.kind().as_str()
    }
}

fn get_f64(options: &GeneratorOptions, key: &str) -> Option<f64> {
    let value = match options.get(key)? {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|x| x.is_finite())
}

fn get_i64(options: &GeneratorOptions, key: &str) -> Option<i64> {
    match options.get(key)? {
        Json::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn require_f64(
    options: &GeneratorOptions,
    generator: &'static str,
    key: &'static str,
) -> Result<f64, ConfigError> {
    get_f64(options, key).ok_or(ConfigError::MissingKey { generator, key })
}

fn require_i64(
    options: &GeneratorOptions,
    generator: &'static str,
    key: &'static str,
) -> Result<i64, ConfigError> {
    get_i64(options, key).ok_or(ConfigError::MissingKey { generator, key })
}

fn require_str<'a>(
    options: &'a GeneratorOptions,
    generator: &'static str,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    options
        .get(key)
        .and_then(Json::as_str)
        .ok_or(ConfigError::MissingKey { generator, key })
}

fn json_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON `null` in a value list becomes SQL NULL.
fn literal(value: &Json, family: Option<TypeFamily>) -> Value {
    match value {
        Json::Null => Value::Null,
        other => coerce(&json_text(other), family),
    }
}

/// Typed value for a configured literal, following the column's family.
fn coerce(text: &str, family: Option<TypeFamily>) -> Value {
    match family {
        Some(TypeFamily::Integer | TypeFamily::Serial) => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::from(text)),
        Some(TypeFamily::Float) => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::from(text)),
        Some(TypeFamily::Boolean) => match text.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "1" => Value::Bool(true),
            "false" | "f" | "no" | "0" => Value::Bool(false),
            _ => Value::from(text),
        },
        _ => Value::from(text),
    }
}

fn weight_of(value: &Json, generator: &'static str) -> Result<f64, ConfigError> {
    value.as_f64().ok_or_else(|| ConfigError::InvalidValue {
        generator,
        key: "weights",
        message: format!("weight {} is not a number", value),
    })
}

/// `weights` as a value→weight object, `weights` + `values` as parallel
/// arrays, or `values` alone for equal weights.
fn weighted_from(
    options: &GeneratorOptions,
    family: Option<TypeFamily>,
    generator: &'static str,
) -> Result<WeightedGenerator, ConfigError> {
    let values = options.get("values").and_then(Json::as_array);
    let pairs: Vec<(Value, f64)> = match (options.get("weights"), values) {
        (Some(Json::Object(map)), _) => map
            .iter()
            .map(|(k, w)| Ok::<_, ConfigError>((coerce(k, family), weight_of(w, generator)?)))
            .collect::<Result<_, ConfigError>>()?,
        (Some(Json::Array(weights)), Some(values)) => {
            if weights.len() != values.len() {
                return Err(ConfigError::InvalidValue {
                    generator,
                    key: "weights",
                    message: format!(
                        "{} weights for {} values",
                        weights.len(),
                        values.len()
                    ),
                });
            }
            values
                .iter()
                .zip(weights)
                .map(|(v, w)| {
                    Ok::<_, ConfigError>((literal(v, family), weight_of(w, generator)?))
                })
                .collect::<Result<_, ConfigError>>()?
        }
        (_, Some(values)) => values
            .iter()
            .map(|v| (literal(v, family), 1.0))
            .collect(),
        _ => {
            return Err(ConfigError::MissingKey {
                generator,
                key: "weights",
            })
        }
    };
    WeightedGenerator::new(pairs).map_err(|e| match e {
        ConfigError::MissingKey { key, .. } => ConfigError::MissingKey { generator, key },
        ConfigError::InvalidValue { key, message, .. } => ConfigError::InvalidValue {
            generator,
            key,
            message,
        },
        other => other,
    })
}

fn time_series_from(options: &GeneratorOptions) -> Result<TimeSeriesGenerator, ConfigError> {
    let timestamp = |key: &str| options.get(key).and_then(Json::as_str).and_then(parse_timestamp);
    let interval = match options.get("interval") {
        Some(Json::Number(n)) => n.as_i64().and_then(|s| parse_interval(&s.to_string())),
        Some(Json::String(s)) => parse_interval(s),
        _ => None,
    }
    .unwrap_or_else(TimeSeriesGenerator::default_interval);
    let pattern = options
        .get("pattern")
        .and_then(Json::as_str)
        .and_then(|p| p.parse::<TimePattern>().ok())
        .unwrap_or_default();
    TimeSeriesGenerator::new(timestamp("start"), timestamp("end"), interval, pattern)
}

fn reference_from(
    options: &GeneratorOptions,
    scope: &ColumnScope<'_>,
) -> Result<ReferenceGenerator, ConfigError> {
    let table_name = require_str(options, "reference", "table")?;
    let column_name = require_str(options, "reference", "column")?;

    let table = scope
        .schema
        .table(table_name)
        .ok_or_else(|| ConfigError::InvalidValue {
            generator: "reference",
            key: "table",
            message: format!("table '{}' does not exist", table_name),
        })?;
    let column_index = table
        .column_index(column_name)
        .ok_or_else(|| ConfigError::InvalidValue {
            generator: "reference",
            key: "column",
            message: format!("column '{}.{}' does not exist", table_name, column_name),
        })?;

    Ok(ReferenceGenerator::new(
        table_name,
        column_index,
        table.row_count.max(0) as u64,
        Arc::clone(scope.cache),
    )
    .self_referencing(table_name == scope.table)
    .nullable(scope.column.nullable))
}
