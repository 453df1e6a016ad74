//! Value generators.
//!
//! Every generator implements [`Generator`]: it draws whatever randomness it
//! needs from the [`GenerationContext`] and returns one [`Value`]. Generators
//! come in three groups:
//! - basic type generators (`integer`, `varchar`, `text`, `timestamp`,
//!   `boolean`, `serial`), registered by name
//! - semantic generators chosen by sniffing the column name (`email`,
//!   `city`, `created_at`, ...), also registered by name
//! - configurable generators built from a column's `generator_config`
//!   (weighted enum, pattern, template, range, time series, distributions,
//!   foreign-key reference), see [`GeneratorConfig`]

mod basic;
mod config;
mod distribution;
mod pattern;
mod range;
mod reference;
mod registry;
mod semantic;
mod template;
mod timeseries;
mod weighted;

pub use basic::{
    BooleanGenerator, IntegerGenerator, SerialGenerator, TextGenerator, TimestampGenerator,
    VarcharGenerator,
};
pub use config::{ColumnScope, ConfigKind, GeneratorConfig};
pub use distribution::{Distribution, DistributionGenerator, ZipfSampler};
pub use pattern::{PatternGenerator, FALLBACK_PATTERN};
pub use range::IntRangeGenerator;
pub use reference::{ReferenceGenerator, RowCache};
pub use registry::{default_registry, GeneratorRegistry};
pub use semantic::{detect_semantic, SemanticGenerator, SemanticKind};
pub use template::TemplateGenerator;
pub use timeseries::{parse_interval, TimePattern, TimeSeriesGenerator};
pub use weighted::WeightedGenerator;

use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::value::Value;

/// A source of column values
pub trait Generator: Send + Sync {
    /// Produce the next value for the context's current table, column and row.
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError>;

    /// Name the generator is registered or reported under
    fn name(&self) -> &str;
}
