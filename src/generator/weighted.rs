//! Weighted categorical sampling.

use super::Generator;
use crate::context::GenerationContext;
use crate::error::{ConfigError, GenerationError};
use crate::value::Value;
use rand::Rng;

/// Picks one of a fixed set of values with given relative weights.
///
/// Entries are ordered by value before the cumulative distribution is built,
/// so the same weights always map draws to the same values. Weights that do
/// not sum to 1 are normalised.
#[derive(Debug, Clone)]
pub struct WeightedGenerator {
    values: Vec<Value>,
    cumulative: Vec<f64>,
}

impl WeightedGenerator {
    /// Build from `(value, weight)` pairs. Values are sorted by their text
    /// form; duplicate values have their weights added.
    pub fn new<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Value, f64)>,
    {
        let mut entries: Vec<(String, Value, f64)> = Vec::new();
        for (value, weight) in pairs {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    generator: "weighted",
                    key: "weights",
                    message: format!("weight for '{}' must be a non-negative number", value),
                });
            }
            let key = value.to_string();
            match entries.iter_mut().find(|(k, _, _)| *k == key) {
                Some(existing) => existing.2 += weight,
                None => entries.push((key, value, weight)),
            }
        }
        if entries.is_empty() {
            return Err(ConfigError::MissingKey {
                generator: "weighted",
                key: "weights",
            });
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let total: f64 = entries.iter().map(|(_, _, w)| w).sum();
        if total <= 0.0 {
            return Err(ConfigError::InvalidValue {
                generator: "weighted",
                key: "weights",
                message: "weights must not all be zero".to_string(),
            });
        }
        let scale = if (total - 1.0).abs() > 1e-9 { total } else { 1.0 };

        let mut cumulative = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        let mut running = 0.0;
        for (_, value, weight) in entries {
            running += weight / scale;
            cumulative.push(running);
            values.push(value);
        }
        Ok(Self { values, cumulative })
    }

    /// Equal weights for every value
    pub fn uniform<I>(values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Value>,
    {
        Self::new(values.into_iter().map(|v| (v, 1.0)))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Map a draw in `[0, 1)` to a value: the first cumulative bound that is
    /// `>=` the draw wins, and the last value absorbs rounding at the top end.
    pub fn pick(&self, draw: f64) -> &Value {
        let idx = self
            .cumulative
            .iter()
            .position(|&bound| bound >= draw)
            .unwrap_or(self.values.len() - 1);
        &self.values[idx]
    }
}

impl Generator for WeightedGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let draw: f64 = ctx.rng().random();
        Ok(self.pick(draw).clone())
    }

    fn name(&self) -> &str {
        "weighted"
    }
}
