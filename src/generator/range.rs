use super::Generator;
use crate::context::GenerationContext;
use crate::error::{ConfigError, GenerationError};
use crate::value::Value;
use rand::Rng;

/// Uniform integer in an inclusive `[min, max]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRangeGenerator {
    min: i64,
    max: i64,
}

impl IntRangeGenerator {
    pub fn new(min: i64, max: i64) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidValue {
                generator: "range",
                key: "max",
                message: format!("max ({}) is less than min ({})", max, min),
            });
        }
        Ok(Self { min, max })
    }
}

impl Generator for IntRangeGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        if self.min == self.max {
            return Ok(Value::Int(self.min));
        }
        Ok(Value::Int(ctx.rng().random_range(self.min..=self.max)))
    }

    fn name(&self) -> &str {
        "range"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_within_bounds() {
        let gen = IntRangeGenerator::new(-3, 3).unwrap();
        let mut ctx = GenerationContext::new(11);
        let mut seen = [false; 7];
        for _ in 0..500 {
            let n = gen.generate(&mut ctx).unwrap().as_i64().unwrap();
            assert!((-3..=3).contains(&n));
            seen[(n + 3) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_constant_range_consumes_no_randomness() {
        let gen = IntRangeGenerator::new(7, 7).unwrap();
        let mut ctx = GenerationContext::new(1);
        let mut twin = GenerationContext::new(1);
        assert_eq!(gen.generate(&mut ctx).unwrap(), Value::Int(7));
        assert_eq!(ctx.rng().random::<u64>(), twin.rng().random::<u64>());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(IntRangeGenerator::new(5, 1).is_err());
    }
}
