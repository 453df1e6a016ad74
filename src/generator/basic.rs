//! Type-driven generators used when a column has no configuration and no
//! recognisable name.

use super::Generator;
use crate::context::{CounterKind, GenerationContext};
use crate::error::GenerationError;
use crate::value::Value;
use chrono::Duration;
use rand::Rng;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const VOCABULARY: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
    "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui",
    "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Random alphanumeric string of exactly `len` characters
pub(crate) fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

/// Uniform non-negative 31-bit integer
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerGenerator;

impl Generator for IntegerGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        Ok(Value::Int(ctx.rng().random_range(0..=i32::MAX) as i64))
    }

    fn name(&self) -> &str {
        "integer"
    }
}

/// Alphanumeric string of random length `1..=max_length`
#[derive(Debug, Clone, Copy)]
pub struct VarcharGenerator {
    max_length: usize,
}

impl VarcharGenerator {
    pub const DEFAULT_MAX_LENGTH: usize = 255;

    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for VarcharGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LENGTH)
    }
}

impl Generator for VarcharGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let rng = ctx.rng();
        let len = rng.random_range(1..=self.max_length);
        Ok(Value::Text(random_alphanumeric(rng, len)))
    }

    fn name(&self) -> &str {
        "varchar"
    }
}

/// Space-separated words drawn from a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct TextGenerator {
    min_length: usize,
    max_length: usize,
}

impl TextGenerator {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        let min_length = min_length.max(1);
        Self {
            min_length,
            max_length: max_length.max(min_length),
        }
    }
}

impl Default for TextGenerator {
    fn default() -> Self {
        Self::new(20, 200)
    }
}

impl Generator for TextGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let rng = ctx.rng();
        let target = rng.random_range(self.min_length..=self.max_length);
        let mut text = String::with_capacity(target);
        loop {
            let word = VOCABULARY[rng.random_range(0..VOCABULARY.len())];
            if !text.is_empty() {
                if text.len() + 1 + word.len() > target {
                    break;
                }
                text.push(' ');
            }
            text.push_str(word);
        }
        Ok(Value::Text(text))
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Uniform instant within the year before the reference time
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampGenerator;

impl Generator for TimestampGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let offset = ctx.rng().random_range(0..SECONDS_PER_YEAR);
        Ok(Value::Timestamp(
            ctx.reference_time() - Duration::seconds(offset),
        ))
    }

    fn name(&self) -> &str {
        "timestamp"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanGenerator;

impl Generator for BooleanGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        Ok(Value::Bool(ctx.rng().random_bool(0.5)))
    }

    fn name(&self) -> &str {
        "boolean"
    }
}

/// 1, 2, 3, ... per (table, column) of the context
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialGenerator;

impl Generator for SerialGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        Ok(Value::Int(ctx.next_counter(CounterKind::Serial)))
    }

    fn name(&self) -> &str {
        "serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GenerationContext {
        let mut ctx = GenerationContext::for_table(42, "t");
        ctx.set_position("c", 0);
        ctx
    }

    #[test]
    fn test_integer_is_non_negative_i32() {
        let mut ctx = ctx();
        for _ in 0..200 {
            let n = IntegerGenerator.generate(&mut ctx).unwrap().as_i64().unwrap();
            assert!((0..=i32::MAX as i64).contains(&n));
        }
    }

    #[test]
    fn test_varchar_respects_max_length() {
        let mut ctx = ctx();
        let gen = VarcharGenerator::new(5);
        for _ in 0..200 {
            let v = gen.generate(&mut ctx).unwrap();
            let s = v.as_str().unwrap();
            assert!((1..=5).contains(&s.len()), "bad length {}", s.len());
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_text_stays_within_target() {
        let mut ctx = ctx();
        let gen = TextGenerator::new(10, 40);
        for _ in 0..100 {
            let v = gen.generate(&mut ctx).unwrap();
            let s = v.as_str().unwrap();
            assert!(!s.is_empty());
            assert!(s.split(' ').all(|w| VOCABULARY.contains(&w)));
        }
    }

    #[test]
    fn test_timestamp_within_past_year() {
        let mut ctx = ctx();
        let reference = ctx.reference_time();
        for _ in 0..200 {
            match TimestampGenerator.generate(&mut ctx).unwrap() {
                Value::Timestamp(ts) => {
                    assert!(ts <= reference);
                    assert!(ts > reference - Duration::days(366));
                }
                other => panic!("expected timestamp, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_serial_counts_from_one_per_column() {
        let mut ctx = ctx();
        let values: Vec<i64> = (0..3)
            .map(|_| SerialGenerator.generate(&mut ctx).unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);

        let mut other = GenerationContext::for_table(42, "other");
        other.set_position("c", 0);
        assert_eq!(SerialGenerator.generate(&mut other).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_same_seed_same_values() {
        let mut a = ctx();
        let mut b = ctx();
        let gen = VarcharGenerator::default();
        for _ in 0..10 {
            assert_eq!(gen.generate(&mut a).unwrap(), gen.generate(&mut b).unwrap());
        }
    }
}
