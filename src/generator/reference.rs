//! Foreign-key values drawn from previously generated rows.

use super::Generator;
use crate::cache::FkCache;
use crate::context::{GenerationContext, ScratchKey};
use crate::error::GenerationError;
use crate::value::{Row, Value};
use rand::Rng;
use std::sync::Arc;

/// Generated rows of referenced tables, keyed by `(table, 1-based row number)`
pub type RowCache = FkCache<Arc<Row>>;

/// Picks a row of the referenced table and returns its value for the
/// referenced column.
///
/// The value comes from the row cache; when the row has been evicted (or was
/// never cached) the row number itself is used. That fallback is best-effort:
/// it is exact for serial and integer row-number keys, but for any other
/// referenced column the emitted value need not exist in the referenced
/// table. Raise the cache capacity to cover every referenced row when that
/// matters; misses are counted in the cache stats. Columns of one
/// multi-column foreign key share the chosen row.
#[derive(Clone)]
pub struct ReferenceGenerator {
    table: String,
    column_index: usize,
    row_count: u64,
    self_reference: bool,
    nullable: bool,
    foreign_key: Option<usize>,
    cache: Arc<RowCache>,
}

impl ReferenceGenerator {
    /// `column_index` is the referenced column's position in the referenced
    /// table, `row_count` that table's planned row count.
    pub fn new(
        table: impl Into<String>,
        column_index: usize,
        row_count: u64,
        cache: Arc<RowCache>,
    ) -> Self {
        Self {
            table: table.into(),
            column_index,
            row_count,
            self_reference: false,
            nullable: false,
            foreign_key: None,
            cache,
        }
    }

    /// Only rows generated before the current one may be referenced.
    pub fn self_referencing(mut self, yes: bool) -> Self {
        self.self_reference = yes;
        self
    }

    pub fn nullable(mut self, yes: bool) -> Self {
        self.nullable = yes;
        self
    }

    /// Share the row choice with the other columns of foreign key `index`.
    pub fn for_foreign_key(mut self, index: usize) -> Self {
        self.foreign_key = Some(index);
        self
    }

    pub fn referenced_table(&self) -> &str {
        &self.table
    }

    fn choose_row(&self, ctx: &mut GenerationContext, upper: u64) -> u64 {
        let key = self.foreign_key.map(ScratchKey::ForeignKeyRow);
        if let Some(Value::Int(row)) = key.as_ref().and_then(|k| ctx.scratch(k)) {
            return *row as u64;
        }
        let row = ctx.rng().random_range(1..=upper);
        if let Some(key) = key {
            ctx.set_scratch(key, Value::Int(row as i64));
        }
        row
    }
}

impl Generator for ReferenceGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let upper = if self.self_reference {
            ctx.row_index().min(self.row_count)
        } else {
            self.row_count
        };

        let upper = match upper {
            0 if self.self_reference && self.nullable => return Ok(Value::Null),
            // the first row of a non-nullable self-reference points at itself
            0 if self.self_reference => 1,
            0 => {
                return Err(GenerationError::failed(
                    "reference",
                    format!("referenced table '{}' has no rows", self.table),
                ))
            }
            n => n,
        };

        let row = self.choose_row(ctx, upper);
        let value = self
            .cache
            .get(&self.table, row)
            .and_then(|cached| cached.get(self.column_index).cloned())
            .unwrap_or(Value::Int(row as i64));
        Ok(value)
    }

    fn name(&self) -> &str {
        "reference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_users(n: u64) -> Arc<RowCache> {
        let cache = Arc::new(RowCache::new(100));
        for i in 1..=n {
            cache.put(
                "users",
                i,
                Arc::new(vec![Value::Int(i as i64 * 10), Value::from(format!("u{}", i))]),
            );
        }
        cache
    }

    #[test]
    fn test_values_come_from_cached_rows() {
        let cache = cache_with_users(5);
        let gen = ReferenceGenerator::new("users", 0, 5, cache);
        let mut ctx = GenerationContext::for_table(1, "orders");
        for row in 0..50 {
            ctx.set_position("user_id", row);
            let n = gen.generate(&mut ctx).unwrap().as_i64().unwrap();
            assert!(n % 10 == 0 && (10..=50).contains(&n), "got {}", n);
        }
    }

    #[test]
    fn test_cache_miss_uses_row_number() {
        let cache = Arc::new(RowCache::new(10));
        let gen = ReferenceGenerator::new("users", 0, 3, cache);
        let mut ctx = GenerationContext::new(2);
        for row in 0..20 {
            ctx.set_position("user_id", row);
            let n = gen.generate(&mut ctx).unwrap().as_i64().unwrap();
            assert!((1..=3).contains(&n));
        }

        // non-integer columns get the row number too
        let names = ReferenceGenerator::new("users", 1, 3, Arc::new(RowCache::new(10)));
        ctx.set_position("user_name", 0);
        assert!(matches!(names.generate(&mut ctx).unwrap(), Value::Int(1..=3)));
    }

    #[test]
    fn test_composite_key_shares_row() {
        let cache = cache_with_users(50);
        let ids = ReferenceGenerator::new("users", 0, 50, Arc::clone(&cache)).for_foreign_key(0);
        let names = ReferenceGenerator::new("users", 1, 50, cache).for_foreign_key(0);
        let mut ctx = GenerationContext::new(3);
        for row in 0..20 {
            ctx.set_position("user_id", row);
            let id = ids.generate(&mut ctx).unwrap().as_i64().unwrap();
            ctx.set_position("user_name", row);
            let name = names.generate(&mut ctx).unwrap();
            assert_eq!(name, Value::from(format!("u{}", id / 10)));
        }
    }

    #[test]
    fn test_self_reference_points_backwards() {
        let cache = Arc::new(RowCache::new(100));
        let gen = ReferenceGenerator::new("employees", 0, 10, cache)
            .self_referencing(true)
            .nullable(true);
        let mut ctx = GenerationContext::for_table(4, "employees");

        ctx.set_position("manager_id", 0);
        assert_eq!(gen.generate(&mut ctx).unwrap(), Value::Null);

        for row in 1..10 {
            ctx.set_position("manager_id", row);
            let n = gen.generate(&mut ctx).unwrap().as_i64().unwrap();
            assert!(n >= 1 && n <= row as i64, "row {} referenced {}", row, n);
        }
    }

    #[test]
    fn test_empty_referenced_table_fails() {
        let gen = ReferenceGenerator::new("ghosts", 0, 0, Arc::new(RowCache::new(1)));
        let mut ctx = GenerationContext::new(1);
        assert!(gen.generate(&mut ctx).is_err());
    }
}
