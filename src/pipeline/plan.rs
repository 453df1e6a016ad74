//! Column → generator resolution.
//!
//! Precedence, first match wins:
//! 1. `generator_config` (configurable generator, built once)
//! 2. explicit `generator` name from the registry
//! 3. foreign-key source column → reference generator
//! 4. enum custom type → uniform choice over its labels
//! 5. semantic detection from the column name
//! 6. type family → basic generator
//!
//! Unregistered names fall back to a 255-character varchar generator.

use crate::error::GenerationError;
use crate::generator::{
    detect_semantic, ColumnScope, Generator, GeneratorConfig, GeneratorRegistry,
    ReferenceGenerator, RowCache, SemanticGenerator, VarcharGenerator, WeightedGenerator,
};
use crate::schema::{type_length, Column, Schema, Table, TypeFamily};
use crate::value::Value;
use std::sync::Arc;
use tracing::warn;

/// Where a column's generator came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Config,
    Named,
    ForeignKey,
    CustomEnum,
    Semantic,
    Type,
    Fallback,
}

pub struct ColumnPlan {
    pub name: String,
    pub source: PlanSource,
    pub generator: Arc<dyn Generator>,
}

/// Everything needed to generate one table's rows
pub struct TablePlan {
    pub name: String,
    pub row_count: u64,
    pub columns: Vec<ColumnPlan>,
    /// Rows are put in the FK cache because some foreign key targets this table.
    pub cache_rows: bool,
}

impl TablePlan {
    pub fn build(
        schema: &Schema,
        table: &Table,
        registry: &GeneratorRegistry,
        cache: &Arc<RowCache>,
    ) -> Result<Self, GenerationError> {
        let columns = table
            .columns
            .iter()
            .map(|column| {
                plan_column(schema, table, column, registry, cache)
                    .map_err(|e| e.in_column(&table.name, &column.name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cache_rows = schema
            .tables
            .values()
            .any(|t| t.foreign_keys.iter().any(|fk| fk.referenced_table == table.name));

        Ok(Self {
            name: table.name.clone(),
            row_count: table.row_count.max(0) as u64,
            columns,
            cache_rows,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

fn plan(name: &str, source: PlanSource, generator: Arc<dyn Generator>) -> ColumnPlan {
    ColumnPlan {
        name: name.to_string(),
        source,
        generator,
    }
}

fn fallback(column: &Column, wanted: &str) -> ColumnPlan {
    warn!(
        column = %column.name,
        generator = wanted,
        "unknown generator, falling back to varchar(255)"
    );
    plan(
        &column.name,
        PlanSource::Fallback,
        Arc::new(VarcharGenerator::default()),
    )
}

fn plan_column(
    schema: &Schema,
    table: &Table,
    column: &Column,
    registry: &GeneratorRegistry,
    cache: &Arc<RowCache>,
) -> Result<ColumnPlan, GenerationError> {
    if let Some(ref options) = column.generator_config {
        let scope = ColumnScope {
            schema,
            table: &table.name,
            column,
            cache,
        };
        let config = GeneratorConfig::from_options(options, &scope)?;
        return Ok(plan(&column.name, PlanSource::Config, Arc::new(config)));
    }

    if let Some(ref name) = column.generator {
        return Ok(match registry.get(name) {
            Ok(generator) => plan(&column.name, PlanSource::Named, generator),
            Err(_) => fallback(column, name),
        });
    }

    if let Some(reference) = reference_for(schema, table, column, cache) {
        return Ok(plan(
            &column.name,
            PlanSource::ForeignKey,
            Arc::new(reference),
        ));
    }

    if let Some(labels) = schema.enum_values(&column.type_name) {
        let generator = WeightedGenerator::uniform(labels.iter().map(|l| Value::from(l.as_str())))?;
        return Ok(plan(&column.name, PlanSource::CustomEnum, Arc::new(generator)));
    }

    let family = column.family();

    if let Some(kind) = detect_semantic(&column.name) {
        if family.is_some_and(|f| kind.applies_to(f)) {
            let generator = registry
                .get(kind.name())
                .unwrap_or_else(|_| Arc::new(SemanticGenerator::new(kind)) as Arc<dyn Generator>);
            return Ok(plan(&column.name, PlanSource::Semantic, generator));
        }
    }

    let Some(family) = family else {
        return Ok(fallback(column, &column.type_name));
    };

    let base = column.base_type();
    let name = family.default_generator(&base);
    if name == "varchar" && family == TypeFamily::Character {
        if let Some(len) = type_length(&column.type_name) {
            return Ok(plan(
                &column.name,
                PlanSource::Type,
                Arc::new(VarcharGenerator::new(len)),
            ));
        }
    }
    Ok(match registry.get(name) {
        Ok(generator) => plan(&column.name, PlanSource::Type, generator),
        Err(_) => fallback(column, name),
    })
}

/// Reference generator for a foreign-key source column, when the foreign
/// key resolves.
fn reference_for(
    schema: &Schema,
    table: &Table,
    column: &Column,
    cache: &Arc<RowCache>,
) -> Option<ReferenceGenerator> {
    let (fk_index, fk) = table.foreign_key_for(&column.name)?;
    let referenced = schema.table(&fk.referenced_table)?;
    let referenced_column = fk.referenced_column_for(&column.name)?;
    let column_index = referenced.column_index(referenced_column)?;

    Some(
        ReferenceGenerator::new(
            &referenced.name,
            column_index,
            referenced.row_count.max(0) as u64,
            Arc::clone(cache),
        )
        .self_referencing(fk.is_self_reference(&table.name))
        .nullable(column.nullable)
        .for_foreign_key(fk_index),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CustomType, ForeignKey};
    use serde_json::json;

    fn sources(schema: &Schema, table: &str) -> Vec<(String, PlanSource, String)> {
        let registry = GeneratorRegistry::with_builtins();
        let cache = Arc::new(RowCache::new(10));
        let table = schema.table(table).unwrap();
        TablePlan::build(schema, table, &registry, &cache)
            .unwrap()
            .columns
            .into_iter()
            .map(|c| (c.name, c.source, c.generator.name().to_string()))
            .collect()
    }

    #[test]
    fn test_resolution_precedence() {
        let mut schema = Schema::new("shop");
        schema.custom_types.insert(
            "status".to_string(),
            CustomType {
                kind: "enum".to_string(),
                values: vec!["new".to_string(), "paid".to_string()],
            },
        );
        schema.insert_table(Table::new("users", 5).column(Column::new("id", "serial")));
        let mut named = Column::new("code", "varchar(20)");
        named.generator = Some("email".to_string());
        let mut unknown = Column::new("legacy", "varchar(20)");
        unknown.generator = Some("no_such_generator".to_string());
        schema.insert_table(
            Table::new("orders", 5)
                .column(Column::new("id", "bigserial"))
                .column(
                    Column::new("tier", "varchar(10)")
                        .generator_config(json!({"type": "pattern", "pattern": "[A-C]"})),
                )
                .column(named)
                .column(unknown)
                .column(Column::new("user_id", "integer"))
                .column(Column::new("status", "status"))
                .column(Column::new("email", "varchar(100)"))
                .column(Column::new("email_sent", "boolean"))
                .column(Column::new("notes", "text"))
                .column(Column::new("total", "numeric(10,2)"))
                .foreign_key(ForeignKey::new(&["user_id"], "users", &["id"])),
        );

        let got = sources(&schema, "orders");
        let expect = [
            ("id", PlanSource::Type, "serial"),
            ("tier", PlanSource::Config, "pattern"),
            ("code", PlanSource::Named, "email"),
            ("legacy", PlanSource::Fallback, "varchar"),
            ("user_id", PlanSource::ForeignKey, "reference"),
            ("status", PlanSource::CustomEnum, "weighted"),
            ("email", PlanSource::Semantic, "email"),
            ("email_sent", PlanSource::Type, "boolean"),
            ("notes", PlanSource::Type, "text"),
            ("total", PlanSource::Type, "varchar"),
        ];
        assert_eq!(got.len(), expect.len());
        for ((name, source, generator), (en, es, eg)) in got.iter().zip(expect.iter()) {
            assert_eq!(name, en);
            assert_eq!(source, es, "column {}", name);
            assert_eq!(generator, eg, "column {}", name);
        }
    }

    #[test]
    fn test_semantic_skipped_for_non_text_columns() {
        let mut schema = Schema::new("shop");
        schema.insert_table(
            Table::new("t", 1)
                .column(Column::new("phone", "integer"))
                .column(Column::new("created_at", "timestamp")),
        );
        let got = sources(&schema, "t");
        assert_eq!(got[0].1, PlanSource::Type);
        assert_eq!(got[1].1, PlanSource::Semantic);
    }

    #[test]
    fn test_bad_config_is_wrapped_with_column() {
        let mut schema = Schema::new("shop");
        schema.insert_table(
            Table::new("stats", 1).column(
                Column::new("score", "integer").generator_config(json!({"type": "normal"})),
            ),
        );
        let registry = GeneratorRegistry::with_builtins();
        let cache = Arc::new(RowCache::new(10));
        let err = TablePlan::build(&schema, schema.table("stats").unwrap(), &registry, &cache)
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("stats.score"), "{}", message);
        assert!(message.contains("mean"), "{}", message);
    }

    #[test]
    fn test_referenced_tables_cache_rows() {
        let mut schema = Schema::new("hr");
        schema.insert_table(
            Table::new("employees", 3)
                .column(Column::new("id", "serial"))
                .column(Column::new("manager_id", "integer").nullable())
                .foreign_key(ForeignKey::new(&["manager_id"], "employees", &["id"])),
        );
        schema.insert_table(Table::new("audit", 3).column(Column::new("id", "serial")));
        let registry = GeneratorRegistry::with_builtins();
        let cache = Arc::new(RowCache::new(10));
        let employees =
            TablePlan::build(&schema, schema.table("employees").unwrap(), &registry, &cache)
                .unwrap();
        let audit =
            TablePlan::build(&schema, schema.table("audit").unwrap(), &registry, &cache).unwrap();
        assert!(employees.cache_rows);
        assert!(!audit.cache_rows);
        assert_eq!(employees.column_names(), vec!["id", "manager_id"]);
    }
}
