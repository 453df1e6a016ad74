//! Pipeline coordinator: schema in, dump out.
//!
//! Tables are generated in dependency order (see
//! [`Schema::generation_order`]). Each table gets its own
//! [`GenerationContext`] seeded from the run seed and the table name, so a
//! table's rows do not depend on which other tables exist. Rows of tables
//! targeted by a foreign key are stored in the FK cache as they are produced.

mod plan;

pub use plan::{ColumnPlan, PlanSource, TablePlan};

use crate::cache::{CacheStats, DEFAULT_CACHE_CAPACITY};
use crate::context::{default_reference_time, GenerationContext};
use crate::error::PipelineError;
use crate::generator::{GeneratorRegistry, RowCache};
use crate::schema::Schema;
use crate::value::Row;
use crate::writer::{
    CopyRowWriter, CopyWriter, OutputFormat, RowWriter, SqlWriter, Writer, DEFAULT_BATCH_SIZE,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_SEED: i64 = 42;

/// Rows between progress callbacks
const PROGRESS_INTERVAL: u64 = 1000;

/// Run configuration
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub seed: i64,
    pub format: OutputFormat,
    /// Group rows into multi-value INSERTs (sql format only)
    pub batch_inserts: bool,
    /// Rows per INSERT when batching; 0 means [`DEFAULT_BATCH_SIZE`]
    pub batch_size: usize,
    /// FK cache capacity; non-positive means the default
    pub cache_capacity: i64,
    pub reference_time: NaiveDateTime,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            format: OutputFormat::Sql,
            batch_inserts: false,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY as i64,
            reference_time: default_reference_time(),
        }
    }
}

impl PipelineOptions {
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_batch_inserts(mut self, batch: bool) -> Self {
        self.batch_inserts = batch;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: i64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub name: String,
    pub rows: u64,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub tables: Vec<TableStats>,
    pub total_rows: u64,
    pub cache: CacheStats,
}

pub struct Pipeline<'r> {
    registry: &'r GeneratorRegistry,
    options: PipelineOptions,
    progress_fn: Option<Box<dyn Fn(u64)>>,
}

impl<'r> Pipeline<'r> {
    pub fn new(registry: &'r GeneratorRegistry, options: PipelineOptions) -> Self {
        Self {
            registry,
            options,
            progress_fn: None,
        }
    }

    /// Called with the number of rows generated so far.
    pub fn with_progress<F: Fn(u64) + 'static>(mut self, f: F) -> Self {
        self.progress_fn = Some(Box::new(f));
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Generate the full dump of `schema` into `sink`.
    ///
    /// The schema is expected to have passed validation; an unresolvable
    /// configuration or a failing generator aborts the run with the table and
    /// column named in the error.
    pub fn run<W: Write>(&self, schema: &Schema, sink: &mut W) -> Result<RunStats, PipelineError> {
        let cache = Arc::new(RowCache::new(self.options.cache_capacity));
        let mut tables = Vec::with_capacity(schema.tables.len());
        let mut total_rows = 0u64;

        match self.options.format {
            OutputFormat::Sql => {
                let mut writer = SqlWriter::new(sink);
                writer.write_schema(schema)?;
                for name in schema.generation_order() {
                    let Some(table) = schema.table(&name) else {
                        continue;
                    };
                    let plan = TablePlan::build(schema, table, self.registry, &cache)?;
                    let columns = plan.column_names();

                    if self.options.batch_inserts {
                        let size = self.options.effective_batch_size();
                        let mut batch: Vec<Row> = Vec::with_capacity(size);
                        self.generate_table(&plan, &cache, &mut total_rows, |row| {
                            batch.push(row);
                            if batch.len() >= size {
                                writer.write_batch_insert(&plan.name, &columns, &batch)?;
                                batch.clear();
                            }
                            Ok(())
                        })?;
                        writer.write_batch_insert(&plan.name, &columns, &batch)?;
                    } else {
                        self.generate_table(&plan, &cache, &mut total_rows, |row| {
                            writer.write_insert(&plan.name, &columns, &row)
                        })?;
                    }
                    tables.push(TableStats {
                        name: plan.name.clone(),
                        rows: plan.row_count,
                    });
                }
                writer.into_inner()?;
            }
            OutputFormat::Copy => {
                let mut writer = CopyWriter::new(sink);
                writer.write_schema(schema)?;
                for name in schema.generation_order() {
                    let Some(table) = schema.table(&name) else {
                        continue;
                    };
                    let plan = TablePlan::build(schema, table, self.registry, &cache)?;
                    writer.write_copy_header(&plan.name, &plan.column_names())?;
                    self.generate_table(&plan, &cache, &mut total_rows, |row| {
                        writer.write_copy_row(&row)
                    })?;
                    writer.write_copy_footer()?;
                    tables.push(TableStats {
                        name: plan.name.clone(),
                        rows: plan.row_count,
                    });
                }
                writer.into_inner()?;
            }
        }

        Ok(RunStats {
            tables,
            total_rows,
            cache: cache.stats(),
        })
    }

    /// Generate every row of `plan`, handing each to `emit`.
    fn generate_table<F>(
        &self,
        plan: &TablePlan,
        cache: &RowCache,
        total_rows: &mut u64,
        mut emit: F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(Row) -> io::Result<()>,
    {
        debug!(table = %plan.name, rows = plan.row_count, "generating table");
        let mut ctx = GenerationContext::for_table(self.options.seed, &plan.name)
            .with_reference_time(self.options.reference_time);

        for row_index in 0..plan.row_count {
            let mut row = Vec::with_capacity(plan.columns.len());
            for column in &plan.columns {
                ctx.set_position(&column.name, row_index);
                let value = column
                    .generator
                    .generate(&mut ctx)
                    .map_err(|e| e.in_column(&plan.name, &column.name))?;
                row.push(value);
            }
            if plan.cache_rows {
                cache.put(&plan.name, row_index + 1, Arc::new(row.clone()));
            }
            emit(row)?;

            *total_rows += 1;
            if *total_rows % PROGRESS_INTERVAL == 0 {
                if let Some(ref cb) = self.progress_fn {
                    cb(*total_rows);
                }
            }
        }

        if let Some(ref cb) = self.progress_fn {
            cb(*total_rows);
        }
        debug!(table = %plan.name, total_rows = *total_rows, "finished table");
        Ok(())
    }
}

/// Generate `schema` with the default registry into a string.
pub fn generate_to_string(
    schema: &Schema,
    options: PipelineOptions,
) -> Result<String, PipelineError> {
    let mut out = Vec::new();
    Pipeline::new(crate::generator::default_registry(), options).run(schema, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
