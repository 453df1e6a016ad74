mod generate;
mod schema;
mod templates;
mod validate;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pgsynth::schema::Schema;
use pgsynth::writer::OutputFormat;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pgsynth")]
#[command(version)]
#[command(about = "Generate deterministic synthetic PostgreSQL dumps from a JSON schema", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a SQL dump from a schema document
    Generate {
        /// Schema document (JSON); "-" or omitted reads stdin
        #[arg(conflicts_with = "template")]
        schema: Option<PathBuf>,

        /// Output file (default: stdout). Compressed by extension: .gz, .bz2, .xz, .zst
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed; the same seed and schema give identical output
        #[arg(short, long, allow_negative_numbers = true)]
        seed: Option<i64>,

        /// Output format: sql (INSERT statements) or copy
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Group rows into multi-row INSERT statements
        #[arg(long)]
        batch: bool,

        /// Rows per multi-row INSERT (implies --batch)
        #[arg(long)]
        batch_size: Option<usize>,

        /// FK cache capacity in rows (0 or negative uses the default)
        #[arg(long, allow_negative_numbers = true)]
        cache_capacity: Option<i64>,

        /// YAML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Generate from a built-in template instead of a schema file
        #[arg(short, long)]
        template: Option<String>,

        /// Show progress
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a schema document without generating anything
    Validate {
        /// Schema document (JSON); "-" or omitted reads stdin
        #[arg(conflicts_with = "template")]
        schema: Option<PathBuf>,

        /// Validate a built-in template
        #[arg(short, long)]
        template: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in schema templates, or print one
    Templates {
        /// Template to print
        name: Option<String>,
    },

    /// Print JSON Schemas for the schema document and `validate --json` output
    Schema {
        /// Only print this schema (schema, validate)
        name: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            output,
            seed,
            format,
            batch,
            batch_size,
            cache_capacity,
            config,
            template,
            progress,
        } => generate::run(generate::GenerateArgs {
            schema,
            output,
            seed,
            format,
            batch,
            batch_size,
            cache_capacity,
            config,
            template,
            progress,
        }),
        Commands::Validate {
            schema,
            template,
            json,
        } => validate::run(schema, template, json),
        Commands::Templates { name } => templates::run(name),
        Commands::Schema { name } => schema::run(name),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pgsynth", &mut io::stdout());
            Ok(())
        }
    }
}

/// Resolve the schema document from a template name, a file, or stdin.
pub(crate) fn load_schema(path: Option<&Path>, template: Option<&str>) -> anyhow::Result<Schema> {
    if let Some(name) = template {
        let doc = schema_templates::get(name).with_context(|| {
            format!(
                "unknown template '{}'. Available: {}",
                name,
                schema_templates::names().join(", ")
            )
        })?;
        let json = serde_json::to_string(&doc)?;
        return Schema::from_json(&json)
            .with_context(|| format!("template '{}' is not a valid schema document", name));
    }

    match path {
        Some(p) if p != Path::new("-") => {
            Schema::load(p).with_context(|| format!("failed to load schema {}", p.display()))
        }
        _ => Schema::from_reader(io::stdin().lock()).context("failed to read schema from stdin"),
    }
}
