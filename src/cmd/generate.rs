use super::load_schema;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use pgsynth::compression::Compression;
use pgsynth::config::Settings;
use pgsynth::generator::default_registry;
use pgsynth::pipeline::{Pipeline, PipelineOptions, RunStats};
use pgsynth::validate::validate;
use pgsynth::writer::OutputFormat;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

pub struct GenerateArgs {
    pub schema: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub seed: Option<i64>,
    pub format: Option<OutputFormat>,
    pub batch: bool,
    pub batch_size: Option<usize>,
    pub cache_capacity: Option<i64>,
    pub config: Option<PathBuf>,
    pub template: Option<String>,
    pub progress: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let schema = load_schema(args.schema.as_deref(), args.template.as_deref())?;

    let errors = validate(&schema);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}", error);
        }
        anyhow::bail!(
            "schema has {} validation error(s); nothing was generated",
            errors.len()
        );
    }

    let options = build_options(&args)?;
    let total_rows = schema.total_rows();

    let pb = if args.progress {
        let pb = ProgressBar::new(total_rows);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Generating...");
        Some(pb)
    } else {
        None
    };

    let mut pipeline = Pipeline::new(default_registry(), options);
    if let Some(ref pb) = pb {
        let pb = pb.clone();
        pipeline = pipeline.with_progress(move |rows| pb.set_position(rows));
    }

    let start_time = Instant::now();

    let (stats, destination) = match args.output {
        Some(ref path) => {
            let compression = Compression::from_path(path);
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut sink = compression.wrap_writer(file)?;
            let stats = pipeline.run(&schema, &mut sink)?;
            sink.finish()
                .with_context(|| format!("failed to finish {} stream", compression))?;
            (stats, path.display().to_string())
        }
        None => {
            let mut stdout = io::stdout().lock();
            let stats = pipeline.run(&schema, &mut stdout)?;
            stdout.flush()?;
            (stats, "stdout".to_string())
        }
    };

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    print_summary(&stats, &destination, start_time);
    Ok(())
}

/// Defaults, then the settings file, then command-line flags.
fn build_options(args: &GenerateArgs) -> anyhow::Result<PipelineOptions> {
    let mut options = PipelineOptions::default();

    if let Some(ref path) = args.config {
        let settings = Settings::load(path)?;
        options = settings.apply(options)?;
    }

    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    if let Some(format) = args.format {
        options = options.with_format(format);
    }
    if args.batch {
        options = options.with_batch_inserts(true);
    }
    if let Some(size) = args.batch_size {
        options = options.with_batch_inserts(true).with_batch_size(size);
    }
    if let Some(capacity) = args.cache_capacity {
        options = options.with_cache_capacity(capacity);
    }

    if options.batch_inserts && options.format == OutputFormat::Copy {
        tracing::warn!("batch inserts have no effect with the copy format");
    }

    Ok(options)
}

fn print_summary(stats: &RunStats, destination: &str, start_time: Instant) {
    eprintln!(
        "Generated {} tables, {} rows to {} in {:.3?}",
        stats.tables.len(),
        stats.total_rows,
        destination,
        start_time.elapsed()
    );
    for table in &stats.tables {
        tracing::debug!(table = %table.name, rows = table.rows, "table summary");
    }
    if stats.cache.hits + stats.cache.misses > 0 {
        eprintln!(
            "  FK cache: {} hits, {} misses, {} evictions",
            stats.cache.hits, stats.cache.misses, stats.cache.evictions
        );
    }
}
