use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pgsynth::context::GenerationContext;
use pgsynth::generator::{default_registry, Generator, PatternGenerator};
use pgsynth::pipeline::{generate_to_string, PipelineOptions};
use pgsynth::schema::{Column, ForeignKey, Schema, Table};
use pgsynth::writer::OutputFormat;
use std::hint::black_box;

fn shop_schema(customers: i64, orders: i64) -> Schema {
    let mut schema = Schema::new("shop");
    schema.insert_table(
        Table::new("customers", customers)
            .column(Column::new("id", "serial").primary_key())
            .column(Column::new("email", "varchar(255)"))
            .column(Column::new("first_name", "varchar(50)"))
            .column(Column::new("city", "varchar(100)"))
            .column(Column::new("created_at", "timestamp")),
    );
    schema.insert_table(
        Table::new("orders", orders)
            .column(Column::new("id", "serial").primary_key())
            .column(Column::new("customer_id", "integer"))
            .column(Column::new("total", "numeric(10,2)"))
            .column(Column::new("note", "text").nullable())
            .foreign_key(ForeignKey::new(&["customer_id"], "customers", &["id"])),
    );
    schema
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for rows in [1_000i64, 10_000] {
        let schema = shop_schema(rows / 10, rows);
        group.throughput(Throughput::Elements((rows + rows / 10) as u64));

        for format in [OutputFormat::Sql, OutputFormat::Copy] {
            let options = PipelineOptions::default().with_format(format);
            group.bench_with_input(
                BenchmarkId::new(format.as_str(), rows),
                &schema,
                |b, schema| b.iter(|| generate_to_string(black_box(schema), options.clone()).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generators");
    group.throughput(Throughput::Elements(1000));

    let registry = default_registry();
    for name in ["integer", "varchar", "timestamp", "email", "first_name"] {
        let generator = registry.get(name).unwrap();
        group.bench_function(name, |b| {
            let mut ctx = GenerationContext::for_table(42, "bench");
            b.iter(|| {
                for _ in 0..1000 {
                    black_box(generator.generate(&mut ctx).unwrap());
                }
            })
        });
    }

    let pattern = PatternGenerator::new("[A-Z]{3}-[0-9]{5}");
    group.bench_function("pattern", |b| {
        let mut ctx = GenerationContext::for_table(42, "bench");
        b.iter(|| {
            for _ in 0..1000 {
                black_box(pattern.generate(&mut ctx).unwrap());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_generators);
criterion_main!(benches);
