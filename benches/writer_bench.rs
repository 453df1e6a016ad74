use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pgsynth::value::{Row, Value};
use pgsynth::writer::{
    escape_copy, escape_string, CopyRowWriter, CopyWriter, RowWriter, SqlWriter, Writer,
};
use std::hint::black_box;

fn sample_row(i: i64) -> Row {
    vec![
        Value::Int(i),
        Value::Text(format!("user{}@example.com", i)),
        Value::Text("O'Brien said \"hi\"\tand left\\".to_string()),
        Value::Bool(i % 2 == 0),
        Value::Null,
    ]
}

fn columns() -> Vec<String> {
    ["id", "email", "note", "active", "deleted_at"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");

    let plain = "plain ascii text without anything to escape ".repeat(8);
    let dirty = "it's a \\path\\ with\ttabs and\nnewlines ".repeat(8);

    for (label, text) in [("plain", &plain), ("dirty", &dirty)] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("sql_literal", label), text, |b, t| {
            b.iter(|| black_box(escape_string(black_box(t))))
        });
        group.bench_with_input(BenchmarkId::new("copy_field", label), text, |b, t| {
            b.iter(|| black_box(escape_copy(black_box(t))))
        });
    }

    group.finish();
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codecs");
    let cols = columns();
    let rows: Vec<Row> = (1..=1000).map(sample_row).collect();
    group.throughput(Throughput::Elements(rows.len() as u64));

    group.bench_function("insert_per_row", |b| {
        b.iter(|| {
            let mut w = SqlWriter::new(Vec::with_capacity(256 * 1024));
            for row in &rows {
                w.write_insert("users", &cols, row).unwrap();
            }
            w.flush().unwrap();
            black_box(w.into_inner().unwrap())
        })
    });

    for batch in [10usize, 100, 500] {
        group.bench_with_input(BenchmarkId::new("insert_batched", batch), &batch, |b, &n| {
            b.iter(|| {
                let mut w = SqlWriter::new(Vec::with_capacity(256 * 1024));
                for chunk in rows.chunks(n) {
                    w.write_batch_insert("users", &cols, chunk).unwrap();
                }
                w.flush().unwrap();
                black_box(w.into_inner().unwrap())
            })
        });
    }

    group.bench_function("copy", |b| {
        b.iter(|| {
            let mut w = CopyWriter::new(Vec::with_capacity(256 * 1024));
            w.write_copy_header("users", &cols).unwrap();
            for row in &rows {
                w.write_copy_row(row).unwrap();
            }
            w.write_copy_footer().unwrap();
            w.flush().unwrap();
            black_box(w.into_inner().unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_escape, bench_codecs);
criterion_main!(benches);
