//! Benchmarks for weblog-stats
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weblog_stats::log::{classify, parse_line};
use weblog_stats::stats::{summarize, Accumulator};

const LINE: &str =
    r#"34.10.2.5 - - [10/Oct/2023:13:55:36 +0000] "GET /api/v1/orders HTTP/1.1" 200 5120"#;

fn benchmark_parse_line(c: &mut Criterion) {
    c.bench_function("parse_line", |b| {
        b.iter(|| {
            let record = parse_line(black_box(LINE));
            black_box(record)
        })
    });

    c.bench_function("parse_line_malformed", |b| {
        b.iter(|| black_box(parse_line(black_box("garbage that never matches"))))
    });
}

fn benchmark_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| black_box(classify(black_box("170.5.5.5"))))
    });
}

fn benchmark_absorb(c: &mut Criterion) {
    let record = parse_line(LINE).expect("benchmark line parses");

    c.bench_function("absorb", |b| {
        let mut acc = Accumulator::new();
        b.iter(|| acc.absorb(black_box(&record)))
    });
}

fn benchmark_merge_and_summarize(c: &mut Criterion) {
    let mut acc = Accumulator::new();
    for i in 0..1000 {
        let line = format!(
            "{}.0.0.1 - - [10/Oct/2023:{:02}:00:00 +0000] \"GET /p/{} HTTP/1.1\" {} 10",
            i % 250,
            i % 24,
            i % 100,
            if i % 7 == 0 { 500 } else { 200 }
        );
        if let Ok(record) = parse_line(&line) {
            acc.absorb(&record);
        }
    }

    c.bench_function("merge", |b| {
        b.iter(|| black_box(acc.clone().merge(black_box(&acc))))
    });

    c.bench_function("summarize", |b| b.iter(|| black_box(summarize(black_box(&acc), 5))));
}

criterion_group!(
    benches,
    benchmark_parse_line,
    benchmark_classify,
    benchmark_absorb,
    benchmark_merge_and_summarize
);
criterion_main!(benches);
