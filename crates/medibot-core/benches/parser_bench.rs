//! # Knowledge Layer Benchmarks
//!
//! Performance benchmarks for scanning, loading and querying.
//!
//! Run with: `cargo bench -p medibot-core`

use criterion::{Criterion, criterion_group, criterion_main};
use medibot_core::{KnowledgeSession, parse_expressions};
use std::hint::black_box;

/// A synthetic knowledge base with `n` conditions and three facts each.
fn synthetic_source(n: usize) -> String {
    let mut source = String::from("(= (getCauses $s) (match &self (causes $c $s) $c))\n");
    for i in 0..n {
        source.push_str(&format!("(causes Condition{} Symptom{}) ; generated\n", i, i % 50));
        source.push_str(&format!("(symptom Condition{} Symptom{})\n", i, i % 50));
        source.push_str(&format!(
            "(treatment Condition{}\n    \"treatment plan {}\")\n",
            i, i
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let source = synthetic_source(1_000);
    c.bench_function("parse_3000_expressions", |b| {
        b.iter(|| parse_expressions(black_box(&source)))
    });
}

fn bench_load(c: &mut Criterion) {
    let source = synthetic_source(1_000);
    c.bench_function("load_3000_expressions", |b| {
        b.iter(|| {
            let mut session = KnowledgeSession::new();
            session.load_source(black_box(&source))
        })
    });
}

fn bench_query(c: &mut Criterion) {
    let mut session = KnowledgeSession::new();
    session.load_source(&synthetic_source(1_000));
    c.bench_function("query_get_causes", |b| {
        b.iter(|| session.query(black_box("(getCauses Symptom7)")))
    });
}

criterion_group!(benches, bench_parse, bench_load, bench_query);
criterion_main!(benches);
