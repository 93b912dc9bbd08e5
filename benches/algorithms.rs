//! Algorithm throughput benchmarks
//!
//! Measures the hot paths of each module on inputs sized like real use:
//!
//! 1. Sliding-window maxima over a 100K-sample series
//! 2. Redundant-edge detection on a 10K-node graph
//! 3. Levenshtein against a 1K-command dictionary
//! 4. Misra-Gries over a 100K-item skewed stream
//! 5. Provenance appends (in memory)
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench algorithms
//! ```

use cairn::edit_distance::{closest_match, levenshtein};
use cairn::frequent_items::{majority_element, ApproximateTopK};
use cairn::provenance::{NewRecord, ProvenanceStore};
use cairn::sliding_window::max_sliding_window;
use cairn::union_find::{find_redundant_connection, Edge};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

/// Deterministic pseudo-random sequence (xorshift)
fn series(len: usize) -> Vec<i64> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as i64
        })
        .collect()
}

/// Path graph over 1..=n closed into a cycle by the final edge
fn cycle_graph(n: usize) -> Vec<Edge> {
    let mut edges: Vec<Edge> = (1..n).map(|i| (i, i + 1)).collect();
    edges.push((n, 1));
    edges
}

fn bench_sliding_window(c: &mut Criterion) {
    let values = series(100_000);
    let mut group = c.benchmark_group("sliding_window");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(values.len() as u64));

    for window in [8usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("max", window), &window, |b, &w| {
            b.iter(|| black_box(max_sliding_window(black_box(&values), w)));
        });
    }

    group.finish();
}

fn bench_union_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_find");

    for n in [100usize, 10_000] {
        let edges = cycle_graph(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("redundant_connection", n), &edges, |b, edges| {
            b.iter(|| black_box(find_redundant_connection(black_box(edges))));
        });
    }

    group.finish();
}

fn bench_edit_distance(c: &mut Criterion) {
    let dictionary: Vec<String> = (0..1000).map(|i| format!("command-{:04}", i)).collect();
    let mut group = c.benchmark_group("edit_distance");

    group.bench_function("levenshtein_short", |b| {
        b.iter(|| black_box(levenshtein(black_box("kitten"), black_box("sitting"))));
    });

    group.throughput(Throughput::Elements(dictionary.len() as u64));
    group.bench_function("closest_match_1000", |b| {
        b.iter(|| black_box(closest_match(black_box("comand-0421"), &dictionary, 3)));
    });

    group.finish();
}

fn bench_frequent_items(c: &mut Criterion) {
    // Skewed stream: a third of the items are 0
    let stream: Vec<u32> = series(100_000)
        .into_iter()
        .map(|v| if v % 3 == 0 { 0 } else { (v % 50) as u32 })
        .collect();
    let mut group = c.benchmark_group("frequent_items");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(stream.len() as u64));

    for k in [4usize, 64] {
        group.bench_with_input(BenchmarkId::new("misra_gries", k), &k, |b, &k| {
            b.iter(|| {
                let mut sketch = ApproximateTopK::new(k);
                sketch.observe_all(stream.iter().copied());
                black_box(sketch.top(3))
            });
        });
    }

    group.bench_function("majority_element", |b| {
        b.iter(|| black_box(majority_element(black_box(&stream))));
    });

    group.finish();
}

fn bench_provenance(c: &mut Criterion) {
    let mut group = c.benchmark_group("provenance");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("add_1000_records_in_memory", |b| {
        b.iter(|| {
            let mut store = ProvenanceStore::in_memory();
            for i in 0..1000 {
                let record = NewRecord::new("planner", format!("step {}", i), 0.8)
                    .with_job_id(format!("job-{}", i % 10))
                    .with_inputs(serde_json::json!({ "step": i }));
                let _ = black_box(store.add_record(record));
            }
            store
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sliding_window,
    bench_union_find,
    bench_edit_distance,
    bench_frequent_items,
    bench_provenance
);
criterion_main!(benches);
