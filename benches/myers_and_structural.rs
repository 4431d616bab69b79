//! Myers diff and structural merge throughput benchmarks.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench myers_and_structural
//! # With a custom filter:
//! cargo bench --bench myers_and_structural -- myers
//! ```

use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use structural_merge::{merge_files, myers_diff};

// ---------------------------------------------------------------------------
// Synthetic input generation
// ---------------------------------------------------------------------------

/// `n` distinct numbered lines, e.g. `["line0", "line1", ...]`.
fn numbered_lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line{i}")).collect()
}

/// Same lines as `base`, but every fourth line's content is changed, so the
/// edit script grows with input size instead of staying O(1).
fn with_scattered_edits(base: &[String]) -> Vec<String> {
    base.iter()
        .enumerate()
        .map(|(i, l)| if i % 4 == 0 { format!("{l}-edited") } else { l.clone() })
        .collect()
}

/// A synthetic Go source file with `n` distinct top-level functions.
fn go_source_with_functions(n: usize) -> String {
    let mut src = String::from("package m\n\n");
    for i in 0..n {
        src.push_str(&format!("func fn{i}() int {{\n\treturn {i}\n}}\n\n"));
    }
    src
}

/// Same file as [`go_source_with_functions`], with every fourth function body
/// changed — matching the "independent modifications" merge scenario at
/// scale (spec §8 scenario 2).
fn go_source_with_every_fourth_modified(n: usize) -> String {
    let mut src = String::from("package m\n\n");
    for i in 0..n {
        let body = if i % 4 == 0 { i + 1000 } else { i };
        src.push_str(&format!("func fn{i}() int {{\n\treturn {body}\n}}\n\n"));
    }
    src
}

// ---------------------------------------------------------------------------
// Benchmark: Myers line diff
// ---------------------------------------------------------------------------

fn bench_myers_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("myers_diff");

    let sizes: &[usize] = &[100, 1_000, 5_000];

    for &n in sizes {
        let a = numbered_lines(n);
        let b = with_scattered_edits(&a);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("lines", n), &n, |bencher, _| {
            bencher.iter(|| myers_diff(&a, &b));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: structural merge over synthetic Go files
// ---------------------------------------------------------------------------

fn bench_structural_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("structural_merge/go");

    let sizes: &[usize] = &[10, 100, 500];
    let path = Path::new("bench.go");

    for &n in sizes {
        let base = go_source_with_functions(n);
        let ours = go_source_with_every_fourth_modified(n);
        let theirs = base.clone();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("functions", n), &n, |bencher, _| {
            bencher.iter(|| merge_files(path, base.as_bytes(), ours.as_bytes(), theirs.as_bytes()));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_myers_diff, bench_structural_merge);
criterion_main!(benches);
