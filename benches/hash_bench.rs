/// Benchmarks for exprkey hashing and comparison.
///
/// Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use exprkey::domain::corpus;
use exprkey::{are_equal, hash_expr, ComparerConfig, ExpressionEqualityComparer};

// ═══════════════════════════════════════════════════════════════════════════
// Single-thread engines
// ═══════════════════════════════════════════════════════════════════════════

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");

    for count in [100usize, 1_000, 10_000] {
        let trees = corpus::corpus(count).expect("corpus");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("uncached", count), &trees, |b, trees| {
            b.iter(|| {
                for tree in trees {
                    black_box(hash_expr(tree));
                }
            })
        });

        let comparer = ExpressionEqualityComparer::new(&ComparerConfig::default());
        group.bench_with_input(BenchmarkId::new("cached", count), &trees, |b, trees| {
            b.iter(|| {
                for tree in trees {
                    black_box(comparer.hash_root(tree));
                }
            })
        });
    }

    group.finish();
}

fn bench_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("equality");

    for count in [100usize, 1_000] {
        let trees = corpus::corpus(count).expect("corpus");
        let twins = corpus::corpus(count).expect("corpus");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("twins", count), &(trees, twins), |b, (trees, twins)| {
            b.iter(|| {
                for (tree, twin) in trees.iter().zip(twins) {
                    black_box(are_equal(tree, twin));
                }
            })
        });
    }

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Parallel corpus analysis
// ═══════════════════════════════════════════════════════════════════════════

fn bench_analyze_corpus(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_corpus");
    group.sample_size(20);

    let count = 20_000;
    let trees = corpus::corpus(count).expect("corpus");
    let twins = corpus::corpus(count).expect("corpus");
    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("uncached", |b| {
        let comparer = ExpressionEqualityComparer::new(&ComparerConfig {
            cache_hash_codes: false,
            ..ComparerConfig::default()
        });
        b.iter(|| black_box(comparer.analyze_corpus(&trees, &twins)))
    });

    group.finish();
}

criterion_group!(benches, bench_hash, bench_equality, bench_analyze_corpus);
criterion_main!(benches);
