//! Benchmarks for antipode matching.
//!
//! Run with: cargo bench --package symmetry --bench matcher_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use symmetry::{AntipodeMatcher, MatchConfig, ToleranceMode};
use test_utils::{antipodally_symmetric_grid, weather_like_grid};

fn bench_find_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_matches");
    let matcher = AntipodeMatcher::new(MatchConfig::default()).unwrap();

    for step in [4.0, 2.0, 1.0] {
        let set = weather_like_grid(step);
        group.throughput(Throughput::Elements(set.len() as u64));
        group.bench_with_input(BenchmarkId::new("weather_like", step), &set, |b, set| {
            b.iter(|| matcher.find_matches(black_box(set)).unwrap())
        });
    }

    // worst case: every mirrored cell produces a pair
    let set = antipodally_symmetric_grid(1.0);
    group.throughput(Throughput::Elements(set.len() as u64));
    group.bench_function("all_match_1deg", |b| {
        b.iter(|| matcher.find_matches(black_box(&set)).unwrap())
    });

    group.finish();
}

fn bench_tolerance_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tolerance_mode");
    let set = weather_like_grid(1.0);

    for mode in [
        ToleranceMode::RelativeToA,
        ToleranceMode::Symmetric,
        ToleranceMode::Absolute,
    ] {
        let matcher = AntipodeMatcher::new(MatchConfig::default().with_mode(mode)).unwrap();
        group.bench_function(format!("{:?}", mode), |b| {
            b.iter(|| matcher.find_matches(black_box(&set)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_matches, bench_tolerance_modes);
criterion_main!(benches);
