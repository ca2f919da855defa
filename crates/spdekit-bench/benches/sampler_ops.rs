//! Criterion micro-benchmarks for random field and noise sampling.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use spdekit_core::sim_rng;
use spdekit_field::{reduced_covariance, BccbEmbedding, CirculantEmbedding, SeparableExponential};
use spdekit_noise::{PeriodicCoefficients, PeriodicIncrements, PlanarCoefficients, PlanarIncrements, Space};
use spdekit_spectral::Complex64;
use spdekit_test_utils::fixtures::exponential_column;

/// Benchmark: one pair from a 4096-point exponential embedding.
fn bench_circulant_pair(c: &mut Criterion) {
    let column = exponential_column(4096, 10.0, 1.0);
    let mut embedding = CirculantEmbedding::minimal(&column).unwrap();
    let mut rng = sim_rng(Some(1));
    c.bench_function("circulant_pair_4096", |b| {
        b.iter(|| black_box(embedding.sample(&mut rng)));
    });
}

/// Benchmark: one pair from a padded 64x64 BCCB embedding.
fn bench_bccb_pair(c: &mut Criterion) {
    let cov = SeparableExponential { ell1: 0.2, ell2: 0.2 };
    let (n, m) = (64, 64);
    let c_red = reduced_covariance(n + m, n + m, 1.0 / 64.0, 1.0 / 64.0, &cov).unwrap();
    let mut embedding = BccbEmbedding::padded(&c_red, n, n, m, m).unwrap();
    let mut rng = sim_rng(Some(2));
    c.bench_function("bccb_pair_64x64_pad64", |b| {
        b.iter(|| black_box(embedding.sample(&mut rng)));
    });
}

/// Benchmark: spectral periodic increments, 16 realizations of 1024 modes.
fn bench_periodic_increments(c: &mut Criterion) {
    let coeffs = PeriodicCoefficients::new(1e-3, 1024, 1.0, 1.0).unwrap();
    let mut gen = PeriodicIncrements::new(coeffs, 4, Space::Spectral).unwrap();
    let mut out = vec![Complex64::default(); 16 * 1024];
    let mut rng = sim_rng(Some(3));
    c.bench_function("periodic_increments_16x1024_kappa4", |b| {
        b.iter(|| {
            gen.draw_spectral_into(&mut rng, &mut out);
            black_box(&out);
        });
    });
}

/// Benchmark: planar increments on a 128x128 grid.
fn bench_planar_increments(c: &mut Criterion) {
    let coeffs = PlanarCoefficients::new(1e-3, (128, 128), (1.0, 1.0), 0.01).unwrap();
    let mut gen = PlanarIncrements::new(coeffs, 1).unwrap();
    let mut rng = sim_rng(Some(4));
    c.bench_function("planar_increments_128x128", |b| {
        b.iter(|| black_box(gen.draw(&mut rng, 1)));
    });
}

criterion_group!(
    benches,
    bench_circulant_pair,
    bench_bccb_pair,
    bench_periodic_increments,
    bench_planar_increments
);
criterion_main!(benches);
