//! Criterion micro-benchmarks for the transform adapters.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use spdekit_spectral::{Complex64, SineTransform, Spectral1D, Spectral2D};

/// Deterministic test signal.
fn signal(len: usize) -> Vec<Complex64> {
    (0..len)
        .map(|k| Complex64::new((k as f64 * 0.37).sin(), (k as f64 * 0.11).cos()))
        .collect()
}

/// Benchmark: forward + inverse over 32 batched rows of 1024.
fn bench_round_trip_1d(c: &mut Criterion) {
    let mut fft = Spectral1D::new(1024);
    let mut buf = signal(32 * 1024);
    c.bench_function("spectral_1d_round_trip_32x1024", |b| {
        b.iter(|| {
            fft.forward(&mut buf);
            fft.inverse(&mut buf);
            black_box(&buf);
        });
    });
}

/// Benchmark: forward + inverse of one 256x256 plane.
fn bench_round_trip_2d(c: &mut Criterion) {
    let mut fft = Spectral2D::new(256, 256);
    let mut buf = signal(256 * 256);
    c.bench_function("spectral_2d_round_trip_256x256", |b| {
        b.iter(|| {
            fft.forward(&mut buf);
            fft.inverse(&mut buf);
            black_box(&buf);
        });
    });
}

/// Benchmark: DST over 64 rows of 511 interior points.
fn bench_sine_rows(c: &mut Criterion) {
    let mut dst = SineTransform::new(511);
    let mut rows: Vec<f64> = signal(64 * 511).iter().map(|z| z.re).collect();
    c.bench_function("sine_transform_64x511", |b| {
        b.iter(|| {
            dst.apply_rows(&mut rows);
            black_box(&rows);
        });
    });
}

criterion_group!(
    benches,
    bench_round_trip_1d,
    bench_round_trip_2d,
    bench_sine_rows
);
criterion_main!(benches);
