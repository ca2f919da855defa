//! Test utilities for spdekit development.
//!
//! - [`stats`]: ensemble statistics for checking samplers against their
//!   analytic covariance.
//! - [`fixtures`]: standard initial conditions and covariance vectors.
//! - [`init_tracing`]: route `tracing` events to the test harness output.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod stats;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Largest absolute elementwise difference between two slices.
///
/// Panics if the lengths differ.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
