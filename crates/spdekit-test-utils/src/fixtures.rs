//! Standard inputs shared by integration tests and benchmarks.

use std::f64::consts::PI;

use spdekit_core::linspace;

/// `amplitude * sin(2 pi x / a)` on `linspace(0, a, intervals + 1)`.
///
/// Periodic: the first and last entries are both zero up to rounding.
pub fn sine_initial(a: f64, intervals: usize, amplitude: f64) -> Vec<f64> {
    linspace(0.0, a, intervals + 1)
        .into_iter()
        .map(|x| amplitude * (2.0 * PI * x / a).sin())
        .collect()
}

/// The end-to-end Allen–Cahn initial condition: `0.1 sin(2 pi x)` on `[0, 1]`.
pub fn allen_cahn_initial(intervals: usize) -> Vec<f64> {
    sine_initial(1.0, intervals, 0.1)
}

/// `exp(-t / ell)` on `linspace(0, t_end, n)`.
pub fn exponential_column(n: usize, t_end: f64, ell: f64) -> Vec<f64> {
    linspace(0.0, t_end, n)
        .into_iter()
        .map(|t| (-t / ell).exp())
        .collect()
}

/// A `rows x cols` plane of `amplitude * sin(2 pi x) sin(2 pi y)` on the
/// unit square, row-major, including both boundary lines.
pub fn sine_plane(rows: usize, cols: usize, amplitude: f64) -> Vec<f64> {
    let x = linspace(0.0, 1.0, rows);
    let y = linspace(0.0, 1.0, cols);
    let mut out = Vec::with_capacity(rows * cols);
    for &xi in &x {
        for &yj in &y {
            out.push(amplitude * (2.0 * PI * xi).sin() * (2.0 * PI * yj).sin());
        }
    }
    out
}
