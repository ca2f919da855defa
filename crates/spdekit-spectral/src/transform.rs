//! Planned 1D and 2D discrete Fourier transforms.
//!
//! Convention: the forward transform is unnormalized and the inverse is
//! scaled by `1/N` (or `1/(N1*N2)`), so `inverse(forward(x)) == x` up to
//! rounding. Buffers may hold several contiguous transforms back to back
//! (one per realization); every length must be a multiple of the plan
//! size.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// A planned 1D transform pair of fixed length.
pub struct Spectral1D {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl std::fmt::Debug for Spectral1D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spectral1D").field("len", &self.len).finish()
    }
}

impl Spectral1D {
    /// Plan forward and inverse transforms of length `len`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`; callers validate resolutions first.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "transform length must be positive");
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            len,
            forward,
            inverse,
            scratch: vec![Complex64::default(); scratch_len],
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; zero-length plans are rejected.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Unnormalized forward transform, in place, of every length-`len` chunk.
    pub fn forward(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len() % self.len, 0);
        self.forward.process_with_scratch(buf, &mut self.scratch);
    }

    /// `1/len`-normalized inverse transform, in place, of every chunk.
    pub fn inverse(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len() % self.len, 0);
        self.inverse.process_with_scratch(buf, &mut self.scratch);
        let scale = 1.0 / self.len as f64;
        for v in buf.iter_mut() {
            *v *= scale;
        }
    }

    /// Forward transform of a real signal into a fresh complex buffer.
    pub fn forward_real(&mut self, x: &[f64]) -> Vec<Complex64> {
        let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward(&mut buf);
        buf
    }

    /// Forward transform of a real signal into an existing complex buffer.
    pub fn forward_real_into(&mut self, x: &[f64], out: &mut [Complex64]) {
        for (o, &v) in out.iter_mut().zip(x) {
            *o = Complex64::new(v, 0.0);
        }
        self.forward(out);
    }
}

/// A planned 2D transform over row-major `rows x cols` planes.
///
/// Implemented as a row pass followed by a column pass; the column pass
/// gathers each column into a contiguous buffer, transforms it, and
/// scatters it back.
pub struct Spectral2D {
    rows: usize,
    cols: usize,
    row_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
    column: Vec<Complex64>,
}

impl std::fmt::Debug for Spectral2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spectral2D")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

impl Spectral2D {
    /// Plan transforms for `rows x cols` planes.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "transform shape must be non-empty");
        let mut planner = FftPlanner::new();
        let row_fwd = planner.plan_fft_forward(cols);
        let row_inv = planner.plan_fft_inverse(cols);
        let col_fwd = planner.plan_fft_forward(rows);
        let col_inv = planner.plan_fft_inverse(rows);
        let scratch_len = [&row_fwd, &row_inv, &col_fwd, &col_inv]
            .iter()
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        Self {
            rows,
            cols,
            row_fwd,
            row_inv,
            col_fwd,
            col_inv,
            scratch: vec![Complex64::default(); scratch_len],
            column: vec![Complex64::default(); rows],
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Entries per plane.
    pub fn plane_len(&self) -> usize {
        self.rows * self.cols
    }

    /// Unnormalized forward 2D transform of every plane in `buf`.
    pub fn forward(&mut self, buf: &mut [Complex64]) {
        self.process(buf, true);
    }

    /// `1/(rows*cols)`-normalized inverse 2D transform of every plane.
    pub fn inverse(&mut self, buf: &mut [Complex64]) {
        self.process(buf, false);
        let scale = 1.0 / self.plane_len() as f64;
        for v in buf.iter_mut() {
            *v *= scale;
        }
    }

    /// Forward transform of a real plane (or stack of planes).
    pub fn forward_real(&mut self, x: &[f64]) -> Vec<Complex64> {
        let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward(&mut buf);
        buf
    }

    /// Forward transform of real planes into an existing complex buffer.
    pub fn forward_real_into(&mut self, x: &[f64], out: &mut [Complex64]) {
        for (o, &v) in out.iter_mut().zip(x) {
            *o = Complex64::new(v, 0.0);
        }
        self.forward(out);
    }

    fn process(&mut self, buf: &mut [Complex64], forward: bool) {
        let plane = self.plane_len();
        debug_assert_eq!(buf.len() % plane, 0);
        let (row_plan, col_plan) = if forward {
            (&self.row_fwd, &self.col_fwd)
        } else {
            (&self.row_inv, &self.col_inv)
        };
        // Rows are contiguous, so one call covers every row of every plane.
        row_plan.process_with_scratch(buf, &mut self.scratch);
        for p in buf.chunks_exact_mut(plane) {
            for c in 0..self.cols {
                for r in 0..self.rows {
                    self.column[r] = p[r * self.cols + c];
                }
                col_plan.process_with_scratch(&mut self.column, &mut self.scratch);
                for r in 0..self.rows {
                    p[r * self.cols + c] = self.column[r];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: Complex64, b: Complex64, tol: f64) -> bool {
        (a - b).norm() < tol
    }

    #[test]
    fn forward_is_unnormalized_dft() {
        let x = [1.0, 2.0, 0.0, -1.0, 3.0];
        let mut plan = Spectral1D::new(x.len());
        let got = plan.forward_real(&x);
        let n = x.len();
        for (k, g) in got.iter().enumerate() {
            let mut expect = Complex64::new(0.0, 0.0);
            for (j, &v) in x.iter().enumerate() {
                let theta = -2.0 * PI * (j * k) as f64 / n as f64;
                expect += Complex64::new(theta.cos(), theta.sin()) * v;
            }
            assert!(close(*g, expect, 1e-12), "k={k}: {g} vs {expect}");
        }
    }

    #[test]
    fn batched_chunks_transform_independently() {
        let mut plan = Spectral1D::new(4);
        let mut batch: Vec<Complex64> = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        plan.forward(&mut batch);
        // Delta at 0 -> all ones.
        for v in &batch[..4] {
            assert!(close(*v, Complex64::new(1.0, 0.0), 1e-14));
        }
        // Delta at 1 -> exp(-i pi k / 2).
        assert!(close(batch[5], Complex64::new(0.0, -1.0), 1e-14));
        assert!(close(batch[6], Complex64::new(-1.0, 0.0), 1e-14));
    }

    #[test]
    fn transform_2d_of_constant_is_delta() {
        let mut plan = Spectral2D::new(3, 4);
        let mut buf = vec![Complex64::new(2.0, 0.0); 12];
        plan.forward(&mut buf);
        assert!(close(buf[0], Complex64::new(24.0, 0.0), 1e-12));
        for v in &buf[1..] {
            assert!(v.norm() < 1e-12);
        }
        plan.inverse(&mut buf);
        for v in &buf {
            assert!(close(*v, Complex64::new(2.0, 0.0), 1e-12));
        }
    }

    #[test]
    fn transform_2d_matches_separable_plane_wave() {
        // x[r, c] = exp(2 pi i (r/rows + 2c/cols)) concentrates at (1, 2).
        let (rows, cols) = (4, 6);
        let mut buf: Vec<Complex64> = (0..rows * cols)
            .map(|i| {
                let (r, c) = (i / cols, i % cols);
                let theta = 2.0 * PI * (r as f64 / rows as f64 + 2.0 * c as f64 / cols as f64);
                Complex64::new(theta.cos(), theta.sin())
            })
            .collect();
        let mut plan = Spectral2D::new(rows, cols);
        plan.forward(&mut buf);
        for (i, v) in buf.iter().enumerate() {
            let expect = if i == cols + 2 { 24.0 } else { 0.0 };
            assert!(close(*v, Complex64::new(expect, 0.0), 1e-10), "i={i} {v}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn round_trip_1d(xs in prop::collection::vec(-100.0f64..100.0, 1..64)) {
                let mut plan = Spectral1D::new(xs.len());
                let mut buf = plan.forward_real(&xs);
                plan.inverse(&mut buf);
                for (b, &x) in buf.iter().zip(&xs) {
                    prop_assert!((b.re - x).abs() < 1e-9);
                    prop_assert!(b.im.abs() < 1e-9);
                }
            }

            #[test]
            fn round_trip_2d(
                rows in 1usize..9,
                cols in 1usize..9,
                seed in prop::collection::vec(-10.0f64..10.0, 64),
            ) {
                let xs: Vec<f64> = seed.iter().copied().take(rows * cols).collect();
                let mut plan = Spectral2D::new(rows, cols);
                let mut buf = plan.forward_real(&xs);
                plan.inverse(&mut buf);
                for (b, &x) in buf.iter().zip(&xs) {
                    prop_assert!((b.re - x).abs() < 1e-9);
                    prop_assert!(b.im.abs() < 1e-9);
                }
            }
        }
    }
}
