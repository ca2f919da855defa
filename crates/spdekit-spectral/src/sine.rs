//! Type-I discrete sine transform for homogeneous Dirichlet problems.
//!
//! For a signal `x` of length `n` (the interior grid values of `[0, a]`
//! with `n + 1` intervals) the transform returns
//!
//! ```text
//! y[k] = sum_{j=0}^{n-1} x[j] * sin(pi * (j + 1) * (k + 1) / (n + 1))
//! ```
//!
//! which is the unnormalized DST-I halved, i.e. the half-range sine series
//! evaluated at the grid points. It is computed as the imaginary part of
//! a complex FFT of the odd extension of length `2 (n + 1)`.

use num_complex::Complex64;

use crate::transform::Spectral1D;

/// A planned DST-I of fixed length.
#[derive(Debug)]
pub struct SineTransform {
    len: usize,
    plan: Spectral1D,
    work: Vec<Complex64>,
}

impl SineTransform {
    /// Plan a transform for signals of length `len`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "sine transform length must be positive");
        let ext = 2 * (len + 1);
        Self {
            len,
            plan: Spectral1D::new(ext),
            work: vec![Complex64::default(); ext],
        }
    }

    /// Signal length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; zero-length plans are rejected.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Transform `x` into `out`; both have length `len`.
    pub fn apply(&mut self, x: &[f64], out: &mut [f64]) {
        let n = self.len;
        debug_assert_eq!(x.len(), n);
        debug_assert_eq!(out.len(), n);
        let ext = 2 * (n + 1);
        self.work.fill(Complex64::default());
        for (j, &v) in x.iter().enumerate() {
            self.work[j + 1] = Complex64::new(v, 0.0);
            self.work[ext - (j + 1)] = Complex64::new(-v, 0.0);
        }
        self.plan.forward(&mut self.work);
        // FFT(odd extension)[m] = -2i * y[m - 1]
        for (k, o) in out.iter_mut().enumerate() {
            *o = -0.5 * self.work[k + 1].im;
        }
    }

    /// Transform every length-`len` row of `batch` in place.
    pub fn apply_rows(&mut self, batch: &mut [f64]) {
        let mut row_out = vec![0.0; self.len];
        for row in batch.chunks_exact_mut(self.len) {
            self.apply(row, &mut row_out);
            row.copy_from_slice(&row_out);
        }
    }
}
