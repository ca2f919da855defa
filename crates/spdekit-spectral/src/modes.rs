//! Fourier index bookkeeping: wavenumbers, origin shifts, and the
//! anti-aliasing band.
//!
//! All index formulas here operate on flat buffers in the standard FFT
//! ordering `[0, 1, .., n/2, -(n/2 - 1), .., -1]` (even `n`).

use std::f64::consts::PI;

/// Signed integer frequency of FFT index `k` for length `n`.
///
/// `k <= n/2` maps to `k`, larger indices map to `k - n`. For even `n`
/// the Nyquist index `n/2` is reported as positive.
#[inline]
pub fn signed_index(k: usize, n: usize) -> i64 {
    if k <= n / 2 {
        k as i64
    } else {
        k as i64 - n as i64
    }
}

/// Angular wavenumbers `(2 pi / a) * signed_index(k, n)` for `k in 0..n`.
pub fn wavenumbers(n: usize, a: f64) -> Vec<f64> {
    let scale = 2.0 * PI / a;
    (0..n).map(|k| scale * signed_index(k, n) as f64).collect()
}

/// Move the zero-frequency entry to the centre: `out[(i + n/2) % n] = x[i]`.
pub fn fftshift<T: Copy>(x: &[T]) -> Vec<T> {
    let n = x.len();
    let mut out = x.to_vec();
    for (i, &v) in x.iter().enumerate() {
        out[(i + n / 2) % n] = v;
    }
    out
}

/// Inverse of [`fftshift`]: `out[i] = x[(i + n/2) % n]`.
pub fn ifftshift<T: Copy>(x: &[T]) -> Vec<T> {
    let n = x.len();
    (0..n).map(|i| x[(i + n / 2) % n]).collect()
}

/// Row-major 2D [`fftshift`] applied along both axes:
/// `out[(r + rows/2) % rows][(c + cols/2) % cols] = x[r][c]`.
pub fn fftshift_2d<T: Copy>(x: &[T], rows: usize, cols: usize) -> Vec<T> {
    debug_assert_eq!(x.len(), rows * cols);
    let mut out = x.to_vec();
    for r in 0..rows {
        let rr = (r + rows / 2) % rows;
        for c in 0..cols {
            let cc = (c + cols / 2) % cols;
            out[rr * cols + cc] = x[r * cols + c];
        }
    }
    out
}

/// Inverse of [`fftshift_2d`].
pub fn ifftshift_2d<T: Copy>(x: &[T], rows: usize, cols: usize) -> Vec<T> {
    debug_assert_eq!(x.len(), rows * cols);
    let mut out = x.to_vec();
    for r in 0..rows {
        let rr = (r + rows / 2) % rows;
        for c in 0..cols {
            let cc = (c + cols / 2) % cols;
            out[r * cols + c] = x[rr * cols + cc];
        }
    }
    out
}

/// The contiguous band of high-frequency indices removed when nonlinear
/// terms are evaluated at a coarser resolution `j` than the reference
/// resolution `jref`.
///
/// The band is `j/2 + 1 .. jref - j/2` (half-open). It is symmetric under
/// `k -> jref - k`, so zeroing it preserves Hermitian symmetry, and it is
/// empty when `j == jref`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AliasBand {
    start: usize,
    end: usize,
    len: usize,
}

impl AliasBand {
    /// Band for working resolution `j` inside reference resolution `jref`.
    ///
    /// Callers guarantee `j <= jref`.
    pub fn new(j: usize, jref: usize) -> Self {
        let start = j / 2 + 1;
        let end = jref.saturating_sub(j / 2).max(start);
        Self {
            start,
            end,
            len: jref,
        }
    }

    /// A band that removes nothing.
    pub fn empty(len: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            len,
        }
    }

    /// First removed index.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last removed index.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of removed modes.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// Whether `k` lies in the removed band.
    pub fn contains(&self, k: usize) -> bool {
        k >= self.start && k < self.end
    }

    /// Zero the band in every length-`jref` chunk of `buf`.
    pub fn zero<T: Copy + Default>(&self, buf: &mut [T]) {
        if self.start >= self.end {
            return;
        }
        for chunk in buf.chunks_exact_mut(self.len) {
            chunk[self.start..self.end].fill(T::default());
        }
    }
}
