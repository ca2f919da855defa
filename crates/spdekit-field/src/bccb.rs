//! Circulant embedding for stationary Gaussian fields on a rectangle.
//!
//! The covariance matrix of a stationary field on an `n1 x n2` grid is
//! block Toeplitz with Toeplitz blocks (BTTB), described by the reduced
//! covariance: a `(2n1 - 1, 2n2 - 1)` array of covariances at every lag
//! vector. Zero-padding it to `(2n1, 2n2)` (offset by one row and one
//! column) and shifting the origin to index `(0, 0)` yields the first
//! block of a BCCB matrix, which the 2D FFT diagonalizes.
//!
//! Draw order: one sample consumes `2N` normals, the `N` real parts in
//! row-major order followed by the `N` imaginary parts.

use num_complex::Complex64;
use rand::Rng;
use spdekit_core::{fill_standard_normal, Array2, ConfigError, EmbeddingError};
use spdekit_spectral::{fftshift_2d, Spectral2D};

use crate::circulant::EmbeddingDiagnostic;
use crate::covariance::Covariance2D;

/// Reduced covariance of an `n1 x n2` grid with spacings `(dx1, dx2)`.
///
/// Entry `(i, j)` is `cov((i + 1 - n1) dx1, (j + 1 - n2) dx2)`, so the
/// zero lag sits at the centre `(n1 - 1, n2 - 1)`.
pub fn reduced_covariance<C: Covariance2D + ?Sized>(
    n1: usize,
    n2: usize,
    dx1: f64,
    dx2: f64,
    cov: &C,
) -> Result<Array2<f64>, ConfigError> {
    check_resolution("n1", n1)?;
    check_resolution("n2", n2)?;
    Ok(Array2::from_fn(2 * n1 - 1, 2 * n2 - 1, |i, j| {
        let x1 = (i as f64 + 1.0 - n1 as f64) * dx1;
        let x2 = (j as f64 + 1.0 - n2 as f64) * dx2;
        cov.eval(x1, x2)
    }))
}

fn check_resolution(name: &'static str, n: usize) -> Result<(), ConfigError> {
    if n == 0 {
        return Err(ConfigError::InvalidResolution {
            name,
            value: 0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Two independent sample fields from one complex draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePair2D {
    /// Real part of the draw.
    pub x: Array2<f64>,
    /// Imaginary part of the draw.
    pub y: Array2<f64>,
}

/// A BCCB (or BCCB-embedded) covariance, ready for sampling.
#[derive(Debug)]
pub struct BccbEmbedding {
    shape: (usize, usize),
    out: (usize, usize),
    eigenvalues: Vec<f64>,
    sqrt_eig: Vec<f64>,
    diagnostic: EmbeddingDiagnostic,
    fft: Spectral2D,
    work: Vec<Complex64>,
}

impl BccbEmbedding {
    /// Use `c` directly as the first block of a BCCB covariance.
    ///
    /// Samples have the shape of `c`.
    pub fn circulant(c: &Array2<f64>) -> Result<Self, EmbeddingError> {
        check_block(c)?;
        Ok(Self::from_block(c.as_slice(), c.shape(), c.shape()))
    }

    /// Minimal embedding of the reduced covariance of an `n1 x n2` grid.
    pub fn minimal(c_red: &Array2<f64>, n1: usize, n2: usize) -> Result<Self, EmbeddingError> {
        Self::padded(c_red, n1, n2, 0, 0)
    }

    /// Embedding padded by `(m1, m2)` extra grid lines.
    ///
    /// `c_red` must be the reduced covariance of the padded
    /// `(n1 + m1) x (n2 + m2)` grid; samples are the leading `n1 x n2`
    /// block.
    pub fn padded(
        c_red: &Array2<f64>,
        n1: usize,
        n2: usize,
        m1: usize,
        m2: usize,
    ) -> Result<Self, EmbeddingError> {
        check_resolution("n1", n1)?;
        check_resolution("n2", n2)?;
        let (nn1, nn2) = (n1 + m1, n2 + m2);
        let expected = (2 * nn1 - 1, 2 * nn2 - 1);
        if c_red.shape() != expected {
            return Err(EmbeddingError::ShapeMismatch {
                expected,
                actual: c_red.shape(),
            });
        }
        check_block(c_red)?;
        let (rows, cols) = (2 * nn1, 2 * nn2);
        let mut tilde = vec![0.0; rows * cols];
        for i in 0..expected.0 {
            let dst = (i + 1) * cols + 1;
            tilde[dst..dst + expected.1].copy_from_slice(c_red.row(i));
        }
        let tilde = fftshift_2d(&tilde, rows, cols);
        Ok(Self::from_block(&tilde, (rows, cols), (n1, n2)))
    }

    fn from_block(block: &[f64], shape: (usize, usize), out: (usize, usize)) -> Self {
        let mut fft = Spectral2D::new(shape.0, shape.1);
        let big_n = (shape.0 * shape.1) as f64;
        let mut lam: Vec<Complex64> = block.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        fft.inverse(&mut lam);
        let eigenvalues: Vec<f64> = lam.iter().map(|z| z.re * big_n).collect();
        let diagnostic = EmbeddingDiagnostic::from_eigenvalues(&eigenvalues);
        diagnostic.report();
        let sqrt_eig = eigenvalues.iter().map(|&d| d.max(0.0).sqrt()).collect();
        Self {
            shape,
            out,
            eigenvalues,
            sqrt_eig,
            diagnostic,
            fft,
            work: vec![Complex64::default(); shape.0 * shape.1],
        }
    }

    /// Shape of the circulant block.
    pub fn embedded_shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Shape of each returned sample.
    pub fn output_shape(&self) -> (usize, usize) {
        self.out
    }

    /// Raw eigenvalues, row-major over the embedded shape.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Embedding defect, `max(0, -min eigenvalue)`.
    pub fn rho_minus(&self) -> f64 {
        self.diagnostic.rho_minus
    }

    /// Full defect report.
    pub fn diagnostic(&self) -> EmbeddingDiagnostic {
        self.diagnostic
    }

    /// Draw one pair of independent sample fields.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SamplePair2D {
        let big_n = self.work.len();
        let mut normals = vec![0.0; 2 * big_n];
        fill_standard_normal(rng, &mut normals);
        let (re, im) = normals.split_at(big_n);
        for (k, w) in self.work.iter_mut().enumerate() {
            *w = Complex64::new(re[k], im[k]) * self.sqrt_eig[k];
        }
        self.fft.forward(&mut self.work);
        let scale = 1.0 / (big_n as f64).sqrt();
        let cols = self.shape.1;
        let (n1, n2) = self.out;
        let work = &self.work;
        SamplePair2D {
            x: Array2::from_fn(n1, n2, |i, j| work[extract_index(i, j, cols)].re * scale),
            y: Array2::from_fn(n1, n2, |i, j| work[extract_index(i, j, cols)].im * scale),
        }
    }
}

/// Row-major index into the embedded `(2 nn1, 2 nn2)` sample of output
/// point `(i, j)`.
///
/// The extraction flattens the sample column by column, keeps the first
/// `2 nn1 nn2` entries, views them as `(nn1, 2 nn2)` column-major and keeps
/// rows `0..n1` and every other column. Column `2j` of that view starts at
/// flat offset `2j * nn1 = j * (2 nn1)`, the start of column `j` of the
/// sample, so the whole map reduces to the leading block.
#[inline]
fn extract_index(i: usize, j: usize, cols: usize) -> usize {
    i * cols + j
}

fn check_block(c: &Array2<f64>) -> Result<(), EmbeddingError> {
    if c.as_slice().is_empty() {
        return Err(EmbeddingError::EmptyCovariance);
    }
    if let Some(index) = c.as_slice().iter().position(|v| !v.is_finite()) {
        return Err(EmbeddingError::NonFinite { index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::SeparableExponential;
    use spdekit_core::sim_rng;

    /// The column-major flatten / reshape / stride-2 recipe, executed
    /// literally.
    fn literal_extraction(z: &[f64], nn1: usize, nn2: usize, n1: usize, n2: usize) -> Vec<f64> {
        let rows = 2 * nn1;
        let flat_cm: Vec<f64> = (0..rows * 2 * nn2)
            .map(|f| z[(f % rows) * (2 * nn2) + f / rows])
            .take(2 * nn1 * nn2)
            .collect();
        let mut out = Vec::new();
        for i in 0..n1 {
            for j in 0..n2 {
                out.push(flat_cm[i + 2 * j * nn1]);
            }
        }
        out
    }

    #[test]
    fn extraction_map_matches_reshape_recipe() {
        let (nn1, nn2, n1, n2) = (5, 4, 3, 2);
        let cols = 2 * nn2;
        let z: Vec<f64> = (0..2 * nn1 * cols).map(|v| v as f64).collect();
        let expect = literal_extraction(&z, nn1, nn2, n1, n2);
        let mut got = Vec::new();
        for i in 0..n1 {
            for j in 0..n2 {
                got.push(z[extract_index(i, j, cols)]);
            }
        }
        assert_eq!(got, expect);
    }

    #[test]
    fn reduced_covariance_centres_zero_lag() {
        let cov = SeparableExponential {
            ell1: 1.0,
            ell2: 1.0,
        };
        let c = reduced_covariance(3, 4, 0.5, 0.25, &cov).unwrap();
        assert_eq!(c.shape(), (5, 7));
        assert_eq!(c.get(2, 3), 1.0);
        assert_eq!(c.get(0, 0), c.get(4, 6));
        assert!((c.get(0, 3) - (-1.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn embedding_places_zero_lag_at_origin() {
        let cov = SeparableExponential {
            ell1: 0.3,
            ell2: 0.3,
        };
        let (n1, n2) = (4, 6);
        let c = reduced_covariance(n1, n2, 0.1, 0.1, &cov).unwrap();
        let emb = BccbEmbedding::minimal(&c, n1, n2).unwrap();
        assert_eq!(emb.embedded_shape(), (8, 12));
        // Sum of eigenvalues = N * c(0).
        let total: f64 = emb.eigenvalues().iter().sum();
        assert!((total - 96.0).abs() < 1e-9);
    }

    #[test]
    fn padding_removes_separable_exponential_defect() {
        let cov = SeparableExponential {
            ell1: 0.5,
            ell2: 0.2,
        };
        let (dx1, dx2) = (1.0 / 15.0, 1.0 / 11.0);
        let c = reduced_covariance(16, 12, dx1, dx2, &cov).unwrap();
        let mut minimal = BccbEmbedding::minimal(&c, 16, 12).unwrap();
        assert!(minimal.rho_minus() > 0.1);
        assert!(!minimal.diagnostic().is_positive_semidefinite());
        // Clamped modes still give finite fields of the requested shape.
        let pair = minimal.sample(&mut sim_rng(Some(12)));
        for field in [&pair.x, &pair.y] {
            assert_eq!(field.shape(), (16, 12));
            assert!(field.as_slice().iter().all(|v| v.is_finite()));
        }

        let c = reduced_covariance(32, 24, dx1, dx2, &cov).unwrap();
        let padded = BccbEmbedding::padded(&c, 16, 12, 16, 12).unwrap();
        assert!(padded.rho_minus() < 1e-10);
        assert_eq!(padded.output_shape(), (16, 12));
    }

    #[test]
    fn padded_requires_padded_block() {
        let cov = |x1: f64, x2: f64| (-(x1 * x1 + x2 * x2)).exp();
        let c = reduced_covariance(4, 4, 0.1, 0.1, &cov).unwrap();
        let err = BccbEmbedding::padded(&c, 4, 4, 2, 2).unwrap_err();
        assert_eq!(
            err,
            EmbeddingError::ShapeMismatch {
                expected: (11, 11),
                actual: (7, 7)
            }
        );
        let c = reduced_covariance(6, 6, 0.1, 0.1, &cov).unwrap();
        let mut emb = BccbEmbedding::padded(&c, 4, 4, 2, 2).unwrap();
        let pair = emb.sample(&mut sim_rng(Some(9)));
        assert_eq!(pair.x.shape(), (4, 4));
        assert_eq!(pair.y.shape(), (4, 4));
    }

    #[test]
    fn circulant_block_samples_full_shape() {
        let c = Array2::from_fn(4, 4, |i, j| if i == 0 && j == 0 { 1.0 } else { 0.0 });
        let mut emb = BccbEmbedding::circulant(&c).unwrap();
        // Identity covariance: eigenvalues all one.
        assert!(emb.eigenvalues().iter().all(|&d| (d - 1.0).abs() < 1e-12));
        let a = emb.sample(&mut sim_rng(Some(2)));
        let b = emb.sample(&mut sim_rng(Some(2)));
        assert_eq!(a, b);
        assert_eq!(a.x.shape(), (4, 4));
    }
}
