//! Circulant embedding for stationary Gaussian processes on the line.
//!
//! A stationary process sampled on a uniform grid has a symmetric Toeplitz
//! covariance matrix, fully described by its first column `c`. Mirroring
//! `c` gives the first column of a circulant matrix whose eigenvalues are
//! one DFT away:
//!
//! ```text
//! c_tilde = [c[0], c[1], .., c[n-1], c[n-2], .., c[1]]    (length 2n - 2)
//! d       = Re(N * ifft(c_tilde))                           (N = len(c_tilde))
//! ```
//!
//! A complex standard normal vector `xi` scaled by `sqrt(d)` and pushed
//! through a forward FFT (normalized by `1/sqrt(N)`) has real and imaginary
//! parts that are two independent samples with covariance `c_tilde`; their
//! first `n` entries are samples with the Toeplitz covariance.
//!
//! When the circulant is not positive semi-definite, the negative
//! eigenvalues are clamped to zero and the defect is reported through an
//! [`EmbeddingDiagnostic`] and a `warn!` event. Padding the covariance with
//! extra lags before mirroring ([`CirculantEmbedding::padded`]) usually
//! drives the defect to zero.
//!
//! Draw order: one sample consumes `2N` normals, interleaved as
//! `xi[i] = n[2i] + i * n[2i + 1]`.

use num_complex::Complex64;
use rand::Rng;
use spdekit_core::{fill_standard_normal, ConfigError, EmbeddingError, Grid1D};
use spdekit_spectral::Spectral1D;
use tracing::warn;

use crate::covariance::{Covariance1D, Exponential, WhittleMatern};

/// How far an embedding is from positive semi-definite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmbeddingDiagnostic {
    /// `max(0, -min eigenvalue)`; zero for a valid embedding.
    pub rho_minus: f64,
    /// Number of strictly negative eigenvalues that were clamped.
    pub negative_modes: usize,
    /// Number of eigenvalues (the embedded size).
    pub size: usize,
}

impl EmbeddingDiagnostic {
    /// Measure the defect of an eigenvalue array.
    pub fn from_eigenvalues(d: &[f64]) -> Self {
        let mut rho_minus = 0.0f64;
        let mut negative_modes = 0;
        for &v in d {
            if v < 0.0 {
                negative_modes += 1;
                rho_minus = rho_minus.max(-v);
            }
        }
        Self {
            rho_minus,
            negative_modes,
            size: d.len(),
        }
    }

    /// Whether no eigenvalue was clamped.
    pub fn is_positive_semidefinite(&self) -> bool {
        self.negative_modes == 0
    }

    pub(crate) fn report(&self) {
        if self.rho_minus > 0.0 {
            warn!(
                rho_minus = self.rho_minus,
                negative_modes = self.negative_modes,
                size = self.size,
                "circulant embedding is not positive semi-definite; clamping negative eigenvalues"
            );
        }
    }
}

/// Two independent sample paths from one complex draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePair {
    /// Real part of the draw.
    pub x: Vec<f64>,
    /// Imaginary part of the draw.
    pub y: Vec<f64>,
}

/// A 1D circulant (or circulant-embedded) covariance, ready for sampling.
#[derive(Debug)]
pub struct CirculantEmbedding {
    eigenvalues: Vec<f64>,
    sqrt_eig: Vec<f64>,
    out_len: usize,
    diagnostic: EmbeddingDiagnostic,
    fft: Spectral1D,
    work: Vec<Complex64>,
}

impl CirculantEmbedding {
    /// Use `c` directly as the first column of a circulant covariance.
    ///
    /// Samples have the same length as `c`.
    pub fn circulant(c: &[f64]) -> Result<Self, EmbeddingError> {
        check_samples(c)?;
        Ok(Self::from_column(c.to_vec(), c.len()))
    }

    /// Minimal embedding of the Toeplitz covariance with first column `c`.
    ///
    /// Samples have the same length as `c`.
    pub fn minimal(c: &[f64]) -> Result<Self, EmbeddingError> {
        Self::padded(c, c.len())
    }

    /// Embedding of a padded first column, truncated to `n` output points.
    ///
    /// `c_padded` holds the covariance at `n + m` lags; the extra `m` lags
    /// enlarge the circulant, which typically removes negative eigenvalues
    /// at the cost of a larger FFT.
    pub fn padded(c_padded: &[f64], n: usize) -> Result<Self, EmbeddingError> {
        check_samples(c_padded)?;
        if n == 0 {
            return Err(ConfigError::InvalidResolution {
                name: "n",
                value: 0,
                reason: "must be at least 1",
            }
            .into());
        }
        if n > c_padded.len() {
            return Err(EmbeddingError::TruncationTooLong {
                requested: n,
                available: c_padded.len(),
            });
        }
        Ok(Self::from_column(mirror(c_padded), n))
    }

    fn from_column(column: Vec<f64>, out_len: usize) -> Self {
        let mut fft = Spectral1D::new(column.len());
        let eigenvalues = eigenvalues_with(&mut fft, &column);
        let diagnostic = EmbeddingDiagnostic::from_eigenvalues(&eigenvalues);
        diagnostic.report();
        let sqrt_eig = eigenvalues.iter().map(|&d| d.max(0.0).sqrt()).collect();
        let work = vec![Complex64::default(); column.len()];
        Self {
            eigenvalues,
            sqrt_eig,
            out_len,
            diagnostic,
            fft,
            work,
        }
    }

    /// Raw eigenvalues of the circulant, before clamping.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Size of the circulant.
    pub fn embedded_len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Length of each returned sample path.
    pub fn len(&self) -> usize {
        self.out_len
    }

    /// Always `false`; empty covariances are rejected.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Embedding defect, `max(0, -min eigenvalue)`.
    pub fn rho_minus(&self) -> f64 {
        self.diagnostic.rho_minus
    }

    /// Full defect report.
    pub fn diagnostic(&self) -> EmbeddingDiagnostic {
        self.diagnostic
    }

    /// Draw one pair of independent samples.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SamplePair {
        let big_n = self.sqrt_eig.len();
        let mut normals = vec![0.0; 2 * big_n];
        fill_standard_normal(rng, &mut normals);
        for (i, (w, &s)) in self.work.iter_mut().zip(&self.sqrt_eig).enumerate() {
            *w = Complex64::new(normals[2 * i], normals[2 * i + 1]) * s;
        }
        self.fft.forward(&mut self.work);
        let scale = 1.0 / (big_n as f64).sqrt();
        let head = &self.work[..self.out_len];
        SamplePair {
            x: head.iter().map(|z| z.re * scale).collect(),
            y: head.iter().map(|z| z.im * scale).collect(),
        }
    }
}

/// `[c, reverse(c[1..n-1])]`.
fn mirror(c: &[f64]) -> Vec<f64> {
    let n = c.len();
    let mut out = c.to_vec();
    if n > 2 {
        out.extend(c[1..n - 1].iter().rev());
    }
    out
}

fn check_samples(c: &[f64]) -> Result<(), EmbeddingError> {
    if c.is_empty() {
        return Err(EmbeddingError::EmptyCovariance);
    }
    if let Some(index) = c.iter().position(|v| !v.is_finite()) {
        return Err(EmbeddingError::NonFinite { index });
    }
    Ok(())
}

fn eigenvalues_with(fft: &mut Spectral1D, column: &[f64]) -> Vec<f64> {
    let big_n = column.len() as f64;
    let mut buf: Vec<Complex64> = column.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    fft.inverse(&mut buf);
    buf.iter().map(|z| z.re * big_n).collect()
}

/// Embedding defect of the minimal embedding of `c`, without logging.
pub fn rho_d_minus(c: &[f64]) -> Result<f64, EmbeddingError> {
    check_samples(c)?;
    let column = mirror(c);
    let mut fft = Spectral1D::new(column.len());
    let d = eigenvalues_with(&mut fft, &column);
    Ok(EmbeddingDiagnostic::from_eigenvalues(&d).rho_minus)
}

/// Exact sampling of a circulant covariance with first column `c`.
pub fn circulant_sample<R: Rng + ?Sized>(
    c: &[f64],
    rng: &mut R,
) -> Result<SamplePair, EmbeddingError> {
    Ok(CirculantEmbedding::circulant(c)?.sample(rng))
}

/// Sampling of the Toeplitz covariance with first column `c` through its
/// minimal circulant embedding.
pub fn circulant_embed_sample<R: Rng + ?Sized>(
    c: &[f64],
    rng: &mut R,
) -> Result<SamplePair, EmbeddingError> {
    Ok(CirculantEmbedding::minimal(c)?.sample(rng))
}

/// A pair of samples of the exponential covariance `exp(-|t|/ell)` on
/// the points of `grid`.
pub fn circulant_exponential<R: Rng + ?Sized>(
    grid: &Grid1D,
    ell: f64,
    rng: &mut R,
) -> Result<SamplePair, EmbeddingError> {
    spdekit_core::error::require_positive("ell", ell)?;
    let c = Exponential { ell }.sample_on(grid);
    circulant_embed_sample(&c, rng)
}

/// Output of [`circulant_approx_whittle_matern`].
#[derive(Clone, Debug, PartialEq)]
pub struct WhittleMaternSample {
    /// Sample times `k * dt`, `k = 0..n`.
    pub t: Vec<f64>,
    /// First sample path.
    pub x: Vec<f64>,
    /// Second, independent sample path.
    pub y: Vec<f64>,
    /// Covariance at all `n + m` lags used for the embedding.
    pub c: Vec<f64>,
    /// Defect of the padded embedding.
    pub diagnostic: EmbeddingDiagnostic,
}

/// Whittle–Matérn covariance at lags `k * dt`, `k = 0..len`.
fn whittle_matern_lags(len: usize, dt: f64, q: f64) -> Vec<f64> {
    let cov = WhittleMatern { q };
    (0..len).map(|k| cov.eval(k as f64 * dt)).collect()
}

fn check_whittle_matern(n: usize, dt: f64, q: f64) -> Result<(), ConfigError> {
    if n == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "n",
            value: 0,
            reason: "must be at least 1",
        });
    }
    spdekit_core::error::require_positive("dt", dt)?;
    spdekit_core::error::require_positive("q", q)
}

/// Approximate sampling of the Whittle–Matérn process with regularity `q`
/// at `n` points of spacing `dt`, padding the embedding with `m` extra lags.
pub fn circulant_approx_whittle_matern<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    dt: f64,
    q: f64,
    rng: &mut R,
) -> Result<WhittleMaternSample, EmbeddingError> {
    check_whittle_matern(n, dt, q)?;
    let c = whittle_matern_lags(n + m, dt, q);
    let mut embedding = CirculantEmbedding::padded(&c, n)?;
    let SamplePair { x, y } = embedding.sample(rng);
    Ok(WhittleMaternSample {
        t: (0..n).map(|k| k as f64 * dt).collect(),
        x,
        y,
        c,
        diagnostic: embedding.diagnostic(),
    })
}

/// Padding sizes `100, 200, .., 10000` used for defect sweeps.
pub fn default_paddings() -> Vec<usize> {
    (1..=100).map(|i| 100 * i).collect()
}

/// Embedding defect of the Whittle–Matérn covariance on `n` points of
/// spacing `dt`, for each padding size in `paddings`.
///
/// Returns `(n + m, rho_minus)` per padding `m`.
pub fn rho_whittle_matern(
    n: usize,
    dt: f64,
    q: f64,
    paddings: &[usize],
) -> Result<Vec<(usize, f64)>, EmbeddingError> {
    check_whittle_matern(n, dt, q)?;
    let longest = paddings.iter().copied().max().unwrap_or(0) + n;
    // Lags are k * dt for every padding, so one evaluation serves all.
    let c = whittle_matern_lags(longest, dt, q);
    paddings
        .iter()
        .map(|&m| Ok((n + m, rho_d_minus(&c[..n + m])?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdekit_core::sim_rng;

    // ── embedding ──────────────────────────────────────────────────

    #[test]
    fn mirror_has_length_two_n_minus_two() {
        assert_eq!(mirror(&[1.0, 2.0, 3.0, 4.0]), vec![1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
        assert_eq!(mirror(&[1.0, 2.0]), vec![1.0, 2.0]);
        assert_eq!(mirror(&[1.0]), vec![1.0]);
    }

    #[test]
    fn exponential_embedding_is_positive_definite() {
        let grid = Grid1D::new(5.0, 63).unwrap();
        let c = Exponential { ell: 1.0 }.sample_on(&grid);
        assert!(rho_d_minus(&c).unwrap() < 1e-10);
        let emb = CirculantEmbedding::minimal(&c).unwrap();
        assert_eq!(emb.embedded_len(), 2 * 64 - 2);
        assert!(emb.diagnostic().is_positive_semidefinite());
    }

    #[test]
    fn gaussian_kernel_on_fine_grid_has_defect() {
        // Smooth kernels on a short window need padding.
        let t: Vec<f64> = (0..50).map(|k| k as f64 * 0.02).collect();
        let c = crate::covariance::Gaussian { ell: 1.0 }.sample_lags(&t);
        let emb = CirculantEmbedding::minimal(&c).unwrap();
        assert!(emb.rho_minus() > 0.0);
        assert!(emb.diagnostic().negative_modes > 0);
        assert!((emb.rho_minus() - rho_d_minus(&c).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn eigenvalues_of_symmetric_circulant_are_real_dft() {
        let c = [2.0, 0.5, 0.1, 0.5];
        let emb = CirculantEmbedding::circulant(&c).unwrap();
        // d_k = sum_j c_j cos(2 pi j k / 4)
        let expect = [3.1, 1.9, 1.1, 1.9];
        for (d, e) in emb.eigenvalues().iter().zip(expect) {
            assert!((d - e).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_covariance_is_rejected() {
        assert_eq!(
            CirculantEmbedding::minimal(&[]).unwrap_err(),
            EmbeddingError::EmptyCovariance
        );
        assert_eq!(
            CirculantEmbedding::minimal(&[1.0, f64::NAN]).unwrap_err(),
            EmbeddingError::NonFinite { index: 1 }
        );
        assert_eq!(
            CirculantEmbedding::padded(&[1.0, 0.5], 3).unwrap_err(),
            EmbeddingError::TruncationTooLong {
                requested: 3,
                available: 2
            }
        );
    }

    // ── sampling ───────────────────────────────────────────────────

    #[test]
    fn samples_have_requested_length_and_are_seeded() {
        let c: Vec<f64> = (0..30).map(|k| (-(k as f64) * 0.1).exp()).collect();
        let a = circulant_embed_sample(&c, &mut sim_rng(Some(7))).unwrap();
        let b = circulant_embed_sample(&c, &mut sim_rng(Some(7))).unwrap();
        assert_eq!(a.x.len(), 30);
        assert_eq!(a.y.len(), 30);
        assert_eq!(a, b);
        assert_ne!(a.x, a.y);
    }

    #[test]
    fn degenerate_circulant_gives_constant_paths() {
        // All-ones covariance: only the zero mode survives.
        let mut emb = CirculantEmbedding::circulant(&[1.0; 8]).unwrap();
        let pair = emb.sample(&mut sim_rng(Some(3)));
        for v in &pair.x {
            assert!((v - pair.x[0]).abs() < 1e-6);
        }
    }

    #[test]
    fn whittle_matern_sample_shapes() {
        let s = circulant_approx_whittle_matern(20, 40, 0.1, 1.5, &mut sim_rng(Some(1))).unwrap();
        assert_eq!(s.t.len(), 20);
        assert_eq!(s.x.len(), 20);
        assert_eq!(s.c.len(), 60);
        assert_eq!(s.c[0], 1.0);
        assert!((s.t[3] - 0.3).abs() < 1e-15);
        assert_eq!(s.diagnostic.size, 2 * 60 - 2);
    }

    #[test]
    fn rho_sweep_reports_embedded_lengths() {
        let sweep = rho_whittle_matern(16, 0.5, 0.5, &[0, 8, 32]).unwrap();
        let sizes: Vec<usize> = sweep.iter().map(|&(s, _)| s).collect();
        assert_eq!(sizes, vec![16, 24, 48]);
        assert!(sweep.iter().all(|&(_, rho)| rho >= 0.0));
        assert_eq!(default_paddings().len(), 100);
        assert_eq!(default_paddings()[99], 10_000);
    }

    #[test]
    fn whittle_matern_rejects_bad_config() {
        let err = circulant_approx_whittle_matern(0, 4, 0.1, 1.0, &mut sim_rng(Some(1)));
        assert!(matches!(err, Err(EmbeddingError::Config(_))));
        assert!(rho_whittle_matern(4, -1.0, 1.0, &[1]).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mirrored_spectrum_is_symmetric(
                c in proptest::collection::vec(-1.0f64..1.0, 2..40)
            ) {
                let emb = CirculantEmbedding::minimal(&c).unwrap();
                let d = emb.eigenvalues();
                let n = d.len();
                for k in 1..n {
                    prop_assert!((d[k] - d[n - k]).abs() < 1e-9);
                }
            }

            #[test]
            fn diagnostic_counts_negatives(d in proptest::collection::vec(-5.0f64..5.0, 1..50)) {
                let diag = EmbeddingDiagnostic::from_eigenvalues(&d);
                let negatives = d.iter().filter(|&&v| v < 0.0).count();
                prop_assert_eq!(diag.negative_modes, negatives);
                prop_assert!(diag.rho_minus >= 0.0);
                prop_assert_eq!(diag.size, d.len());
            }
        }
    }
}
