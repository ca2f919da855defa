//! Dense Karhunen–Loève sampling.
//!
//! Diagonalizes the full `n x n` covariance matrix and draws
//! `X = U * sqrt(S) * xi`. Cost is cubic in `n`, so this is a reference
//! sampler for checking circulant embedding on small grids, not a
//! production path.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::Rng;
use spdekit_core::error::require_positive;
use spdekit_core::{fill_standard_normal, linspace, ConfigError, EmbeddingError};

use crate::covariance::{Covariance1D, Exponential, Gaussian};
use crate::process::SamplePath;

/// Dense covariance matrix `C[i, j] = cov(|t_i - t_j|)`.
fn covariance_matrix<C>(t: &[f64], cov: &C) -> Result<DMatrix<f64>, EmbeddingError>
where
    C: Covariance1D + ?Sized,
{
    let n = t.len();
    if n == 0 {
        return Err(EmbeddingError::EmptyCovariance);
    }
    let c = DMatrix::from_fn(n, n, |i, j| cov.eval((t[i] - t[j]).abs()));
    match (0..n * n).find(|&k| !c[(k / n, k % n)].is_finite()) {
        Some(index) => Err(EmbeddingError::NonFinite { index }),
        None => Ok(c),
    }
}

/// One sample at the points `t` of the process with covariance `cov`.
///
/// Consumes `t.len()` normals, the `k`-th one weighting the eigenvector of
/// the `k`-th largest eigenvalue. Eigenvalues that come out slightly
/// negative from rounding are treated as zero.
pub fn kl_sample<C, R>(t: &[f64], cov: &C, rng: &mut R) -> Result<Vec<f64>, EmbeddingError>
where
    C: Covariance1D + ?Sized,
    R: Rng + ?Sized,
{
    let n = t.len();
    let eig = SymmetricEigen::new(covariance_matrix(t, cov)?);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[j].total_cmp(&eig.eigenvalues[i]));

    let mut xi = vec![0.0; n];
    fill_standard_normal(rng, &mut xi);
    let weights = DVector::from_iterator(
        n,
        order
            .iter()
            .zip(&xi)
            .map(|(&k, &x)| eig.eigenvalues[k].max(0.0).sqrt() * x),
    );
    let x = eig.eigenvectors.select_columns(order.iter()) * weights;
    Ok(x.iter().copied().collect())
}

fn kl_path<C: Covariance1D, R: Rng + ?Sized>(
    horizon: f64,
    steps: usize,
    cov: &C,
    rng: &mut R,
) -> Result<SamplePath, EmbeddingError> {
    require_positive("T", horizon)?;
    if steps == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "N",
            value: 0,
            reason: "must be at least 1",
        }
        .into());
    }
    let t = linspace(0.0, horizon, steps + 1);
    let values = kl_sample(&t, cov, rng)?;
    Ok(SamplePath { t, values })
}

/// Exponential-covariance process on `linspace(0, T, N + 1)`.
pub fn gp_exponential_kl<R: Rng + ?Sized>(
    horizon: f64,
    steps: usize,
    ell: f64,
    rng: &mut R,
) -> Result<SamplePath, EmbeddingError> {
    require_positive("ell", ell)?;
    kl_path(horizon, steps, &Exponential { ell }, rng)
}

/// Gaussian-covariance process on `linspace(0, T, N + 1)`.
pub fn gp_gaussian_kl<R: Rng + ?Sized>(
    horizon: f64,
    steps: usize,
    ell: f64,
    rng: &mut R,
) -> Result<SamplePath, EmbeddingError> {
    require_positive("ell", ell)?;
    kl_path(horizon, steps, &Gaussian { ell }, rng)
}
