//! Stationary covariance functions.
//!
//! A 1D covariance maps a lag to a scalar; a 2D covariance maps a lag
//! vector `(x1, x2)` to a scalar. Both are stateless. Closures implement
//! the traits directly, so ad-hoc kernels need no wrapper type.

use spdekit_core::Grid1D;

use crate::special::{bessel_k, gamma};

/// A stationary covariance on the line.
pub trait Covariance1D {
    /// Covariance at lag `t`.
    fn eval(&self, t: f64) -> f64;

    /// Covariance at the lags `t[i] - t[0]` of a uniform grid.
    ///
    /// The result is the first column of the Toeplitz covariance matrix
    /// of the grid values.
    fn sample_lags(&self, t: &[f64]) -> Vec<f64> {
        let t0 = t.first().copied().unwrap_or(0.0);
        t.iter().map(|&ti| self.eval(ti - t0)).collect()
    }

    /// [`sample_lags`](Self::sample_lags) over the points of `grid`.
    fn sample_on(&self, grid: &Grid1D) -> Vec<f64> {
        self.sample_lags(grid.points())
    }
}

impl<F: Fn(f64) -> f64> Covariance1D for F {
    fn eval(&self, t: f64) -> f64 {
        self(t)
    }
}

/// A stationary covariance on the plane.
pub trait Covariance2D {
    /// Covariance at lag vector `(x1, x2)`.
    fn eval(&self, x1: f64, x2: f64) -> f64;
}

impl<F: Fn(f64, f64) -> f64> Covariance2D for F {
    fn eval(&self, x1: f64, x2: f64) -> f64 {
        self(x1, x2)
    }
}

/// `c(t) = exp(-|t| / ell)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exponential {
    /// Correlation length.
    pub ell: f64,
}

impl Covariance1D for Exponential {
    fn eval(&self, t: f64) -> f64 {
        (-t.abs() / self.ell).exp()
    }
}

/// `c(t) = exp(-t^2 / ell^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gaussian {
    /// Correlation length.
    pub ell: f64,
}

impl Covariance1D for Gaussian {
    fn eval(&self, t: f64) -> f64 {
        (-(t * t) / (self.ell * self.ell)).exp()
    }
}

/// Whittle–Matérn covariance
/// `c(t) = 2^(1-q) / Gamma(q) * |t|^q * K_q(|t|)`, with `c(0) = 1`.
///
/// `q` controls regularity; `q = 1/2` reduces to `exp(-|t|)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WhittleMatern {
    /// Regularity parameter, `q > 0`.
    pub q: f64,
}

impl Default for WhittleMatern {
    fn default() -> Self {
        Self { q: 0.5 }
    }
}

impl Covariance1D for WhittleMatern {
    fn eval(&self, t: f64) -> f64 {
        let t = t.abs();
        if t == 0.0 {
            return 1.0;
        }
        let factor = 2.0f64.powf(1.0 - self.q) / gamma(self.q);
        factor * t.powf(self.q) * bessel_k(self.q, t)
    }
}

/// Separable exponential `c(x1, x2) = exp(-|x1|/ell1 - |x2|/ell2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeparableExponential {
    /// Correlation length along the first axis.
    pub ell1: f64,
    /// Correlation length along the second axis.
    pub ell2: f64,
}

impl Covariance2D for SeparableExponential {
    fn eval(&self, x1: f64, x2: f64) -> f64 {
        (-x1.abs() / self.ell1 - x2.abs() / self.ell2).exp()
    }
}

/// Anisotropic Gaussian `c(x) = exp(-(a11 x1^2 + a22 x2^2 - 2 a12 x1 x2))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnisotropicGaussian {
    /// First diagonal entry of the shape matrix.
    pub a11: f64,
    /// Second diagonal entry of the shape matrix.
    pub a22: f64,
    /// Off-diagonal coupling.
    pub a12: f64,
}

impl Covariance2D for AnisotropicGaussian {
    fn eval(&self, x1: f64, x2: f64) -> f64 {
        (-((x1 * x1 * self.a11 + x2 * x2 * self.a22) - 2.0 * x1 * x2 * self.a12)).exp()
    }
}
