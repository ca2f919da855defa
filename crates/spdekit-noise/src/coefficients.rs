//! Spectral coefficients of Q-Wiener processes.
//!
//! A Q-Wiener process is expanded in the eigenfunctions of its covariance
//! operator; `b_j` is the standard deviation of the `j`-th mode over one
//! reference step `dt_ref`. Coefficients depend only on the domain, the
//! resolution and the regularity, so they are computed once per
//! configuration and shared by every step.

use spdekit_core::error::{require_non_negative, require_positive};
use spdekit_core::{Array2, ConfigError};
use spdekit_spectral::{signed_index, wavenumbers, AliasBand};

/// Regularization added to the decay exponent `2r + 1` so the series
/// converges at the boundary cases of `r`.
pub const REGULARITY_EPS: f64 = 0.001;

pub(crate) fn require_even(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value < 2 || value % 2 != 0 {
        return Err(ConfigError::InvalidResolution {
            name,
            value,
            reason: "must be even and at least 2",
        });
    }
    Ok(())
}

// ── H^r_0(0, a): sine basis ─────────────────────────────────────────

/// Coefficients of an `H^r_0(0, a)`-valued process in the sine basis.
///
/// `b_j = sqrt(2 dt_ref j^-(2r + 1 + eps) / a)` for `j = 1..J-1`, one
/// per interior grid point.
#[derive(Clone, Debug, PartialEq)]
pub struct DirichletCoefficients {
    bj: Vec<f64>,
}

impl DirichletCoefficients {
    /// Coefficients for `J` intervals on `[0, a]`.
    pub fn new(dt_ref: f64, j: usize, a: f64, r: f64) -> Result<Self, ConfigError> {
        require_positive("dt_ref", dt_ref)?;
        require_positive("a", a)?;
        require_non_negative("r", r)?;
        if j < 2 {
            return Err(ConfigError::InvalidResolution {
                name: "J",
                value: j,
                reason: "must be at least 2",
            });
        }
        let exponent = -(2.0 * r + 1.0 + REGULARITY_EPS);
        let bj = (1..j)
            .map(|k| (2.0 * dt_ref * (k as f64).powf(exponent) / a).sqrt())
            .collect();
        Ok(Self { bj })
    }

    /// Coefficients, mode `j` at index `j - 1`.
    pub fn as_slice(&self) -> &[f64] {
        &self.bj
    }

    /// Number of modes, `J - 1`.
    pub fn len(&self) -> usize {
        self.bj.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.bj.is_empty()
    }

    /// Keep modes `1..=modes` and silence the rest.
    ///
    /// Used when the noise is drawn on a fine grid but only resolved by a
    /// coarser one.
    pub fn truncate(&mut self, modes: usize) {
        if modes < self.bj.len() {
            self.bj[modes..].fill(0.0);
        }
    }
}

// ── H^r_per(0, a): Fourier basis ────────────────────────────────────

/// Coefficients of an `H^r_per(0, a)`-valued process in the Fourier basis,
/// in FFT order.
///
/// With signed modes `j = [0, 1, .., J/2, -J/2 + 1, .., -1]`,
/// `q_0 = 0`, `q_j = |j|^-((2r + 1 + eps) / 2)` and
/// `b_j = sqrt(q_j dt_ref / a) J`. The zero mode carries no noise, so the
/// spatial mean is not driven.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicCoefficients {
    bj: Vec<f64>,
}

impl PeriodicCoefficients {
    /// Coefficients for `J` (even) grid intervals on `[0, a]`.
    pub fn new(dt_ref: f64, j: usize, a: f64, r: f64) -> Result<Self, ConfigError> {
        require_positive("dt_ref", dt_ref)?;
        require_positive("a", a)?;
        require_non_negative("r", r)?;
        require_even("J", j)?;
        let exponent = -(2.0 * r + 1.0 + REGULARITY_EPS) / 2.0;
        let scale = j as f64;
        let bj = (0..j)
            .map(|k| {
                let m = signed_index(k, j).unsigned_abs();
                if m == 0 {
                    0.0
                } else {
                    ((m as f64).powf(exponent) * dt_ref / a).sqrt() * scale
                }
            })
            .collect();
        Ok(Self { bj })
    }

    /// Coefficients in FFT order.
    pub fn as_slice(&self) -> &[f64] {
        &self.bj
    }

    /// Number of modes, `J`.
    pub fn len(&self) -> usize {
        self.bj.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.bj.is_empty()
    }

    /// Zero the coefficients of the aliased band.
    pub fn truncate(&mut self, band: &AliasBand) {
        band.zero(&mut self.bj);
    }
}

// ── L^2 on a rectangle ──────────────────────────────────────────────

/// Coefficients of an `L^2((0, a1) x (0, a2))`-valued process, row-major
/// in 2D FFT order.
///
/// `b = exp(-alpha (lambda_x^2 + lambda_y^2)) sqrt(dt_ref) J1 J2 / sqrt(a1 a2)`
/// with `lambda = 2 pi k / a` the wavenumbers.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarCoefficients {
    bj: Array2<f64>,
}

impl PlanarCoefficients {
    /// Coefficients for a `J1 x J2` (both even) periodic grid.
    pub fn new(
        dt_ref: f64,
        j: (usize, usize),
        a: (f64, f64),
        alpha: f64,
    ) -> Result<Self, ConfigError> {
        require_positive("dt_ref", dt_ref)?;
        require_positive("a1", a.0)?;
        require_positive("a2", a.1)?;
        require_non_negative("alpha", alpha)?;
        require_even("J1", j.0)?;
        require_even("J2", j.1)?;
        let lx = wavenumbers(j.0, a.0);
        let ly = wavenumbers(j.1, a.1);
        let scale = dt_ref.sqrt() * (j.0 * j.1) as f64 / (a.0 * a.1).sqrt();
        let bj = Array2::from_fn(j.0, j.1, |r, c| {
            (-alpha * (lx[r] * lx[r] + ly[c] * ly[c])).exp() * scale
        });
        Ok(Self { bj })
    }

    /// Coefficient plane.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.bj
    }

    /// `(J1, J2)`.
    pub fn shape(&self) -> (usize, usize) {
        self.bj.shape()
    }
}
