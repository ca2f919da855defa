//! Real-part extraction after inverse transforms.
//!
//! Spectral states of real fields are Hermitian, so their inverse
//! transforms are real up to rounding. The imaginary residue is discarded,
//! but it is measured first: a residue above the tolerance means the
//! spectral state lost its symmetry, which is reported as a warning and
//! counted instead of being dropped silently.

use num_complex::Complex64;
use tracing::warn;

/// Default bound on `max |Im|` accepted without a warning.
pub const DEFAULT_IMAG_TOLERANCE: f64 = 1e-8;

/// Copy the real parts of `buf` into `out`, returning `max |Im|`.
pub fn take_real(buf: &[Complex64], out: &mut [f64]) -> f64 {
    let mut max_imag = 0.0f64;
    for (o, v) in out.iter_mut().zip(buf) {
        *o = v.re;
        max_imag = max_imag.max(v.im.abs());
    }
    max_imag
}

/// Tracks imaginary residues across a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidueMonitor {
    tolerance: f64,
    warnings: usize,
    worst: f64,
}

impl Default for ResidueMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_IMAG_TOLERANCE)
    }
}

impl ResidueMonitor {
    /// A monitor that warns when a residue exceeds `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            warnings: 0,
            worst: 0.0,
        }
    }

    /// Extract real parts into `out` and record the residue.
    pub fn take_real(&mut self, buf: &[Complex64], out: &mut [f64], step: usize) {
        let residue = take_real(buf, out);
        self.observe(residue, step);
    }

    /// Record a residue measured elsewhere.
    pub fn observe(&mut self, residue: f64, step: usize) {
        self.worst = self.worst.max(residue);
        if residue > self.tolerance {
            self.warnings += 1;
            // Warn once; later exceedances are only counted.
            if self.warnings == 1 {
                warn!(
                    step,
                    max_imag = residue,
                    tolerance = self.tolerance,
                    "imaginary residue after inverse transform exceeds tolerance"
                );
            }
        }
    }

    /// Configured tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of observations above the tolerance.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Largest residue observed.
    pub fn worst(&self) -> f64 {
        self.worst
    }
}
