//! Per-step Wiener increments.
//!
//! Each generator owns its coefficients, the sub-step count `kappa` and
//! the transform plans it needs. One `draw` produces the increment over a
//! coarse step `kappa * dt_ref` for `M` independent realizations, stored
//! realization-major (`out[r * len + mode]`).
//!
//! Draw order is fixed: sub-step outermost, then realization, then mode
//! (for the planar generator, real and imaginary parts interleaved
//! innermost). Summing `kappa` independent unit normals per mode gives the
//! variance `kappa` of the aggregated increment.

use num_complex::Complex64;
use rand::Rng;
use spdekit_core::{fill_standard_normal, ConfigError};
use spdekit_spectral::{take_real, ResidueMonitor, SineTransform, Spectral1D, Spectral2D};

use crate::coefficients::{DirichletCoefficients, PeriodicCoefficients, PlanarCoefficients};

/// Representation of a drawn increment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Space {
    /// Spectral coefficients, ready to combine with a spectral state.
    #[default]
    Spectral,
    /// Values on the spatial grid.
    Physical,
}

fn check_kappa(kappa: usize) -> Result<(), ConfigError> {
    if kappa == 0 {
        return Err(ConfigError::InvalidResolution {
            name: "kappa",
            value: 0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Sum of `kappa` blocks of `out.len()` standard normals, in draw order.
fn summed_normals<R: Rng + ?Sized>(rng: &mut R, kappa: usize, out: &mut [f64]) {
    fill_standard_normal(rng, out);
    if kappa > 1 {
        let mut block = vec![0.0; out.len()];
        for _ in 1..kappa {
            fill_standard_normal(rng, &mut block);
            for (o, b) in out.iter_mut().zip(&block) {
                *o += b;
            }
        }
    }
}

// ── sine basis ───────────────────────────────────────────────────────

/// Increments of an `H^r_0` process on the interior grid points.
#[derive(Debug)]
pub struct DirichletIncrements {
    coeffs: DirichletCoefficients,
    kappa: usize,
    space: Space,
    dst: SineTransform,
}

impl DirichletIncrements {
    /// Generator for `coeffs`, aggregating `kappa` reference steps.
    pub fn new(
        coeffs: DirichletCoefficients,
        kappa: usize,
        space: Space,
    ) -> Result<Self, ConfigError> {
        check_kappa(kappa)?;
        let dst = SineTransform::new(coeffs.len());
        Ok(Self {
            coeffs,
            kappa,
            space,
            dst,
        })
    }

    /// Values per realization (`J - 1`).
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Increments for `m` realizations, `m * (J - 1)` values.
    ///
    /// In [`Space::Physical`] each realization is mapped to the grid by
    /// the halved DST-I.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, m: usize) -> Vec<f64> {
        let len = self.len();
        let mut out = vec![0.0; m * len];
        summed_normals(rng, self.kappa, &mut out);
        for row in out.chunks_exact_mut(len) {
            for (v, b) in row.iter_mut().zip(self.coeffs.as_slice()) {
                *v *= b;
            }
        }
        if self.space == Space::Physical {
            self.dst.apply_rows(&mut out);
        }
        out
    }
}

// ── Fourier basis ────────────────────────────────────────────────────

/// Output of [`PeriodicIncrements::draw`].
#[derive(Clone, Debug, PartialEq)]
pub enum Increment {
    /// Hermitian spectral coefficients, `m * J` values.
    Spectral(Vec<Complex64>),
    /// Real grid values, `m * J` values.
    Physical(Vec<f64>),
}

/// Increments of an `H^r_per` process.
///
/// Spectral draws are Hermitian per realization
/// (`X[J - j] = conj(X[j])`), so their inverse transform is real.
#[derive(Debug)]
pub struct PeriodicIncrements {
    coeffs: PeriodicCoefficients,
    kappa: usize,
    space: Space,
    fft: Spectral1D,
    residue: ResidueMonitor,
    normals: Vec<f64>,
}

impl PeriodicIncrements {
    /// Generator for `coeffs`, aggregating `kappa` reference steps.
    pub fn new(
        coeffs: PeriodicCoefficients,
        kappa: usize,
        space: Space,
    ) -> Result<Self, ConfigError> {
        check_kappa(kappa)?;
        let fft = Spectral1D::new(coeffs.len());
        Ok(Self {
            coeffs,
            kappa,
            space,
            fft,
            residue: ResidueMonitor::default(),
            normals: Vec::new(),
        })
    }

    /// Modes per realization (`J`).
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The coefficients in use.
    pub fn coefficients(&self) -> &PeriodicCoefficients {
        &self.coeffs
    }

    /// Residues observed when mapping draws to physical space.
    pub fn residue(&self) -> &ResidueMonitor {
        &self.residue
    }

    /// Spectral increments for `out.len() / J` realizations, written into
    /// `out`.
    pub fn draw_spectral_into<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut [Complex64]) {
        let j = self.len();
        debug_assert_eq!(out.len() % j, 0);
        self.normals.resize(out.len(), 0.0);
        summed_normals(rng, self.kappa, &mut self.normals);
        for (nn, x) in self.normals.chunks_exact(j).zip(out.chunks_exact_mut(j)) {
            hermitian_fold(nn, x);
            for (v, &b) in x.iter_mut().zip(self.coeffs.as_slice()) {
                *v *= b;
            }
        }
    }

    /// Increments for `m` realizations in the configured [`Space`].
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, m: usize) -> Increment {
        let mut x = vec![Complex64::default(); m * self.len()];
        self.draw_spectral_into(rng, &mut x);
        match self.space {
            Space::Spectral => Increment::Spectral(x),
            Space::Physical => {
                self.fft.inverse(&mut x);
                let mut real = vec![0.0; x.len()];
                let residue = take_real(&x, &mut real);
                self.residue.observe(residue, 0);
                Increment::Physical(real)
            }
        }
    }
}

/// Combine `J` real normals into a Hermitian vector of the same length.
///
/// ```text
/// X[0]        = n[0]
/// X[j]        = (n[j] + i n[J/2 + j]) / sqrt(2)      j = 1 .. J/2 - 1
/// X[J/2]      = n[J/2]
/// X[J/2 + k]  = (n[J/2 - k] - i n[J - k]) / sqrt(2)  k = 1 .. J/2 - 1
/// ```
///
/// Every entry has unit expected squared modulus.
pub fn hermitian_fold(n: &[f64], out: &mut [Complex64]) {
    let j = n.len();
    let half = j / 2;
    let s = std::f64::consts::FRAC_1_SQRT_2;
    out[0] = Complex64::new(n[0], 0.0);
    for k in 1..half {
        out[k] = Complex64::new(n[k], n[half + k]) * s;
        out[half + k] = Complex64::new(n[half - k], -n[j - k]) * s;
    }
    out[half] = Complex64::new(n[half], 0.0);
}

// ── L^2 on a rectangle ──────────────────────────────────────────────

/// Output of [`PlanarIncrements::draw`]: two independent physical-space
/// increments, each `m * J1 * J2` values row-major per realization.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarIncrement {
    /// Real part of the transformed draw.
    pub dw1: Vec<f64>,
    /// Imaginary part of the transformed draw.
    pub dw2: Vec<f64>,
}

/// Increments of an `L^2` process on a periodic rectangle.
#[derive(Debug)]
pub struct PlanarIncrements {
    coeffs: PlanarCoefficients,
    kappa: usize,
    fft: Spectral2D,
}

impl PlanarIncrements {
    /// Generator for `coeffs`, aggregating `kappa` reference steps.
    pub fn new(coeffs: PlanarCoefficients, kappa: usize) -> Result<Self, ConfigError> {
        check_kappa(kappa)?;
        let (j1, j2) = coeffs.shape();
        Ok(Self {
            coeffs,
            kappa,
            fft: Spectral2D::new(j1, j2),
        })
    }

    /// `(J1, J2)`.
    pub fn shape(&self) -> (usize, usize) {
        self.coeffs.shape()
    }

    /// Increment pair for `m` realizations:
    /// `ifft2(b * (n0 + i n1))` split into real and imaginary parts.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, m: usize) -> PlanarIncrement {
        let plane = self.fft.plane_len();
        let mut nn = vec![0.0; 2 * m * plane];
        summed_normals(rng, self.kappa, &mut nn);
        let b = self.coeffs.as_array().as_slice();
        let mut x: Vec<Complex64> = nn
            .chunks_exact(2)
            .enumerate()
            .map(|(k, p)| Complex64::new(p[0], p[1]) * b[k % plane])
            .collect();
        self.fft.inverse(&mut x);
        PlanarIncrement {
            dw1: x.iter().map(|z| z.re).collect(),
            dw2: x.iter().map(|z| z.im).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdekit_core::sim_rng;

    #[test]
    fn hermitian_fold_is_conjugate_symmetric() {
        let n: Vec<f64> = (0..8).map(|k| k as f64 + 1.0).collect();
        let mut x = vec![Complex64::default(); 8];
        hermitian_fold(&n, &mut x);
        assert_eq!(x[0].im, 0.0);
        assert_eq!(x[4].im, 0.0);
        for k in 1..8 {
            assert_eq!(x[8 - k], x[k].conj(), "mode {k}");
        }
    }

    #[test]
    fn periodic_physical_draw_is_real() {
        let coeffs = PeriodicCoefficients::new(0.01, 32, 1.0, 0.5).unwrap();
        let mut gen = PeriodicIncrements::new(coeffs, 1, Space::Physical).unwrap();
        let Increment::Physical(dw) = gen.draw(&mut sim_rng(Some(5)), 3) else {
            panic!("expected physical increment");
        };
        assert_eq!(dw.len(), 96);
        assert!(gen.residue().worst() < 1e-12);
        assert_eq!(gen.residue().warnings(), 0);
        // Zero mode is silent, so each realization has zero mean.
        for row in dw.chunks_exact(32) {
            assert!(row.iter().sum::<f64>().abs() < 1e-12);
        }
    }

    #[test]
    fn kappa_sums_reference_draws() {
        let coeffs = DirichletCoefficients::new(1.0, 3, 2.0, 0.0).unwrap();
        let mut gen = DirichletIncrements::new(coeffs.clone(), 3, Space::Spectral).unwrap();
        let got = gen.draw(&mut sim_rng(Some(12)), 2);

        let mut rng = sim_rng(Some(12));
        let mut expect = vec![0.0; 4];
        for _ in 0..3 {
            let block = spdekit_core::standard_normals(&mut rng, 4);
            for (e, b) in expect.iter_mut().zip(block) {
                *e += b;
            }
        }
        for (r, row) in expect.chunks_exact_mut(2).enumerate() {
            for (v, b) in row.iter_mut().zip(coeffs.as_slice()) {
                *v *= b;
            }
            assert_eq!(&got[2 * r..2 * r + 2], &row[..]);
        }
    }

    #[test]
    fn dirichlet_physical_applies_sine_series() {
        let coeffs = DirichletCoefficients::new(0.5, 6, 1.0, 1.0).unwrap();
        let mut spectral = DirichletIncrements::new(coeffs.clone(), 1, Space::Spectral).unwrap();
        let mut physical = DirichletIncrements::new(coeffs, 1, Space::Physical).unwrap();
        let x = spectral.draw(&mut sim_rng(Some(1)), 1);
        let u = physical.draw(&mut sim_rng(Some(1)), 1);
        let n = x.len();
        for (k, &uk) in u.iter().enumerate() {
            let direct: f64 = x
                .iter()
                .enumerate()
                .map(|(j, &xj)| {
                    let arg = std::f64::consts::PI * ((j + 1) * (k + 1)) as f64 / (n + 1) as f64;
                    xj * arg.sin()
                })
                .sum();
            assert!((uk - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn planar_draw_shapes_and_seed() {
        let coeffs = PlanarCoefficients::new(0.01, (8, 6), (1.0, 1.0), 0.01).unwrap();
        let mut gen = PlanarIncrements::new(coeffs, 2).unwrap();
        let a = gen.draw(&mut sim_rng(Some(3)), 2);
        let b = gen.draw(&mut sim_rng(Some(3)), 2);
        assert_eq!(a, b);
        assert_eq!(a.dw1.len(), 2 * 48);
        assert_ne!(a.dw1, a.dw2);
    }

    #[test]
    fn zero_kappa_is_rejected() {
        let coeffs = PeriodicCoefficients::new(0.01, 8, 1.0, 0.0).unwrap();
        assert!(PeriodicIncrements::new(coeffs, 0, Space::Spectral).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fold_inverse_is_real(half in 1usize..24, seed in any::<u64>()) {
                let j = 2 * half;
                let n = spdekit_core::standard_normals(&mut sim_rng(Some(seed)), j);
                let mut x = vec![Complex64::default(); j];
                hermitian_fold(&n, &mut x);
                let mut fft = Spectral1D::new(j);
                fft.inverse(&mut x);
                for v in &x {
                    prop_assert!(v.im.abs() < 1e-12);
                }
            }
        }
    }
}
