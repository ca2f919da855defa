//! Semi-implicit spectral Galerkin integrators on a periodic rectangle.
//!
//! The 2D analogue of [`spectral`](crate::spectral): states are
//! `J1 x J2` planes, row-major, one per realization, and the implicit
//! factor is `1 / (1 + dt eps (lambda_x^2 + lambda_y^2))`.

use std::fmt;

use num_complex::Complex64;
use rand::Rng;
use spdekit_core::error::{require_non_negative, require_positive};
use spdekit_core::{linspace, sim_rng, Additive, Array2, ConfigError, Elementwise, SolverError};
use spdekit_noise::{PlanarCoefficients, PlanarIncrement, PlanarIncrements};
use spdekit_spectral::{wavenumbers, ResidueMonitor, Spectral2D, DEFAULT_IMAG_TOLERANCE};
use tracing::{debug, trace};

use crate::config::{require_even, require_finite, require_finite_state, require_steps, required};
use crate::run::{check_finite, close_periodic_2d, Run, RunDiagnostics, Trajectory};
use crate::Term;

fn planar_factor(j: (usize, usize), a: (f64, f64), dt: f64, epsilon: f64) -> Vec<f64> {
    let lx = wavenumbers(j.0, a.0);
    let ly = wavenumbers(j.1, a.1);
    let mut ee = Vec::with_capacity(j.0 * j.1);
    for x in &lx {
        for y in &ly {
            ee.push(1.0 / (1.0 + dt * epsilon * (x * x + y * y)));
        }
    }
    ee
}

/// Interior `J1 x J2` values of a closed `(J1 + 1) x (J2 + 1)` plane.
fn open_plane(u0: &Array2<f64>) -> Vec<f64> {
    let (rows, cols) = u0.shape();
    let mut out = Vec::with_capacity((rows - 1) * (cols - 1));
    for r in 0..rows - 1 {
        out.extend_from_slice(&u0.row(r)[..cols - 1]);
    }
    out
}

fn check_plane(u0: &Array2<f64>, j: (usize, usize)) -> Result<(), ConfigError> {
    let (rows, cols) = u0.shape();
    if (rows, cols) != (j.0 + 1, j.1 + 1) {
        return Err(ConfigError::ShapeMismatch {
            what: "u0",
            expected: (j.0 + 1) * (j.1 + 1),
            actual: rows * cols,
        });
    }
    require_finite_state("u0", u0.as_slice())
}

// ── SpectralSpde2D ──────────────────────────────────────────────────

/// Stochastic reaction–diffusion on `[0, a1) x [0, a2)` with periodic
/// boundary, driven by a smooth `L^2` Q-Wiener process whose spectrum
/// decays like `exp(-alpha |lambda|^2)`.
///
/// Each planar draw yields two independent increments. The first drives
/// the current step; the second is kept and drives the next step, so a
/// fresh draw happens every other step.
pub struct SpectralSpde2D {
    a: (f64, f64),
    horizon: f64,
    steps: usize,
    kappa: usize,
    j: (usize, usize),
    epsilon: f64,
    sigma: f64,
    alpha: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Term,
    diffusion: Term,
    u0: Array2<f64>,
    imag_tolerance: f64,
}

impl fmt::Debug for SpectralSpde2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralSpde2D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("kappa", &self.kappa)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("sigma", &self.sigma)
            .field("alpha", &self.alpha)
            .field("realizations", &self.realizations)
            .field("reaction", &self.reaction.name())
            .field("diffusion", &self.diffusion.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SpectralSpde2D`].
///
/// Required: `domain`, `horizon`, `steps`, `resolution`, `reaction` and
/// `initial`.
pub struct SpectralSpde2DBuilder {
    a: Option<(f64, f64)>,
    horizon: Option<f64>,
    steps: Option<usize>,
    kappa: usize,
    j: Option<(usize, usize)>,
    epsilon: f64,
    sigma: f64,
    alpha: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Option<Term>,
    diffusion: Term,
    u0: Option<Array2<f64>>,
    imag_tolerance: f64,
}

impl SpectralSpde2D {
    /// Create a new builder.
    pub fn builder() -> SpectralSpde2DBuilder {
        SpectralSpde2DBuilder {
            a: None,
            horizon: None,
            steps: None,
            kappa: 1,
            j: None,
            epsilon: 1.0,
            sigma: 1.0,
            alpha: 0.1,
            realizations: 1,
            seed: None,
            reaction: None,
            diffusion: Box::new(Additive(1.0)),
            u0: None,
            imag_tolerance: DEFAULT_IMAG_TOLERANCE,
        }
    }

    /// Run with the configured seed.
    pub fn run(&self) -> Result<Run, SolverError> {
        let mut rng = sim_rng(self.seed);
        self.run_with(&mut rng)
    }

    /// Run drawing the noise from `rng`.
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Run, SolverError> {
        let (j1, j2) = self.j;
        let m = self.realizations;
        let dt_ref = self.horizon / self.steps as f64;
        let dt = self.kappa as f64 * dt_ref;
        let coarse = self.steps / self.kappa;
        debug!(
            j1,
            j2,
            coarse_steps = coarse,
            kappa = self.kappa,
            dt,
            alpha = self.alpha,
            realizations = m,
            reaction = self.reaction.name(),
            "starting 2D spectral SPDE run"
        );

        let ee = planar_factor(self.j, self.a, dt, self.epsilon);
        let coeffs = PlanarCoefficients::new(dt_ref, self.j, self.a, self.alpha)?;
        let mut noise = PlanarIncrements::new(coeffs, self.kappa)?;
        let mut fft = Spectral2D::new(j1, j2);
        let mut residue = ResidueMonitor::new(self.imag_tolerance);

        let plane = j1 * j2;
        let len = m * plane;
        let mut u = open_plane(&self.u0).repeat(m);
        let mut uh = vec![Complex64::default(); len];
        fft.forward_real_into(&u, &mut uh);
        let mut work = vec![0.0; len];
        let mut fh = vec![Complex64::default(); len];
        let mut gh = vec![Complex64::default(); len];
        let mut back = vec![Complex64::default(); len];
        let mut cached: Option<Vec<f64>> = None;

        let closed = (j1 + 1) * (j2 + 1);
        let times = linspace(0.0, self.horizon, coarse + 1);
        let mut trajectory = Trajectory::new(&[m, j1 + 1, j2 + 1], coarse + 1);
        let mut snapshot = vec![0.0; m * closed];
        close_periodic_2d(&u, self.j, &mut snapshot);
        trajectory.push(times[0], &snapshot);

        for n in 1..=coarse {
            self.reaction.apply(&u, &mut work);
            fft.forward_real_into(&work, &mut fh);

            let dw = match cached.take() {
                Some(dw) => dw,
                None => {
                    let PlanarIncrement { dw1, dw2 } = noise.draw(rng, m);
                    cached = Some(dw2);
                    dw1
                }
            };
            self.diffusion.apply(&u, &mut work);
            for (w, d) in work.iter_mut().zip(&dw) {
                *w = self.sigma * *w * d;
            }
            fft.forward_real_into(&work, &mut gh);

            for (i, v) in uh.iter_mut().enumerate() {
                *v = (*v + fh[i] * dt + gh[i]) * ee[i % plane];
            }
            back.copy_from_slice(&uh);
            fft.inverse(&mut back);
            residue.take_real(&back, &mut u, n);
            check_finite(n, &u)?;

            close_periodic_2d(&u, self.j, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, fresh_draw = cached.is_some(), "2D spectral SPDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a.0, j1 + 1),
            y: Some(linspace(0.0, self.a.1, j2 + 1)),
            trajectory,
            diagnostics: RunDiagnostics {
                steps: coarse,
                imag_warnings: residue.warnings(),
                worst_imag: residue.worst(),
                embedding: None,
            },
        })
    }
}

impl SpectralSpde2DBuilder {
    /// Side lengths `(a1, a2)`.
    pub fn domain(mut self, a1: f64, a2: f64) -> Self {
        self.a = Some((a1, a2));
        self
    }

    /// Final time `T`.
    pub fn horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Number of reference steps `N`.
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Reference steps per coarse step. Default: 1.
    pub fn substeps(mut self, kappa: usize) -> Self {
        self.kappa = kappa;
        self
    }

    /// Grid intervals `(J1, J2)`, both even.
    pub fn resolution(mut self, j1: usize, j2: usize) -> Self {
        self.j = Some((j1, j2));
        self
    }

    /// Diffusion coefficient. Default: 1.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Noise amplitude multiplying `g(u)`. Default: 1.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Spectral decay rate of the noise. Default: 0.1.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Number of independent realizations `M`. Default: 1.
    pub fn realizations(mut self, m: usize) -> Self {
        self.realizations = m;
        self
    }

    /// Seed for [`run`](SpectralSpde2D::run). Default: unseeded.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reaction term `f(u)`.
    pub fn reaction(mut self, f: impl Elementwise + Send + Sync + 'static) -> Self {
        self.reaction = Some(Box::new(f));
        self
    }

    /// Noise coefficient `g(u)`. Default: `Additive(1.0)`.
    pub fn diffusion(mut self, g: impl Elementwise + Send + Sync + 'static) -> Self {
        self.diffusion = Box::new(g);
        self
    }

    /// Initial condition, shape `(J1 + 1, J2 + 1)`. The last row and
    /// column are implied by periodicity and ignored.
    pub fn initial(mut self, u0: Array2<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Bound on the imaginary residue before a warning. Default: `1e-8`.
    pub fn imag_tolerance(mut self, tolerance: f64) -> Self {
        self.imag_tolerance = tolerance;
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<SpectralSpde2D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let j = required("J", self.j)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a1", a.0)?;
        require_positive("a2", a.1)?;
        require_positive("T", horizon)?;
        require_steps(steps, self.kappa)?;
        require_even("J1", j.0)?;
        require_even("J2", j.1)?;
        require_non_negative("epsilon", self.epsilon)?;
        require_finite("sigma", self.sigma)?;
        require_non_negative("alpha", self.alpha)?;
        if self.realizations == 0 {
            return Err(ConfigError::InvalidResolution {
                name: "M",
                value: 0,
                reason: "must be at least 1",
            });
        }
        require_positive("imag_tolerance", self.imag_tolerance)?;
        check_plane(&u0, j)?;

        Ok(SpectralSpde2D {
            a,
            horizon,
            steps,
            kappa: self.kappa,
            j,
            epsilon: self.epsilon,
            sigma: self.sigma,
            alpha: self.alpha,
            realizations: self.realizations,
            seed: self.seed,
            reaction,
            diffusion: self.diffusion,
            u0,
            imag_tolerance: self.imag_tolerance,
        })
    }
}

// ── SpectralPde2D ───────────────────────────────────────────────────

/// Deterministic reaction–diffusion on a periodic rectangle.
pub struct SpectralPde2D {
    a: (f64, f64),
    horizon: f64,
    steps: usize,
    j: (usize, usize),
    epsilon: f64,
    reaction: Term,
    u0: Array2<f64>,
    imag_tolerance: f64,
}

impl fmt::Debug for SpectralPde2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralPde2D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("reaction", &self.reaction.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SpectralPde2D`].
///
/// Required: `domain`, `horizon`, `steps`, `resolution`, `reaction` and
/// `initial`.
pub struct SpectralPde2DBuilder {
    a: Option<(f64, f64)>,
    horizon: Option<f64>,
    steps: Option<usize>,
    j: Option<(usize, usize)>,
    epsilon: f64,
    reaction: Option<Term>,
    u0: Option<Array2<f64>>,
    imag_tolerance: f64,
}

impl SpectralPde2D {
    /// Create a new builder.
    pub fn builder() -> SpectralPde2DBuilder {
        SpectralPde2DBuilder {
            a: None,
            horizon: None,
            steps: None,
            j: None,
            epsilon: 1.0,
            reaction: None,
            u0: None,
            imag_tolerance: DEFAULT_IMAG_TOLERANCE,
        }
    }

    /// Integrate to the final time.
    pub fn run(&self) -> Result<Run, SolverError> {
        let (j1, j2) = self.j;
        let dt = self.horizon / self.steps as f64;
        debug!(j1, j2, steps = self.steps, dt, "starting 2D spectral PDE run");

        let ee = planar_factor(self.j, self.a, dt, self.epsilon);
        let mut fft = Spectral2D::new(j1, j2);
        let mut residue = ResidueMonitor::new(self.imag_tolerance);

        let plane = j1 * j2;
        let mut u = open_plane(&self.u0);
        let mut uh = fft.forward_real(&u);
        let mut work = vec![0.0; plane];
        let mut fh = vec![Complex64::default(); plane];
        let mut back = vec![Complex64::default(); plane];

        let times = linspace(0.0, self.horizon, self.steps + 1);
        let mut trajectory = Trajectory::new(&[1, j1 + 1, j2 + 1], self.steps + 1);
        let mut snapshot = vec![0.0; (j1 + 1) * (j2 + 1)];
        close_periodic_2d(&u, self.j, &mut snapshot);
        trajectory.push(times[0], &snapshot);

        for n in 1..=self.steps {
            self.reaction.apply(&u, &mut work);
            fft.forward_real_into(&work, &mut fh);
            for (i, v) in uh.iter_mut().enumerate() {
                *v = (*v + fh[i] * dt) * ee[i];
            }
            back.copy_from_slice(&uh);
            fft.inverse(&mut back);
            residue.take_real(&back, &mut u, n);
            check_finite(n, &u)?;

            close_periodic_2d(&u, self.j, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, "2D spectral PDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a.0, j1 + 1),
            y: Some(linspace(0.0, self.a.1, j2 + 1)),
            trajectory,
            diagnostics: RunDiagnostics {
                steps: self.steps,
                imag_warnings: residue.warnings(),
                worst_imag: residue.worst(),
                embedding: None,
            },
        })
    }
}

impl SpectralPde2DBuilder {
    /// Side lengths `(a1, a2)`.
    pub fn domain(mut self, a1: f64, a2: f64) -> Self {
        self.a = Some((a1, a2));
        self
    }

    /// Final time `T`.
    pub fn horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Number of time steps `N`.
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Grid intervals `(J1, J2)`, both even.
    pub fn resolution(mut self, j1: usize, j2: usize) -> Self {
        self.j = Some((j1, j2));
        self
    }

    /// Diffusion coefficient. Default: 1.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Reaction term `f(u)`.
    pub fn reaction(mut self, f: impl Elementwise + Send + Sync + 'static) -> Self {
        self.reaction = Some(Box::new(f));
        self
    }

    /// Initial condition, shape `(J1 + 1, J2 + 1)`.
    pub fn initial(mut self, u0: Array2<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Bound on the imaginary residue before a warning. Default: `1e-8`.
    pub fn imag_tolerance(mut self, tolerance: f64) -> Self {
        self.imag_tolerance = tolerance;
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<SpectralPde2D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let j = required("J", self.j)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a1", a.0)?;
        require_positive("a2", a.1)?;
        require_positive("T", horizon)?;
        require_steps(steps, 1)?;
        require_even("J1", j.0)?;
        require_even("J2", j.1)?;
        require_non_negative("epsilon", self.epsilon)?;
        require_positive("imag_tolerance", self.imag_tolerance)?;
        check_plane(&u0, j)?;

        Ok(SpectralPde2D {
            a,
            horizon,
            steps,
            j,
            epsilon: self.epsilon,
            reaction,
            u0,
            imag_tolerance: self.imag_tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdekit_core::AllenCahn;
    use spdekit_test_utils::fixtures::sine_plane;

    fn plane(j1: usize, j2: usize, amp: f64) -> Array2<f64> {
        Array2::from_vec(j1 + 1, j2 + 1, sine_plane(j1 + 1, j2 + 1, amp)).unwrap()
    }

    #[test]
    fn open_plane_drops_last_row_and_column() {
        let p = Array2::from_fn(3, 4, |r, c| (10 * r + c) as f64);
        assert_eq!(open_plane(&p), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn initial_shape_is_checked() {
        let err = SpectralSpde2D::builder()
            .domain(1.0, 1.0)
            .horizon(1.0)
            .steps(4)
            .resolution(8, 8)
            .reaction(AllenCahn)
            .initial(Array2::zeros(8, 8))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ShapeMismatch { what: "u0", .. }));
    }

    #[test]
    fn run_is_periodic_in_both_directions() {
        let spde = SpectralSpde2D::builder()
            .domain(1.0, 2.0)
            .horizon(0.05)
            .steps(5)
            .resolution(8, 16)
            .epsilon(0.01)
            .sigma(0.5)
            .realizations(2)
            .reaction(AllenCahn)
            .initial(plane(8, 16, 0.3))
            .seed(21)
            .build()
            .unwrap();
        let run = spde.run().unwrap();
        assert_eq!(run.trajectory.shape(), &[2, 9, 17]);
        assert_eq!(run.y.as_ref().map(Vec::len), Some(17));
        for step in 0..run.trajectory.len() {
            for r in 0..2 {
                let s = run.trajectory.realization(step, r).unwrap();
                for row in 0..9 {
                    assert_eq!(s[row * 17], s[row * 17 + 16]);
                }
                for col in 0..17 {
                    assert_eq!(s[col], s[8 * 17 + col]);
                }
            }
        }
    }

    #[test]
    fn draws_alternate_between_fresh_and_cached() {
        // With g = 1 and no reaction or diffusion, u accumulates sigma * dW.
        // Two steps consume one planar draw: dw1 then dw2.
        let spde = SpectralSpde2D::builder()
            .domain(1.0, 1.0)
            .horizon(0.02)
            .steps(2)
            .resolution(4, 4)
            .epsilon(0.0)
            .reaction(|_u: f64| 0.0)
            .initial(Array2::zeros(5, 5))
            .build()
            .unwrap();
        let run = spde.run_with(&mut sim_rng(Some(6))).unwrap();

        let coeffs = PlanarCoefficients::new(0.01, (4, 4), (1.0, 1.0), 0.1).unwrap();
        let PlanarIncrement { dw1, dw2 } =
            PlanarIncrements::new(coeffs, 1).unwrap().draw(&mut sim_rng(Some(6)), 1);
        let expect: Vec<f64> = dw1.iter().zip(&dw2).map(|(a, b)| a + b).collect();

        let last = run.final_state();
        for r in 0..4 {
            for c in 0..4 {
                let got = last[r * 5 + c];
                assert!((got - expect[r * 4 + c]).abs() < 1e-12);
            }
        }
    }
}
