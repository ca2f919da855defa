//! Semi-implicit spectral Galerkin integrators on a periodic interval.
//!
//! Both integrators advance `du = (eps u_xx + f(u)) dt [+ sigma g(u) dW]`
//! with the diffusion treated implicitly and exactly per Fourier mode:
//!
//! ```text
//! u_hat <- (u_hat + dt f_hat + (sigma g(u) dW)_hat) / (1 + dt eps lambda^2)
//! ```
//!
//! The reaction and the noise product are evaluated in physical space and
//! transformed back each step. All `M` realizations advance in lock-step
//! over a realization-major buffer.

use std::fmt;

use num_complex::Complex64;
use rand::Rng;
use spdekit_core::error::{require_len, require_non_negative, require_positive};
use spdekit_core::{linspace, sim_rng, Additive, ConfigError, Elementwise, SolverError};
use spdekit_noise::{PeriodicCoefficients, PeriodicIncrements, Space};
use spdekit_spectral::{wavenumbers, AliasBand, ResidueMonitor, Spectral1D, DEFAULT_IMAG_TOLERANCE};
use tracing::{debug, trace};

use crate::config::{
    require_even, require_finite, require_finite_state, require_steps, required,
};
use crate::run::{check_finite, close_periodic_1d, Run, RunDiagnostics, Trajectory};
use crate::Term;

/// `1 / (1 + dt eps lambda^2)` per mode.
pub(crate) fn integrating_factor(lambda: &[f64], dt: f64, epsilon: f64) -> Vec<f64> {
    lambda
        .iter()
        .map(|l| 1.0 / (1.0 + dt * epsilon * l * l))
        .collect()
}

// ── SpectralSpde1D ──────────────────────────────────────────────────

/// Stochastic reaction–diffusion on `[0, a)` with periodic boundary,
/// driven by an `H^r_per` Q-Wiener process.
///
/// The state lives on `Jref` grid intervals. The reaction is dealiased to
/// the working resolution `J <= Jref` by zeroing the Fourier band
/// `J/2 + 1 .. Jref - J/2` of the state, the reaction and the noise each
/// step. One coarse step aggregates `kappa` reference steps of the noise.
///
/// # Construction
///
/// ```
/// use spdekit_core::AllenCahn;
/// use spdekit_solver::SpectralSpde1D;
///
/// let spde = SpectralSpde1D::builder()
///     .domain(1.0)
///     .horizon(0.1)
///     .steps(10)
///     .reference_resolution(32)
///     .epsilon(0.01)
///     .reaction(AllenCahn)
///     .initial(vec![0.0; 33])
///     .seed(1)
///     .build()
///     .unwrap();
/// let run = spde.run().unwrap();
/// assert_eq!(run.trajectory.len(), 11);
/// ```
pub struct SpectralSpde1D {
    a: f64,
    horizon: f64,
    steps: usize,
    kappa: usize,
    jref: usize,
    j: usize,
    epsilon: f64,
    sigma: f64,
    r: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Term,
    diffusion: Term,
    u0: Vec<f64>,
    imag_tolerance: f64,
}

impl fmt::Debug for SpectralSpde1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralSpde1D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("kappa", &self.kappa)
            .field("jref", &self.jref)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("sigma", &self.sigma)
            .field("r", &self.r)
            .field("realizations", &self.realizations)
            .field("reaction", &self.reaction.name())
            .field("diffusion", &self.diffusion.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SpectralSpde1D`].
///
/// Required: `domain`, `horizon`, `steps`, `reference_resolution`,
/// `reaction` and `initial`.
pub struct SpectralSpde1DBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    kappa: usize,
    jref: Option<usize>,
    j: Option<usize>,
    epsilon: f64,
    sigma: f64,
    r: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Option<Term>,
    diffusion: Term,
    u0: Option<Vec<f64>>,
    imag_tolerance: f64,
}

impl SpectralSpde1D {
    /// Create a new builder.
    pub fn builder() -> SpectralSpde1DBuilder {
        SpectralSpde1DBuilder {
            a: None,
            horizon: None,
            steps: None,
            kappa: 1,
            jref: None,
            j: None,
            epsilon: 1.0,
            sigma: 1.0,
            r: 0.0,
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
    ///
    /// Each coarse step draws `kappa * M * Jref` normals, in the order
    /// documented on [`PeriodicIncrements`].
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Run, SolverError> {
        let (jref, m) = (self.jref, self.realizations);
        let dt_ref = self.horizon / self.steps as f64;
        let dt = self.kappa as f64 * dt_ref;
        let coarse = self.steps / self.kappa;
        debug!(
            jref,
            j = self.j,
            coarse_steps = coarse,
            kappa = self.kappa,
            dt,
            realizations = m,
            reaction = self.reaction.name(),
            diffusion = self.diffusion.name(),
            "starting spectral SPDE run"
        );

        let band = AliasBand::new(self.j, jref);
        let ee = integrating_factor(&wavenumbers(jref, self.a), dt, self.epsilon);
        let mut coeffs = PeriodicCoefficients::new(dt_ref, jref, self.a, self.r)?;
        coeffs.truncate(&band);
        let mut noise = PeriodicIncrements::new(coeffs, self.kappa, Space::Spectral)?;
        let mut fft = Spectral1D::new(jref);
        let mut residue = ResidueMonitor::new(self.imag_tolerance);

        let len = m * jref;
        let mut u: Vec<f64> = self.u0[..jref].repeat(m);
        let mut uh = vec![Complex64::default(); len];
        fft.forward_real_into(&u, &mut uh);
        let mut work = vec![0.0; len];
        let mut gu = vec![0.0; len];
        let mut fh = vec![Complex64::default(); len];
        let mut dw = vec![Complex64::default(); len];
        let mut back = vec![Complex64::default(); len];

        let times = linspace(0.0, self.horizon, coarse + 1);
        let mut trajectory = Trajectory::new(&[m, jref + 1], coarse + 1);
        let mut snapshot = vec![0.0; m * (jref + 1)];
        close_periodic_1d(&u, jref, &mut snapshot);
        trajectory.push(times[0], &snapshot);

        for n in 1..=coarse {
            band.zero(&mut uh);

            self.reaction.apply(&u, &mut work);
            fft.forward_real_into(&work, &mut fh);
            band.zero(&mut fh);

            noise.draw_spectral_into(rng, &mut dw);
            fft.inverse(&mut dw);
            residue.take_real(&dw, &mut work, n);
            self.diffusion.apply(&u, &mut gu);
            for (w, g) in work.iter_mut().zip(&gu) {
                *w *= self.sigma * g;
            }
            fft.forward_real_into(&work, &mut dw);
            band.zero(&mut dw);

            for (i, v) in uh.iter_mut().enumerate() {
                *v = (*v + fh[i] * dt + dw[i]) * ee[i % jref];
            }
            back.copy_from_slice(&uh);
            fft.inverse(&mut back);
            residue.take_real(&back, &mut u, n);
            check_finite(n, &u)?;

            close_periodic_1d(&u, jref, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, t = times[n], "spectral SPDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a, jref + 1),
            y: None,
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

impl SpectralSpde1DBuilder {
    /// Domain length `a`; the grid is `linspace(0, a, Jref + 1)`.
    pub fn domain(mut self, a: f64) -> Self {
        self.a = Some(a);
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

    /// Grid intervals of the state, `Jref` (even).
    pub fn reference_resolution(mut self, jref: usize) -> Self {
        self.jref = Some(jref);
        self
    }

    /// Working resolution `J` for dealiasing (even, `<= Jref`).
    /// Default: `Jref`.
    pub fn resolution(mut self, j: usize) -> Self {
        self.j = Some(j);
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

    /// Spatial regularity `r` of the noise. Default: 0.
    pub fn regularity(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Number of independent realizations `M`. Default: 1.
    pub fn realizations(mut self, m: usize) -> Self {
        self.realizations = m;
        self
    }

    /// Seed for [`run`](SpectralSpde1D::run). Default: unseeded.
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

    /// Initial condition on `linspace(0, a, Jref + 1)`. Only the first
    /// `Jref` values are used; the last is implied by periodicity.
    pub fn initial(mut self, u0: Vec<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Bound on the imaginary residue before a warning. Default: `1e-8`.
    pub fn imag_tolerance(mut self, tolerance: f64) -> Self {
        self.imag_tolerance = tolerance;
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<SpectralSpde1D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let jref = required("Jref", self.jref)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, self.kappa)?;
        require_even("Jref", jref)?;
        let j = self.j.unwrap_or(jref);
        require_even("J", j)?;
        if j > jref {
            return Err(ConfigError::InvalidResolution {
                name: "J",
                value: j,
                reason: "must not exceed Jref",
            });
        }
        require_non_negative("epsilon", self.epsilon)?;
        require_finite("sigma", self.sigma)?;
        require_non_negative("r", self.r)?;
        if self.realizations == 0 {
            return Err(ConfigError::InvalidResolution {
                name: "M",
                value: 0,
                reason: "must be at least 1",
            });
        }
        require_positive("imag_tolerance", self.imag_tolerance)?;
        require_len("u0", jref + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(SpectralSpde1D {
            a,
            horizon,
            steps,
            kappa: self.kappa,
            jref,
            j,
            epsilon: self.epsilon,
            sigma: self.sigma,
            r: self.r,
            realizations: self.realizations,
            seed: self.seed,
            reaction,
            diffusion: self.diffusion,
            u0,
            imag_tolerance: self.imag_tolerance,
        })
    }
}

// ── SpectralPde1D ───────────────────────────────────────────────────

/// Deterministic reaction–diffusion on `[0, a)` with periodic boundary.
///
/// The same semi-implicit step as [`SpectralSpde1D`] without noise or
/// dealiasing.
pub struct SpectralPde1D {
    a: f64,
    horizon: f64,
    steps: usize,
    j: usize,
    epsilon: f64,
    reaction: Term,
    u0: Vec<f64>,
    imag_tolerance: f64,
}

impl fmt::Debug for SpectralPde1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralPde1D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("reaction", &self.reaction.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SpectralPde1D`].
///
/// Required: `domain`, `horizon`, `steps`, `resolution`, `reaction` and
/// `initial`.
pub struct SpectralPde1DBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    j: Option<usize>,
    epsilon: f64,
    reaction: Option<Term>,
    u0: Option<Vec<f64>>,
    imag_tolerance: f64,
}

impl SpectralPde1D {
    /// Create a new builder.
    pub fn builder() -> SpectralPde1DBuilder {
        SpectralPde1DBuilder {
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
        let j = self.j;
        let dt = self.horizon / self.steps as f64;
        debug!(j, steps = self.steps, dt, reaction = self.reaction.name(), "starting spectral PDE run");

        let ee = integrating_factor(&wavenumbers(j, self.a), dt, self.epsilon);
        let mut fft = Spectral1D::new(j);
        let mut residue = ResidueMonitor::new(self.imag_tolerance);

        let mut u = self.u0[..j].to_vec();
        let mut uh = fft.forward_real(&u);
        let mut work = vec![0.0; j];
        let mut fh = vec![Complex64::default(); j];
        let mut back = vec![Complex64::default(); j];

        let times = linspace(0.0, self.horizon, self.steps + 1);
        let mut trajectory = Trajectory::new(&[1, j + 1], self.steps + 1);
        let mut snapshot = vec![0.0; j + 1];
        close_periodic_1d(&u, j, &mut snapshot);
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

            close_periodic_1d(&u, j, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, "spectral PDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a, j + 1),
            y: None,
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

impl SpectralPde1DBuilder {
    /// Domain length `a`.
    pub fn domain(mut self, a: f64) -> Self {
        self.a = Some(a);
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

    /// Grid intervals `J` (even).
    pub fn resolution(mut self, j: usize) -> Self {
        self.j = Some(j);
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

    /// Initial condition on `linspace(0, a, J + 1)`.
    pub fn initial(mut self, u0: Vec<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Bound on the imaginary residue before a warning. Default: `1e-8`.
    pub fn imag_tolerance(mut self, tolerance: f64) -> Self {
        self.imag_tolerance = tolerance;
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<SpectralPde1D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let j = required("J", self.j)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, 1)?;
        require_even("J", j)?;
        require_non_negative("epsilon", self.epsilon)?;
        require_positive("imag_tolerance", self.imag_tolerance)?;
        require_len("u0", j + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(SpectralPde1D {
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
