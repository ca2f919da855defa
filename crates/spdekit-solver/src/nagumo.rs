//! Finite-difference Nagumo equation with additive noise.
//!
//! `du = (eps u_xx + u (1 - u) (u - alpha)) dt + sigma dW` on `[0, a]`,
//! semi-implicit in time as in [`fdm`](crate::fdm). Two noise models:
//!
//! - [`NagumoNoise::Exponential`]: spatially correlated noise with
//!   covariance `exp(-|x|/ell)`, sampled on the full grid by circulant
//!   embedding, with homogeneous Neumann boundary.
//! - [`NagumoNoise::White`]: space-time white noise on the interior points
//!   with homogeneous Dirichlet boundary.

use std::fmt;

use rand::Rng;
use spdekit_core::error::{require_len, require_non_negative, require_positive};
use spdekit_core::{
    fill_standard_normal, linspace, sim_rng, ConfigError, Elementwise, Nagumo, SolverError,
};
use spdekit_field::{CirculantEmbedding, Covariance1D, Exponential, SamplePair};
use tracing::{debug, trace};

use crate::config::{require_at_least, require_finite, require_finite_state, require_steps, required};
use crate::fdm::{scatter, Boundary, Implicit};
use crate::run::{check_finite, Run, RunDiagnostics, Trajectory};
use crate::Term;

/// Noise model for [`FdmSpdeNagumo`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NagumoNoise {
    /// Exponentially correlated noise with correlation length `ell`.
    ///
    /// Each embedding draw yields two independent fields; the second
    /// drives the following step.
    Exponential {
        /// Correlation length.
        ell: f64,
    },
    /// Uncorrelated noise, `sqrt(dt / h) xi` per interior point.
    White,
}

impl NagumoNoise {
    /// The boundary condition paired with this noise model.
    pub fn boundary(self) -> Boundary {
        match self {
            Self::Exponential { .. } => Boundary::Neumann,
            Self::White => Boundary::Dirichlet,
        }
    }
}

enum NoiseSource {
    Correlated {
        embedding: CirculantEmbedding,
        cached: Option<Vec<f64>>,
        scale: f64,
    },
    White {
        scale: f64,
    },
}

impl NoiseSource {
    /// Add one step of noise to `rhs`.
    fn add_to<R: Rng + ?Sized>(&mut self, rng: &mut R, rhs: &mut [f64], xi: &mut [f64]) {
        match self {
            Self::Correlated {
                embedding,
                cached,
                scale,
            } => {
                let dw = match cached.take() {
                    Some(y) => y,
                    None => {
                        let SamplePair { x, y } = embedding.sample(rng);
                        *cached = Some(y);
                        x
                    }
                };
                for (v, d) in rhs.iter_mut().zip(&dw) {
                    *v += *scale * d;
                }
            }
            Self::White { scale } => {
                fill_standard_normal(rng, xi);
                for (v, d) in rhs.iter_mut().zip(xi.iter()) {
                    *v += *scale * d;
                }
            }
        }
    }
}

/// Stochastic Nagumo equation by finite differences.
///
/// # Construction
///
/// ```
/// use spdekit_solver::{FdmSpdeNagumo, NagumoNoise};
///
/// let spde = FdmSpdeNagumo::builder()
///     .domain(20.0)
///     .horizon(1.0)
///     .steps(100)
///     .resolution(64)
///     .noise(NagumoNoise::Exponential { ell: 1.0 })
///     .initial(vec![0.5; 65])
///     .seed(3)
///     .build()
///     .unwrap();
/// let run = spde.run().unwrap();
/// assert!(run.diagnostics.embedding.is_some());
/// ```
pub struct FdmSpdeNagumo {
    a: f64,
    horizon: f64,
    steps: usize,
    j: usize,
    epsilon: f64,
    sigma: f64,
    noise: NagumoNoise,
    seed: Option<u64>,
    reaction: Term,
    u0: Vec<f64>,
}

impl fmt::Debug for FdmSpdeNagumo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmSpdeNagumo")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("sigma", &self.sigma)
            .field("noise", &self.noise)
            .field("reaction", &self.reaction.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FdmSpdeNagumo`].
///
/// Required: `domain`, `horizon`, `steps`, `resolution` and `initial`.
pub struct FdmSpdeNagumoBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    j: Option<usize>,
    epsilon: f64,
    sigma: f64,
    noise: NagumoNoise,
    seed: Option<u64>,
    reaction: Term,
    u0: Option<Vec<f64>>,
}

impl FdmSpdeNagumo {
    /// Create a new builder.
    pub fn builder() -> FdmSpdeNagumoBuilder {
        FdmSpdeNagumoBuilder {
            a: None,
            horizon: None,
            steps: None,
            j: None,
            epsilon: 1.0,
            sigma: 1.0,
            noise: NagumoNoise::White,
            seed: None,
            reaction: Box::new(Nagumo::default()),
            u0: None,
        }
    }

    /// Run with the configured seed.
    pub fn run(&self) -> Result<Run, SolverError> {
        let mut rng = sim_rng(self.seed);
        self.run_with(&mut rng)
    }

    /// Run drawing the noise from `rng`.
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Run, SolverError> {
        let j = self.j;
        let h = self.a / j as f64;
        let dt = self.horizon / self.steps as f64;
        let r = dt * self.epsilon / (h * h);
        let boundary = self.noise.boundary();
        debug!(
            j,
            steps = self.steps,
            dt,
            sigma = self.sigma,
            noise = ?self.noise,
            "starting FDM Nagumo run"
        );
        let implicit = Implicit::assemble(boundary, j, r)?;

        let x = linspace(0.0, self.a, j + 1);
        let mut embedding_diagnostic = None;
        let mut source = match self.noise {
            NagumoNoise::Exponential { ell } => {
                let c = Exponential { ell }.sample_lags(&x);
                let embedding = CirculantEmbedding::minimal(&c)?;
                embedding_diagnostic = Some(embedding.diagnostic());
                NoiseSource::Correlated {
                    embedding,
                    cached: None,
                    scale: self.sigma * dt.sqrt(),
                }
            }
            NagumoNoise::White => NoiseSource::White {
                scale: self.sigma * (dt / h).sqrt(),
            },
        };

        let mut u = self.u0[boundary.unknowns(j)].to_vec();
        let mut fu = vec![0.0; u.len()];
        let mut xi = vec![0.0; u.len()];
        let times = linspace(0.0, self.horizon, self.steps + 1);
        let mut trajectory = Trajectory::new(&[1, j + 1], self.steps + 1);
        trajectory.push(times[0], &self.u0);
        let mut snapshot = vec![0.0; j + 1];

        for n in 1..=self.steps {
            self.reaction.apply(&u, &mut fu);
            for (v, f) in u.iter_mut().zip(&fu) {
                *v += dt * f;
            }
            source.add_to(rng, &mut u, &mut xi);
            implicit.solve(&mut u);
            check_finite(n, &u)?;

            scatter(boundary, &u, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, "FDM Nagumo step");
        }

        Ok(Run {
            x,
            y: None,
            trajectory,
            diagnostics: RunDiagnostics {
                steps: self.steps,
                embedding: embedding_diagnostic,
                ..RunDiagnostics::default()
            },
        })
    }
}

impl FdmSpdeNagumoBuilder {
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

    /// Grid intervals `J >= 3`.
    pub fn resolution(mut self, j: usize) -> Self {
        self.j = Some(j);
        self
    }

    /// Diffusion coefficient. Default: 1.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Noise amplitude. Default: 1.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Noise model; also selects the boundary condition. Default: white.
    pub fn noise(mut self, noise: NagumoNoise) -> Self {
        self.noise = noise;
        self
    }

    /// Seed for [`run`](FdmSpdeNagumo::run). Default: unseeded.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reaction term. Default: [`Nagumo::default()`].
    pub fn reaction(mut self, f: impl Elementwise + Send + Sync + 'static) -> Self {
        self.reaction = Box::new(f);
        self
    }

    /// Initial condition on `linspace(0, a, J + 1)`.
    pub fn initial(mut self, u0: Vec<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<FdmSpdeNagumo, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let j = required("J", self.j)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, 1)?;
        require_at_least("J", j, 3, "must be at least 3")?;
        require_non_negative("epsilon", self.epsilon)?;
        require_finite("sigma", self.sigma)?;
        if let NagumoNoise::Exponential { ell } = self.noise {
            require_positive("ell", ell)?;
        }
        require_len("u0", j + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(FdmSpdeNagumo {
            a,
            horizon,
            steps,
            j,
            epsilon: self.epsilon,
            sigma: self.sigma,
            noise: self.noise,
            seed: self.seed,
            reaction: self.reaction,
            u0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A travelling-front profile centred at `x = 10`.
    fn front(points: usize) -> Vec<f64> {
        linspace(0.0, 20.0, points)
            .iter()
            .map(|x| 1.0 / (1.0 + (x - 10.0f64).exp()))
            .collect()
    }

    fn nagumo(noise: NagumoNoise, sigma: f64) -> FdmSpdeNagumo {
        FdmSpdeNagumo::builder()
            .domain(20.0)
            .horizon(2.0)
            .steps(40)
            .resolution(32)
            .sigma(sigma)
            .noise(noise)
            .initial(front(33))
            .seed(17)
            .build()
            .unwrap()
    }

    #[test]
    fn white_noise_keeps_dirichlet_ends() {
        let run = nagumo(NagumoNoise::White, 0.5).run().unwrap();
        for step in 1..run.trajectory.len() {
            let s = run.trajectory.snapshot(step).unwrap();
            assert_eq!(s[0], 0.0);
            assert_eq!(s[32], 0.0);
        }
        assert!(run.diagnostics.embedding.is_none());
    }

    #[test]
    fn exponential_noise_reports_embedding() {
        let run = nagumo(NagumoNoise::Exponential { ell: 1.0 }, 0.5).run().unwrap();
        let d = run.diagnostics.embedding.unwrap();
        assert_eq!(d.size, 64);
        assert!(d.is_positive_semidefinite());
    }

    #[test]
    fn zero_sigma_ignores_noise_model() {
        let a = nagumo(NagumoNoise::Exponential { ell: 2.0 }, 0.0).run().unwrap();
        let b = crate::FdmPde1D::builder()
            .domain(20.0)
            .horizon(2.0)
            .steps(40)
            .resolution(32)
            .boundary(Boundary::Neumann)
            .reaction(Nagumo::default())
            .initial(front(33))
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(a.final_state(), b.final_state());
    }

    #[test]
    fn same_seed_same_path() {
        let a = nagumo(NagumoNoise::White, 1.0).run().unwrap();
        let b = nagumo(NagumoNoise::White, 1.0).run().unwrap();
        assert_eq!(a.trajectory, b.trajectory);
    }

    #[test]
    fn rejects_non_positive_correlation_length() {
        let err = FdmSpdeNagumo::builder()
            .domain(1.0)
            .horizon(1.0)
            .steps(10)
            .resolution(8)
            .noise(NagumoNoise::Exponential { ell: 0.0 })
            .initial(vec![0.0; 9])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyDomain { name: "ell" });
    }
}
