//! Piecewise-linear finite elements on `[0, a]` with homogeneous
//! Dirichlet ends.
//!
//! On a uniform mesh of `ne` elements of width `h`, the interior mass and
//! stiffness matrices are
//!
//! ```text
//! M = h/6 tridiag(1, 4, 1)        K = eps/h tridiag(-1, 2, -1)
//! ```
//!
//! and one semi-implicit Euler step reads
//!
//! ```text
//! (M + dt K) u_{n+1} = M u_n + dt <f(u_n), phi> [+ <sigma g(u_n) dW, phi>]
//! ```
//!
//! where `<v, phi>` is the load vector of the piecewise-linear
//! interpolant of the nodal values `v`. `M + dt K` is factorized once.

use std::fmt;

use rand::Rng;
use spdekit_core::error::{require_len, require_non_negative, require_positive};
use spdekit_core::{linspace, sim_rng, Additive, ConfigError, Elementwise, SolverError};
use spdekit_noise::{DirichletCoefficients, DirichletIncrements, Space};
use tracing::{debug, trace};

use crate::config::{
    require_at_least, require_finite, require_finite_state, require_steps, required,
};
use crate::run::{check_finite, Run, RunDiagnostics, Trajectory};
use crate::tridiagonal::{Tridiagonal, TridiagonalLu};
use crate::Term;

/// A uniform mesh of linear elements.
#[derive(Clone, Copy, Debug)]
struct Elements {
    ne: usize,
    h: f64,
}

impl Elements {
    fn new(a: f64, ne: usize) -> Self {
        Self {
            ne,
            h: a / ne as f64,
        }
    }

    /// Interior vertices, the unknowns.
    fn interior(self) -> usize {
        self.ne - 1
    }

    fn mass(self) -> Result<Tridiagonal, ConfigError> {
        Tridiagonal::constant(self.interior(), 2.0 * self.h / 3.0, self.h / 6.0)
    }

    /// Factorized `M + dt K`.
    fn implicit(self, dt: f64, epsilon: f64) -> Result<TridiagonalLu, SolverError> {
        let h = self.h;
        let k = dt * epsilon / h;
        Tridiagonal::constant(self.interior(), 2.0 * h / 3.0 + 2.0 * k, h / 6.0 - k)?.factor()
    }

    /// Load vector on the interior vertices of nodal values `v` (all
    /// `ne + 1` vertices).
    fn load(self, v: &[f64], out: &mut [f64]) {
        let (side, centre) = (self.h / 6.0, 2.0 * self.h / 3.0);
        for (i, o) in out.iter_mut().enumerate() {
            *o = side * (v[i] + v[i + 2]) + centre * v[i + 1];
        }
    }

    /// One step for a single realization `u` (all `ne + 1` vertices).
    ///
    /// `forcing` holds the nodal values of the noise term, or `None` for a
    /// deterministic step.
    fn step(
        self,
        system: &Step<'_>,
        u: &mut [f64],
        fu: &[f64],
        forcing: Option<&[f64]>,
        scratch: &mut [f64],
    ) {
        let interior = self.interior();
        let mut rhs = system.mass.apply(&u[1..=interior]);
        self.load(fu, scratch);
        for (r, b) in rhs.iter_mut().zip(scratch.iter()) {
            *r += system.dt * b;
        }
        if let Some(gdw) = forcing {
            self.load(gdw, scratch);
            for (r, b) in rhs.iter_mut().zip(scratch.iter()) {
                *r += b;
            }
        }
        system.lu.solve(&mut rhs);
        u[0] = 0.0;
        u[1..=interior].copy_from_slice(&rhs);
        u[self.ne] = 0.0;
    }
}

/// Matrices shared by every step of a run.
struct Step<'a> {
    mass: &'a Tridiagonal,
    lu: &'a TridiagonalLu,
    dt: f64,
}

/// Restrict interior fine-grid values to the coarse vertices
/// `0, L, 2L, ..`, with zero at both ends.
///
/// `fine` holds the `ne * L - 1` interior values of the fine grid; `out`
/// has `ne + 1` entries.
fn restrict(fine: &[f64], stride: usize, out: &mut [f64]) {
    let last = out.len() - 1;
    out[0] = 0.0;
    for (k, o) in out.iter_mut().enumerate().take(last).skip(1) {
        *o = fine[k * stride - 1];
    }
    out[last] = 0.0;
}

// ── FemPde1D ────────────────────────────────────────────────────────

/// Deterministic reaction–diffusion on `[0, a]` by linear finite
/// elements, `u(0) = u(a) = 0`.
pub struct FemPde1D {
    a: f64,
    horizon: f64,
    steps: usize,
    ne: usize,
    epsilon: f64,
    reaction: Term,
    u0: Vec<f64>,
}

impl fmt::Debug for FemPde1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemPde1D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("ne", &self.ne)
            .field("epsilon", &self.epsilon)
            .field("reaction", &self.reaction.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FemPde1D`].
///
/// Required: `domain`, `horizon`, `steps`, `elements`, `reaction` and
/// `initial`.
pub struct FemPde1DBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    ne: Option<usize>,
    epsilon: f64,
    reaction: Option<Term>,
    u0: Option<Vec<f64>>,
}

impl FemPde1D {
    /// Create a new builder.
    pub fn builder() -> FemPde1DBuilder {
        FemPde1DBuilder {
            a: None,
            horizon: None,
            steps: None,
            ne: None,
            epsilon: 1.0,
            reaction: None,
            u0: None,
        }
    }

    /// Integrate to the final time.
    ///
    /// The recorded initial state is `u0` as given; later snapshots have
    /// zero ends.
    pub fn run(&self) -> Result<Run, SolverError> {
        let mesh = Elements::new(self.a, self.ne);
        let dt = self.horizon / self.steps as f64;
        debug!(
            ne = self.ne,
            steps = self.steps,
            dt,
            reaction = self.reaction.name(),
            "starting FEM PDE run"
        );
        let mass = mesh.mass()?;
        let lu = mesh.implicit(dt, self.epsilon)?;
        let system = Step {
            mass: &mass,
            lu: &lu,
            dt,
        };

        let mut u = self.u0.clone();
        let mut fu = vec![0.0; u.len()];
        let mut scratch = vec![0.0; mesh.interior()];
        let times = linspace(0.0, self.horizon, self.steps + 1);
        let mut trajectory = Trajectory::new(&[1, self.ne + 1], self.steps + 1);
        trajectory.push(times[0], &u);

        for n in 1..=self.steps {
            self.reaction.apply(&u, &mut fu);
            mesh.step(&system, &mut u, &fu, None, &mut scratch);
            check_finite(n, &u)?;
            trajectory.push(times[n], &u);
            trace!(step = n, "FEM PDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a, self.ne + 1),
            y: None,
            trajectory,
            diagnostics: RunDiagnostics {
                steps: self.steps,
                ..RunDiagnostics::default()
            },
        })
    }
}

impl FemPde1DBuilder {
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

    /// Number of elements `ne >= 2`.
    pub fn elements(mut self, ne: usize) -> Self {
        self.ne = Some(ne);
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

    /// Initial condition on the `ne + 1` vertices.
    pub fn initial(mut self, u0: Vec<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<FemPde1D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let ne = required("ne", self.ne)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, 1)?;
        require_at_least("ne", ne, 2, "must be at least 2")?;
        require_non_negative("epsilon", self.epsilon)?;
        require_len("u0", ne + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(FemPde1D {
            a,
            horizon,
            steps,
            ne,
            epsilon: self.epsilon,
            reaction,
            u0,
        })
    }
}

// ── FemSpde1D ───────────────────────────────────────────────────────

/// Stochastic reaction–diffusion on `[0, a]` by linear finite elements,
/// driven by an `H^r_0` Q-Wiener process.
///
/// The noise is drawn in physical space on a reference mesh of `neref`
/// elements, truncated to the first `ne = neref / L` sine modes, and
/// sampled at every `L`-th reference vertex.
///
/// # Construction
///
/// ```
/// use spdekit_core::Nagumo;
/// use spdekit_solver::FemSpde1D;
///
/// let spde = FemSpde1D::builder()
///     .domain(1.0)
///     .horizon(0.1)
///     .steps(20)
///     .substeps(2)
///     .reference_elements(64)
///     .coarsening(4)
///     .reaction(Nagumo::default())
///     .initial(vec![0.0; 17])
///     .seed(5)
///     .build()
///     .unwrap();
/// let run = spde.run().unwrap();
/// assert_eq!(run.trajectory.shape(), &[1, 17]);
/// ```
pub struct FemSpde1D {
    a: f64,
    horizon: f64,
    steps: usize,
    kappa: usize,
    neref: usize,
    stride: usize,
    epsilon: f64,
    sigma: f64,
    r: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Term,
    diffusion: Term,
    u0: Vec<f64>,
}

impl fmt::Debug for FemSpde1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemSpde1D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("kappa", &self.kappa)
            .field("neref", &self.neref)
            .field("stride", &self.stride)
            .field("epsilon", &self.epsilon)
            .field("sigma", &self.sigma)
            .field("r", &self.r)
            .field("realizations", &self.realizations)
            .field("seed", &self.seed)
            .field("reaction", &self.reaction.name())
            .field("diffusion", &self.diffusion.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FemSpde1D`].
///
/// Required: `domain`, `horizon`, `steps`, `reference_elements`,
/// `reaction` and `initial`.
pub struct FemSpde1DBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    kappa: usize,
    neref: Option<usize>,
    stride: usize,
    epsilon: f64,
    sigma: f64,
    r: f64,
    realizations: usize,
    seed: Option<u64>,
    reaction: Option<Term>,
    diffusion: Term,
    u0: Option<Vec<f64>>,
}

impl FemSpde1D {
    /// Create a new builder.
    pub fn builder() -> FemSpde1DBuilder {
        FemSpde1DBuilder {
            a: None,
            horizon: None,
            steps: None,
            kappa: 1,
            neref: None,
            stride: 1,
            epsilon: 1.0,
            sigma: 1.0,
            r: 0.0,
            realizations: 1,
            seed: None,
            reaction: None,
            diffusion: Box::new(Additive(1.0)),
            u0: None,
        }
    }

    /// Run with the configured seed.
    pub fn run(&self) -> Result<Run, SolverError> {
        let mut rng = sim_rng(self.seed);
        self.run_with(&mut rng)
    }

    /// Run drawing the noise from `rng`.
    ///
    /// Each coarse step draws `kappa * M * (neref - 1)` normals, in the
    /// order documented on [`DirichletIncrements`].
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Run, SolverError> {
        let ne = self.neref / self.stride;
        let nv = ne + 1;
        let m = self.realizations;
        let mesh = Elements::new(self.a, ne);
        let dt_ref = self.horizon / self.steps as f64;
        let dt = self.kappa as f64 * dt_ref;
        let coarse = self.steps / self.kappa;
        debug!(
            neref = self.neref,
            ne,
            coarse_steps = coarse,
            kappa = self.kappa,
            dt,
            realizations = m,
            reaction = self.reaction.name(),
            diffusion = self.diffusion.name(),
            "starting FEM SPDE run"
        );

        let mass = mesh.mass()?;
        let lu = mesh.implicit(dt, self.epsilon)?;
        let system = Step {
            mass: &mass,
            lu: &lu,
            dt,
        };
        let mut coeffs = DirichletCoefficients::new(dt_ref, self.neref, self.a, self.r)?;
        coeffs.truncate(ne);
        let mut noise = DirichletIncrements::new(coeffs, self.kappa, Space::Physical)?;
        let fine = noise.len();

        let mut u: Vec<f64> = self.u0.repeat(m);
        let mut fu = vec![0.0; m * nv];
        let mut gu = vec![0.0; m * nv];
        let mut gdw = vec![0.0; nv];
        let mut scratch = vec![0.0; mesh.interior()];

        let times = linspace(0.0, self.horizon, coarse + 1);
        let mut trajectory = Trajectory::new(&[m, nv], coarse + 1);
        trajectory.push(times[0], &u);

        for n in 1..=coarse {
            let dw = noise.draw(rng, m);
            self.reaction.apply(&u, &mut fu);
            self.diffusion.apply(&u, &mut gu);
            for r in 0..m {
                let row = r * nv..(r + 1) * nv;
                restrict(&dw[r * fine..(r + 1) * fine], self.stride, &mut gdw);
                for (w, g) in gdw.iter_mut().zip(&gu[row.clone()]) {
                    *w *= self.sigma * g;
                }
                mesh.step(&system, &mut u[row.clone()], &fu[row], Some(&gdw), &mut scratch);
            }
            check_finite(n, &u)?;
            trajectory.push(times[n], &u);
            trace!(step = n, t = times[n], "FEM SPDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a, nv),
            y: None,
            trajectory,
            diagnostics: RunDiagnostics {
                steps: coarse,
                ..RunDiagnostics::default()
            },
        })
    }
}

impl FemSpde1DBuilder {
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

    /// Number of reference time steps `Nref`.
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Reference steps per coarse step, `kappa`. Default: 1.
    pub fn substeps(mut self, kappa: usize) -> Self {
        self.kappa = kappa;
        self
    }

    /// Elements of the noise mesh, `neref`.
    pub fn reference_elements(mut self, neref: usize) -> Self {
        self.neref = Some(neref);
        self
    }

    /// Reference elements per solution element, `L`. Default: 1.
    pub fn coarsening(mut self, stride: usize) -> Self {
        self.stride = stride;
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

    /// Noise regularity `r`. Default: 0.
    pub fn regularity(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Independent realizations `M`. Default: 1.
    pub fn realizations(mut self, m: usize) -> Self {
        self.realizations = m;
        self
    }

    /// Seed for a reproducible run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reaction term `f(u)`.
    pub fn reaction(mut self, f: impl Elementwise + Send + Sync + 'static) -> Self {
        self.reaction = Some(Box::new(f));
        self
    }

    /// Noise coefficient `g(u)`. Default: additive, `g = 1`.
    pub fn diffusion(mut self, g: impl Elementwise + Send + Sync + 'static) -> Self {
        self.diffusion = Box::new(g);
        self
    }

    /// Initial condition on the `neref / L + 1` solution vertices.
    pub fn initial(mut self, u0: Vec<f64>) -> Self {
        self.u0 = Some(u0);
        self
    }

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<FemSpde1D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let neref = required("neref", self.neref)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, self.kappa)?;
        require_at_least("L", self.stride, 1, "must be at least 1")?;
        if neref % self.stride != 0 {
            return Err(ConfigError::InvalidResolution {
                name: "neref",
                value: neref,
                reason: "must be a multiple of L",
            });
        }
        let ne = neref / self.stride;
        require_at_least("ne", ne, 2, "neref / L must be at least 2")?;
        require_non_negative("epsilon", self.epsilon)?;
        require_finite("sigma", self.sigma)?;
        require_non_negative("r", self.r)?;
        require_at_least("M", self.realizations, 1, "must be at least 1")?;
        require_len("u0", ne + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(FemSpde1D {
            a,
            horizon,
            steps,
            kappa: self.kappa,
            neref,
            stride: self.stride,
            epsilon: self.epsilon,
            sigma: self.sigma,
            r: self.r,
            realizations: self.realizations,
            seed: self.seed,
            reaction,
            diffusion: self.diffusion,
            u0,
        })
    }
}
