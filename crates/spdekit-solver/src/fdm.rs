//! Method-of-lines finite differences in 1D.
//!
//! The second difference `A = tridiag(-1, 2, -1) / h^2` is treated
//! implicitly and the reaction explicitly:
//!
//! ```text
//! (I + dt eps A) u_{n+1} = u_n + dt f(u_n) [+ noise]
//! ```
//!
//! The matrix depends only on the configuration, so it is factorized once
//! per run.

use std::fmt;
use std::ops::Range;

use spdekit_core::error::{require_len, require_non_negative, require_positive};
use spdekit_core::{linspace, ConfigError, Elementwise, SolverError};
use tracing::{debug, trace};

use crate::config::{require_at_least, require_finite_state, require_steps, required};
use crate::run::{check_finite, Run, RunDiagnostics, Trajectory};
use crate::tridiagonal::{CyclicTridiagonal, Tridiagonal, TridiagonalLu};
use crate::Term;

/// Boundary condition on `[0, a]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Boundary {
    /// Homogeneous Dirichlet: `u(0) = u(a) = 0`; unknowns are the
    /// interior points.
    #[default]
    Dirichlet,
    /// Periodic: `u(0) = u(a)`; unknowns are points `0 .. J`.
    Periodic,
    /// Homogeneous Neumann via ghost points; unknowns are all `J + 1`
    /// points.
    Neumann,
}

impl Boundary {
    /// Indices of the grid points that are solved for.
    pub fn unknowns(self, j: usize) -> Range<usize> {
        match self {
            Self::Dirichlet => 1..j,
            Self::Periodic => 0..j,
            Self::Neumann => 0..j + 1,
        }
    }
}

/// The factorized implicit matrix for one boundary condition.
#[derive(Clone, Debug)]
pub(crate) enum Implicit {
    Banded(TridiagonalLu),
    Cyclic(CyclicTridiagonal),
}

impl Implicit {
    /// Factorize `I + r A` for `J` intervals, `r = dt eps / h^2`.
    pub(crate) fn assemble(boundary: Boundary, j: usize, r: f64) -> Result<Self, SolverError> {
        let n = boundary.unknowns(j).len();
        let mut t = Tridiagonal::constant(n, 1.0 + 2.0 * r, -r)?;
        match boundary {
            Boundary::Dirichlet => Ok(Self::Banded(t.factor()?)),
            Boundary::Periodic => Ok(Self::Cyclic(CyclicTridiagonal::factor(&t, -r, -r)?)),
            Boundary::Neumann => {
                *t.sup_mut(0) = -2.0 * r;
                *t.sub_mut(n - 1) = -2.0 * r;
                Ok(Self::Banded(t.factor()?))
            }
        }
    }

    pub(crate) fn solve(&self, rhs: &mut [f64]) {
        match self {
            Self::Banded(lu) => lu.solve(rhs),
            Self::Cyclic(c) => c.solve(rhs),
        }
    }
}

/// Write the unknowns `v` back onto the closed grid of `J + 1` points.
pub(crate) fn scatter(boundary: Boundary, v: &[f64], out: &mut [f64]) {
    let j = out.len() - 1;
    match boundary {
        Boundary::Dirichlet => {
            out[0] = 0.0;
            out[1..j].copy_from_slice(v);
            out[j] = 0.0;
        }
        Boundary::Periodic => {
            out[..j].copy_from_slice(v);
            out[j] = v[0];
        }
        Boundary::Neumann => out.copy_from_slice(v),
    }
}

// ── FdmPde1D ────────────────────────────────────────────────────────

/// Deterministic reaction–diffusion on `[0, a]` by finite differences.
///
/// # Construction
///
/// ```
/// use spdekit_core::AllenCahn;
/// use spdekit_solver::{Boundary, FdmPde1D};
///
/// let pde = FdmPde1D::builder()
///     .domain(1.0)
///     .horizon(0.1)
///     .steps(10)
///     .resolution(16)
///     .boundary(Boundary::Neumann)
///     .reaction(AllenCahn)
///     .initial(vec![0.5; 17])
///     .build()
///     .unwrap();
/// assert_eq!(pde.run().unwrap().trajectory.len(), 11);
/// ```
pub struct FdmPde1D {
    a: f64,
    horizon: f64,
    steps: usize,
    j: usize,
    epsilon: f64,
    boundary: Boundary,
    reaction: Term,
    u0: Vec<f64>,
}

impl fmt::Debug for FdmPde1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmPde1D")
            .field("a", &self.a)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .field("j", &self.j)
            .field("epsilon", &self.epsilon)
            .field("boundary", &self.boundary)
            .field("reaction", &self.reaction.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FdmPde1D`].
///
/// Required: `domain`, `horizon`, `steps`, `resolution`, `reaction` and
/// `initial`.
pub struct FdmPde1DBuilder {
    a: Option<f64>,
    horizon: Option<f64>,
    steps: Option<usize>,
    j: Option<usize>,
    epsilon: f64,
    boundary: Boundary,
    reaction: Option<Term>,
    u0: Option<Vec<f64>>,
}

impl FdmPde1D {
    /// Create a new builder.
    pub fn builder() -> FdmPde1DBuilder {
        FdmPde1DBuilder {
            a: None,
            horizon: None,
            steps: None,
            j: None,
            epsilon: 1.0,
            boundary: Boundary::default(),
            reaction: None,
            u0: None,
        }
    }

    /// Integrate to the final time.
    ///
    /// The recorded initial state is `u0` as given; later snapshots carry
    /// the boundary condition (zero ends for Dirichlet, a closed period
    /// for periodic).
    pub fn run(&self) -> Result<Run, SolverError> {
        let j = self.j;
        let h = self.a / j as f64;
        let dt = self.horizon / self.steps as f64;
        let r = dt * self.epsilon / (h * h);
        debug!(
            j,
            steps = self.steps,
            dt,
            r,
            boundary = ?self.boundary,
            reaction = self.reaction.name(),
            "starting FDM PDE run"
        );
        let implicit = Implicit::assemble(self.boundary, j, r)?;

        let mut u = self.u0[self.boundary.unknowns(j)].to_vec();
        let mut fu = vec![0.0; u.len()];
        let times = linspace(0.0, self.horizon, self.steps + 1);
        let mut trajectory = Trajectory::new(&[1, j + 1], self.steps + 1);
        trajectory.push(times[0], &self.u0);
        let mut snapshot = vec![0.0; j + 1];

        for n in 1..=self.steps {
            self.reaction.apply(&u, &mut fu);
            for (v, f) in u.iter_mut().zip(&fu) {
                *v += dt * f;
            }
            implicit.solve(&mut u);
            check_finite(n, &u)?;

            scatter(self.boundary, &u, &mut snapshot);
            trajectory.push(times[n], &snapshot);
            trace!(step = n, "FDM PDE step");
        }

        Ok(Run {
            x: linspace(0.0, self.a, j + 1),
            y: None,
            trajectory,
            diagnostics: RunDiagnostics {
                steps: self.steps,
                ..RunDiagnostics::default()
            },
        })
    }
}

impl FdmPde1DBuilder {
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

    /// Boundary condition. Default: Dirichlet.
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
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

    /// Build the integrator, validating all configuration.
    pub fn build(self) -> Result<FdmPde1D, ConfigError> {
        let a = required("a", self.a)?;
        let horizon = required("T", self.horizon)?;
        let steps = required("N", self.steps)?;
        let j = required("J", self.j)?;
        let reaction = required("reaction", self.reaction)?;
        let u0 = required("u0", self.u0)?;

        require_positive("a", a)?;
        require_positive("T", horizon)?;
        require_steps(steps, 1)?;
        require_at_least("J", j, 3, "must be at least 3")?;
        require_non_negative("epsilon", self.epsilon)?;
        require_len("u0", j + 1, u0.len())?;
        require_finite_state("u0", &u0)?;

        Ok(FdmPde1D {
            a,
            horizon,
            steps,
            j,
            epsilon: self.epsilon,
            boundary: self.boundary,
            reaction,
            u0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdekit_test_utils::fixtures::sine_initial;

    fn heat(boundary: Boundary, u0: Vec<f64>) -> FdmPde1D {
        FdmPde1D::builder()
            .domain(1.0)
            .horizon(0.1)
            .steps(50)
            .resolution(u0.len() - 1)
            .epsilon(0.5)
            .boundary(boundary)
            .reaction(|_u: f64| 0.0)
            .initial(u0)
            .build()
            .unwrap()
    }

    // ── boundaries ──────────────────────────────────────────────

    #[test]
    fn unknown_ranges() {
        assert_eq!(Boundary::Dirichlet.unknowns(8), 1..8);
        assert_eq!(Boundary::Periodic.unknowns(8), 0..8);
        assert_eq!(Boundary::Neumann.unknowns(8), 0..9);
    }

    #[test]
    fn neumann_preserves_constants() {
        let run = heat(Boundary::Neumann, vec![0.7; 17]).run().unwrap();
        for &v in run.final_state() {
            assert!((v - 0.7).abs() < 1e-13);
        }
    }

    #[test]
    fn periodic_preserves_constants_and_closes() {
        let run = heat(Boundary::Periodic, vec![-1.25; 13]).run().unwrap();
        let last = run.final_state();
        for &v in last {
            assert!((v + 1.25).abs() < 1e-13);
        }
        assert_eq!(last[0], last[12]);
    }

    #[test]
    fn dirichlet_pins_ends_and_decays() {
        let u0 = sine_initial(2.0, 32, 1.0).iter().map(|v| v.abs()).collect();
        let run = heat(Boundary::Dirichlet, u0).run().unwrap();
        let last = run.final_state();
        assert_eq!(last[0], 0.0);
        assert_eq!(last[32], 0.0);
        let peak = last.iter().copied().fold(0.0, f64::max);
        assert!(peak < 1.0 && peak > 0.0);
    }

    #[test]
    fn periodic_matches_discrete_mode_decay() {
        // sin(2 pi x) is an eigenvector of the periodic second difference
        // with eigenvalue 4 sin^2(pi h) / h^2.
        let j = 16;
        let u0 = sine_initial(1.0, j, 1.0);
        let run = heat(Boundary::Periodic, u0.clone()).run().unwrap();
        let h = 1.0 / j as f64;
        let r = (0.1 / 50.0) * 0.5 / (h * h);
        let mu = 4.0 * (std::f64::consts::PI * h).sin().powi(2);
        let factor = (1.0 / (1.0 + r * mu)).powi(50);
        let last = run.final_state();
        for k in 0..j {
            assert!((last[k] - factor * u0[k]).abs() < 1e-12, "point {k}");
        }
    }

    // ── validation ──────────────────────────────────────────────

    #[test]
    fn rejects_coarse_grid_and_bad_lengths() {
        let base = || {
            FdmPde1D::builder()
                .domain(1.0)
                .horizon(1.0)
                .steps(10)
                .reaction(|u: f64| u)
        };
        assert!(matches!(
            base().resolution(2).initial(vec![0.0; 3]).build(),
            Err(ConfigError::InvalidResolution { name: "J", .. })
        ));
        assert!(matches!(
            base().resolution(8).initial(vec![0.0; 8]).build(),
            Err(ConfigError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            base().resolution(8).initial(vec![f64::NAN; 9]).build(),
            Err(ConfigError::InvalidParameter { name: "u0", .. })
        ));
    }

    #[test]
    fn blow_up_is_reported_as_non_finite() {
        let run = FdmPde1D::builder()
            .domain(1.0)
            .horizon(1.0)
            .steps(10)
            .resolution(8)
            .epsilon(0.0)
            .boundary(Boundary::Neumann)
            .reaction(|u: f64| u * u * 1e200)
            .initial(vec![1.0; 9])
            .build()
            .unwrap()
            .run();
        assert!(matches!(run, Err(SolverError::NonFinite { .. })));
    }
}
