//! Q-Wiener process noise for the spdekit workspace.
//!
//! [`coefficients`] computes the per-mode standard deviations `b_j` once
//! per configuration; [`increments`] turns them into per-step increments
//! with `kappa` sub-step aggregation, in spectral or physical space.
//!
//! Three processes are covered:
//!
//! | Process | Basis | Coefficients | Generator |
//! |---------|-------|--------------|-----------|
//! | `H^r_0(0, a)` | sine | [`DirichletCoefficients`] | [`DirichletIncrements`] |
//! | `H^r_per(0, a)` | Fourier | [`PeriodicCoefficients`] | [`PeriodicIncrements`] |
//! | `L^2` on a rectangle | 2D Fourier | [`PlanarCoefficients`] | [`PlanarIncrements`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coefficients;
pub mod increments;

pub use coefficients::{
    DirichletCoefficients, PeriodicCoefficients, PlanarCoefficients, REGULARITY_EPS,
};
pub use increments::{
    hermitian_fold, DirichletIncrements, Increment, PeriodicIncrements, PlanarIncrement,
    PlanarIncrements, Space,
};
