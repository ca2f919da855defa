//! Time-stepping integrators for semilinear reaction–diffusion equations.
//!
//! | Integrator | Space | Noise |
//! |---|---|---|
//! | [`SpectralSpde1D`] | periodic interval, Fourier Galerkin | `H^r_per` Q-Wiener |
//! | [`SpectralSpde2D`] | periodic rectangle, Fourier Galerkin | smooth `L^2` Q-Wiener |
//! | [`SpectralPde1D`], [`SpectralPde2D`] | as above | none |
//! | [`FdmPde1D`] | finite differences, [`Boundary`] of choice | none |
//! | [`FdmSpdeNagumo`] | finite differences | exponential or white |
//! | [`FemSpde1D`] | linear finite elements, Dirichlet | `H^r_0` Q-Wiener |
//! | [`FemPde1D`] | as above | none |
//!
//! All integrators are configured through builders that validate eagerly,
//! step semi-implicitly (diffusion implicit, reaction and noise explicit),
//! and return a [`Run`] holding the full [`Trajectory`] plus
//! [`RunDiagnostics`]. Stochastic integrators own an optional seed and
//! also accept an external RNG through `run_with`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
pub mod fdm;
pub mod fem;
pub mod nagumo;
pub mod run;
pub mod spectral;
pub mod spectral_2d;
pub mod tridiagonal;

use spdekit_core::Elementwise;

/// A boxed reaction or noise coefficient.
pub(crate) type Term = Box<dyn Elementwise + Send + Sync>;

pub use fdm::{Boundary, FdmPde1D, FdmPde1DBuilder};
pub use fem::{FemPde1D, FemPde1DBuilder, FemSpde1D, FemSpde1DBuilder};
pub use nagumo::{FdmSpdeNagumo, FdmSpdeNagumoBuilder, NagumoNoise};
pub use run::{Run, RunDiagnostics, Trajectory};
pub use spectral::{SpectralPde1D, SpectralPde1DBuilder, SpectralSpde1D, SpectralSpde1DBuilder};
pub use spectral_2d::{SpectralPde2D, SpectralPde2DBuilder, SpectralSpde2D, SpectralSpde2DBuilder};
pub use tridiagonal::{CyclicTridiagonal, Tridiagonal, TridiagonalLu};
