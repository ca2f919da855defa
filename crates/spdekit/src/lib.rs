//! spdekit: Gaussian random fields, Q-Wiener increments and semi-implicit
//! integrators for stochastic reaction–diffusion equations.
//!
//! This is the facade crate that re-exports the public API of every
//! spdekit sub-crate. Depending on `spdekit` alone is enough for most uses.
//!
//! # Quick start
//!
//! ```rust
//! use spdekit::prelude::*;
//!
//! // Stochastic Allen–Cahn on [0, 1] with 64 grid intervals.
//! let u0: Vec<f64> = linspace(0.0, 1.0, 65)
//!     .iter()
//!     .map(|x| 0.5 * (2.0 * std::f64::consts::PI * x).sin())
//!     .collect();
//! let spde = SpectralSpde1D::builder()
//!     .domain(1.0)
//!     .horizon(0.1)
//!     .steps(10)
//!     .reference_resolution(64)
//!     .epsilon(0.01)
//!     .sigma(0.1)
//!     .regularity(0.5)
//!     .reaction(AllenCahn)
//!     .initial(u0)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let run = spde.run().unwrap();
//! assert_eq!(run.trajectory.len(), 11);
//! assert_eq!(run.final_state().len(), 65);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `spdekit-core` | Grids, `Array2`, reaction terms, RNG, errors |
//! | [`spectral`] | `spdekit-spectral` | FFT wrappers, mode ordering, residue checks |
//! | [`field`] | `spdekit-field` | Covariances, circulant and BCCB samplers, KL, processes |
//! | [`noise`] | `spdekit-noise` | Q-Wiener coefficients and increments |
//! | [`solver`] | `spdekit-solver` | Spectral and finite-difference integrators |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grids, dense arrays, reaction terms, RNG handles and errors
/// (`spdekit-core`).
pub use spdekit_core as types;

/// FFT plans, wavenumber ordering and imaginary-residue checks
/// (`spdekit-spectral`).
///
/// [`spectral::Spectral1D`] and [`spectral::Spectral2D`] use the
/// unnormalized forward / `1/N` inverse convention throughout.
pub use spdekit_spectral as spectral;

/// Covariance models and exact Gaussian field samplers (`spdekit-field`).
///
/// Circulant embedding in 1D ([`field::CirculantEmbedding`]) and 2D
/// ([`field::BccbEmbedding`]), Karhunen–Loève expansions and Brownian
/// processes.
pub use spdekit_field as field;

/// Q-Wiener coefficients and increments (`spdekit-noise`).
pub use spdekit_noise as noise;

/// Time-stepping integrators (`spdekit-solver`).
///
/// Every integrator returns a [`solver::Run`].
pub use spdekit_solver as solver;

/// Common imports for typical spdekit usage.
///
/// ```rust
/// use spdekit::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use spdekit_core::{
        linspace, sim_rng, Additive, AllenCahn, Array2, Elementwise, Linear, Nagumo, SimRng,
    };

    // Errors
    pub use spdekit_core::{ConfigError, EmbeddingError, SolverError};

    // Fields
    pub use spdekit_field::{
        BccbEmbedding, CirculantEmbedding, Covariance1D, Covariance2D, EmbeddingDiagnostic,
    };

    // Noise
    pub use spdekit_noise::{PeriodicIncrements, PlanarIncrements, Space};

    // Integrators
    pub use spdekit_solver::{
        Boundary, FdmPde1D, FdmSpdeNagumo, FemPde1D, FemSpde1D, NagumoNoise, Run, SpectralPde1D,
        SpectralPde2D, SpectralSpde1D, SpectralSpde2D, Trajectory,
    };
}
