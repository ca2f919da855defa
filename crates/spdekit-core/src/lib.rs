//! Core types and traits for the spdekit workspace.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! shared vocabulary used by the spectral, field, noise, and solver
//! crates: error enums, uniform grids, row-major 2D buffers, the seeded
//! RNG handle, and the [`Elementwise`] capability for pluggable reaction
//! and noise terms.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod elementwise;
pub mod error;
pub mod grid;
pub mod rng;

pub use array::Array2;
pub use elementwise::{Additive, AllenCahn, Elementwise, Linear, Nagumo};
pub use error::{ConfigError, EmbeddingError, SolverError};
pub use grid::{linspace, Grid1D, Grid2D};
pub use rng::{fill_standard_normal, sim_rng, standard_normals, SimRng};
