//! Stationary Gaussian random fields for the spdekit workspace.
//!
//! - [`covariance`]: covariance kernels on the line and the plane.
//! - [`circulant`]: 1D circulant embedding, sampling, and the embedding
//!   defect diagnostic.
//! - [`bccb`]: the 2D (block circulant) counterpart.
//! - [`process`]: Brownian motion and bridge.
//! - [`kl`]: dense Karhunen–Loève reference sampler.
//! - [`special`]: gamma and modified Bessel functions.
//!
//! Every sampler takes an explicit `&mut impl Rng`; use
//! [`spdekit_core::sim_rng`] for seeded, reproducible draws.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bccb;
pub mod circulant;
pub mod covariance;
pub mod kl;
pub mod process;
pub mod special;

pub use bccb::{reduced_covariance, BccbEmbedding, SamplePair2D};
pub use circulant::{
    circulant_approx_whittle_matern, circulant_embed_sample, circulant_exponential,
    circulant_sample, default_paddings, rho_d_minus, rho_whittle_matern, CirculantEmbedding,
    EmbeddingDiagnostic, SamplePair, WhittleMaternSample,
};
pub use covariance::{
    AnisotropicGaussian, Covariance1D, Covariance2D, Exponential, Gaussian, SeparableExponential,
    WhittleMatern,
};
pub use kl::{gp_exponential_kl, gp_gaussian_kl, kl_sample};
pub use process::{brownian_bridge, brownian_motion, SamplePath};
