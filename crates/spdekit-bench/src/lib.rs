//! Benchmark profiles for the spdekit integrators.
//!
//! - [`reference_profile`]: 1D stochastic Allen–Cahn, `Jref = 256`,
//!   dealiased to `J = 128`, 8 realizations.
//! - [`stress_profile`]: the same equation at `Jref = 2048` with 32
//!   realizations.
//! - [`planar_profile`]: 2D stochastic Allen–Cahn on a `64 x 64` grid.
//! - [`nagumo_profile`]: finite-difference Nagumo with correlated noise.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use spdekit_core::{AllenCahn, Array2, ConfigError};
use spdekit_solver::{FdmSpdeNagumo, NagumoNoise, SpectralSpde1D, SpectralSpde2D};
use spdekit_test_utils::fixtures::{sine_initial, sine_plane};

fn allen_cahn_1d(
    jref: usize,
    j: usize,
    realizations: usize,
    seed: u64,
) -> Result<SpectralSpde1D, ConfigError> {
    SpectralSpde1D::builder()
        .domain(1.0)
        .horizon(0.5)
        .steps(200)
        .substeps(2)
        .reference_resolution(jref)
        .resolution(j)
        .epsilon(0.001)
        .sigma(0.1)
        .regularity(0.5)
        .realizations(realizations)
        .reaction(AllenCahn)
        .initial(sine_initial(1.0, jref, 0.5))
        .seed(seed)
        .build()
}

/// Reference profile: 100 coarse steps of 8 realizations at `Jref = 256`.
pub fn reference_profile(seed: u64) -> Result<SpectralSpde1D, ConfigError> {
    allen_cahn_1d(256, 128, 8, seed)
}

/// Stress profile: 100 coarse steps of 32 realizations at `Jref = 2048`.
pub fn stress_profile(seed: u64) -> Result<SpectralSpde1D, ConfigError> {
    allen_cahn_1d(2048, 1024, 32, seed)
}

/// Planar profile: 20 steps on a `64 x 64` periodic grid.
pub fn planar_profile(seed: u64) -> Result<SpectralSpde2D, ConfigError> {
    let u0 = Array2::from_vec(65, 65, sine_plane(65, 65, 0.5))?;
    SpectralSpde2D::builder()
        .domain(1.0, 1.0)
        .horizon(0.1)
        .steps(20)
        .resolution(64, 64)
        .epsilon(0.001)
        .sigma(0.1)
        .alpha(0.01)
        .reaction(AllenCahn)
        .initial(u0)
        .seed(seed)
        .build()
}

/// Nagumo profile: 500 steps on 512 intervals with `ell = 1` noise.
pub fn nagumo_profile(seed: u64) -> Result<FdmSpdeNagumo, ConfigError> {
    let u0 = sine_initial(20.0, 512, 0.5)
        .into_iter()
        .map(|v| 0.5 + v)
        .collect();
    FdmSpdeNagumo::builder()
        .domain(20.0)
        .horizon(5.0)
        .steps(500)
        .resolution(512)
        .sigma(0.5)
        .noise(NagumoNoise::Exponential { ell: 1.0 })
        .initial(u0)
        .seed(seed)
        .build()
}
