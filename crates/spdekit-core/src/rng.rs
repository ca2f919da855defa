//! Explicitly owned random-number handles.
//!
//! Every sampling routine in the workspace takes `&mut R where R: Rng`;
//! there is no process-wide seed. [`sim_rng`] builds the canonical
//! generator: a ChaCha8 stream seeded with `seed_from_u64` when a seed is
//! given, so identical `(seed, configuration)` pairs reproduce identical
//! trajectories.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// The generator used by builders that own their RNG.
pub type SimRng = ChaCha8Rng;

/// Build a [`SimRng`].
///
/// `Some(seed)` is fully deterministic. `None` seeds from the thread-local
/// entropy source, so runs are equal only in distribution.
pub fn sim_rng(seed: Option<u64>) -> SimRng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

/// Fill `out` with independent standard normal draws, in index order.
pub fn fill_standard_normal<R: Rng + ?Sized>(rng: &mut R, out: &mut [f64]) {
    for v in out.iter_mut() {
        *v = StandardNormal.sample(rng);
    }
}

/// `len` independent standard normal draws.
pub fn standard_normals<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    fill_standard_normal(rng, &mut out);
    out
}
