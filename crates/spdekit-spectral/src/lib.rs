//! Spectral transform adapter for the spdekit workspace.
//!
//! Wraps `rustfft` behind planned, reusable transform objects:
//!
//! - [`Spectral1D`] / [`Spectral2D`]: unnormalized forward, `1/N` inverse
//!   complex DFTs over contiguous batches of realizations.
//! - [`SineTransform`]: halved DST-I for Dirichlet (sine-series) problems.
//! - [`modes`]: wavenumbers, `fftshift`, and the anti-aliasing [`AliasBand`].
//! - [`residue`]: checked real-part extraction after inverse transforms.
//!
//! Plans are built once and reused; transforms never allocate per call
//! except where a fresh output buffer is returned.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod modes;
pub mod residue;
pub mod sine;
pub mod transform;

pub use modes::{
    fftshift, fftshift_2d, ifftshift, ifftshift_2d, signed_index, wavenumbers, AliasBand,
};
pub use num_complex::Complex64;
pub use residue::{take_real, ResidueMonitor, DEFAULT_IMAG_TOLERANCE};
pub use sine::SineTransform;
pub use transform::{Spectral1D, Spectral2D};
