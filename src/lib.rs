//! # chol-wishart
//!
//! $$
//! W=(TU)^\top(TU)\sim\mathcal W_p(\nu,\Sigma),\qquad \Sigma=U^\top U
//! $$
//!
//! Draws of the upper Cholesky factor of Wishart matrices, or of its
//! inverse, without forming the full matrix.
//!
//! ## Modules
//!
//! | Module       | Description                                                        |
//! |--------------|--------------------------------------------------------------------|
//! | [`sampler`]  | Batch sampling session and the public entry points.               |
//! | [`bartlett`] | Standardized triangular Bartlett factor.                           |
//! | [`linalg`]   | Cholesky, triangular product and triangular inversion primitives.  |
//! | [`stream`]   | Shared pseudo-random stream with an acquire/release bracket.      |
//! | [`scale`]    | Caller-supplied scale matrix.                                      |
//! | [`error`]    | Error type.                                                        |
//!
//! ## Example Usage
//!
//! ```rust
//! use chol_wishart::CholWishart;
//! use chol_wishart::stream::SharedStream;
//! use ndarray::array;
//!
//! let stream = SharedStream::seed_from_u64(1);
//! let factors = CholWishart::new(3, 5.0, array![[2.0, 0.5], [0.5, 1.0]])
//!   .sample_with(&stream)
//!   .unwrap();
//! assert_eq!(factors.len(), 3);
//! ```

pub mod bartlett;
pub mod error;
pub mod linalg;
pub mod sampler;
pub mod scale;
pub mod stream;

pub use crate::error::Result;
pub use crate::error::WishartError;
pub use crate::sampler::r_chol_wishart;
pub use crate::sampler::r_inv_chol_wishart;
pub use crate::sampler::r_inv_wishart;
pub use crate::sampler::r_wishart;
pub use crate::sampler::sample_wishart_factors;
pub use crate::sampler::CholWishart;
pub use crate::sampler::CholWishartConfig;
pub use crate::sampler::FactorMode;
pub use crate::sampler::SampleCountPolicy;
pub use crate::scale::ScaleMatrix;
