//! # Error
//!
//! $$
//! \text{sample}:(n,\nu,\Sigma)\to\text{Ok}(U_1,\dots,U_n)\ \vert\ \text{Err}(e)
//! $$
//!
use thiserror::Error;

/// Failure of a Wishart factor sampling call.
#[derive(Clone, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum WishartError {
  /// Scale matrix is not square, not real, empty, has non-finite entries,
  /// or does not match another expected size.
  #[error("'scale' must be a square, real matrix ({0})")]
  InvalidShape(String),
  #[error("inconsistent degrees of freedom and dimension (df: {df}, dimension: {dim})")]
  InvalidDegreesOfFreedom { df: f64, dim: usize },
  #[error("'scale' matrix is not positive-definite")]
  NotPositiveDefinite,
  /// Triangular inversion failed for the draw at `index`. Unreachable for
  /// well-posed input.
  #[error("sampled factor {index} is singular and cannot be inverted")]
  SingularFactor { index: usize },
  /// Only raised under [`SampleCountPolicy::Strict`](crate::sampler::SampleCountPolicy).
  #[error("sample count must be at least 1 (got {0})")]
  InvalidSampleCount(i64),
}

pub type Result<T> = std::result::Result<T, WishartError>;
