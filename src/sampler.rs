//! # Sampler
//!
//! $$
//! W\sim\mathcal W_p(\nu,\Sigma),\qquad W = (TU)^\top(TU),\qquad \Sigma=U^\top U
//! $$
//!
//! Batch sampling of Wishart Cholesky factors. The product `TU` of a
//! standardized Bartlett factor with the Cholesky factor of the scale is
//! itself the upper Cholesky factor of a Wishart draw, so the full matrix is
//! never formed.
use nalgebra::DMatrix;
use ndarray::Array2;
use ndarray::ShapeBuilder;
use rand::Rng;

use crate::bartlett::BartlettFactor;
use crate::bartlett::Upper;
use crate::error::Result;
use crate::error::WishartError;
use crate::linalg::copy_upper_into;
use crate::linalg::crossprod;
use crate::linalg::tcrossprod;
use crate::linalg::to_dmatrix;
use crate::linalg::NalgebraPrimitives;
use crate::linalg::TriangularPrimitives;
use crate::scale::ScaleMatrix;
use crate::stream::global_stream;
use crate::stream::SharedStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactorMode {
  /// Upper Cholesky factor `U` of the draw, `W = UᵀU`.
  #[default]
  Cholesky,
  /// `U⁻¹`, so that `W⁻¹ = U⁻¹U⁻ᵀ`.
  InverseCholesky,
}

/// What to do with a requested sample count below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleCountPolicy {
  /// Silently raise it to 1.
  #[default]
  Coerce,
  Strict,
}

#[derive(Debug, Clone, Default)]
pub struct CholWishartConfig {
  pub mode: FactorMode,
  pub sample_count_policy: SampleCountPolicy,
  /// Dimension the scale matrix must have, when known up front.
  pub expected_dim: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
  Init,
  Validating,
  Factoring,
  Sampling(usize),
  Done,
  Failed,
}

/// Validated request: the scale, its dimension and the effective count.
struct Plan<'a> {
  scale: &'a Array2<f64>,
  p: usize,
  count: usize,
}

struct Session {
  state: SessionState,
}

impl Session {
  fn new() -> Self {
    Self {
      state: SessionState::Init,
    }
  }

  fn enter(&mut self, next: SessionState) {
    tracing::trace!(from = ?self.state, to = ?next, "session transition");
    self.state = next;
  }

  fn fail(&mut self, err: WishartError) -> WishartError {
    self.enter(SessionState::Failed);
    tracing::debug!(error = %err, "wishart sampling failed");
    err
  }
}

/// Sampler for `n` Cholesky factors (or inverse factors) of
/// `Wishart(df, scale)` draws.
#[derive(Debug, Clone)]
pub struct CholWishart {
  pub n: i64,
  pub df: f64,
  pub scale: ScaleMatrix,
  pub config: CholWishartConfig,
}

impl CholWishart {
  pub fn new(n: i64, df: f64, scale: impl Into<ScaleMatrix>) -> Self {
    Self {
      n,
      df,
      scale: scale.into(),
      config: CholWishartConfig::default(),
    }
  }

  /// Switches to [`FactorMode::InverseCholesky`].
  pub fn inverse(mut self) -> Self {
    self.config.mode = FactorMode::InverseCholesky;
    self
  }

  pub fn with_config(mut self, config: CholWishartConfig) -> Self {
    self.config = config;
    self
  }

  /// Samples from the process-wide stream.
  pub fn sample(&self) -> Result<Vec<Array2<f64>>> {
    self.sample_with(global_stream())
  }

  pub fn sample_with<R: Rng>(&self, stream: &SharedStream<R>) -> Result<Vec<Array2<f64>>> {
    self.sample_with_primitives(stream, &NalgebraPrimitives)
  }

  pub fn sample_with_primitives<R: Rng, P: TriangularPrimitives>(
    &self,
    stream: &SharedStream<R>,
    prims: &P,
  ) -> Result<Vec<Array2<f64>>> {
    let mut session = Session::new();
    let plan = self.validate(&mut session, None)?;
    let mut out = Vec::new();
    out
      .try_reserve_exact(plan.count)
      .map_err(|_| session.fail(WishartError::InvalidSampleCount(self.n)))?;
    let upper = self.factor(&mut session, &plan, prims)?;
    out.extend((0..plan.count).map(|_| Array2::zeros((plan.p, plan.p).f())));
    self.draw(&mut session, &upper, stream, prims, &mut out)?;
    Ok(out)
  }

  /// Writes the draws into caller-owned slots. `out` must hold exactly the
  /// effective sample count of `p×p` matrices.
  pub fn sample_into<R: Rng>(&self, stream: &SharedStream<R>, out: &mut [Array2<f64>]) -> Result<()> {
    let mut session = Session::new();
    let plan = self.validate(&mut session, Some(&*out))?;
    let upper = self.factor(&mut session, &plan, &NalgebraPrimitives)?;
    self.draw(&mut session, &upper, stream, &NalgebraPrimitives, out)
  }

  /// Full matrices: `W = UᵀU` in Cholesky mode, `W⁻¹ = VVᵀ` with `V = U⁻¹`
  /// in inverse mode.
  pub fn sample_matrices_with<R: Rng>(&self, stream: &SharedStream<R>) -> Result<Vec<Array2<f64>>> {
    let factors = self.sample_with(stream)?;
    let compose = match self.config.mode {
      FactorMode::Cholesky => crossprod,
      FactorMode::InverseCholesky => tcrossprod,
    };
    Ok(factors.iter().map(compose).collect())
  }

  fn validate<'a>(&'a self, session: &mut Session, slots: Option<&[Array2<f64>]>) -> Result<Plan<'a>> {
    session.enter(SessionState::Validating);
    self.check(slots).map_err(|e| session.fail(e))
  }

  fn check<'a>(&'a self, slots: Option<&[Array2<f64>]>) -> Result<Plan<'a>> {
    let scale = self.scale.as_real_square()?;
    let p = scale.nrows();
    if let Some(dim) = self.config.expected_dim {
      if dim != p {
        return Err(WishartError::InvalidShape(format!(
          "expected dimension {dim}, got {p}"
        )));
      }
    }
    if !(self.df.is_finite() && self.df >= p as f64) {
      return Err(WishartError::InvalidDegreesOfFreedom { df: self.df, dim: p });
    }
    let count = self.effective_count()?;
    let fits = count
      .checked_mul(p * p)
      .and_then(|len| len.checked_mul(std::mem::size_of::<f64>()))
      .is_some_and(|bytes| bytes <= isize::MAX as usize);
    if !fits {
      return Err(WishartError::InvalidSampleCount(self.n));
    }
    if let Some(slots) = slots {
      if slots.len() != count {
        return Err(WishartError::InvalidShape(format!(
          "{} output slots for {count} samples",
          slots.len()
        )));
      }
      if let Some(bad) = slots.iter().find(|s| s.dim() != (p, p)) {
        let (r, c) = bad.dim();
        return Err(WishartError::InvalidShape(format!(
          "output slot is {r}x{c}, expected {p}x{p}"
        )));
      }
    }
    Ok(Plan { scale, p, count })
  }

  fn effective_count(&self) -> Result<usize> {
    if self.n >= 1 {
      return usize::try_from(self.n).map_err(|_| WishartError::InvalidSampleCount(self.n));
    }
    match self.config.sample_count_policy {
      SampleCountPolicy::Coerce => {
        tracing::warn!(requested = self.n, "coercing sample count to 1");
        Ok(1)
      }
      SampleCountPolicy::Strict => Err(WishartError::InvalidSampleCount(self.n)),
    }
  }

  fn factor<P: TriangularPrimitives>(
    &self,
    session: &mut Session,
    plan: &Plan<'_>,
    prims: &P,
  ) -> Result<DMatrix<f64>> {
    session.enter(SessionState::Factoring);
    prims
      .cholesky_upper(to_dmatrix(plan.scale))
      .ok_or_else(|| session.fail(WishartError::NotPositiveDefinite))
  }

  fn draw<R: Rng, P: TriangularPrimitives>(
    &self,
    session: &mut Session,
    upper: &DMatrix<f64>,
    stream: &SharedStream<R>,
    prims: &P,
    out: &mut [Array2<f64>],
  ) -> Result<()> {
    let p = upper.nrows();
    let invert = self.config.mode == FactorMode::InverseCholesky;
    tracing::debug!(
      p,
      df = self.df,
      count = out.len(),
      mode = ?self.config.mode,
      "sampling wishart factors"
    );

    let mut factor = BartlettFactor::<Upper>::new(self.df, p);
    let mut product = DMatrix::zeros(p, p);
    let mut work = DMatrix::zeros(p, p);

    let mut guard = stream.acquire();
    for (j, slot) in out.iter_mut().enumerate() {
      session.enter(SessionState::Sampling(j));
      let t = factor.resample(&mut guard);
      prims.trmm_right_upper(t, upper, &mut product);
      if invert && !prims.invert_upper(&mut product, &mut work) {
        drop(guard);
        return Err(session.fail(WishartError::SingularFactor { index: j }));
      }
      copy_upper_into(&product, slot);
    }
    drop(guard);

    session.enter(SessionState::Done);
    Ok(())
  }
}

/// `sample_count` factors (`inverse = false`) or inverse factors
/// (`inverse = true`) of `Wishart(df, scale)` draws from the process-wide
/// stream.
pub fn sample_wishart_factors(
  sample_count: i64,
  df: f64,
  scale: impl Into<ScaleMatrix>,
  inverse: bool,
) -> Result<Vec<Array2<f64>>> {
  let sampler = CholWishart::new(sample_count, df, scale);
  if inverse {
    sampler.inverse().sample()
  } else {
    sampler.sample()
  }
}

pub fn r_chol_wishart(n: i64, df: f64, scale: impl Into<ScaleMatrix>) -> Result<Vec<Array2<f64>>> {
  sample_wishart_factors(n, df, scale, false)
}

pub fn r_inv_chol_wishart(n: i64, df: f64, scale: impl Into<ScaleMatrix>) -> Result<Vec<Array2<f64>>> {
  sample_wishart_factors(n, df, scale, true)
}

/// Full `Wishart(df, scale)` draws.
pub fn r_wishart(n: i64, df: f64, scale: impl Into<ScaleMatrix>) -> Result<Vec<Array2<f64>>> {
  CholWishart::new(n, df, scale).sample_matrices_with(global_stream())
}

/// Inverses of `Wishart(df, scale)` draws, i.e. inverse-Wishart draws with
/// scale `scale⁻¹`.
pub fn r_inv_wishart(n: i64, df: f64, scale: impl Into<ScaleMatrix>) -> Result<Vec<Array2<f64>>> {
  CholWishart::new(n, df, scale)
    .inverse()
    .sample_matrices_with(global_stream())
}
