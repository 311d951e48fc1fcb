//! # Bartlett
//!
//! $$
//! T_{jj}=\sqrt{\chi^2_{\nu-j}},\qquad T_{ij}\sim\mathcal N(0,1)\ (i<j),\qquad T_{ji}=0
//! $$
//!
//! Standardized Bartlett factor of a Wishart draw with identity scale.
//!
//! The draw order is part of the contract: columns left to right, the
//! diagonal chi-squared first, then the normals of that column from the top
//! row down. A fixed stream state therefore always yields the same factor.
use std::marker::PhantomData;

use nalgebra::DMatrix;
use ndarray::Array2;

use crate::stream::VariateSource;

/// Which triangle a factor populates.
pub trait TriangleLayout {
  /// Storage position of the off-diagonal variate for column `j`, row `i < j`.
  fn entry(i: usize, j: usize) -> (usize, usize);
  /// Position that must hold zero for the same pair.
  fn mirror(i: usize, j: usize) -> (usize, usize);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Upper;

#[derive(Debug, Clone, Copy, Default)]
pub struct Lower;

impl TriangleLayout for Upper {
  fn entry(i: usize, j: usize) -> (usize, usize) {
    (i, j)
  }

  fn mirror(i: usize, j: usize) -> (usize, usize) {
    (j, i)
  }
}

impl TriangleLayout for Lower {
  fn entry(i: usize, j: usize) -> (usize, usize) {
    (j, i)
  }

  fn mirror(i: usize, j: usize) -> (usize, usize) {
    (i, j)
  }
}

/// Fills square `out` with a standardized factor for `nu` degrees of freedom.
///
/// The caller guarantees `1 <= p <= nu`; nothing is validated here.
pub fn fill_factor<L: TriangleLayout, S: VariateSource + ?Sized>(
  nu: f64,
  out: &mut DMatrix<f64>,
  source: &mut S,
) {
  let p = out.nrows();
  for j in 0..p {
    out[(j, j)] = source.chi_squared(nu - j as f64).sqrt();
    for i in 0..j {
      out[L::entry(i, j)] = source.standard_normal();
      out[L::mirror(i, j)] = 0.0;
    }
  }
}

/// Owned standardized factor of dimension `p`.
pub fn standard_factor<L: TriangleLayout, S: VariateSource + ?Sized>(
  nu: f64,
  p: usize,
  source: &mut S,
) -> Array2<f64> {
  let mut m = DMatrix::zeros(p, p);
  fill_factor::<L, S>(nu, &mut m, source);
  Array2::from_shape_fn((p, p), |(i, j)| m[(i, j)])
}

/// Reusable scratch buffer holding one factor at a time.
pub struct BartlettFactor<L: TriangleLayout = Upper> {
  nu: f64,
  buf: DMatrix<f64>,
  _layout: PhantomData<L>,
}

impl<L: TriangleLayout> BartlettFactor<L> {
  pub fn new(nu: f64, p: usize) -> Self {
    Self {
      nu,
      buf: DMatrix::zeros(p, p),
      _layout: PhantomData,
    }
  }

  /// Overwrites the buffer with a fresh factor and returns it.
  pub fn resample<S: VariateSource + ?Sized>(&mut self, source: &mut S) -> &DMatrix<f64> {
    fill_factor::<L, S>(self.nu, &mut self.buf, source);
    &self.buf
  }
}
