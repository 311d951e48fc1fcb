//! # Scale
//!
//! $$
//! \Sigma\in\mathbb R^{p\times p},\quad \Sigma=\Sigma^\top\succ 0
//! $$
//!
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::Result;
use crate::error::WishartError;

/// Scale matrix as handed over by a caller. Only real input can be sampled;
/// complex input is carried so it can be rejected with a proper error.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleMatrix {
  Real(Array2<f64>),
  Complex(Array2<Complex64>),
}

impl ScaleMatrix {
  pub fn shape(&self) -> (usize, usize) {
    match self {
      ScaleMatrix::Real(a) => a.dim(),
      ScaleMatrix::Complex(a) => a.dim(),
    }
  }

  /// The real, square, finite, non-empty matrix, or `InvalidShape`.
  pub fn as_real_square(&self) -> Result<&Array2<f64>> {
    let a = match self {
      ScaleMatrix::Real(a) => a,
      ScaleMatrix::Complex(_) => {
        return Err(WishartError::InvalidShape("complex entries".into()));
      }
    };
    let (rows, cols) = a.dim();
    if rows != cols {
      return Err(WishartError::InvalidShape(format!("{rows}x{cols}")));
    }
    if rows == 0 {
      return Err(WishartError::InvalidShape("empty matrix".into()));
    }
    if let Some(v) = a.iter().find(|v| !v.is_finite()) {
      return Err(WishartError::InvalidShape(format!("non-finite entry {v}")));
    }
    Ok(a)
  }
}

impl From<Array2<f64>> for ScaleMatrix {
  fn from(a: Array2<f64>) -> Self {
    ScaleMatrix::Real(a)
  }
}

impl From<&Array2<f64>> for ScaleMatrix {
  fn from(a: &Array2<f64>) -> Self {
    ScaleMatrix::Real(a.clone())
  }
}

impl From<Array2<Complex64>> for ScaleMatrix {
  fn from(a: Array2<Complex64>) -> Self {
    ScaleMatrix::Complex(a)
  }
}

impl From<DMatrix<f64>> for ScaleMatrix {
  fn from(m: DMatrix<f64>) -> Self {
    ScaleMatrix::Real(Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)]))
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use ndarray::Array2;
  use num_complex::Complex64;

  use super::ScaleMatrix;
  use crate::error::WishartError;

  #[test]
  fn accepts_square_real_input() {
    let s = ScaleMatrix::from(array![[2.0, 0.5], [0.5, 1.0]]);
    assert_eq!(s.as_real_square().unwrap().dim(), (2, 2));
  }

  #[test]
  fn rejects_bad_shapes() {
    let cases: Vec<ScaleMatrix> = vec![
      Array2::<f64>::zeros((2, 3)).into(),
      Array2::<f64>::zeros((0, 0)).into(),
      array![[1.0, f64::NAN], [0.0, 1.0]].into(),
      Array2::<Complex64>::zeros((2, 2)).into(),
    ];
    for s in cases {
      assert!(
        matches!(s.as_real_square(), Err(WishartError::InvalidShape(_))),
        "{s:?} should be rejected"
      );
    }
  }

  #[test]
  fn nalgebra_input_keeps_its_layout() {
    let m = nalgebra::DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let s = ScaleMatrix::from(m);
    assert_eq!(s, ScaleMatrix::Real(array![[1.0, 2.0], [3.0, 4.0]]));
  }
}
