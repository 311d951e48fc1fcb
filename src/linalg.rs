//! # Linalg
//!
//! $$
//! \Sigma = U^\top U,\qquad T' = T\,U,\qquad T' \mapsto T'^{-1}
//! $$
//!
//! Dense triangular primitives used by the sampler. Every primitive works on
//! buffers the caller owns, so inputs that must stay intact are copied first.
use nalgebra::Cholesky;
use nalgebra::DMatrix;
use ndarray::Array2;

/// Factorization, product and inversion routines consumed by the sampler.
pub trait TriangularPrimitives {
  /// Upper factor `U` with `UᵀU = a`, reading only the upper triangle of
  /// `a`. `None` when `a` is not positive-definite.
  fn cholesky_upper(&self, a: DMatrix<f64>) -> Option<DMatrix<f64>>;

  /// `out = t · u` for upper-triangular `t` and `u`.
  fn trmm_right_upper(&self, t: &DMatrix<f64>, u: &DMatrix<f64>, out: &mut DMatrix<f64>);

  /// Replaces upper-triangular `a` by its inverse, using `work` as scratch.
  /// Returns `false` when `a` is singular.
  fn invert_upper(&self, a: &mut DMatrix<f64>, work: &mut DMatrix<f64>) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraPrimitives;

impl TriangularPrimitives for NalgebraPrimitives {
  fn cholesky_upper(&self, a: DMatrix<f64>) -> Option<DMatrix<f64>> {
    let p = a.nrows();
    // nalgebra reads the lower triangle, so mirror the upper one into it.
    let sym = DMatrix::from_fn(p, p, |i, j| if i <= j { a[(i, j)] } else { a[(j, i)] });
    let chol = Cholesky::new(sym)?;
    Some(chol.l().transpose())
  }

  fn trmm_right_upper(&self, t: &DMatrix<f64>, u: &DMatrix<f64>, out: &mut DMatrix<f64>) {
    t.mul_to(u, out);
  }

  fn invert_upper(&self, a: &mut DMatrix<f64>, work: &mut DMatrix<f64>) -> bool {
    work.fill_with_identity();
    if !a.solve_upper_triangular_mut(work) || work.iter().any(|v| !v.is_finite()) {
      return false;
    }
    a.copy_from(work);
    true
  }
}

pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
  DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copies an upper-triangular `m` into `out`, writing exact zeros below the
/// diagonal.
pub fn copy_upper_into(m: &DMatrix<f64>, out: &mut Array2<f64>) {
  for ((i, j), v) in out.indexed_iter_mut() {
    *v = if i > j { 0.0 } else { m[(i, j)] };
  }
}

/// `UᵀU` for an upper-triangular factor `U`.
pub fn crossprod(u: &Array2<f64>) -> Array2<f64> {
  u.t().dot(u)
}

/// `VVᵀ` for an upper-triangular `V`.
pub fn tcrossprod(v: &Array2<f64>) -> Array2<f64> {
  v.dot(&v.t())
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use nalgebra::DMatrix;
  use ndarray::array;
  use ndarray::Array2;

  use super::*;

  #[test]
  fn cholesky_upper_reconstructs_the_scale() {
    let a = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
    let u = NalgebraPrimitives.cholesky_upper(a.clone()).unwrap();
    assert_relative_eq!(u[(0, 0)], 2.0, epsilon = 1e-12);
    assert_relative_eq!(u[(0, 1)], 1.0, epsilon = 1e-12);
    assert_relative_eq!(u[(1, 1)], 2f64.sqrt(), epsilon = 1e-12);
    assert_eq!(u[(1, 0)], 0.0);
    assert_relative_eq!(u.transpose() * &u, a, epsilon = 1e-12);
  }

  #[test]
  fn cholesky_ignores_the_lower_triangle() {
    let a = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, -100.0, 3.0]);
    let u = NalgebraPrimitives.cholesky_upper(a).unwrap();
    assert_relative_eq!(u[(0, 1)], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn cholesky_rejects_indefinite_input() {
    let neg = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
    let zero = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 1.0]);
    assert!(NalgebraPrimitives.cholesky_upper(neg).is_none());
    assert!(NalgebraPrimitives.cholesky_upper(zero).is_none());
  }

  #[test]
  fn triangular_product_matches_dense_product() {
    let t = DMatrix::from_row_slice(3, 3, &[1.5, -0.3, 0.7, 0.0, 2.0, 0.1, 0.0, 0.0, 0.9]);
    let u = DMatrix::from_row_slice(3, 3, &[2.0, 0.5, -1.0, 0.0, 1.0, 0.25, 0.0, 0.0, 3.0]);
    let mut out = DMatrix::zeros(3, 3);
    NalgebraPrimitives.trmm_right_upper(&t, &u, &mut out);
    assert_relative_eq!(out, &t * &u, epsilon = 1e-14);
    for j in 0..3 {
      for i in (j + 1)..3 {
        assert_eq!(out[(i, j)], 0.0);
      }
    }
  }

  #[test]
  fn inversion_of_upper_triangle() {
    let a = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, -1.0, 0.0, 4.0, 0.5, 0.0, 0.0, 0.5]);
    let mut inv = a.clone();
    let mut work = DMatrix::zeros(3, 3);
    assert!(NalgebraPrimitives.invert_upper(&mut inv, &mut work));
    assert_relative_eq!(&a * &inv, DMatrix::identity(3, 3), epsilon = 1e-12);
  }

  #[test]
  fn inversion_reports_singularity() {
    let mut a = DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 0.0, 0.0]);
    let mut work = DMatrix::zeros(2, 2);
    assert!(!NalgebraPrimitives.invert_upper(&mut a, &mut work));
  }

  #[test]
  fn copy_out_zeroes_the_lower_triangle() {
    let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 7.0, 3.0]);
    let mut out = Array2::from_elem((2, 2), f64::NAN);
    copy_upper_into(&m, &mut out);
    assert_eq!(out, array![[1.0, 2.0], [0.0, 3.0]]);
  }

  #[test]
  fn cross_products() {
    let u = array![[2.0, 1.0], [0.0, 3.0]];
    assert_eq!(crossprod(&u), array![[4.0, 2.0], [2.0, 10.0]]);
    assert_eq!(tcrossprod(&u), array![[5.0, 3.0], [3.0, 9.0]]);
  }
}
