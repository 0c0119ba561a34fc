/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Small utilities built out of the other kernels.

use crate::Matrix;
use crate::blas::{self, matrix_matrix_mult};
use crate::errors::{Result, check_shape, check_len};

/// `100 * ||A - B||_F / ||A||_F`
///
/// Infinite (or NaN) when `A` is zero.
pub fn percent_error_between(a: &Matrix, b: &Matrix) -> Result<f64>
{
    check_shape("percent_error_between", a.dims(), b.dims())?;
    let mut diff = a.clone();
    diff.sub_assign(b)?;
    Ok(100.0 * diff.frobenius_norm() / a.frobenius_norm())
}

/// `P = U * S * Vt`, the product of a (possibly truncated) SVD.
///
/// `u` is `m x k`, `s` is `k x k`, `vt` is `k x n` and `p` must be `m x n`.
/// `s` need not actually be diagonal.
pub fn form_svd_product(u: &Matrix, s: &Matrix, vt: &Matrix, p: &mut Matrix) -> Result<()>
{
    let op = "form_svd_product";
    let k = u.num_cols();
    check_shape(op, (k, k), s.dims())?;
    check_len(op, k, vt.num_rows())?;
    check_shape(op, (u.num_rows(), vt.num_cols()), p.dims())?;

    let mut us = Matrix::zeros(u.dims());
    matrix_matrix_mult(u, s, &mut us)?;
    matrix_matrix_mult(&us, vt, p)
}

/// `max |Q^T Q - I|`, over all entries.
pub fn orthogonality_error(q: &Matrix) -> Result<f64>
{
    let mut gram = blas::t_dot(q, q)?;
    gram.sub_assign(&Matrix::identity(q.num_cols()))?;
    Ok(gram.max_abs_element())
}

/// `||A - Q (Q^T A)||_F / ||A||_F`
///
/// Zero iff every column of `a` lies in the column space of `q` (assuming `q`
/// has orthonormal columns).  For a zero `a` this is the absolute residual,
/// which is zero.
pub fn reconstruction_residual(a: &Matrix, q: &Matrix) -> Result<f64>
{
    check_len("reconstruction_residual", a.num_rows(), q.num_rows())?;
    let coeffs = blas::t_dot(q, a)?;
    let approx = blas::dot(q, &coeffs)?;

    let mut diff = a.clone();
    diff.sub_assign(&approx)?;
    let a_norm = a.frobenius_norm();
    Ok(match a_norm {
        norm if norm == 0.0 => diff.frobenius_norm(),
        norm => diff.frobenius_norm() / norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Vector};
    use crate::lapack::svd;

    #[test]
    fn percent_error() {
        let a = Matrix::from_column_major_data((2, 1), vec![3.0, 4.0]);
        let b = Matrix::from_column_major_data((2, 1), vec![3.0, 4.5]);
        assert_close!(abs=1e-12, percent_error_between(&a, &b).unwrap(), 10.0);
        assert_eq!(percent_error_between(&a, &a).unwrap(), 0.0);

        match percent_error_between(&a, &Matrix::zeros((1, 2))) {
            Err(Error::ShapeMismatch { .. }) => {},
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn svd_product_reconstructs() {
        let a = Matrix::from_row_major_data((3, 2), &[
            2.0, 0.0,
            1.0, 3.0,
            -1.0, 4.0,
        ]);
        let out = svd(&a).unwrap();
        let mut p = Matrix::zeros((3, 2));
        form_svd_product(&out.u, &out.s, &out.vt, &mut p).unwrap();
        assert!(percent_error_between(&a, &p).unwrap() < 1e-10);
    }

    #[test]
    fn truncated_svd_product() {
        // rank 1: keeping only the top singular triplet is exact
        let a = Matrix::from_fn((4, 3), |i, j| ((i + 1) * (j + 2)) as f64);
        let out = svd(&a).unwrap();

        let mut u1 = Matrix::zeros((4, 1));
        let mut s1 = Matrix::zeros((1, 1));
        let mut vt1 = Matrix::zeros((1, 3));
        out.u.copy_first_columns(&mut u1).unwrap();
        out.s.copy_leading_block(&mut s1).unwrap();
        out.vt.copy_first_rows(&mut vt1).unwrap();

        let mut p = Matrix::zeros((4, 3));
        form_svd_product(&u1, &s1, &vt1, &mut p).unwrap();
        assert!(percent_error_between(&a, &p).unwrap() < 1e-10);
    }

    #[test]
    fn svd_product_shapes() {
        let u = Matrix::zeros((4, 2));
        let vt = Matrix::zeros((2, 3));
        assert!(form_svd_product(&u, &Matrix::zeros((3, 3)), &vt, &mut Matrix::zeros((4, 3))).is_err());
        assert!(form_svd_product(&u, &Matrix::zeros((2, 2)), &vt, &mut Matrix::zeros((3, 4))).is_err());
        assert!(form_svd_product(&u, &Matrix::zeros((2, 2)), &Matrix::zeros((3, 3)), &mut Matrix::zeros((4, 3))).is_err());
    }

    #[test]
    fn diagnostics() {
        let q = Matrix::identity(3);
        assert_eq!(orthogonality_error(&q).unwrap(), 0.0);

        let mut skewed = Matrix::identity(2);
        skewed.set(0, 1, 0.1);
        assert_close!(abs=1e-15, orthogonality_error(&skewed).unwrap(), 0.1);

        // a vector in the span of e1, e2 versus one that is not
        let mut q = Matrix::zeros((3, 2));
        q.set_diagonal(&Vector::from_vec(vec![1.0, 1.0])).unwrap();
        let inside = Matrix::from_column_major_data((3, 1), vec![2.0, -1.0, 0.0]);
        let outside = Matrix::from_column_major_data((3, 1), vec![0.0, 3.0, 4.0]);
        assert_eq!(reconstruction_residual(&inside, &q).unwrap(), 0.0);
        assert_close!(abs=1e-15, reconstruction_residual(&outside, &q).unwrap(), 0.8);

        assert!(reconstruction_residual(&inside, &Matrix::zeros((2, 2))).is_err());
    }
}
