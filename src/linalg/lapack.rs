/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Factorizations: compact QR, economy SVD, symmetric eigendecomposition.
//!
//! The numerical work is done by an external backend; this module only adapts
//! shapes and pins down the ordering/sign conventions that callers rely on.
//! By default the backend is nalgebra.  With the `lapacke-backend` feature the
//! same contracts are fulfilled by LAPACKe (`dgeqrf`/`dorgqr`, `dgesvd`, `dsyev`).

use crate::{Matrix, Vector};
use crate::errors::{Result, check_shape, check_len};

#[cfg(not(feature = "lapacke-backend"))]
use self::native as backend;
#[cfg(feature = "lapacke-backend")]
use self::lapacke_impl as backend;

/// Output of [`qr`].
#[derive(Debug, Clone)]
pub struct Qr {
    /// `m x k`, orthonormal columns.
    pub q: Matrix,
    /// `k x k`, upper triangular.
    pub r: Matrix,
}

/// Output of [`svd`].  `m = u * s * vt`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// `m x k`
    pub u: Matrix,
    /// `k x k` diagonal, non-negative and descending.
    pub s: Matrix,
    /// `k x n`
    pub vt: Matrix,
}

impl Svd {
    pub fn singular_values(&self) -> Vector
    { Vector::from_vec((0..self.s.num_rows()).map(|i| self.s.get(i, i)).collect()) }
}

/// `[Q, R] = qr(M, 0)` into pre-sized outputs.
///
/// For an `m x n` input with `k = min(m, n)`, `q` must be `m x k` and `r` must be
/// `k x k`.  When `m >= n` (the usual case) that is exactly `M = Q R`.  When
/// `m < n`, `r` holds only the leading `k x k` block of the triangular factor.
pub fn compact_qr(m: &Matrix, q: &mut Matrix, r: &mut Matrix) -> Result<()>
{
    let (rows, cols) = m.dims();
    let k = usize::min(rows, cols);
    check_shape("compact_qr", (rows, k), q.dims())?;
    check_shape("compact_qr", (k, k), r.dims())?;

    trace!("doing QR with m = {}, n = {}, k = {}", rows, cols, k);
    if k == 0 {
        return Ok(());
    }

    let (q_full, r_full) = backend::qr(m)?;
    q.copy_from(&q_full)?;
    for j in 0..k {
        for i in 0..k {
            r.set(i, j, if j >= i { r_full.get(i, j) } else { 0.0 });
        }
    }
    Ok(())
}

pub fn qr(m: &Matrix) -> Result<Qr>
{
    let k = usize::min(m.num_rows(), m.num_cols());
    let mut q = Matrix::zeros((m.num_rows(), k));
    let mut r = Matrix::zeros((k, k));
    compact_qr(m, &mut q, &mut r)?;
    Ok(Qr { q, r })
}

/// Just the `m x min(m, n)` orthonormal factor of a compact QR.
pub fn qr_q_factor(m: &Matrix, q: &mut Matrix) -> Result<()>
{
    let k = usize::min(m.num_rows(), m.num_cols());
    check_shape("qr_q_factor", (m.num_rows(), k), q.dims())?;
    if k == 0 {
        return Ok(());
    }
    let (q_full, _) = backend::qr(m)?;
    q.copy_from(&q_full)
}

/// Economy SVD `M = U S V^T` into pre-sized outputs.
///
/// With `k = min(m, n)`: `u` is `m x k`, `s` is `k x k`, `vt` is `k x n`.
/// Singular values come out non-negative and in descending order.
/// `s` is overwritten entirely (zero off the diagonal).
pub fn singular_value_decomposition(m: &Matrix, u: &mut Matrix, s: &mut Matrix, vt: &mut Matrix) -> Result<()>
{
    let (rows, cols) = m.dims();
    let k = usize::min(rows, cols);
    let op = "singular_value_decomposition";
    check_shape(op, (rows, k), u.dims())?;
    check_shape(op, (k, k), s.dims())?;
    check_shape(op, (k, cols), vt.dims())?;
    if k == 0 {
        return Ok(());
    }

    let (u_raw, svals, vt_raw) = backend::svd(m)?;

    // descending, with a stable sort so that ties keep the backend's order
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| svals[b].partial_cmp(&svals[a]).unwrap_or(::std::cmp::Ordering::Equal));

    for x in s.column_major_data_mut() {
        *x = 0.0;
    }
    for (dest, &src) in order.iter().enumerate() {
        s.set(dest, dest, svals[src].abs());
        u.col_slice_mut(dest).copy_from_slice(u_raw.col_slice(src));
        for j in 0..cols {
            vt.set(dest, j, vt_raw.get(src, j));
        }
    }
    Ok(())
}

pub fn svd(m: &Matrix) -> Result<Svd>
{
    let (rows, cols) = m.dims();
    let k = usize::min(rows, cols);
    let mut u = Matrix::zeros((rows, k));
    let mut s = Matrix::zeros((k, k));
    let mut vt = Matrix::zeros((k, cols));
    singular_value_decomposition(m, &mut u, &mut s, &mut vt)?;
    Ok(Svd { u, s, vt })
}

/// Eigendecomposition of a symmetric matrix, in place.
///
/// Only the upper triangle of `s` is read.  On return, the columns of `s` are
/// the orthonormal eigenvectors and `evals` holds the eigenvalues in ascending
/// order (matching `dsyev`).
pub fn symmetric_eigen(s: &mut Matrix, evals: &mut Vector) -> Result<()>
{
    let n = s.num_rows();
    check_shape("symmetric_eigen", (n, n), s.dims())?;
    check_len("symmetric_eigen", n, evals.len())?;
    if n == 0 {
        return Ok(());
    }

    // mirror the upper triangle so every backend sees the same matrix
    let sym = Matrix::from_fn((n, n), |i, j| match j >= i {
        true => s.get(i, j),
        false => s.get(j, i),
    });
    let (vals, vecs) = backend::eigh(&sym)?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| vals[a].partial_cmp(&vals[b]).unwrap_or(::std::cmp::Ordering::Equal));
    for (dest, &src) in order.iter().enumerate() {
        evals.set(dest, vals[src]);
        s.col_slice_mut(dest).copy_from_slice(vecs.col_slice(src));
    }
    Ok(())
}

// Backend contract (inputs are never empty):
//  - qr(m)   -> (Q: m x k, R: k x n)
//  - svd(m)  -> (U: m x k, singular values (any order), Vt: k x n)
//  - eigh(m) -> (eigenvalues (any order), eigenvectors as columns)

mod native {
    use crate::Matrix;
    use crate::errors::{Error, Result};
    use ::nalgebra::{DMatrix, SymmetricEigen, SVD};

    fn to_nalgebra(m: &Matrix) -> DMatrix<f64>
    { DMatrix::from_column_slice(m.num_rows(), m.num_cols(), m.column_major_data()) }

    fn from_nalgebra(m: &DMatrix<f64>) -> Matrix
    { Matrix::from_column_major_data((m.nrows(), m.ncols()), m.as_slice().to_vec()) }

    #[allow(dead_code)]
    pub(super) fn qr(m: &Matrix) -> Result<(Matrix, Matrix)>
    {
        let qr = to_nalgebra(m).qr();
        Ok((from_nalgebra(&qr.q()), from_nalgebra(&qr.r())))
    }

    #[allow(dead_code)]
    pub(super) fn svd(m: &Matrix) -> Result<(Matrix, Vec<f64>, Matrix)>
    {
        let svd = SVD::try_new(to_nalgebra(m), true, true, ::std::f64::EPSILON, 0)
            .ok_or_else(|| Error::backend("svd", "iteration did not converge"))?;
        match (svd.u.as_ref(), svd.v_t.as_ref()) {
            (Some(u), Some(vt)) => Ok((
                from_nalgebra(u),
                svd.singular_values.as_slice().to_vec(),
                from_nalgebra(vt),
            )),
            _ => Err(Error::backend("svd", "singular vectors were not computed")),
        }
    }

    #[allow(dead_code)]
    pub(super) fn eigh(m: &Matrix) -> Result<(Vec<f64>, Matrix)>
    {
        let eig = SymmetricEigen::try_new(to_nalgebra(m), ::std::f64::EPSILON, 0)
            .ok_or_else(|| Error::backend("symmetric_eigen", "iteration did not converge"))?;
        Ok((eig.eigenvalues.as_slice().to_vec(), from_nalgebra(&eig.eigenvectors)))
    }
}

#[cfg(feature = "lapacke-backend")]
mod lapacke_impl {
    extern crate lapack_src;

    use crate::Matrix;
    use crate::errors::{Error, Result};
    use ::lapacke::Layout;

    fn check_info(routine: &'static str, info: i32) -> Result<()>
    {
        match info {
            0 => Ok(()),
            info if info < 0 => panic!("bad arg number {} to {}", -info, routine),
            info => Err(Error::backend(routine, format!("info = {}", info))),
        }
    }

    pub(super) fn qr(m: &Matrix) -> Result<(Matrix, Matrix)>
    {
        let (rows, cols) = m.dims();
        let k = usize::min(rows, cols);
        let mut a = m.clone();
        let mut tau = vec![0f64; k];

        let info = unsafe {
            ::lapacke::dgeqrf(
                Layout::ColumnMajor, rows as i32, cols as i32,
                a.column_major_data_mut(), rows as i32, &mut tau,
            )
        };
        check_info("dgeqrf", info)?;

        let r = Matrix::from_fn((k, cols), |i, j| if j >= i { a.get(i, j) } else { 0.0 });

        // the reflectors for Q live in the first k columns
        let mut q = Matrix::zeros((rows, k));
        a.copy_first_columns(&mut q)?;
        let info = unsafe {
            ::lapacke::dorgqr(
                Layout::ColumnMajor, rows as i32, k as i32, k as i32,
                q.column_major_data_mut(), rows as i32, &tau,
            )
        };
        check_info("dorgqr", info)?;
        Ok((q, r))
    }

    pub(super) fn svd(m: &Matrix) -> Result<(Matrix, Vec<f64>, Matrix)>
    {
        let (rows, cols) = m.dims();
        let k = usize::min(rows, cols);
        let mut a = m.clone();
        let mut s = vec![0f64; k];
        let mut u = Matrix::zeros((rows, k));
        let mut vt = Matrix::zeros((k, cols));
        let mut superb = vec![0f64; usize::max(k, 2) - 1];

        let info = unsafe {
            ::lapacke::dgesvd(
                Layout::ColumnMajor, b'S', b'S', rows as i32, cols as i32,
                a.column_major_data_mut(), rows as i32,
                &mut s,
                u.column_major_data_mut(), rows as i32,
                vt.column_major_data_mut(), k as i32,
                &mut superb,
            )
        };
        check_info("dgesvd", info)?;
        Ok((u, s, vt))
    }

    pub(super) fn eigh(m: &Matrix) -> Result<(Vec<f64>, Matrix)>
    {
        let n = m.num_rows();
        let mut a = m.clone();
        let mut w = vec![0f64; n];
        let info = unsafe {
            ::lapacke::dsyev(
                Layout::ColumnMajor, b'V', b'U', n as i32,
                a.column_major_data_mut(), n as i32, &mut w,
            )
        };
        check_info("dsyev", info)?;
        Ok((w, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blas;
    use crate::Error;

    fn assert_identity(m: &Matrix, tol: f64) {
        let eye = Matrix::identity(m.num_rows());
        assert_close!(abs=tol, m.column_major_data(), eye.column_major_data());
    }

    fn sample_tall() -> Matrix {
        Matrix::from_row_major_data((4, 3), &[
            2.0, -1.0, 0.5,
            1.0, 3.0, -2.0,
            0.0, 1.0, 4.0,
            -1.5, 2.0, 1.0,
        ])
    }

    #[test]
    fn qr_reconstructs() {
        let m = sample_tall();
        let Qr { q, r } = qr(&m).unwrap();
        assert_eq!(q.dims(), (4, 3));
        assert_eq!(r.dims(), (3, 3));

        for j in 0..3 {
            for i in j + 1..3 {
                assert_eq!(r.get(i, j), 0.0);
            }
        }
        assert_identity(&blas::t_dot(&q, &q).unwrap(), 1e-12);

        let qr = blas::dot(&q, &r).unwrap();
        assert_close!(abs=1e-12, &qr, &m);

        let mut q_only = Matrix::zeros((4, 3));
        qr_q_factor(&m, &mut q_only).unwrap();
        assert_close!(abs=1e-12, q_only.column_major_data(), q.column_major_data());
    }

    #[test]
    fn qr_shape_errors() {
        let m = sample_tall();
        match compact_qr(&m, &mut Matrix::zeros((4, 4)), &mut Matrix::zeros((3, 3))) {
            Err(Error::ShapeMismatch { expected: (4, 3), found: (4, 4), .. }) => {},
            r => panic!("{:?}", r),
        }
        assert!(compact_qr(&m, &mut Matrix::zeros((4, 3)), &mut Matrix::zeros((3, 4))).is_err());
    }

    #[test]
    fn qr_of_wide_matrix() {
        let m = sample_tall().to_transpose(); // 3x4
        let Qr { q, r } = qr(&m).unwrap();
        assert_eq!(q.dims(), (3, 3));
        assert_eq!(r.dims(), (3, 3));
        assert_identity(&blas::t_dot(&q, &q).unwrap(), 1e-12);

        // Q R reproduces the leading columns
        let mut lead = Matrix::zeros((3, 3));
        m.copy_first_columns(&mut lead).unwrap();
        let qr = blas::dot(&q, &r).unwrap();
        assert_close!(abs=1e-12, qr.column_major_data(), lead.column_major_data());
    }

    #[test]
    fn svd_conventions() {
        for m in vec![sample_tall(), sample_tall().to_transpose()] {
            let out = svd(&m).unwrap();
            let svals = out.singular_values();
            let Svd { u, s, vt } = out;
            let k = 3;
            assert_eq!(u.dims(), (m.num_rows(), k));
            assert_eq!(s.dims(), (k, k));
            assert_eq!(vt.dims(), (k, m.num_cols()));

            for w in svals.as_slice().windows(2) {
                assert!(w[0] >= w[1], "{:?}", svals);
            }
            assert!(svals.as_slice().iter().all(|&x| x >= 0.0));
            assert_eq!(s.get(0, 1), 0.0);

            assert_identity(&blas::t_dot(&u, &u).unwrap(), 1e-12);
            let us = blas::dot(&u, &s).unwrap();
            let usvt = blas::dot(&us, &vt).unwrap();
            assert_close!(abs=1e-11, usvt.column_major_data(), m.column_major_data());
        }
    }

    #[test]
    fn svd_of_diagonal_sorts_descending() {
        let m = Matrix::from_diagonal(&Vector::from_vec(vec![1.0, -5.0, 3.0]));
        let out = svd(&m).unwrap();
        let svals = out.singular_values();
        assert_close!(abs=1e-12, svals.as_slice(), &[5.0, 3.0, 1.0][..]);
    }

    #[test]
    fn symmetric_eigen_in_place() {
        let a = Matrix::from_row_major_data((3, 3), &[
            2.0, 1.0, 0.0,
            1.0, 2.0, 0.0,
            0.0, 0.0, 5.0,
        ]);
        // garbage in the lower triangle must be ignored
        let mut s = a.clone();
        s.set(1, 0, 1000.0);
        s.set(2, 0, -1000.0);

        let mut evals = Vector::zeros(3);
        symmetric_eigen(&mut s, &mut evals).unwrap();
        assert_close!(abs=1e-12, evals.as_slice(), &[1.0, 3.0, 5.0][..]);
        assert_identity(&blas::t_dot(&s, &s).unwrap(), 1e-12);

        // A v = lambda v
        let av = blas::dot(&a, &s).unwrap();
        for j in 0..3 {
            for i in 0..3 {
                assert_close!(abs=1e-12, av.get(i, j), evals.get(j) * s.get(i, j));
            }
        }

        assert!(symmetric_eigen(&mut Matrix::zeros((2, 3)), &mut Vector::zeros(2)).is_err());
        assert!(symmetric_eigen(&mut Matrix::zeros((2, 2)), &mut Vector::zeros(3)).is_err());
    }

    #[test]
    fn empty_inputs() {
        let out = svd(&Matrix::zeros((0, 3))).unwrap();
        assert_eq!(out.u.dims(), (0, 0));
        assert_eq!(out.vt.dims(), (0, 3));
        let out = qr(&Matrix::zeros((3, 0))).unwrap();
        assert_eq!(out.q.dims(), (3, 0));
    }
}
