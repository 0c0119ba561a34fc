/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Matrix products.
//!
//! These are thin shape-checking wrappers around ndarray's gemm/gemv, which
//! see our buffers as Fortran-order views without copying.  The output is
//! always overwritten (`beta = 0`), never accumulated into.

use crate::{Matrix, Vector};
use crate::errors::{Result, check_shape, check_len};
use ::ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, ShapeBuilder};
use ::ndarray::linalg::{general_mat_mul, general_mat_vec_mul};

fn view(m: &Matrix) -> ArrayView2<'_, f64>
{
    ArrayView2::from_shape(m.dims().f(), m.column_major_data())
        .expect("(BUG) matrix data does not match its dims")
}

fn view_mut(m: &mut Matrix) -> ArrayViewMut2<'_, f64>
{
    let dims = m.dims();
    ArrayViewMut2::from_shape(dims.f(), m.column_major_data_mut())
        .expect("(BUG) matrix data does not match its dims")
}

fn gemm(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, c: &mut Matrix)
{
    // zero first so that no stale NaNs survive an empty inner dimension
    for x in c.column_major_data_mut() {
        *x = 0.0;
    }
    general_mat_mul(1.0, &a, &b, 0.0, &mut view_mut(c));
}

fn gemv(m: ArrayView2<'_, f64>, x: &Vector, y: &mut Vector)
{
    for v in y.as_mut_slice() {
        *v = 0.0;
    }
    let x = ArrayView1::from(x.as_slice());
    let mut y = ArrayViewMut1::from(y.as_mut_slice());
    general_mat_vec_mul(1.0, &m, &x, 0.0, &mut y);
}

/// `c = a * b`
pub fn matrix_matrix_mult(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()>
{
    let op = "matrix_matrix_mult";
    check_len(op, a.num_cols(), b.num_rows())?;
    check_shape(op, (a.num_rows(), b.num_cols()), c.dims())?;
    gemm(view(a), view(b), c);
    Ok(())
}

/// `c = a^T * b`
pub fn matrix_transpose_matrix_mult(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()>
{
    let op = "matrix_transpose_matrix_mult";
    check_len(op, a.num_rows(), b.num_rows())?;
    check_shape(op, (a.num_cols(), b.num_cols()), c.dims())?;
    gemm(view(a).reversed_axes(), view(b), c);
    Ok(())
}

/// `c = a * b^T`
pub fn matrix_matrix_transpose_mult(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()>
{
    let op = "matrix_matrix_transpose_mult";
    check_len(op, a.num_cols(), b.num_cols())?;
    check_shape(op, (a.num_rows(), b.num_rows()), c.dims())?;
    gemm(view(a), view(b).reversed_axes(), c);
    Ok(())
}

/// `y = m * x`
pub fn matrix_vector_mult(m: &Matrix, x: &Vector, y: &mut Vector) -> Result<()>
{
    let op = "matrix_vector_mult";
    check_len(op, m.num_cols(), x.len())?;
    check_len(op, m.num_rows(), y.len())?;
    gemv(view(m), x, y);
    Ok(())
}

/// `y = m^T * x`
pub fn matrix_transpose_vector_mult(m: &Matrix, x: &Vector, y: &mut Vector) -> Result<()>
{
    let op = "matrix_transpose_vector_mult";
    check_len(op, m.num_rows(), x.len())?;
    check_len(op, m.num_cols(), y.len())?;
    gemv(view(m).reversed_axes(), x, y);
    Ok(())
}

/// Allocating form of [`matrix_matrix_mult`].
pub fn dot(a: &Matrix, b: &Matrix) -> Result<Matrix>
{
    let mut c = Matrix::zeros((a.num_rows(), b.num_cols()));
    matrix_matrix_mult(a, b, &mut c)?;
    Ok(c)
}

/// Allocating form of [`matrix_transpose_matrix_mult`].
pub fn t_dot(a: &Matrix, b: &Matrix) -> Result<Matrix>
{
    let mut c = Matrix::zeros((a.num_cols(), b.num_cols()));
    matrix_transpose_matrix_mult(a, b, &mut c)?;
    Ok(c)
}
