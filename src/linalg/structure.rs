/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Row/column traffic, sub-block copies and concatenation.
//!
//! Every operation writes into a destination that the caller has already
//! sized; a wrongly sized destination is an error, never a partial write.

use crate::{Matrix, Vector};
use crate::errors::{Error, Result, check_shape, check_len};

impl Matrix {
    /// Copy row `i` into `out`, which must have length `num_cols()`.
    pub fn get_row(&self, i: usize, out: &mut Vector) -> Result<()>
    {
        check_index("Matrix::get_row", i, self.num_rows())?;
        check_len("Matrix::get_row", self.num_cols(), out.len())?;
        for (j, dest) in out.as_mut_slice().iter_mut().enumerate() {
            *dest = self.get(i, j);
        }
        Ok(())
    }

    /// Copy column `j` into `out`, which must have length `num_rows()`.
    pub fn get_col(&self, j: usize, out: &mut Vector) -> Result<()>
    {
        check_index("Matrix::get_col", j, self.num_cols())?;
        check_len("Matrix::get_col", self.num_rows(), out.len())?;
        out.as_mut_slice().copy_from_slice(self.col_slice(j));
        Ok(())
    }

    pub fn set_row(&mut self, i: usize, row: &Vector) -> Result<()>
    {
        check_index("Matrix::set_row", i, self.num_rows())?;
        check_len("Matrix::set_row", self.num_cols(), row.len())?;
        for (j, &x) in row.as_slice().iter().enumerate() {
            self.set(i, j, x);
        }
        Ok(())
    }

    pub fn set_col(&mut self, j: usize, col: &Vector) -> Result<()>
    {
        check_index("Matrix::set_col", j, self.num_cols())?;
        check_len("Matrix::set_col", self.num_rows(), col.len())?;
        self.col_slice_mut(j).copy_from_slice(col.as_slice());
        Ok(())
    }

    /// `out = self^T`.  `out` must be `num_cols() x num_rows()`.
    pub fn transpose_into(&self, out: &mut Matrix) -> Result<()>
    {
        check_shape("Matrix::transpose_into", (self.num_cols(), self.num_rows()), out.dims())?;
        for j in 0..self.num_cols() {
            for i in 0..self.num_rows() {
                out.set(j, i, self.get(i, j));
            }
        }
        Ok(())
    }

    pub fn to_transpose(&self) -> Matrix
    {
        let mut out = Matrix::zeros((self.num_cols(), self.num_rows()));
        self.transpose_into(&mut out).expect("(BUG) transpose shape");
        out
    }
}

/// Sub-block extraction.
///
/// Naming follows the slice being taken, written MATLAB style in each doc
/// comment (1-based, inclusive).
impl Matrix {
    /// `out = M(1:k, :)` where `k = out.num_rows()`.
    pub fn copy_first_rows(&self, out: &mut Matrix) -> Result<()>
    {
        let k = out.num_rows();
        check_block("Matrix::copy_first_rows", k, self.num_rows())?;
        check_shape("Matrix::copy_first_rows", (k, self.num_cols()), out.dims())?;
        self.copy_block_into(out, (0, 0));
        Ok(())
    }

    /// `out = M(:, 1:k)` where `k = out.num_cols()`.
    pub fn copy_first_columns(&self, out: &mut Matrix) -> Result<()>
    {
        let k = out.num_cols();
        check_block("Matrix::copy_first_columns", k, self.num_cols())?;
        check_shape("Matrix::copy_first_columns", (self.num_rows(), k), out.dims())?;
        let len = self.num_rows() * k;
        out.column_major_data_mut().copy_from_slice(&self.column_major_data()[..len]);
        Ok(())
    }

    /// `out(:, 1:k) = M(:, 1:k)`, leaving the rest of `out` untouched.
    ///
    /// Unlike `copy_first_columns`, `out` may be wider than `k`.
    pub fn copy_first_columns_with_count(&self, out: &mut Matrix, k: usize) -> Result<()>
    {
        let op = "Matrix::copy_first_columns_with_count";
        check_block(op, k, self.num_cols())?;
        check_block(op, k, out.num_cols())?;
        check_len(op, self.num_rows(), out.num_rows())?;
        let len = self.num_rows() * k;
        out.column_major_data_mut()[..len].copy_from_slice(&self.column_major_data()[..len]);
        Ok(())
    }

    /// `out = M(1:k, 1:k)` where `out` is `k x k`.
    pub fn copy_leading_block(&self, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_leading_block";
        if !out.is_square() {
            return Err(Error::ShapeMismatch { op, expected: (out.num_cols(), out.num_cols()), found: out.dims() });
        }
        let k = out.num_rows();
        check_block(op, k, self.num_rows())?;
        check_block(op, k, self.num_cols())?;
        self.copy_block_into(out, (0, 0));
        Ok(())
    }

    /// `out = M(:, k+1:end)`.
    pub fn copy_columns_from(&self, k: usize, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_columns_from";
        check_block(op, k, self.num_cols())?;
        check_shape(op, (self.num_rows(), self.num_cols() - k), out.dims())?;
        let start = k * self.num_rows();
        out.column_major_data_mut().copy_from_slice(&self.column_major_data()[start..]);
        Ok(())
    }

    /// `out = M(k+1:end, :)`.
    pub fn copy_rows_from(&self, k: usize, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_rows_from";
        check_block(op, k, self.num_rows())?;
        check_shape(op, (self.num_rows() - k, self.num_cols()), out.dims())?;
        self.copy_block_into(out, (k, 0));
        Ok(())
    }

    /// `out = M(k+1:end, k+1:end)`.
    pub fn copy_lower_right_from(&self, k: usize, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_lower_right_from";
        check_block(op, k, self.num_rows())?;
        check_block(op, k, self.num_cols())?;
        check_shape(op, (self.num_rows() - k, self.num_cols() - k), out.dims())?;
        self.copy_block_into(out, (k, k));
        Ok(())
    }

    /// `out = M(:, cols)` for a list of **1-based** column numbers.
    ///
    /// The 1-based convention is kept for callers that build index lists
    /// MATLAB-style; the list is converted to 0-based once, up front.
    pub fn copy_column_list(&self, cols: &[usize], out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_column_list";
        let cols = zero_based(op, cols, self.num_cols())?;
        check_shape(op, (self.num_rows(), cols.len()), out.dims())?;
        for (dest, src) in cols.into_iter().enumerate() {
            out.col_slice_mut(dest).copy_from_slice(self.col_slice(src));
        }
        Ok(())
    }

    /// `out = M(rows, :)` for a list of **1-based** row numbers.
    pub fn copy_row_list(&self, rows: &[usize], out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::copy_row_list";
        let rows = zero_based(op, rows, self.num_rows())?;
        check_shape(op, (rows.len(), self.num_cols()), out.dims())?;
        for j in 0..self.num_cols() {
            for (dest, &src) in rows.iter().enumerate() {
                out.set(dest, j, self.get(src, j));
            }
        }
        Ok(())
    }

    // out(i, j) = self(i + r0, j + c0) over all of out.  Shapes already checked.
    fn copy_block_into(&self, out: &mut Matrix, (r0, c0): (usize, usize))
    {
        let rows = out.num_rows();
        for j in 0..out.num_cols() {
            let src = &self.col_slice(j + c0)[r0..r0 + rows];
            out.col_slice_mut(j).copy_from_slice(src);
        }
    }
}

/// Concatenation.
impl Matrix {
    /// `out = [a, b]`.
    pub fn append_horizontally(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::append_horizontally";
        check_len(op, a.num_rows(), b.num_rows())?;
        check_shape(op, (a.num_rows(), a.num_cols() + b.num_cols()), out.dims())?;
        // column-major, so this is just two contiguous runs
        let (left, right) = out.column_major_data_mut().split_at_mut(a.size());
        left.copy_from_slice(a.column_major_data());
        right.copy_from_slice(b.column_major_data());
        Ok(())
    }

    /// `out = [a; b]`.
    pub fn append_vertically(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()>
    {
        let op = "Matrix::append_vertically";
        check_len(op, a.num_cols(), b.num_cols())?;
        check_shape(op, (a.num_rows() + b.num_rows(), a.num_cols()), out.dims())?;
        let top = a.num_rows();
        for j in 0..a.num_cols() {
            let col = out.col_slice_mut(j);
            col[..top].copy_from_slice(a.col_slice(j));
            col[top..].copy_from_slice(b.col_slice(j));
        }
        Ok(())
    }
}

/// Triangles and diagonals.
impl Matrix {
    /// Copy the upper triangle (`j >= i`) of `src` into `self`.
    ///
    /// The strict lower triangle of `self` is left as it was.
    pub fn copy_upper_triangle(&mut self, src: &Matrix) -> Result<()>
    {
        check_shape("Matrix::copy_upper_triangle", src.dims(), self.dims())?;
        for j in 0..self.num_cols() {
            let end = usize::min(j + 1, self.num_rows());
            self.col_slice_mut(j)[..end].copy_from_slice(&src.col_slice(j)[..end]);
        }
        Ok(())
    }

    /// Zero the strict lower triangle (`j < i`).
    pub fn keep_only_upper_triangle(&mut self)
    {
        let rows = self.num_rows();
        for j in 0..self.num_cols() {
            if j + 1 < rows {
                for x in &mut self.col_slice_mut(j)[j + 1..] {
                    *x = 0.0;
                }
            }
        }
    }

    /// Write `diag` onto the diagonal.  Off-diagonal entries are untouched.
    pub fn set_diagonal(&mut self, diag: &Vector) -> Result<()>
    {
        check_len("Matrix::set_diagonal", usize::min(self.num_rows(), self.num_cols()), diag.len())?;
        for (i, &x) in diag.as_slice().iter().enumerate() {
            self.set(i, i, x);
        }
        Ok(())
    }

    /// Write ones onto the diagonal.  Off-diagonal entries are untouched.
    pub fn set_identity(&mut self)
    {
        for i in 0..usize::min(self.num_rows(), self.num_cols()) {
            self.set(i, i, 1.0);
        }
    }

    /// `out(i, i) = 1 / self(i, i)`.
    ///
    /// Zeros on the diagonal produce infinities; that is the caller's problem.
    pub fn invert_diagonal_into(&self, out: &mut Matrix) -> Result<()>
    {
        check_shape("Matrix::invert_diagonal_into", self.dims(), out.dims())?;
        for i in 0..usize::min(self.num_rows(), self.num_cols()) {
            out.set(i, i, 1.0 / self.get(i, i));
        }
        Ok(())
    }
}

fn check_block(op: &'static str, k: usize, len: usize) -> Result<()>
{
    match k <= len {
        true => Ok(()),
        false => Err(Error::IndexOutOfRange { op, index: k, len }),
    }
}

// reported 1-based, like the index lists
fn check_index(op: &'static str, index: usize, len: usize) -> Result<()>
{
    match index < len {
        true => Ok(()),
        false => Err(Error::IndexOutOfRange { op, index: index + 1, len }),
    }
}

fn zero_based(op: &'static str, indices: &[usize], len: usize) -> Result<Vec<usize>>
{
    indices.iter().map(|&index| match index {
        0 => Err(Error::IndexOutOfRange { op, index, len }),
        i if i > len => Err(Error::IndexOutOfRange { op, index, len }),
        i => Ok(i - 1),
    }).collect()
}
