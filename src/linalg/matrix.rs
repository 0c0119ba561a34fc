/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::errors::{Result, check_len};
use ::std::ops::{Index, IndexMut};

/// Owned dense matrix with column-major (Fortran) layout.
///
/// Element `(i, j)` lives at flat offset `j * rows + i`.
// please resist the urge to add views; every accessor copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    // invariant: data.len() == rows * cols
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

/// Owned dense vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-initialized matrix.
    pub fn zeros((rows, cols): (usize, usize)) -> Self
    { Matrix { data: vec![0.0; rows * cols], rows, cols } }

    pub fn from_column_major_data((rows, cols): (usize, usize), data: Vec<f64>) -> Self
    {
        assert_eq!(data.len(), rows * cols, "(BUG) data does not fit a {}x{} matrix", rows, cols);
        Matrix { data, rows, cols }
    }

    /// Build from data where the column index varies fastest.
    pub fn from_row_major_data((rows, cols): (usize, usize), data: &[f64]) -> Self
    {
        assert_eq!(data.len(), rows * cols, "(BUG) data does not fit a {}x{} matrix", rows, cols);
        Matrix::from_fn((rows, cols), |i, j| data[i * cols + j])
    }

    pub fn from_fn<F>((rows, cols): (usize, usize), mut f: F) -> Self
    where F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                data.push(f(i, j));
            }
        }
        Matrix { data, rows, cols }
    }

    /// Build a matrix from its columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns are not all the same length.
    pub fn from_columns(columns: &[&[f64]]) -> Self
    {
        let rows = columns.first().map_or(0, |c| c.len());
        let mut data = Vec::with_capacity(rows * columns.len());
        for column in columns {
            assert_eq!(column.len(), rows, "ragged columns");
            data.extend_from_slice(column);
        }
        Matrix { data, rows, cols: columns.len() }
    }

    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self
    { Matrix::from_fn((n, n), |i, j| if i == j { 1.0 } else { 0.0 }) }

    /// Square matrix with `diag` on the diagonal.
    pub fn from_diagonal(diag: &Vector) -> Self
    {
        let mut out = Matrix::zeros((diag.len(), diag.len()));
        for (i, &x) in diag.as_slice().iter().enumerate() {
            out.set(i, i, x);
        }
        out
    }
}

impl Matrix {
    pub fn dims(&self) -> (usize, usize) { (self.rows, self.cols) }
    pub fn num_rows(&self) -> usize { self.rows }
    pub fn num_cols(&self) -> usize { self.cols }
    pub fn size(&self) -> usize { self.data.len() }
    pub fn is_square(&self) -> bool { self.rows == self.cols }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn column_major_data(&self) -> &[f64] { &self.data }
    pub fn column_major_data_mut(&mut self) -> &mut [f64] { &mut self.data }
    pub fn into_column_major_data(self) -> Vec<f64> { self.data }

    /// Copies out the data with the column index varying fastest.
    pub fn to_row_major_data(&self) -> Vec<f64>
    {
        let mut out = Vec::with_capacity(self.data.len());
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.push(self.get(i, j));
            }
        }
        out
    }

    /// Contiguous slice holding column `j`.
    pub fn col_slice(&self, j: usize) -> &[f64]
    {
        debug_assert!(j < self.cols, "column {} out of bounds for {}x{}", j, self.rows, self.cols);
        &self.data[j * self.rows..(j + 1) * self.rows]
    }

    pub fn col_slice_mut(&mut self, j: usize) -> &mut [f64]
    {
        debug_assert!(j < self.cols, "column {} out of bounds for {}x{}", j, self.rows, self.cols);
        let rows = self.rows;
        &mut self.data[j * rows..(j + 1) * rows]
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize) -> usize
    {
        debug_assert!(
            i < self.rows && j < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix", i, j, self.rows, self.cols,
        );
        j * self.rows + i
    }

    /// Read element `(i, j)`.
    ///
    /// Bounds are only checked by a debug assertion; in release builds an
    /// out-of-range pair that still lands inside the buffer reads the wrong
    /// element.  Use [`Matrix::checked_get`] at API edges.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64
    { self.data[self.offset(i, j)] }

    /// Write element `(i, j)`.  Same bounds policy as [`Matrix::get`].
    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: f64)
    {
        let k = self.offset(i, j);
        self.data[k] = value;
    }

    pub fn checked_get(&self, i: usize, j: usize) -> Option<f64>
    {
        match i < self.rows && j < self.cols {
            true => Some(self.data[j * self.rows + i]),
            false => None,
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &f64
    { &self.data[self.offset(i, j)] }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64
    {
        let k = self.offset(i, j);
        &mut self.data[k]
    }
}

//--------------------------------------------------------

impl Vector {
    pub fn zeros(len: usize) -> Self
    { Vector { data: vec![0.0; len] } }

    pub fn from_vec(data: Vec<f64>) -> Self
    { Vector { data } }

    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn as_slice(&self) -> &[f64] { &self.data }
    pub fn as_mut_slice(&mut self) -> &mut [f64] { &mut self.data }
    pub fn into_vec(self) -> Vec<f64> { self.data }

    #[inline(always)]
    pub fn get(&self, i: usize) -> f64
    {
        debug_assert!(i < self.data.len(), "index {} out of bounds for length {}", i, self.data.len());
        self.data[i]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, value: f64)
    {
        debug_assert!(i < self.data.len(), "index {} out of bounds for length {}", i, self.data.len());
        self.data[i] = value;
    }

    /// Overwrite every entry from `data`, which must have the same length.
    pub fn set_data(&mut self, data: &[f64]) -> Result<()>
    {
        check_len("Vector::set_data", self.len(), data.len())?;
        self.data.copy_from_slice(data);
        Ok(())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    #[inline(always)]
    fn index(&self, i: usize) -> &f64 { &self.data[i] }
}

impl IndexMut<usize> for Vector {
    #[inline(always)]
    fn index_mut(&mut self, i: usize) -> &mut f64 { &mut self.data[i] }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self { Vector { data } }
}

// Tests compare whole matrices with `assert_close!`, reporting `(row, col)`.
#[cfg(test)]
impl ::rla_assert_close::CheckClose for Matrix {
    fn check_close(
        &self,
        other: &Matrix,
        tol: ::rla_assert_close::Tolerances,
    ) -> ::std::result::Result<(), ::rla_assert_close::CheckCloseError>
    {
        use ::rla_assert_close::{CheckClose, CheckCloseError};

        if self.dims() != other.dims() {
            return Err(CheckCloseError::Shape {
                left: vec![self.rows, self.cols],
                right: vec![other.rows, other.cols],
            });
        }
        self.data.check_close(&other.data, tol).map_err(|e| match e {
            CheckCloseError::Values { index, left, right } => {
                let k = index[0];
                CheckCloseError::Values { index: vec![k % self.rows, k / self.rows], left, right }
            },
            e => e,
        })
    }
}

#[cfg(test)]
impl ::rla_assert_close::CheckClose for Vector {
    fn check_close(
        &self,
        other: &Vector,
        tol: ::rla_assert_close::Tolerances,
    ) -> ::std::result::Result<(), ::rla_assert_close::CheckCloseError>
    { ::rla_assert_close::CheckClose::check_close(&self.data, &other.data, tol) }
}
