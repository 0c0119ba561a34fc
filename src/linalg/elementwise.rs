/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Entrywise updates and reductions.
//!
//! Anything touching at least [`PARALLEL_THRESHOLD`] entries runs on the rayon
//! pool.  Parallel sums are tree reductions, so the last few bits of a norm or
//! dot product may depend on the number of threads.

use crate::{Matrix, Vector};
use crate::errors::{Result, check_shape, check_len};
use ::rayon::prelude::*;
use ::rayon_cond::CondIterator;

/// Buffers shorter than this are processed on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 1 << 14;

#[inline]
fn use_rayon(len: usize) -> bool
{ len >= PARALLEL_THRESHOLD }

fn scale_slice(data: &mut [f64], scalar: f64)
{
    let parallel = use_rayon(data.len());
    CondIterator::new(data, parallel).for_each(|x| *x *= scalar);
}

fn sub_slice(dest: &mut [f64], src: &[f64])
{
    debug_assert_eq!(dest.len(), src.len());
    if use_rayon(dest.len()) {
        dest.par_iter_mut().zip(src.par_iter()).for_each(|(a, b)| *a -= *b);
    } else {
        for (a, b) in dest.iter_mut().zip(src) {
            *a -= *b;
        }
    }
}

fn copy_slice(dest: &mut [f64], src: &[f64])
{
    debug_assert_eq!(dest.len(), src.len());
    if use_rayon(dest.len()) {
        dest.par_iter_mut().zip(src.par_iter()).for_each(|(a, b)| *a = *b);
    } else {
        dest.copy_from_slice(src);
    }
}

fn sum_of_squares(data: &[f64]) -> f64
{
    let parallel = use_rayon(data.len());
    CondIterator::new(data, parallel).map(|&x| x * x).sum::<f64>()
}

/// 2-norm, scaled by the largest magnitude first (as in `dnrm2`) so that the
/// squares neither overflow nor underflow.
fn norm_of_slice(data: &[f64]) -> f64
{
    let scale = data.iter().fold(0.0, |acc, &x| f64::max(acc, x.abs()));
    if scale == 0.0 || scale.is_infinite() {
        // the fold skips NaN, so it has to be looked for here
        return match data.iter().any(|x| x.is_nan()) {
            true => ::std::f64::NAN,
            false => scale,
        };
    }

    let parallel = use_rayon(data.len());
    let sum = CondIterator::new(data, parallel)
        .map(|&x| { let y = x / scale; y * y })
        .sum::<f64>();
    scale * sum.sqrt()
}

fn dot_slices(a: &[f64], b: &[f64]) -> f64
{
    debug_assert_eq!(a.len(), b.len());
    let parallel = use_rayon(a.len());
    CondIterator::new(0..a.len(), parallel).map(|i| a[i] * b[i]).sum::<f64>()
}

impl Vector {
    pub fn scale(&mut self, scalar: f64)
    { scale_slice(self.as_mut_slice(), scalar) }

    pub fn copy_from(&mut self, src: &Vector) -> Result<()>
    {
        check_len("Vector::copy_from", self.len(), src.len())?;
        copy_slice(self.as_mut_slice(), src.as_slice());
        Ok(())
    }

    /// `self -= other`
    pub fn sub_assign(&mut self, other: &Vector) -> Result<()>
    {
        check_len("Vector::sub_assign", self.len(), other.len())?;
        sub_slice(self.as_mut_slice(), other.as_slice());
        Ok(())
    }

    /// Euclidean norm.
    pub fn norm2(&self) -> f64
    { norm_of_slice(self.as_slice()) }

    pub fn dot(&self, other: &Vector) -> Result<f64>
    {
        check_len("Vector::dot", self.len(), other.len())?;
        Ok(dot_slices(self.as_slice(), other.as_slice()))
    }

    /// Projection of `self` onto the direction of `u`, written into `out`.
    ///
    /// `out = (self . u / u . u) u`.  A zero `u` gives NaNs.
    pub fn project_onto(&self, u: &Vector, out: &mut Vector) -> Result<()>
    {
        let coeff = self.dot(u)? / u.dot(u)?;
        out.copy_from(u)?;
        out.scale(coeff);
        Ok(())
    }
}

impl Matrix {
    pub fn scale(&mut self, scalar: f64)
    { scale_slice(self.column_major_data_mut(), scalar) }

    /// Elementwise copy.  Shapes must match exactly.
    pub fn copy_from(&mut self, src: &Matrix) -> Result<()>
    {
        check_shape("Matrix::copy_from", self.dims(), src.dims())?;
        copy_slice(self.column_major_data_mut(), src.column_major_data());
        Ok(())
    }

    /// `self -= other`
    pub fn sub_assign(&mut self, other: &Matrix) -> Result<()>
    {
        check_shape("Matrix::sub_assign", self.dims(), other.dims())?;
        sub_slice(self.column_major_data_mut(), other.column_major_data());
        Ok(())
    }

    /// Zero every entry with `|x| < tol`.
    pub fn hard_threshold(&mut self, tol: f64)
    {
        let data = self.column_major_data_mut();
        let parallel = use_rayon(data.len());
        CondIterator::new(data, parallel).for_each(|x| {
            if x.abs() < tol {
                *x = 0.0;
            }
        });
    }

    pub fn frobenius_norm(&self) -> f64
    { norm_of_slice(self.column_major_data()) }

    /// Largest absolute value of any entry (0 for an empty matrix).
    pub fn max_abs_element(&self) -> f64
    { self.column_major_data().iter().fold(0.0, |acc, &x| f64::max(acc, x.abs())) }

    /// The historical "max abs" reduction, which compares magnitudes but
    /// records the signed entry.
    ///
    /// Because the running value keeps its sign, a large negative entry can be
    /// reported (as a negative number) and then be "beaten" by any later entry
    /// whose magnitude exceeds that negative value.  Only use this when matching
    /// output from older tooling; [`Matrix::max_abs_element`] is the real thing.
    pub fn max_abs_element_signed(&self) -> f64
    {
        let mut max = 0.0;
        for &x in self.column_major_data() {
            if x.abs() > max {
                max = x;
            }
        }
        max
    }

    /// `sum_i M(i, j)^2`
    pub fn column_norm_squared(&self, j: usize) -> f64
    { sum_of_squares(self.col_slice(j)) }

    /// Squared 2-norm of every column.  `out` must have length `num_cols()`.
    pub fn column_norms_squared(&self, out: &mut Vector) -> Result<()>
    {
        check_len("Matrix::column_norms_squared", self.num_cols(), out.len())?;
        let parallel = use_rayon(self.size());
        let norms: Vec<f64> = CondIterator::new(0..self.num_cols(), parallel)
            .map(|j| self.column_norm_squared(j))
            .collect();
        out.set_data(&norms)
    }

    /// Index and 2-norm of the column with the largest 2-norm.
    ///
    /// Ties go to the leftmost column.  `None` when there are no columns.
    pub fn column_with_max_norm(&self) -> Option<(usize, f64)>
    {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.num_cols() {
            let norm = self.column_norm_squared(j).sqrt();
            match best {
                Some((_, b)) if b >= norm => {},
                _ => best = Some((j, norm)),
            }
        }
        best
    }

    /// Largest column 2-norm (0 when there are no columns).
    pub fn max_column_norm(&self) -> f64
    { self.column_with_max_norm().map_or(0.0, |(_, norm)| norm) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn vector_basics() {
        let mut v = Vector::from_vec(vec![3.0, 4.0]);
        assert_eq!(v.norm2(), 5.0);

        v.scale(2.0);
        assert_eq!(v.as_slice(), &[6.0, 8.0]);

        v.sub_assign(&Vector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(v.as_slice(), &[5.0, 7.0]);
        assert_eq!(v.dot(&Vector::from_vec(vec![1.0, -1.0])).unwrap(), -2.0);

        let mut w = Vector::zeros(2);
        w.copy_from(&v).unwrap();
        assert_eq!(w, v);

        assert!(v.dot(&Vector::zeros(3)).is_err());
        assert!(v.sub_assign(&Vector::zeros(1)).is_err());
    }

    #[test]
    fn projection() {
        let v = Vector::from_vec(vec![2.0, 3.0]);
        let u = Vector::from_vec(vec![2.0, 0.0]);
        let mut p = Vector::zeros(2);
        v.project_onto(&u, &mut p).unwrap();
        assert_eq!(p.as_slice(), &[2.0, 0.0]);
    }

    #[test]
    fn matrix_updates() {
        let mut a = Matrix::from_fn((2, 2), |i, j| (i + 2 * j) as f64);
        a.scale(-1.0);
        assert_eq!(a.column_major_data(), &[0.0, -1.0, -2.0, -3.0]);

        let b = Matrix::from_fn((2, 2), |_, _| 1.0);
        a.sub_assign(&b).unwrap();
        assert_eq!(a.column_major_data(), &[-1.0, -2.0, -3.0, -4.0]);

        match a.sub_assign(&Matrix::zeros((2, 3))) {
            Err(Error::ShapeMismatch { expected: (2, 2), found: (2, 3), .. }) => {},
            r => panic!("{:?}", r),
        }

        let mut c = Matrix::zeros((2, 2));
        c.copy_from(&a).unwrap();
        assert_eq!(c, a);
        assert!(c.copy_from(&Matrix::zeros((4, 1))).is_err());
    }

    #[test]
    fn threshold() {
        let mut m = Matrix::from_column_major_data((2, 2), vec![1e-12, -0.5, -1e-9, 2.0]);
        m.hard_threshold(1e-6);
        assert_eq!(m.column_major_data(), &[0.0, -0.5, 0.0, 2.0]);
    }

    #[test]
    fn norms() {
        let m = Matrix::from_column_major_data((2, 2), vec![1.0, 2.0, 2.0, 4.0]);
        assert_eq!(m.frobenius_norm(), 5.0);
        assert_eq!(m.column_norm_squared(0), 5.0);
        assert_eq!(m.column_norm_squared(1), 20.0);

        let mut norms = Vector::zeros(2);
        m.column_norms_squared(&mut norms).unwrap();
        assert_eq!(norms.as_slice(), &[5.0, 20.0]);
        assert!(m.column_norms_squared(&mut Vector::zeros(3)).is_err());

        assert_eq!(m.column_with_max_norm(), Some((1, 20f64.sqrt())));
        assert_eq!(m.max_column_norm(), 20f64.sqrt());
        assert_eq!(Matrix::zeros((3, 0)).column_with_max_norm(), None);
    }

    #[test]
    fn norms_of_extreme_magnitudes() {
        let big = Vector::from_vec(vec![3e200, -4e200]);
        assert_close!(rel=1e-15, big.norm2(), 5e200);
        let tiny = Vector::from_vec(vec![3e-200, 4e-200]);
        assert_close!(rel=1e-15, tiny.norm2(), 5e-200);

        let m = Matrix::from_column_major_data((1, 2), vec![1e300, 1e300]);
        assert_close!(rel=1e-15, m.frobenius_norm(), 2f64.sqrt() * 1e300);

        assert_eq!(Vector::zeros(3).norm2(), 0.0);
        assert_eq!(Vector::zeros(0).norm2(), 0.0);
        assert_eq!(Vector::from_vec(vec![1.0, ::std::f64::INFINITY]).norm2(), ::std::f64::INFINITY);
        assert!(Vector::from_vec(vec![1.0, ::std::f64::NAN]).norm2().is_nan());
        assert!(Vector::from_vec(vec![::std::f64::NAN, ::std::f64::INFINITY]).norm2().is_nan());
    }

    #[test]
    fn max_abs_of_negative_entry() {
        // the entry of largest magnitude is negative
        let m = Matrix::from_column_major_data((2, 2), vec![1.0, -7.0, 3.0, 2.0]);
        assert_eq!(m.max_abs_element(), 7.0);

        // legacy behavior records the sign, then gets overwritten by
        // smaller-magnitude entries that compare greater than -7.
        assert_eq!(m.max_abs_element_signed(), 3.0);
        let m = Matrix::from_column_major_data((1, 2), vec![1.0, -7.0]);
        assert_eq!(m.max_abs_element_signed(), -7.0);

        assert_eq!(Matrix::zeros((0, 0)).max_abs_element(), 0.0);
    }

    #[test]
    fn parallel_paths_agree_with_serial() {
        let n = PARALLEL_THRESHOLD + 17;
        let data: Vec<f64> = (0..n).map(|i| ((i % 7) as f64) - 3.0).collect();
        let expected_sq: f64 = data.iter().map(|x| x * x).sum();

        let m = Matrix::from_column_major_data((n, 1), data.clone());
        assert_close!(rel=1e-12, m.frobenius_norm(), expected_sq.sqrt());

        let v = Vector::from_vec(data.clone());
        assert_close!(rel=1e-12, v.dot(&v).unwrap(), expected_sq);

        let mut w = v.clone();
        w.scale(2.0);
        w.sub_assign(&v).unwrap();
        assert_eq!(w, v);

        let mut m2 = m.clone();
        m2.hard_threshold(2.5);
        assert!(m2.column_major_data().iter().all(|&x| x == 0.0 || x.abs() >= 2.5));
    }
}
