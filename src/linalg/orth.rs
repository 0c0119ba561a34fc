/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Orthonormal basis for the column space of a matrix.
//!
//! This is modified Gram-Schmidt, run [`NUM_PASSES`] times over the matrix.
//! The second pass is the re-orthogonalization: a single pass leaves errors
//! of order `cond(A) * eps` in `Q^T Q` when columns are nearly dependent,
//! and sweeping the (already nearly orthonormal) result a second time brings
//! that back down to a few `eps`.
//!
//! Columns are processed strictly left to right and each column only has the
//! columns *before* it projected out.  This means the leading `k` columns of
//! the output span exactly the leading `k` columns of the input, which is what
//! range finders rely on when they truncate the basis.

use crate::{Matrix, Vector};
use crate::composite::orthogonality_error;
use crate::errors::{Error, Result, check_shape};

/// Number of full Gram-Schmidt sweeps.
///
/// Two is the smallest number for which the result is orthonormal to working
/// precision; each extra sweep costs another `O(m n^2)`.
pub const NUM_PASSES: usize = 2;

/// Default relative tolerance for declaring a column dependent.
///
/// See [`Orthonormalize::rank_rtol`].
pub const DEFAULT_RANK_RTOL: f64 = 1e-12;

/// Builder for the orthonormalization.
///
/// Only the rank-deficiency tolerance is configurable; the number of passes
/// is fixed at [`NUM_PASSES`].
#[derive(Debug, Clone)]
pub struct Orthonormalize {
    rank_rtol: f64,
}

impl Default for Orthonormalize {
    fn default() -> Self
    { Orthonormalize { rank_rtol: DEFAULT_RANK_RTOL } }
}

impl Orthonormalize {
    pub fn new() -> Self
    { Default::default() }

    /// A column is rejected as linearly dependent when, after the earlier
    /// columns are projected out, its norm is at most `rtol` times its norm at
    /// the start of the pass.  Exact zeros are always rejected, even with
    /// `rtol = 0`.
    pub fn rank_rtol(&mut self, rtol: f64) -> &mut Self
    {
        assert!(rtol >= 0.0, "negative tolerance: {}", rtol);
        self.rank_rtol = rtol;
        self
    }

    /// Write an orthonormal basis for the columns of `a` into `q`.
    ///
    /// `q` must have the same shape as `a`.  On `Err`, the contents of `q`
    /// are unspecified.
    pub fn build_into(&self, a: &Matrix, q: &mut Matrix) -> Result<()>
    {
        check_shape("build_orthonormal_basis", a.dims(), q.dims())?;
        check_finite("build_orthonormal_basis", a)?;
        q.copy_from(a)?;

        let (m, n) = a.dims();
        let mut vi = Vector::zeros(m);
        let mut vj = Vector::zeros(m);
        let mut p = Vector::zeros(m);

        for pass in 1..=NUM_PASSES {
            for j in 0..n {
                q.get_col(j, &mut vj)?;
                let initial_norm = vj.norm2();

                for i in 0..j {
                    q.get_col(i, &mut vi)?;
                    vj.project_onto(&vi, &mut p)?;
                    vj.sub_assign(&p)?;
                }

                let norm = vj.norm2();
                if !norm.is_finite() || norm == 0.0 || norm <= self.rank_rtol * initial_norm {
                    warn!("column {} of {} is linearly dependent (pass {}, residual {:e} of {:e})",
                        j, n, pass, norm, initial_norm);
                    return Err(Error::RankDeficiency { column: j, pass, residual_norm: norm });
                }

                vj.scale(1.0 / norm);
                q.set_col(j, &vj)?;
            }

            if log_enabled!(::log::Level::Debug) {
                debug!("Gram-Schmidt pass {}/{}: max |Q^T Q - I| = {:e}",
                    pass, NUM_PASSES, orthogonality_error(q)?);
            }
        }
        Ok(())
    }

    pub fn build(&self, a: &Matrix) -> Result<Matrix>
    {
        let mut q = Matrix::zeros(a.dims());
        self.build_into(a, &mut q)?;
        Ok(q)
    }
}

/// NaN or infinite entries are bad input, not a sign of dependence.
fn check_finite(op: &'static str, a: &Matrix) -> Result<()>
{
    let data = a.column_major_data();
    match data.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(k) => Err(Error::NonFiniteEntry {
            op,
            row: k % a.num_rows(),
            col: k / a.num_rows(),
            value: data[k],
        }),
    }
}

/// [`Orthonormalize::build_into`] with default settings.
pub fn build_orthonormal_basis(a: &Matrix, q: &mut Matrix) -> Result<()>
{ Orthonormalize::new().build_into(a, q) }

/// [`Orthonormalize::build`] with default settings.
pub fn orthonormal_basis(a: &Matrix) -> Result<Matrix>
{ Orthonormalize::new().build(a) }
