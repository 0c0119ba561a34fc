/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Dense column-major matrix kernels.
//!
//! Storage is a single owned `Vec<f64>` per [`Matrix`] or [`Vector`], and every
//! structural operation copies into caller-supplied (pre-sized) storage.
//! Nothing in this crate hands out views that alias another matrix.
//!
//! The heavy lifting (products and factorizations) is delegated to external
//! numeric code in [`blas`] and [`lapack`]; the one piece of real algorithm
//! that lives here is the iterated Gram-Schmidt basis builder in [`orth`].

#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate rla_assert_close;

pub use crate::errors::{Error, Result};
mod errors;

pub use crate::matrix::{Matrix, Vector};
mod matrix;

mod structure;
mod elementwise;
pub use crate::elementwise::PARALLEL_THRESHOLD;

pub mod blas;
pub mod lapack;
pub use crate::lapack::{Qr, Svd};

pub mod orth;
pub use crate::orth::{build_orthonormal_basis, orthonormal_basis, Orthonormalize};

pub mod composite;
pub use crate::composite::{percent_error_between, form_svd_product};

pub mod io;
pub use crate::io::{load_binary_file, save_binary_file};

pub mod random;
pub use crate::random::initialize_random_matrix;
