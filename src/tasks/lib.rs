/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Everything between the command line and `rla-linalg`.
//!
//! The binaries in the root package are one-line shims around the functions
//! in [`entry_points`].

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate clap;
#[cfg(test)]
#[macro_use]
extern crate rla_assert_close;

pub type FailResult<T> = Result<T, ::failure::Error>;

pub mod config;
pub mod logging;
pub mod cmd;
// clap 2's `crate_authors!` trips this lint on newer rustc.
#[allow(unknown_lints, dangerous_implicit_autorefs)]
pub mod entry_points;
mod cli_deserialize;

pub use crate::config::{Settings, ValidatedSettings, FactorizationKind};
