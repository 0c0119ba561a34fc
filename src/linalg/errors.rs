/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ::failure::Fail;
use ::std::io;

pub type Result<T> = ::std::result::Result<T, Error>;

/// Everything that can go wrong in this crate.
///
/// Shape and index problems are reported rather than trusted, so that a bad
/// call cannot quietly scribble over the wrong entries.
#[derive(Debug, Fail)]
pub enum Error {
    /// A matrix argument did not have the shape the operation requires.
    #[fail(display = "{}: expected a matrix of shape {:?}, got {:?}", op, expected, found)]
    ShapeMismatch {
        op: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A vector argument did not have the length the operation requires.
    #[fail(display = "{}: expected a vector of length {}, got {}", op, expected, found)]
    LengthMismatch {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    /// A row or column index (reported 1-based) did not refer to a valid row or column.
    #[fail(display = "{}: index {} is out of range 1..={}", op, index, len)]
    IndexOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    /// A column became (numerically) dependent on the columns before it.
    #[fail(display = "rank deficiency: column {} vanished during pass {} (residual norm {:e})", column, pass, residual_norm)]
    RankDeficiency {
        column: usize,
        pass: usize,
        residual_norm: f64,
    },

    /// An input entry was NaN or infinite where only finite values make sense.
    #[fail(display = "{}: non-finite entry {} at row {}, column {}", op, value, row, col)]
    NonFiniteEntry {
        op: &'static str,
        row: usize,
        col: usize,
        value: f64,
    },

    /// A binary matrix file was truncated or otherwise nonsensical.
    #[fail(display = "malformed matrix file: {}", _0)]
    MalformedFile(String),

    #[fail(display = "{}: {}", path, cause)]
    Io {
        path: String,
        #[cause] cause: io::Error,
    },

    /// The numeric backend reported a failure (e.g. an SVD that did not converge).
    #[fail(display = "{} failed: {}", routine, message)]
    Backend {
        routine: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn io<P: AsRef<::std::path::Path>>(path: P, cause: io::Error) -> Self {
        Error::Io { path: path.as_ref().display().to_string(), cause }
    }

    pub(crate) fn backend<S: ToString>(routine: &'static str, message: S) -> Self {
        Error::Backend { routine, message: message.to_string() }
    }
}

pub(crate) fn check_shape(op: &'static str, expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    match expected == found {
        true => Ok(()),
        false => Err(Error::ShapeMismatch { op, expected, found }),
    }
}

pub(crate) fn check_len(op: &'static str, expected: usize, found: usize) -> Result<()> {
    match expected == found {
        true => Ok(()),
        false => Err(Error::LengthMismatch { op, expected, found }),
    }
}
