/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The binary matrix file format.
//!
//! ```text
//! i32          rows
//! i32          cols
//! f64 * rows * cols   entries, ROW-major
//! ```
//!
//! Everything is native-endian.  There is no magic number and no padding, so
//! the file length is exactly `8 + 8 * rows * cols` bytes; anything else is
//! rejected.

use crate::Matrix;
use crate::errors::{Error, Result};
use ::std::fs::File;
use ::std::io::{self, prelude::*, BufReader, BufWriter};
use ::std::mem::size_of;
use ::std::path::Path;

/// Read a matrix in the binary format.
///
/// The reader must contain the matrix and nothing else.
pub fn read_binary<R: Read>(mut r: R) -> Result<Matrix>
{
    let rows = read_dim(&mut r, "row count")?;
    let cols = read_dim(&mut r, "column count")?;

    let len = rows.checked_mul(cols)
        .ok_or_else(|| malformed(format!("{} x {} is too large", rows, cols)))?;

    // don't trust the header enough to preallocate from it
    let mut bytes = vec![];
    r.read_to_end(&mut bytes).map_err(|e| malformed(e.to_string()))?;
    let expected_bytes = len.checked_mul(size_of::<f64>())
        .ok_or_else(|| malformed(format!("{} x {} is too large", rows, cols)))?;
    if bytes.len() < expected_bytes {
        return Err(malformed(format!(
            "expected {} entries for a {} x {} matrix, found {} bytes",
            len, rows, cols, bytes.len(),
        )));
    }
    if bytes.len() > expected_bytes {
        return Err(malformed(format!(
            "{} trailing bytes after a {} x {} matrix",
            bytes.len() - expected_bytes, rows, cols,
        )));
    }

    let row_major: Vec<f64> = bytes.chunks(size_of::<f64>())
        .map(|chunk| {
            let mut buf = [0; 8];
            buf.copy_from_slice(chunk);
            f64::from_ne_bytes(buf)
        })
        .collect();
    Ok(Matrix::from_row_major_data((rows, cols), &row_major))
}

/// Write a matrix in the binary format.
pub fn write_binary<W: Write>(mut w: W, m: &Matrix) -> Result<()>
{
    let (rows, cols) = m.dims();
    let as_i32 = |x: usize| match x {
        x if x <= i32::max_value() as usize => Ok(x as i32),
        _ => Err(malformed(format!("{} x {} does not fit the format's header", rows, cols))),
    };
    let header = [as_i32(rows)?, as_i32(cols)?];

    let mut go = || -> io::Result<()> {
        for &dim in &header {
            w.write_all(&dim.to_ne_bytes())?;
        }
        for x in m.to_row_major_data() {
            w.write_all(&x.to_ne_bytes())?;
        }
        w.flush()
    };
    go().map_err(|e| Error::io("<stream>", e))
}

/// Load a matrix from a binary file.
pub fn load_binary_file<P: AsRef<Path>>(path: P) -> Result<Matrix>
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let m = read_binary(BufReader::new(file)).map_err(|e| match e {
        Error::MalformedFile(msg) => Error::MalformedFile(format!("{}: {}", path.display(), msg)),
        e => e,
    })?;
    info!("loaded {} x {} matrix from {}", m.num_rows(), m.num_cols(), path.display());
    Ok(m)
}

/// Save a matrix to a binary file, replacing any existing file.
pub fn save_binary_file<P: AsRef<Path>>(path: P, m: &Matrix) -> Result<()>
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_binary(BufWriter::new(file), m).map_err(|e| match e {
        Error::Io { cause, .. } => Error::io(path, cause),
        e => e,
    })?;
    debug!("wrote {} x {} matrix to {}", m.num_rows(), m.num_cols(), path.display());
    Ok(())
}

fn read_dim<R: Read>(r: &mut R, what: &str) -> Result<usize>
{
    let mut buf = [0; 4];
    r.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => malformed(format!("file ends before the {}", what)),
        _ => malformed(e.to_string()),
    })?;
    match i32::from_ne_bytes(buf) {
        n if n < 0 => Err(malformed(format!("negative {}: {}", what, n))),
        n => Ok(n as usize),
    }
}

fn malformed(msg: String) -> Error
{ Error::MalformedFile(msg) }
