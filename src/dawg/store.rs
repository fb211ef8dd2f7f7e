//! Storing and loading the packed cell array.
//!
//! The on-disk form is a big-endian `u32` cell count followed by that many
//! big-endian `u32` cells. `load` re-checks the structural invariants of
//! the array so that queries on a loaded dawg stay in bounds.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;
use tracing::debug;

use super::cell::Cell;
use super::graph::Dawg;

/// Errors produced when loading a packed dawg.
#[derive(Debug, Error)]
pub enum DawgError {
    /// The stream did not contain a well-formed packed cell array.
    #[error("invalid packed dawg: {reason}")]
    Format {
        /// What was wrong with the data.
        reason: String,
        /// The underlying read failure, when truncation was the problem.
        #[source]
        source: Option<io::Error>,
    },
    /// An I/O failure reported by the underlying stream, passed through
    /// unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Truncation means the data is malformed; anything else is the stream's
/// problem.
fn read_error(e: io::Error, reason: &str) -> DawgError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        DawgError::Format {
            reason: reason.to_string(),
            source: Some(e),
        }
    } else {
        DawgError::Io(e)
    }
}

fn format_error(reason: impl Into<String>) -> DawgError {
    DawgError::Format {
        reason: reason.into(),
        source: None,
    }
}

impl Dawg {
    /// Writes the packed cell array to `writer` and flushes it. The
    /// stream is left open.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::dawg::{Dawg, DawgBuilder};
    ///
    /// let mut builder = DawgBuilder::new();
    /// builder.add("CAT");
    /// let dawg = builder.build();
    ///
    /// let mut buf = Vec::new();
    /// dawg.store(&mut buf).unwrap();
    /// let reloaded = Dawg::load(&mut buf.as_slice()).unwrap();
    /// assert!(reloaded.contains("CAT"));
    /// ```
    pub fn store<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let cells = self.cells();
        writer.write_u32::<BigEndian>(cells.len() as u32)?;
        for &cell in cells {
            writer.write_u32::<BigEndian>(cell)?;
        }
        writer.flush()
    }

    /// Reads a packed cell array from `reader`. The stream is left open.
    ///
    /// # Errors
    ///
    /// [`DawgError::Format`] when the stream does not hold a well-formed
    /// cell array — truncated data, an empty array, or child pointers that
    /// escape it. [`DawgError::Io`] for any other stream failure.
    pub fn load<R: Read>(reader: &mut R) -> Result<Dawg, DawgError> {
        let count = reader
            .read_u32::<BigEndian>()
            .map_err(|e| read_error(e, "missing cell count"))?;
        if count == 0 {
            return Err(format_error("empty cell array"));
        }

        let mut cells = Vec::new();
        for i in 0..count {
            let cell = reader
                .read_u32::<BigEndian>()
                .map_err(|e| read_error(e, &format!("truncated at cell {i} of {count}")))?;
            cells.push(cell);
        }
        validate(&cells)?;

        debug!(cells = cells.len(), "loaded packed dawg");
        Ok(Dawg::from_cells(cells))
    }
}

/// Structural well-formedness: every child pointer must land inside the
/// array (and never back at the root), and the final child run must
/// terminate before the array ends.
fn validate(cells: &[u32]) -> Result<(), DawgError> {
    let len = cells.len() as u32;
    for (i, &bits) in cells.iter().enumerate() {
        if let Some(first_child) = Cell(bits).first_child() {
            if first_child == 0 || first_child >= len {
                return Err(format_error(format!(
                    "cell {i} points at out-of-range child {first_child}"
                )));
            }
        }
    }
    if len > 1 && !Cell(cells[len as usize - 1]).is_last_sibling() {
        return Err(format_error("unterminated final child run"));
    }
    Ok(())
}
