//! Value-stream layout for table bodies.
//!
//! Layout only decides where separators and line breaks go; the value
//! sequence written is exactly the one supplied.

use std::fmt::{self, Display, Write};

/// How a table body is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `v, v, v, ` on one line.
    Inline,
    /// `v,` followed by a newline after every `per_line` values, a space otherwise.
    Wrapped { per_line: usize },
    /// One line per row of `per_row` values, each right-aligned to `width`.
    Rows { width: usize, per_row: usize },
}

/// Window and MDCT twiddle tables.
pub const WORD_TABLE: Layout = Layout::Wrapped { per_line: 5 };

/// Pulse cache and bit-reversal tables.
pub const BYTE_TABLE: Layout = Layout::Wrapped { per_line: 15 };

/// FFT twiddle pairs.
pub const TWIDDLE_TABLE: Layout = Layout::Wrapped { per_line: 2 };

impl Layout {
    /// Write `values`, returning how many were written.
    pub fn write_values<O, I, T>(self, out: &mut O, values: I) -> Result<usize, fmt::Error>
    where
        O: Write,
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let mut count = 0;
        match self {
            Layout::Inline => {
                for value in values {
                    write!(out, "{value}, ")?;
                    count += 1;
                }
            }
            Layout::Wrapped { per_line } => {
                let per_line = per_line.max(1);
                for value in values {
                    count += 1;
                    let brk = if count % per_line == 0 { '\n' } else { ' ' };
                    write!(out, "{value},{brk}")?;
                }
            }
            Layout::Rows { width, per_row } => {
                for value in values {
                    write!(out, "{value:>width$}, ")?;
                    count += 1;
                    if per_row > 0 && count % per_row == 0 {
                        out.write_char('\n')?;
                    }
                }
            }
        }
        Ok(count)
    }
}
