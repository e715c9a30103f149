// This module turns mode descriptors into C source. It is split the way the output is
// produced: `layout` decides separators and line breaks for a stream of values, `mode`
// writes the guarded tables and the record of a single mode, and `batch` runs a whole
// ordered set of modes through one registry and writes the mode list and the optional
// companion header.

//! Table emission.
//!
//! - [`layout`] - value-stream pretty printer
//! - [`mode`] - per-mode emitter
//! - [`batch`] - batch driver and companion header

pub mod batch;
pub mod layout;
pub mod mode;

pub use batch::{compile, dump_header, dump_modes, Batch, HeaderSummary, Uniformity};
pub use layout::Layout;
pub use mode::emit_mode;
