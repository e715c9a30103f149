//! CELT mode-table compiler.
//!
//! Turns computed CELT custom-mode descriptors into C source that defines
//! every mode as static data, sharing sub-tables between modes wherever
//! their content is identical.
//!
//! # Primary Usage
//!
//! ```ignore
//! use celt_modegen::celt::{create_modes, CustomModeFactory};
//! use celt_modegen::emit::Batch;
//! use bumpalo::Bump;
//!
//! let modes = create_modes::<f32, _>(&CustomModeFactory, &[(48000, 960), (48000, 480)])?;
//!
//! // One registry per batch, backed by the arena
//! let arena = Bump::new();
//! let batch = Batch::new(&arena, &modes);
//! let mut body = String::new();
//! batch.write_body(&mut body)?;
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Shared infrastructure (errors, formatting, descriptors, session)
//! - [`emit`] - Table emission and batch driver
//! - [`celt`] - Mode construction from (sample rate, frame size) pairs

pub mod celt;
pub mod core;
pub mod emit;

pub use self::core::{
    // Descriptors
    FftState, MdctLookup, ModeDescriptor, PulseCache, Twiddle,
    // Errors
    DumpError, DumpResult, ModeError, ModeResult,
    // Formatting and identity
    ModeIdentity, NumericMode, TableKey, Word,
    // Session management
    EmitSession, SessionStats,
};
pub use self::emit::{compile, dump_header, dump_modes, emit_mode, Batch};
