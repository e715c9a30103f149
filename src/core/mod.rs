// This module gathers the shared building blocks of the mode-table compiler: the error
// types, the numeric literal formatter, the read-only mode descriptor model with its
// derived table lengths, the identity deriver that computes the standard predicate and
// the dedup keys, and the arena-backed emission session that acts as the batch's table
// registry. Nothing in here writes table text; the `emit` module builds on these.

//! Core infrastructure.
//!
//! # Key Components
//!
//! ## Numeric formatting (`numeric`)
//! - `Word` trait implemented for fixed-point and floating-point words
//! - Literals that parse back to the exact value
//!
//! ## Descriptors (`descriptor`)
//! - Mode, MDCT, FFT and pulse cache records
//! - Named derived lengths and length checks
//!
//! ## Identity (`identity`)
//! - Standard-mode predicate, frame rate
//! - Dedup keys with guard and symbol names
//!
//! ## Session (`session`)
//! - Table registry for one batch
//! - Emission statistics

pub mod descriptor;
pub mod error;
pub mod identity;
pub mod numeric;
pub mod session;
pub mod test_utils;

pub use descriptor::{FftState, MdctLookup, ModeDescriptor, PulseCache, Twiddle, MAX_FACTORS};
pub use error::{DumpError, DumpResult, ModeError, ModeResult};
pub use identity::{
    ModeIdentity, PulseCacheSymbols, TableKey, DEFAULT_ALLOC_SYMBOL, DEFAULT_EBANDS_SYMBOL,
};
pub use numeric::{format_significant, format_word, NumericMode, Word};
pub use session::{EmitSession, Presence, SessionStats};
