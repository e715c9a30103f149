// This module defines the error types for the mode-table compiler using the thiserror
// crate. DumpError covers everything that can go wrong while turning descriptors into
// generated source: a supplied table whose length disagrees with the length derived
// from the descriptor's scalar fields, a floating-point FFT plan without its scale
// factor, two distinct dedup keys rendering to the same include guard, one key reached
// by tables of different lengths, and failures of the underlying text or file sink. ModeError is
// reported by the mode-construction collaborator when it refuses a (rate, frame size)
// pair. Both come with Result aliases for `?` propagation.

//! Error types for the mode-table compiler.
//!
//! Using thiserror for idiomatic error handling.

use thiserror::Error;

/// Errors raised while emitting tables.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("{table} of mode {sample_rate}/{frame_size} has {actual} entries, expected {expected}")]
    TableLength {
        table: &'static str,
        sample_rate: i32,
        frame_size: usize,
        expected: usize,
        actual: usize,
    },

    #[error("FFT plan {shift} of mode {sample_rate}/{frame_size} has no scale factor")]
    MissingScale {
        sample_rate: i32,
        frame_size: usize,
        shift: usize,
    },

    #[error("include guard {guard} is claimed by both {first} and {second}")]
    GuardCollision {
        guard: String,
        first: String,
        second: String,
    },

    #[error("{symbol} was emitted with lengths {written:?} but is requested again with lengths {requested:?}")]
    ShapeMismatch {
        symbol: String,
        written: Vec<usize>,
        requested: Vec<usize>,
    },

    #[error("failed to format generated source")]
    Fmt(#[from] std::fmt::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the mode-construction collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Error creating mode with Fs={sample_rate}, frame_size={frame_size}: {reason}")]
    BadArgument {
        sample_rate: i32,
        frame_size: i32,
        reason: &'static str,
    },

    #[error("Error creating mode with Fs={sample_rate}, frame_size={frame_size}: FFT size {nfft} has a radix above 5")]
    UnsupportedFactor {
        sample_rate: i32,
        frame_size: i32,
        nfft: usize,
    },
}

/// Result type alias for emission.
pub type DumpResult<T> = Result<T, DumpError>;

/// Result type alias for mode construction.
pub type ModeResult<T> = Result<T, ModeError>;
