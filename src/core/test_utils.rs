//! Test utilities for emission tests.
//!
//! Synthetic descriptors with the right table shapes (values are arbitrary
//! but deterministic) and a reader that pulls a table's values back out of
//! generated text regardless of line wrapping.
