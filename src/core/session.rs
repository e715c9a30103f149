// This module provides the emission session that lives for exactly one batch of modes.
// EmitSession owns the table registry: every table family the emitter writes is first
// checked in with `ensure_emitted`, which answers whether its include guard is fresh or
// was already written earlier in the batch. Guard names are interned in a bumpalo arena
// borrowed from the caller, and each guard remembers the dedup key that claimed it so
// that two distinct keys rendering to the same guard are reported rather than silently
// merged. The guard also remembers the lengths of the tables written under it: keys
// derived by integer division can be reached by modes whose tables differ in shape, and
// such a mode must not reference tables sized for another. The session also gathers statistics (modes, tables written, dedup hits,
// values) that the driver logs when the batch is done. Registry state is never shared
// between batches; a new batch means a new session.

//! Arena-backed emission session and table registry.
//!
//! Emission is single threaded; interior mutability uses `RefCell`. A
//! parallel emitter would have to serialize every `ensure_emitted` call
//! through one owner, since dedup relies on check-then-mark being atomic.

use bumpalo::Bump;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::fmt;

use super::error::{DumpError, DumpResult};
use super::identity::TableKey;

/// Registry answer for a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// First request in this batch; the caller must write the definition.
    Fresh,
    /// Already written; the caller only references the symbol.
    AlreadyEmitted,
}

impl Presence {
    pub fn is_fresh(self) -> bool {
        self == Presence::Fresh
    }
}

/// Emission session for one batch.
pub struct EmitSession<'arena> {
    arena: &'arena Bump,

    /// Guard name -> key that first claimed it, with the lengths written under it.
    tables: RefCell<HashMap<&'arena str, (TableKey, &'arena [usize])>>,

    stats: RefCell<SessionStats>,
}

impl<'arena> EmitSession<'arena> {
    /// Create a new session with the given arena.
    pub fn new(arena: &'arena Bump) -> Self {
        Self {
            arena,
            tables: RefCell::new(HashMap::new()),
            stats: RefCell::new(SessionStats::default()),
        }
    }

    /// Check a table in. Returns [`Presence::Fresh`] exactly once per guard.
    ///
    /// `shape` lists the lengths of the table group about to be written. A
    /// later request for the same key must carry the same shape.
    pub fn ensure_emitted(&self, key: &TableKey, shape: &[usize]) -> DumpResult<Presence> {
        let guard = key.guard();
        let mut tables = self.tables.borrow_mut();

        if let Some(&(owner, written)) = tables.get(guard.as_str()) {
            if owner != *key {
                return Err(DumpError::GuardCollision {
                    guard,
                    first: owner.symbol(),
                    second: key.symbol(),
                });
            }
            if written != shape {
                return Err(DumpError::ShapeMismatch {
                    symbol: key.symbol(),
                    written: written.to_vec(),
                    requested: shape.to_vec(),
                });
            }
            self.stats.borrow_mut().tables_shared += 1;
            log::trace!("{} already emitted, sharing {}", guard, key.symbol());
            return Ok(Presence::AlreadyEmitted);
        }

        let interned: &'arena str = self.arena.alloc_str(&guard);
        let shape: &'arena [usize] = self.arena.alloc_slice_copy(shape);
        tables.insert(interned, (*key, shape));
        self.stats.borrow_mut().tables_written += 1;
        log::debug!("Emitting {} ({}) with lengths {:?}", key.symbol(), guard, shape);
        Ok(Presence::Fresh)
    }

    /// All guards checked in so far, sorted.
    pub fn emitted_guards(&self) -> Vec<String> {
        let mut guards: Vec<String> = self
            .tables
            .borrow()
            .keys()
            .map(|guard| guard.to_string())
            .collect();
        guards.sort();
        guards
    }

    /// Record that a mode record was written.
    pub fn record_mode_emitted(&self, symbol: &str) {
        let mut stats = self.stats.borrow_mut();
        stats.modes_emitted += 1;
        stats.mode_symbols.push(symbol.to_string());
    }

    /// Record values written into table bodies.
    pub fn record_values(&self, count: usize) {
        self.stats.borrow_mut().values_written += count;
    }

    /// Get session statistics.
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }

    /// Bytes held by the guard arena.
    pub fn arena_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }
}

/// Emission session statistics.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// Mode records written.
    pub modes_emitted: usize,

    /// Symbols of the mode records, in emission order.
    pub mode_symbols: Vec<String>,

    /// Guarded table groups written.
    pub tables_written: usize,

    /// Requests answered from the registry instead of re-emitting.
    pub tables_shared: usize,

    /// Scalar values written into tables.
    pub values_written: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Emission Session Statistics:")?;
        writeln!(f, "  Modes emitted: {}", self.modes_emitted)?;
        writeln!(f, "  Tables written: {}", self.tables_written)?;
        writeln!(f, "  Tables shared: {}", self.tables_shared)?;
        writeln!(f, "  Values written: {}", self.values_written)?;
        if !self.mode_symbols.is_empty() {
            writeln!(f, "  Modes: {}", self.mode_symbols.join(", "))?;
        }
        Ok(())
    }
}
