// This module drives a whole compile run. A Batch pairs the ordered descriptors with one
// EmitSession, so the table registry lives exactly as long as the batch and every mode
// sees what earlier modes already emitted. The body starts with a provenance comment
// naming each requested (rate, frame size) pair, delegates each mode to the mode
// emitter in input order, and ends with the static mode list whose order consumers rely
// on positionally. The companion header is a separate entry point that folds frame
// size, overlap and channel count across the batch and only defines the properties
// every mode agrees on.

//! Batch driver and companion header.

use bumpalo::Bump;
use std::fmt::Write;

use crate::core::descriptor::ModeDescriptor;
use crate::core::error::DumpResult;
use crate::core::identity::ModeIdentity;
use crate::core::numeric::Word;
use crate::core::session::{EmitSession, SessionStats};

use super::mode::emit_mode;

/// Ordered modes plus the registry shared by all of them.
pub struct Batch<'m, 'arena, W> {
    modes: &'m [ModeDescriptor<W>],
    session: EmitSession<'arena>,
}

impl<'m, 'arena, W: Word> Batch<'m, 'arena, W> {
    pub fn new(arena: &'arena Bump, modes: &'m [ModeDescriptor<W>]) -> Self {
        Self {
            modes,
            session: EmitSession::new(arena),
        }
    }

    /// Write the body file: every mode, then the mode list.
    pub fn write_body<O: Write>(&self, out: &mut O) -> DumpResult<()> {
        dump_modes(out, self.modes, &self.session)
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }
}

/// Write all `modes` to `out`, deduplicating tables through `session`.
pub fn dump_modes<W, O>(out: &mut O, modes: &[ModeDescriptor<W>], session: &EmitSession<'_>) -> DumpResult<()>
where
    W: Word,
    O: Write,
{
    for mode in modes {
        mode.check_lengths()?;
    }

    writeln!(
        out,
        "/* The contents of this file was automatically generated by dump_modes"
    )?;
    write!(out, "   with arguments:")?;
    for mode in modes {
        write!(out, " {} {}", mode.sample_rate, mode.frame_size())?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "   It contains static definitions for some pre-defined modes. */"
    )?;
    writeln!(out, "#include \"modes.h\"")?;
    writeln!(out, "#include \"rate.h\"")?;
    writeln!(out)?;

    for mode in modes {
        emit_mode(out, mode, session)?;
    }

    writeln!(out)?;
    writeln!(out, "/* List of all the available modes */")?;
    writeln!(out, "#define TOTAL_MODES {}", modes.len())?;
    writeln!(
        out,
        "static const CELTMode * const static_mode_list[TOTAL_MODES] = {{"
    )?;
    for mode in modes {
        writeln!(out, "&{},", ModeIdentity::derive(mode).mode_symbol())?;
    }
    writeln!(out, "}};")?;

    log::info!("{}", session.stats());
    Ok(())
}

/// Compile `modes` into the body text with a fresh registry.
pub fn compile<W: Word>(modes: &[ModeDescriptor<W>]) -> DumpResult<String> {
    let arena = Bump::new();
    let batch = Batch::new(&arena, modes);
    let mut out = String::new();
    batch.write_body(&mut out)?;
    Ok(out)
}

/// Batch-wide agreement on one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniformity<T> {
    /// No mode supplied a value.
    Absent,
    /// Every mode agrees.
    Uniform(T),
    /// At least two modes disagree.
    Mixed,
}

impl<T: PartialEq + Copy> Uniformity<T> {
    #[must_use]
    pub fn observe(self, value: T) -> Self {
        match self {
            Uniformity::Absent => Uniformity::Uniform(value),
            Uniformity::Uniform(current) if current == value => self,
            Uniformity::Uniform(_) | Uniformity::Mixed => Uniformity::Mixed,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Uniformity::Uniform(value) => Some(value),
            Uniformity::Absent | Uniformity::Mixed => None,
        }
    }
}

/// Properties shared by every mode of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    /// No descriptor field feeds this yet, so it stays `Absent`.
    pub channels: Uniformity<usize>,
    pub frame_size: Uniformity<usize>,
    pub overlap: Uniformity<usize>,
}

impl HeaderSummary {
    pub fn from_modes<W: Word>(modes: &[ModeDescriptor<W>]) -> Self {
        modes.iter().fold(
            HeaderSummary {
                channels: Uniformity::Absent,
                frame_size: Uniformity::Absent,
                overlap: Uniformity::Absent,
            },
            |summary, mode| HeaderSummary {
                channels: summary.channels,
                frame_size: summary.frame_size.observe(mode.frame_size()),
                overlap: summary.overlap.observe(mode.overlap),
            },
        )
    }

    pub fn write<O: Write>(&self, out: &mut O) -> DumpResult<()> {
        writeln!(out, "/* This header file is generated automatically*/")?;
        if let Some(channels) = self.channels.value().filter(|&c| c > 0) {
            writeln!(out, "#define CHANNELS(mode) {channels}")?;
            if channels == 1 {
                writeln!(out, "#define DISABLE_STEREO")?;
            }
        }
        if let Some(frame_size) = self.frame_size.value().filter(|&f| f > 0) {
            writeln!(out, "#define FRAMESIZE(mode) {frame_size}")?;
        }
        if let Some(overlap) = self.overlap.value().filter(|&o| o > 0) {
            writeln!(out, "#define OVERLAP(mode) {overlap}")?;
        }
        Ok(())
    }
}

/// Write the companion header summarizing `modes`.
pub fn dump_header<W, O>(out: &mut O, modes: &[ModeDescriptor<W>]) -> DumpResult<()>
where
    W: Word,
    O: Write,
{
    let summary = HeaderSummary::from_modes(modes);
    log::debug!("Header summary: {:?}", summary);
    summary.write(out)
}
