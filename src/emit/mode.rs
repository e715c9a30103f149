// This module writes one mode descriptor as C source: the guarded sub-tables (band
// edges, window, allocation vectors, logN, pulse cache group, FFT twiddles, bit-reversal
// tables, FFT states, MDCT twiddles) followed by the mode record that ties them
// together. Every sub-table is checked in with the session registry before it is
// written, so a table already produced for an earlier mode of the batch is only
// referenced. Standard modes reference the built-in band edge and allocation tables;
// those two decisions are taken independently even though they share one predicate.
// Declared table sizes always come from the descriptor's derived lengths, and the same
// lengths are handed to the registry so a shared table is never referenced by a mode
// that needs a differently sized one.

//! Mode emitter.

use std::fmt::Write;

use crate::core::descriptor::ModeDescriptor;
use crate::core::error::DumpResult;
use crate::core::identity::{ModeIdentity, TableKey};
use crate::core::numeric::{NumericMode, Word};
use crate::core::session::EmitSession;

use super::layout::{Layout, BYTE_TABLE, TWIDDLE_TABLE, WORD_TABLE};

/// C type of `opus_val16` tables.
const VAL16: &str = "opus_val16";
const INT16: &str = "opus_int16";
const UCHAR: &str = "unsigned char";

/// Write every table of `mode` not yet present in `session`, then its mode record.
pub fn emit_mode<W, O>(out: &mut O, mode: &ModeDescriptor<W>, session: &EmitSession<'_>) -> DumpResult<()>
where
    W: Word,
    O: Write,
{
    mode.check_lengths()?;
    let mut emitter = ModeEmitter::new(out, mode, session);
    emitter.emit_all()
}

struct ModeEmitter<'a, 's, W, O> {
    out: &'a mut O,
    mode: &'a ModeDescriptor<W>,
    session: &'a EmitSession<'s>,
    id: ModeIdentity,
}

impl<'a, 's, W: Word, O: Write> ModeEmitter<'a, 's, W, O> {
    fn new(out: &'a mut O, mode: &'a ModeDescriptor<W>, session: &'a EmitSession<'s>) -> Self {
        Self {
            out,
            mode,
            session,
            id: ModeIdentity::derive(mode),
        }
    }

    fn emit_all(&mut self) -> DumpResult<()> {
        log::debug!(
            "Emitting mode {} (standard: {})",
            self.id.mode_symbol(),
            self.id.is_standard
        );
        self.emit_band_edges()?;
        self.emit_window()?;
        self.emit_alloc_vectors()?;
        self.emit_log_n()?;
        self.emit_pulse_cache()?;
        self.emit_fft()?;
        self.emit_mdct_twiddles()?;
        self.emit_mode_record()
    }

    // ── Guarded table helpers ──────────────────────────────────────────

    /// Check `key` in and open its guard. Returns false when already emitted.
    fn open_guard(&mut self, key: &TableKey, shape: &[usize]) -> DumpResult<bool> {
        if !self.session.ensure_emitted(key, shape)?.is_fresh() {
            return Ok(false);
        }
        let guard = key.guard();
        writeln!(self.out, "#ifndef {guard}")?;
        writeln!(self.out, "#define {guard}")?;
        Ok(true)
    }

    fn close_guard(&mut self) -> DumpResult<()> {
        writeln!(self.out, "#endif")?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_table<I, T>(
        &mut self,
        c_type: &str,
        symbol: &str,
        len: usize,
        layout: Layout,
        values: I,
    ) -> DumpResult<()>
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        writeln!(self.out, "static const {c_type} {symbol}[{len}] = {{")?;
        let written = layout.write_values(&mut *self.out, values)?;
        writeln!(self.out, "}};")?;
        self.session.record_values(written);
        Ok(())
    }

    // ── Tables ─────────────────────────────────────────────────────────

    fn emit_band_edges(&mut self) -> DumpResult<()> {
        if self.id.uses_default_band_edges() {
            return Ok(());
        }
        let key = self.id.band_edges_key();
        if !self.open_guard(&key, &[self.mode.ebands_len()])? {
            return Ok(());
        }
        let mode = self.mode;
        self.write_table(
            INT16,
            &key.symbol(),
            mode.ebands_len(),
            Layout::Inline,
            &mode.ebands,
        )?;
        self.close_guard()
    }

    fn emit_window(&mut self) -> DumpResult<()> {
        let key = self.id.window_key();
        if !self.open_guard(&key, &[self.mode.window_len()])? {
            return Ok(());
        }
        let mode = self.mode;
        self.write_table(
            VAL16,
            &key.symbol(),
            mode.window_len(),
            WORD_TABLE,
            mode.window.iter().map(W::literal),
        )?;
        self.close_guard()
    }

    fn emit_alloc_vectors(&mut self) -> DumpResult<()> {
        if self.id.uses_default_allocation() {
            return Ok(());
        }
        let key = self.id.alloc_vectors_key();
        if !self.open_guard(&key, &[self.mode.alloc_vectors_len()])? {
            return Ok(());
        }
        let mode = self.mode;
        self.write_table(
            UCHAR,
            &key.symbol(),
            mode.alloc_vectors_len(),
            Layout::Rows {
                width: 2,
                per_row: mode.nb_ebands,
            },
            &mode.alloc_vectors,
        )?;
        self.close_guard()
    }

    fn emit_log_n(&mut self) -> DumpResult<()> {
        let key = self.id.log_n_key();
        if !self.open_guard(&key, &[self.mode.log_n_len()])? {
            return Ok(());
        }
        let mode = self.mode;
        self.write_table(
            INT16,
            &key.symbol(),
            mode.log_n_len(),
            Layout::Inline,
            &mode.log_n,
        )?;
        self.close_guard()
    }

    /// Index, bits and caps share one guard and are written together.
    fn emit_pulse_cache(&mut self) -> DumpResult<()> {
        let mode = self.mode;
        let key = self.id.pulse_cache_key();
        let shape = [
            mode.cache_index_len(),
            mode.cache_bits_len(),
            mode.cache_caps_len(),
        ];
        if !self.open_guard(&key, &shape)? {
            return Ok(());
        }
        let symbols = self.id.pulse_cache_symbols();
        self.write_table(
            INT16,
            &symbols.index,
            mode.cache_index_len(),
            BYTE_TABLE,
            &mode.cache.index,
        )?;
        self.write_table(
            UCHAR,
            &symbols.bits,
            mode.cache_bits_len(),
            BYTE_TABLE,
            &mode.cache.bits,
        )?;
        self.write_table(
            UCHAR,
            &symbols.caps,
            mode.cache_caps_len(),
            BYTE_TABLE,
            &mode.cache.caps,
        )?;
        self.close_guard()
    }

    fn emit_fft(&mut self) -> DumpResult<()> {
        let mode = self.mode;
        let Some(base) = mode.mdct.kfft.first() else {
            return Ok(());
        };

        let twiddles_key = self.id.fft_twiddles_key();
        if self.open_guard(&twiddles_key, &[base.nfft])? {
            writeln!(
                self.out,
                "static const kiss_twiddle_cpx {}[{}] = {{",
                twiddles_key.symbol(),
                base.nfft
            )?;
            let written = TWIDDLE_TABLE.write_values(
                &mut *self.out,
                base.twiddles
                    .iter()
                    .map(|t| format!("{{{}, {}}}", t.r.literal(), t.i.literal())),
            )?;
            writeln!(self.out, "}};")?;
            self.session.record_values(2 * written);
            self.close_guard()?;
        }

        for state in &mode.mdct.kfft {
            let key = TableKey::FftBitrev { nfft: state.nfft };
            if !self.open_guard(&key, &[state.nfft])? {
                continue;
            }
            self.write_table(INT16, &key.symbol(), state.nfft, BYTE_TABLE, &state.bitrev)?;
            self.close_guard()?;
        }

        for (shift, state) in mode.mdct.kfft.iter().enumerate() {
            let key = self.id.fft_state_key(shift);
            if !self.open_guard(&key, &[state.nfft])? {
                continue;
            }
            writeln!(self.out, "static const kiss_fft_state {} = {{", key.symbol())?;
            writeln!(self.out, "{},\t/* nfft */", state.nfft)?;
            if W::MODE == NumericMode::Float {
                if let Some(scale) = state.scale {
                    writeln!(self.out, "{},\t/* scale */", scale.literal())?;
                }
            }
            writeln!(self.out, "{},\t/* shift */", state.shift)?;
            write!(self.out, "{{")?;
            Layout::Inline.write_values(&mut *self.out, state.factors)?;
            writeln!(self.out, "}},\t/* factors */")?;
            writeln!(
                self.out,
                "{},\t/* bitrev */",
                TableKey::FftBitrev { nfft: state.nfft }.symbol()
            )?;
            writeln!(self.out, "{},\t/* twiddles */", twiddles_key.symbol())?;
            writeln!(self.out, "}};")?;
            self.close_guard()?;
        }
        Ok(())
    }

    fn emit_mdct_twiddles(&mut self) -> DumpResult<()> {
        let key = self.id.mdct_twiddles_key();
        if !self.open_guard(&key, &[self.mode.mdct_trig_len()])? {
            return Ok(());
        }
        let mode = self.mode;
        self.write_table(
            VAL16,
            &key.symbol(),
            mode.mdct_trig_len(),
            WORD_TABLE,
            mode.mdct.trig.iter().map(W::literal),
        )?;
        self.close_guard()
    }

    // ── Mode record ────────────────────────────────────────────────────

    /// Never deduplicated: every mode gets its own record.
    fn emit_mode_record(&mut self) -> DumpResult<()> {
        let mode = self.mode;
        let id = self.id;
        let symbol = id.mode_symbol();

        writeln!(self.out, "static const CELTMode {symbol} = {{")?;
        writeln!(self.out, "{},\t/* Fs */", mode.sample_rate)?;
        writeln!(self.out, "{},\t/* overlap */", mode.overlap)?;
        writeln!(self.out, "{},\t/* nbEBands */", mode.nb_ebands)?;
        writeln!(self.out, "{},\t/* effEBands */", mode.eff_ebands)?;

        write!(self.out, "{{")?;
        Layout::Inline.write_values(&mut *self.out, mode.preemph.iter().map(W::literal))?;
        writeln!(self.out, "}},\t/* preemph */")?;

        writeln!(self.out, "{},\t/* eBands */", id.band_edges_symbol())?;
        writeln!(self.out, "{},\t/* maxLM */", mode.max_lm)?;
        writeln!(self.out, "{},\t/* nbShortMdcts */", mode.nb_short_mdcts)?;
        writeln!(self.out, "{},\t/* shortMdctSize */", mode.short_mdct_size)?;
        writeln!(self.out, "{},\t/* nbAllocVectors */", mode.nb_alloc_vectors)?;
        writeln!(self.out, "{},\t/* allocVectors */", id.alloc_vectors_symbol())?;
        writeln!(self.out, "{},\t/* logN */", id.log_n_key().symbol())?;
        writeln!(self.out, "{},\t/* window */", id.window_key().symbol())?;

        write!(self.out, "{{{}, {}, {{", mode.mdct.n, mode.mdct.max_shift)?;
        for shift in 0..mode.fft_levels() {
            write!(self.out, "&{}, ", id.fft_state_key(shift).symbol())?;
        }
        writeln!(
            self.out,
            "}}, {}}},\t/* mdct */",
            id.mdct_twiddles_key().symbol()
        )?;

        let cache = id.pulse_cache_symbols();
        writeln!(
            self.out,
            "{{{}, {}, {}, {}}},\t/* cache */",
            mode.cache.size, cache.index, cache.bits, cache.caps
        )?;
        writeln!(self.out, "}};")?;

        self.session.record_mode_emitted(&symbol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::test::{definition_count, synthetic_mode, table_values};
    use bumpalo::Bump;

    fn emit_one<W: crate::core::test_utils::test::TestWord>(mode: &ModeDescriptor<W>) -> String {
        let arena = Bump::new();
        let session = EmitSession::new(&arena);
        let mut out = String::new();
        emit_mode(&mut out, mode, &session).unwrap();
        out
    }

    #[test]
    fn test_standard_mode_uses_default_tables() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);

        assert!(!out.contains("DEF_EBANDS48000_960"));
        assert!(!out.contains("DEF_ALLOC_VECTORS48000_960"));
        assert!(out.contains("eband5ms,\t/* eBands */"));
        assert!(out.contains("band_allocation,\t/* allocVectors */"));
    }

    #[test]
    fn test_custom_mode_gets_own_tables() {
        let mode = synthetic_mode::<f32>(8000, 120);
        let out = emit_one(&mode);

        assert_eq!(definition_count(&out, "eBands8000_120"), 1);
        assert_eq!(definition_count(&out, "allocVectors8000_120"), 1);
        assert!(out.contains("eBands8000_120,\t/* eBands */"));
        assert!(out.contains("allocVectors8000_120,\t/* allocVectors */"));

        let ebands = table_values(&out, "eBands8000_120").unwrap();
        assert_eq!(ebands.len(), mode.ebands_len());
    }

    #[test]
    fn test_window_values_survive_wrapping() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);

        let parsed: Vec<f32> = table_values(&out, "window120")
            .unwrap()
            .iter()
            .map(|v| v.trim_end_matches('f').parse().unwrap())
            .collect();
        assert_eq!(parsed.len(), mode.window.len());
        for (parsed, original) in parsed.iter().zip(&mode.window) {
            assert_eq!(parsed.to_bits(), original.to_bits());
        }
    }

    #[test]
    fn test_fixed_point_omits_scale() {
        let mode = synthetic_mode::<i16>(48000, 960);
        let out = emit_one(&mode);

        assert!(!out.contains("/* scale */"));
        let window = table_values(&out, "window120").unwrap();
        let expected: Vec<String> = mode.window.iter().map(|w| w.to_string()).collect();
        assert_eq!(window, expected);
    }

    #[test]
    fn test_float_states_carry_scale() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);
        assert_eq!(out.matches("/* scale */").count(), mode.fft_levels());
    }

    #[test]
    fn test_fft_tables_per_level() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);

        assert_eq!(definition_count(&out, "fft_twiddles48000_960"), 1);
        for (shift, state) in mode.mdct.kfft.iter().enumerate() {
            let bitrev = format!("fft_bitrev{}", state.nfft);
            assert_eq!(definition_count(&out, &bitrev), 1);
            let record = table_values(&out, &format!("fft_state48000_960_{shift}")).unwrap();
            assert_eq!(record[0], state.nfft.to_string());
            assert!(record.contains(&bitrev));
            assert!(record.contains(&"fft_twiddles48000_960".to_string()));
        }
        let twiddles = table_values(&out, "fft_twiddles48000_960").unwrap();
        assert_eq!(twiddles.len(), 2 * mode.mdct.kfft[0].nfft);
    }

    #[test]
    fn test_pulse_cache_group() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);

        assert_eq!(out.matches("#ifndef DEF_PULSE_CACHE50\n").count(), 1);
        assert_eq!(table_values(&out, "cache_index50").unwrap().len(), mode.cache_index_len());
        assert_eq!(table_values(&out, "cache_bits50").unwrap().len(), mode.cache.size);
        assert_eq!(table_values(&out, "cache_caps50").unwrap().len(), mode.cache_caps_len());
    }

    #[test]
    fn test_mode_record_fields() {
        let mode = synthetic_mode::<f32>(48000, 960);
        let out = emit_one(&mode);

        let record = table_values(&out, "mode48000_960_120").unwrap();
        assert_eq!(record[0], "48000");
        assert_eq!(record[1], "120");
        assert_eq!(record[2], "21");
        assert!(record.contains(&"window120".to_string()));
        assert!(record.contains(&"logN400".to_string()));
        assert!(record.contains(&"mdct_twiddles960".to_string()));
        assert!(record.contains(&"&fft_state48000_960_3".to_string()));
        assert!(record.contains(&"cache_caps50".to_string()));
    }

    #[test]
    fn test_malformed_descriptor_is_reported() {
        let mut mode = synthetic_mode::<f32>(8000, 120);
        mode.log_n.push(3);

        let arena = Bump::new();
        let session = EmitSession::new(&arena);
        let mut out = String::new();
        assert!(emit_mode(&mut out, &mode, &session).is_err());
        assert!(out.is_empty());
        assert!(session.emitted_guards().is_empty());
    }

    #[test]
    fn test_float_plan_without_scale_writes_nothing() {
        let mut mode = synthetic_mode::<f32>(48000, 960);
        mode.mdct.kfft[0].scale = None;

        let arena = Bump::new();
        let session = EmitSession::new(&arena);
        let mut out = String::new();
        assert!(matches!(
            emit_mode(&mut out, &mode, &session),
            Err(crate::core::DumpError::MissingScale { shift: 0, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_shared_key_with_other_lengths_is_rejected() {
        let first = synthetic_mode::<f32>(48000, 960);
        let mut second = synthetic_mode::<f32>(48000, 480);
        // Same cache rate as the first mode, with fewer bands.
        second.sample_rate = 24000;
        second.nb_ebands -= 1;
        second.ebands.pop();
        second.log_n.pop();
        second.alloc_vectors.truncate(second.nb_alloc_vectors * second.nb_ebands);
        second.cache.index.truncate(second.nb_ebands * (second.max_lm + 2));
        second.cache.caps.truncate((second.max_lm + 1) * 2 * second.nb_ebands);
        second.check_lengths().unwrap();

        let arena = Bump::new();
        let session = EmitSession::new(&arena);
        let mut out = String::new();
        emit_mode(&mut out, &first, &session).unwrap();
        assert!(matches!(
            emit_mode(&mut out, &second, &session),
            Err(crate::core::DumpError::ShapeMismatch { .. })
        ));
    }
}
