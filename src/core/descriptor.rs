// This module models the read-only mode descriptor consumed by the emitter: one fully
// computed CELT custom-mode configuration (band layout, window, allocation vectors,
// logN, pulse cache, MDCT lookup with its per-shift FFT plans). Table lengths are fixed
// by the descriptor's scalar fields, so every length has a named derivation here and
// `check_lengths` compares each supplied table against it before anything is emitted.
// FFT plans of the same transform share one twiddle table through an `Rc` slice.

//! Mode descriptor model.

use std::rc::Rc;

use super::error::{DumpError, DumpResult};
use super::numeric::{NumericMode, Word};

/// Maximum number of radix stages of an FFT plan.
pub const MAX_FACTORS: usize = 8;

/// Complex twiddle factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twiddle<W> {
    pub r: W,
    pub i: W,
}

/// FFT plan for one shift level of the MDCT.
#[derive(Debug, Clone, PartialEq)]
pub struct FftState<W> {
    /// Number of points.
    pub nfft: usize,
    /// `1/nfft`, only present for floating-point words.
    pub scale: Option<W>,
    /// Twiddle stride relative to the level 0 plan (-1 for the level 0 plan itself).
    pub shift: i32,
    /// `(radix, remaining length)` pairs, zero padded.
    pub factors: [i16; 2 * MAX_FACTORS],
    pub bitrev: Vec<i16>,
    /// Twiddles of the level 0 plan, shared by every level.
    pub twiddles: Rc<[Twiddle<W>]>,
}

/// MDCT lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct MdctLookup<W> {
    pub n: usize,
    pub max_shift: usize,
    pub kfft: Vec<FftState<W>>,
    pub trig: Vec<W>,
}

/// Pulse cache tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PulseCache {
    pub size: usize,
    pub index: Vec<i16>,
    pub bits: Vec<u8>,
    pub caps: Vec<u8>,
}

/// One computed codec mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeDescriptor<W> {
    pub sample_rate: i32,
    pub overlap: usize,
    pub nb_ebands: usize,
    pub eff_ebands: usize,
    pub preemph: [W; 4],
    pub ebands: Vec<i16>,
    pub max_lm: usize,
    pub nb_short_mdcts: usize,
    pub short_mdct_size: usize,
    pub nb_alloc_vectors: usize,
    pub alloc_vectors: Vec<u8>,
    pub log_n: Vec<i16>,
    pub window: Vec<W>,
    pub mdct: MdctLookup<W>,
    pub cache: PulseCache,
}

impl<W: Word> ModeDescriptor<W> {
    /// Samples per frame.
    pub fn frame_size(&self) -> usize {
        self.nb_short_mdcts * self.short_mdct_size
    }

    pub fn ebands_len(&self) -> usize {
        self.nb_ebands + 2
    }

    pub fn alloc_vectors_len(&self) -> usize {
        self.nb_alloc_vectors * self.nb_ebands
    }

    pub fn log_n_len(&self) -> usize {
        self.nb_ebands
    }

    pub fn window_len(&self) -> usize {
        self.overlap
    }

    pub fn cache_index_len(&self) -> usize {
        self.nb_ebands * (self.max_lm + 2)
    }

    pub fn cache_bits_len(&self) -> usize {
        self.cache.size
    }

    pub fn cache_caps_len(&self) -> usize {
        (self.max_lm + 1) * 2 * self.nb_ebands
    }

    pub fn fft_levels(&self) -> usize {
        self.mdct.max_shift + 1
    }

    pub fn mdct_trig_len(&self) -> usize {
        self.mdct.n / 4 + 1
    }

    /// Compare every supplied table with the length derived from the scalar fields.
    ///
    /// Floating-point FFT plans must also carry their scale, since the state
    /// record has a field for it.
    pub fn check_lengths(&self) -> DumpResult<()> {
        self.expect_len("eBands", self.ebands_len(), self.ebands.len())?;
        self.expect_len("window", self.window_len(), self.window.len())?;
        self.expect_len(
            "allocVectors",
            self.alloc_vectors_len(),
            self.alloc_vectors.len(),
        )?;
        self.expect_len("logN", self.log_n_len(), self.log_n.len())?;
        self.expect_len("cache_index", self.cache_index_len(), self.cache.index.len())?;
        self.expect_len("cache_bits", self.cache_bits_len(), self.cache.bits.len())?;
        self.expect_len("cache_caps", self.cache_caps_len(), self.cache.caps.len())?;
        self.expect_len("mdct_twiddles", self.mdct_trig_len(), self.mdct.trig.len())?;
        self.expect_len("fft states", self.fft_levels(), self.mdct.kfft.len())?;

        for (shift, state) in self.mdct.kfft.iter().enumerate() {
            self.expect_len("fft_bitrev", state.nfft, state.bitrev.len())?;
            if W::MODE == NumericMode::Float && state.scale.is_none() {
                return Err(DumpError::MissingScale {
                    sample_rate: self.sample_rate,
                    frame_size: self.frame_size(),
                    shift,
                });
            }
        }
        if let Some(base) = self.mdct.kfft.first() {
            self.expect_len("fft_twiddles", base.nfft, base.twiddles.len())?;
        }
        Ok(())
    }

    fn expect_len(&self, table: &'static str, expected: usize, actual: usize) -> DumpResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(DumpError::TableLength {
                table,
                sample_rate: self.sample_rate,
                frame_size: self.frame_size(),
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::test_utils::test::synthetic_mode;
    use crate::core::DumpError;

    #[test]
    fn test_derived_lengths() {
        let mode = synthetic_mode::<f32>(8000, 120);
        assert_eq!(mode.frame_size(), 120);
        assert_eq!(mode.ebands_len(), mode.nb_ebands + 2);
        assert_eq!(mode.cache_index_len(), mode.nb_ebands * (mode.max_lm + 2));
        assert_eq!(mode.cache_caps_len(), (mode.max_lm + 1) * 2 * mode.nb_ebands);
        assert_eq!(mode.mdct_trig_len(), 2 * 120 / 4 + 1);
        assert!(mode.check_lengths().is_ok());
    }

    #[test]
    fn test_short_window_is_rejected() {
        let mut mode = synthetic_mode::<f32>(8000, 120);
        mode.window.pop();

        match mode.check_lengths() {
            Err(DumpError::TableLength {
                table,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(table, "window");
                assert_eq!(expected, mode.overlap);
                assert_eq!(actual, mode.overlap - 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cache_caps_mismatch_is_rejected() {
        let mut mode = synthetic_mode::<i16>(48000, 240);
        mode.cache.caps.push(0);
        assert!(matches!(
            mode.check_lengths(),
            Err(DumpError::TableLength { table: "cache_caps", .. })
        ));
    }

    #[test]
    fn test_float_plan_without_scale_is_rejected() {
        let mut mode = synthetic_mode::<f32>(48000, 960);
        mode.mdct.kfft[2].scale = None;
        assert!(matches!(
            mode.check_lengths(),
            Err(DumpError::MissingScale { shift: 2, .. })
        ));
    }

    #[test]
    fn test_fixed_plan_needs_no_scale() {
        let mode = synthetic_mode::<i16>(48000, 960);
        assert!(mode.mdct.kfft.iter().all(|state| state.scale.is_none()));
        assert!(mode.check_lengths().is_ok());
    }
}
