// This module is the mode-construction collaborator: it turns a (sample rate, frame
// size) pair into the fully computed descriptor the emitter consumes. It validates the
// pair, picks the number of short blocks, lays out the bands and allocation vectors,
// builds the window, logN, pulse cache and the MDCT lookup with its FFT plans. The
// word type decides how real-valued quantities are quantized: float words keep the
// value, 16-bit fixed-point words store it in Q15 (or the given Q format).

//! CELT custom-mode construction.
//!
//! # Key Components
//!
//! - [`ModeFactory`] - seam between the CLI and mode construction
//! - [`create_mode`] - builds one [`ModeDescriptor`](crate::core::ModeDescriptor)
//! - `bands`, `rate`, `kiss_fft`, `mdct` - the table builders

pub mod bands;
pub mod kiss_fft;
pub mod mdct;
pub mod modes;
pub mod rate;
pub mod tables;

use crate::core::numeric::Word;

pub use modes::{create_mode, create_modes, CustomModeFactory, ModeFactory};

/// A table word that real-valued quantities can be quantized into.
pub trait CeltWord: Word {
    /// `x` in Q`bits` (`QCONST16`).
    fn qconst(x: f64, bits: u32) -> Self;

    /// A window sample in `[0, 1]`.
    fn window(x: f64) -> Self;

    /// A cosine or sine value in `[-1, 1]`.
    fn trig(x: f64) -> Self;

    /// Output scaling of an `nfft` point FFT, if the runtime stores one.
    fn fft_scale(nfft: usize) -> Option<Self>;
}

impl CeltWord for f32 {
    fn qconst(x: f64, _bits: u32) -> Self {
        x as f32
    }

    fn window(x: f64) -> Self {
        x as f32
    }

    fn trig(x: f64) -> Self {
        x as f32
    }

    fn fft_scale(nfft: usize) -> Option<Self> {
        Some(1.0 / nfft as f32)
    }
}

impl CeltWord for i16 {
    fn qconst(x: f64, bits: u32) -> Self {
        (0.5 + x * f64::from(1u32 << bits)) as i16
    }

    fn window(x: f64) -> Self {
        (0.5 + 32768.0 * x).floor().min(32767.0) as i16
    }

    fn trig(x: f64) -> Self {
        (32768.0 * x).round().clamp(-32767.0, 32767.0) as i16
    }

    fn fft_scale(_nfft: usize) -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_quantization() {
        assert_eq!(i16::qconst(0.8500061035, 15), 27853);
        assert_eq!(i16::qconst(1.0, 13), 8192);
        assert_eq!(i16::window(1.0), 32767);
        assert_eq!(i16::window(0.5), 16384);
        assert_eq!(i16::trig(-1.0), -32767);
        assert_eq!(i16::fft_scale(480), None);
    }

    #[test]
    fn test_float_quantization_keeps_value() {
        assert_eq!(f32::qconst(0.8500061035, 15), 0.8500061035f32);
        assert_eq!(f32::window(0.25), 0.25);
        assert_eq!(f32::fft_scale(4), Some(0.25));
    }
}
