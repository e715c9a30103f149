// This module builds complete mode descriptors. A (sample rate, frame size) pair is
// accepted when the rate is within 8..96 kHz, the frame is an even size of 40 to 1024
// samples lasting at least 1 ms, and the short blocks it splits into last at most
// 3.3 ms. The number of short blocks (1 << LM) is the largest that keeps short blocks
// of at least 2.5 ms (LM 3, 16-sample aligned), 5 ms or 10 ms. Every table of the
// descriptor is derived from the pair; nothing is read from prior state.

//! Mode construction.

use crate::core::descriptor::ModeDescriptor;
use crate::core::error::{ModeError, ModeResult};

use super::bands::{compute_allocation_table, compute_ebands, compute_log_n};
use super::mdct::mdct_init;
use super::rate::compute_pulse_cache;
use super::tables::BITALLOC_SIZE;
use super::CeltWord;

/// Builds descriptors for requested (sample rate, frame size) pairs.
pub trait ModeFactory<W> {
    fn create(&self, sample_rate: i32, frame_size: i32) -> ModeResult<ModeDescriptor<W>>;
}

/// Factory computing custom modes from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomModeFactory;

impl<W: CeltWord> ModeFactory<W> for CustomModeFactory {
    fn create(&self, sample_rate: i32, frame_size: i32) -> ModeResult<ModeDescriptor<W>> {
        create_mode(sample_rate, frame_size)
    }
}

/// Build every requested mode in order, stopping at the first refusal.
pub fn create_modes<W, F>(factory: &F, pairs: &[(i32, i32)]) -> ModeResult<Vec<ModeDescriptor<W>>>
where
    F: ModeFactory<W>,
{
    pairs
        .iter()
        .map(|&(sample_rate, frame_size)| factory.create(sample_rate, frame_size))
        .collect()
}

/// Pre-emphasis coefficients and the Q formats of their fixed-point forms.
const PREEMPH_Q: [u32; 4] = [15, 15, 12, 13];

fn preemph_coefs(sample_rate: i32) -> [f64; 4] {
    if sample_rate < 12000 {
        [0.3500061035, -0.1799926758, 0.2719968125, 3.6765480641]
    } else if sample_rate < 24000 {
        [0.6000061035, -0.1799926758, 0.4424998650, 2.2598876953]
    } else if sample_rate < 40000 {
        [0.7799987793, -0.1000061035, 0.7499771125, 1.3333740234]
    } else {
        [0.8500061035, 0.0, 1.0, 1.0]
    }
}

fn bad_argument(sample_rate: i32, frame_size: i32, reason: &'static str) -> ModeError {
    ModeError::BadArgument {
        sample_rate,
        frame_size,
        reason,
    }
}

/// Number of short blocks per frame, as a power of two.
fn frame_lm(sample_rate: i32, frame_size: i32) -> usize {
    let frame = i64::from(frame_size);
    let rate = i64::from(sample_rate);
    if frame * 75 >= rate && frame % 16 == 0 {
        3
    } else if frame * 150 >= rate && frame % 8 == 0 {
        2
    } else if frame * 300 >= rate && frame % 4 == 0 {
        1
    } else {
        0
    }
}

fn window<W: CeltWord>(overlap: usize) -> Vec<W> {
    use std::f64::consts::FRAC_PI_2;
    (0..overlap)
        .map(|i| {
            let s = (FRAC_PI_2 * (i as f64 + 0.5) / overlap as f64).sin();
            W::window((FRAC_PI_2 * s * s).sin())
        })
        .collect()
}

/// Compute the mode for `sample_rate` Hz and `frame_size` samples.
pub fn create_mode<W: CeltWord>(sample_rate: i32, frame_size: i32) -> ModeResult<ModeDescriptor<W>> {
    if !(8000..=96000).contains(&sample_rate) {
        return Err(bad_argument(
            sample_rate,
            frame_size,
            "sample rate must be within 8000..=96000",
        ));
    }
    if !(40..=1024).contains(&frame_size) || frame_size % 2 != 0 {
        return Err(bad_argument(
            sample_rate,
            frame_size,
            "frame size must be even and within 40..=1024",
        ));
    }
    if i64::from(frame_size) * 1000 < i64::from(sample_rate) {
        return Err(bad_argument(
            sample_rate,
            frame_size,
            "frames shorter than 1 ms are not supported",
        ));
    }

    let lm = frame_lm(sample_rate, frame_size);
    if i64::from(frame_size >> lm) * 300 > i64::from(sample_rate) {
        return Err(bad_argument(
            sample_rate,
            frame_size,
            "short blocks longer than 3.3 ms are not supported",
        ));
    }

    let nb_short_mdcts = 1usize << lm;
    let short_mdct_size = frame_size as usize / nb_short_mdcts;
    let short = short_mdct_size as i32;
    let res = (sample_rate + short) / (2 * short);

    let mut ebands = compute_ebands(sample_rate, short_mdct_size, res);
    let nb_ebands = ebands.len() - 1;
    let mut eff_ebands = nb_ebands;
    while eff_ebands > 0 && i32::from(ebands[eff_ebands]) > short {
        eff_ebands -= 1;
    }

    let alloc_vectors = compute_allocation_table(sample_rate, short_mdct_size, &ebands);
    let log_n = compute_log_n(&ebands);
    let cache = compute_pulse_cache(&ebands, &log_n, lm);

    let mdct = mdct_init::<W>(2 * short_mdct_size * nb_short_mdcts, lm).map_err(|nfft| {
        ModeError::UnsupportedFactor {
            sample_rate,
            frame_size,
            nfft,
        }
    })?;

    // The band table carries one entry past the last edge.
    let last = ebands[nb_ebands];
    ebands.push(last);

    let overlap = (short_mdct_size >> 2) << 2;
    let coefs = preemph_coefs(sample_rate);
    let preemph = [
        W::qconst(coefs[0], PREEMPH_Q[0]),
        W::qconst(coefs[1], PREEMPH_Q[1]),
        W::qconst(coefs[2], PREEMPH_Q[2]),
        W::qconst(coefs[3], PREEMPH_Q[3]),
    ];

    log::debug!(
        "Created mode Fs={} frame_size={}: {} bands ({} effective), LM {}, {} cache bytes",
        sample_rate,
        frame_size,
        nb_ebands,
        eff_ebands,
        lm,
        cache.size
    );

    Ok(ModeDescriptor {
        sample_rate,
        overlap,
        nb_ebands,
        eff_ebands,
        preemph,
        ebands,
        max_lm: lm,
        nb_short_mdcts,
        short_mdct_size,
        nb_alloc_vectors: BITALLOC_SIZE,
        alloc_vectors,
        log_n,
        window: window::<W>(overlap),
        mdct,
        cache,
    })
}
