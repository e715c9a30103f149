//! MDCT lookup construction.

use std::f64::consts::PI;

use crate::core::descriptor::MdctLookup;

use super::kiss_fft::fft_alloc;
use super::CeltWord;

/// Build the lookup of an `n` point MDCT with one FFT plan per shift up to `max_shift`.
///
/// Returns the failing FFT size when a plan cannot be factored.
pub fn mdct_init<W: CeltWord>(n: usize, max_shift: usize) -> Result<MdctLookup<W>, usize> {
    let mut kfft = Vec::with_capacity(max_shift + 1);
    for shift in 0..=max_shift {
        let nfft = n >> 2 >> shift;
        let state = fft_alloc::<W>(nfft, kfft.first()).ok_or(nfft)?;
        kfft.push(state);
    }

    let n4 = n >> 2;
    let trig = (0..=n4)
        .map(|i| W::trig((2.0 * PI * i as f64 / n as f64).cos()))
        .collect();

    Ok(MdctLookup {
        n,
        max_shift,
        kfft,
        trig,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_lookup_shape() {
        let mdct = mdct_init::<f32>(1920, 3).unwrap();
        assert_eq!(mdct.kfft.len(), 4);
        assert_eq!(mdct.trig.len(), 481);
        let sizes: Vec<usize> = mdct.kfft.iter().map(|s| s.nfft).collect();
        assert_eq!(sizes, vec![480, 240, 120, 60]);
        assert!(mdct.kfft.iter().all(|s| Rc::ptr_eq(&s.twiddles, &mdct.kfft[0].twiddles)));
        assert_eq!(mdct.trig[0], 1.0);
    }

    #[test]
    fn test_unfactorable_size() {
        assert_eq!(mdct_init::<i16>(616, 0).unwrap_err(), 154);
    }
}
