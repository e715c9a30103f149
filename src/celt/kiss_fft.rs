// This module plans the complex FFTs used by the MDCT. A plan factors its length into
// radix 4, 2, 3 and 5 stages (longest radix 4 run last after reversal), records the
// input permutation produced by that stage order, and either computes its own twiddle
// table or borrows the one of a larger plan through a power-of-two stride.

//! FFT plans.

use std::f64::consts::PI;
use std::rc::Rc;

use crate::core::descriptor::{FftState, Twiddle, MAX_FACTORS};

use super::CeltWord;

/// Radix stages of an `n` point FFT as `(radix, remaining length)` pairs.
///
/// Returns `None` when `n` has a prime factor above 5.
pub fn kf_factor(nfft: usize) -> Option<[i16; 2 * MAX_FACTORS]> {
    let mut facbuf = [0i16; 2 * MAX_FACTORS];
    let mut n = nfft;
    let mut p = 4;
    let mut stages = 0;

    loop {
        while n % p != 0 {
            p = match p {
                4 => 2,
                2 => 3,
                _ => p + 2,
            };
            if p * p > n {
                p = n;
            }
        }
        n /= p;
        if p > 5 || stages >= MAX_FACTORS {
            return None;
        }
        facbuf[2 * stages] = p as i16;
        if p == 2 && stages > 1 {
            facbuf[2 * stages] = 4;
            facbuf[2] = 2;
        }
        stages += 1;
        if n <= 1 {
            break;
        }
    }

    for i in 0..stages / 2 {
        facbuf.swap(2 * i, 2 * (stages - i - 1));
    }
    let mut n = nfft;
    for i in 0..stages {
        n /= facbuf[2 * i] as usize;
        facbuf[2 * i + 1] = n as i16;
    }
    Some(facbuf)
}

/// Input permutation of a plan with the given stage factors.
pub fn compute_bitrev_table(nfft: usize, factors: &[i16]) -> Vec<i16> {
    let mut bitrev = vec![0i16; nfft];
    fill_bitrev(&mut bitrev, 0, 0, 1, factors);
    bitrev
}

fn fill_bitrev(table: &mut [i16], mut fout: usize, mut pos: usize, fstride: usize, factors: &[i16]) {
    let p = factors[0] as usize;
    let m = factors[1] as usize;
    if m == 1 {
        for j in 0..p {
            table[pos] = (fout + j) as i16;
            pos += fstride;
        }
    } else {
        for _ in 0..p {
            fill_bitrev(table, fout, pos, fstride * p, &factors[2..]);
            pos += fstride;
            fout += m;
        }
    }
}

/// `e^{-2 pi i k / nfft}` for every `k`.
pub fn compute_twiddles<W: CeltWord>(nfft: usize) -> Rc<[Twiddle<W>]> {
    (0..nfft)
        .map(|i| {
            let phase = (-2.0 * PI / nfft as f64) * i as f64;
            Twiddle {
                r: W::trig(phase.cos()),
                i: W::trig(phase.sin()),
            }
        })
        .collect()
}

/// Plan an `nfft` point FFT, sharing the twiddles of `base` when given.
pub fn fft_alloc<W: CeltWord>(nfft: usize, base: Option<&FftState<W>>) -> Option<FftState<W>> {
    let factors = kf_factor(nfft)?;
    let (twiddles, shift) = match base {
        Some(base) => {
            let shift = (0..32).find(|&s| nfft << s == base.nfft)?;
            (Rc::clone(&base.twiddles), shift)
        }
        None => (compute_twiddles::<W>(nfft), -1),
    };
    log::trace!("FFT plan nfft={} shift={} factors={:?}", nfft, shift, factors);

    Some(FftState {
        nfft,
        scale: W::fft_scale(nfft),
        shift,
        bitrev: compute_bitrev_table(nfft, &factors),
        factors,
        twiddles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_480() {
        let factors = kf_factor(480).unwrap();
        assert_eq!(&factors[..10], &[5, 96, 3, 32, 4, 8, 2, 4, 4, 1]);
        assert!(factors[10..].iter().all(|&f| f == 0));
    }

    #[test]
    fn test_factor_rejects_large_primes() {
        assert!(kf_factor(154).is_none());
        assert!(kf_factor(7).is_none());
        assert_eq!(&kf_factor(60).unwrap()[..6], &[5, 12, 3, 4, 4, 1]);
    }

    #[test]
    fn test_bitrev_is_permutation() {
        for nfft in [60, 120, 240, 480] {
            let factors = kf_factor(nfft).unwrap();
            let mut bitrev = compute_bitrev_table(nfft, &factors);
            bitrev.sort_unstable();
            assert!(bitrev.iter().enumerate().all(|(i, &v)| v as usize == i));
        }
    }

    #[test]
    fn test_radix4_bitrev() {
        let factors = kf_factor(16).unwrap();
        let bitrev = compute_bitrev_table(16, &factors);
        assert_eq!(bitrev, vec![0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15]);
    }

    #[test]
    fn test_sub_plans_share_twiddles() {
        let base = fft_alloc::<f32>(240, None).unwrap();
        assert_eq!(base.shift, -1);
        assert_eq!(base.twiddles.len(), 240);
        assert_eq!(base.scale, Some(1.0 / 240.0));

        let half = fft_alloc::<f32>(120, Some(&base)).unwrap();
        assert_eq!(half.shift, 1);
        assert!(Rc::ptr_eq(&half.twiddles, &base.twiddles));

        let quarter = fft_alloc::<f32>(60, Some(&base)).unwrap();
        assert_eq!(quarter.shift, 2);
    }

    #[test]
    fn test_first_twiddles() {
        let tw = compute_twiddles::<f32>(4);
        assert_eq!(tw[0], Twiddle { r: 1.0, i: 0.0 });
        assert!((tw[1].i + 1.0).abs() < 1e-6);

        let fixed = compute_twiddles::<i16>(4);
        assert_eq!(fixed[0].r, 32767);
        assert_eq!(fixed[1].i, -32767);
    }
}
