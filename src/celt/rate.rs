// This module builds the pulse cache of a custom mode. For every (band, LM) pair the
// band is halved to its PVQ size N and pairs of the same size share one cache entry.
// Each entry holds the number of pseudo-pulse levels K followed by the cost in 1/8 bits
// of coding each level. The caps table bounds the bits a band can usefully take at
// each LM for mono and stereo, including split, stereo and fine energy costs.

//! Pulse cache and bit caps.

use crate::core::descriptor::PulseCache;

/// Fractional bits of the rate tables.
pub const BITRES: i32 = 3;
pub const MAX_PSEUDO: i32 = 40;
pub const CELT_MAX_PULSES: usize = 128;
pub const MAX_FINE_BITS: i32 = 8;
pub const FINE_OFFSET: i32 = 21;
pub const QTHETA_OFFSET: i32 = 4;
pub const QTHETA_OFFSET_TWOPHASE: i32 = 16;

fn ilog(val: u32) -> i32 {
    32 - val.leading_zeros() as i32
}

/// `log2(val)` with `frac` fractional bits, rounded up.
pub fn log2_frac(mut val: u32, mut frac: i32) -> i32 {
    let mut l = ilog(val);
    if val & val.wrapping_sub(1) == 0 {
        return (l - 1) << frac;
    }
    if l > 16 {
        val = ((val - 1) >> (l - 16)) + 1;
    } else {
        val <<= 16 - l;
    }
    l = (l - 1) << frac;
    loop {
        let b = val >> 16;
        l += (b as i32) << frac;
        val = (val + b) >> b;
        val = val.wrapping_mul(val).wrapping_add(0x7FFF) >> 15;
        if frac <= 0 {
            break;
        }
        frac -= 1;
    }
    l + i32::from(val > 0x8000)
}

/// Pulses represented by pseudo-pulse index `i`.
pub fn get_pulses(i: i32) -> i32 {
    if i < 8 {
        i
    } else {
        (8 + (i & 7)) << ((i >> 3) - 1)
    }
}

/// Whether `V(n, k)` fits in 32 bits.
pub fn fits_in32(n: i32, k: i32) -> bool {
    const MAX_N: [i16; 15] = [
        32767, 32767, 32767, 1476, 283, 109, 60, 40, 29, 24, 20, 18, 16, 14, 13,
    ];
    const MAX_K: [i16; 15] = [
        32767, 32767, 32767, 32767, 1172, 238, 95, 53, 36, 27, 22, 18, 16, 15, 13,
    ];
    if n >= 14 {
        k < 14 && n <= i32::from(MAX_N[k as usize])
    } else {
        k <= i32::from(MAX_K[n as usize])
    }
}

/// Advance one row of the U(n, k) table.
fn unext(u: &mut [u32], mut u0: u32) {
    for j in 1..u.len() {
        let u1 = u[j].wrapping_add(u[j - 1]).wrapping_add(u0);
        u[j - 1] = u0;
        u0 = u1;
    }
    if let Some(last) = u.last_mut() {
        *last = u0;
    }
}

/// `U(n, 0..=k+1)` for `n >= 2`.
fn ncwrs_urow(n: usize, k: usize) -> Vec<u32> {
    let mut u = vec![0u32; k + 2];
    u[1] = 1;
    for (j, slot) in u.iter_mut().enumerate().skip(2) {
        *slot = ((j as u32) << 1) - 1;
    }
    for _ in 2..n {
        unext(&mut u[1..], 1);
    }
    u
}

/// Bits needed to code 0..=`max_k` pulses in `n` dimensions.
pub fn get_required_bits(n: usize, max_k: usize, frac: i32) -> Vec<i16> {
    let mut bits = vec![0i16; max_k + 1];
    if max_k == 0 {
        return bits;
    }
    if n == 1 {
        for slot in bits.iter_mut().skip(1) {
            *slot = (1 << frac) as i16;
        }
    } else {
        let u = ncwrs_urow(n, max_k);
        for k in 1..=max_k {
            bits[k] = log2_frac(u[k].wrapping_add(u[k + 1]), frac) as i16;
        }
    }
    bits
}

struct CacheEntry {
    n: i32,
    k: i32,
    offset: usize,
}

/// Build the pulse cache for band edges `ebands` (`nb + 1` entries) up to `lm`.
pub fn compute_pulse_cache(ebands: &[i16], log_n: &[i16], lm: usize) -> PulseCache {
    let nb = ebands.len().saturating_sub(1);
    let width = |j: usize| i32::from(ebands[j + 1] - ebands[j]);

    let mut index = vec![-1i32; nb * (lm + 2)];
    let mut entries = Vec::new();
    let mut curr = 0usize;

    for i in 0..=lm + 1 {
        for j in 0..nb {
            let n = (width(j) << i) >> 1;
            let row = i * nb + j;
            'search: for k in 0..=i {
                let limit = if k == i { j } else { nb };
                for other in 0..limit {
                    if n == (width(other) << k) >> 1 {
                        index[row] = index[k * nb + other];
                        break 'search;
                    }
                }
            }
            if index[row] == -1 && n != 0 {
                let mut k = 0;
                while k < MAX_PSEUDO && fits_in32(n, get_pulses(k + 1)) {
                    k += 1;
                }
                entries.push(CacheEntry { n, k, offset: curr });
                index[row] = curr as i32;
                curr += k as usize + 1;
            }
        }
    }

    let mut bits = vec![0u8; curr];
    for entry in &entries {
        let required = get_required_bits(
            entry.n as usize,
            get_pulses(entry.k) as usize,
            BITRES,
        );
        bits[entry.offset] = entry.k as u8;
        for j in 1..=entry.k {
            bits[entry.offset + j as usize] = (required[get_pulses(j) as usize] - 1) as u8;
        }
    }
    log::trace!(
        "Pulse cache: {} entries, {} bytes for {} bands",
        entries.len(),
        curr,
        nb
    );

    let mut caps = Vec::with_capacity((lm + 1) * 2 * nb);
    for i in 0..=lm {
        for c in 1..=2 {
            for j in 0..nb {
                let max_bits = band_max_bits(&index, &bits, log_n, nb, width(j), i, j, c);
                let cap = (4 * max_bits / (c * (width(j) << i))) - 64;
                caps.push(cap.clamp(0, 255) as u8);
            }
        }
    }

    PulseCache {
        size: curr,
        index: index.into_iter().map(|v| v as i16).collect(),
        bits,
        caps,
    }
}

/// Most bits a band of width `n0` can use at LM `i` with `c` channels.
#[allow(clippy::too_many_arguments)]
fn band_max_bits(
    index: &[i32],
    bits: &[u8],
    log_n: &[i16],
    nb: usize,
    mut n0: i32,
    i: usize,
    j: usize,
    c: i32,
) -> i32 {
    if n0 << i == 1 {
        return (c * (1 + MAX_FINE_BITS)) << BITRES;
    }
    let log_n = i32::from(log_n[j]);
    let lm = i as i32;

    let mut lm0 = 0i32;
    if n0 > 2 {
        n0 >>= 1;
        lm0 -= 1;
    } else if n0 <= 1 {
        lm0 = lm.min(1);
        n0 <<= lm0;
    }

    // Lowest-level PVQ of a fully split band.
    let entry = index[(lm0 + 1) as usize * nb + j].max(0) as usize;
    let mut max_bits = i32::from(bits[entry + bits[entry] as usize]) + 1;

    let mut n = n0;
    for k in 0..lm - lm0 {
        max_bits <<= 1;
        let offset = ((log_n + ((lm0 + k) << BITRES)) >> 1) - QTHETA_OFFSET;
        let num = 459 * ((2 * n - 1) * offset + max_bits);
        let den = ((2 * n - 1) << 9) - 459;
        max_bits += ((num + (den >> 1)) / den).min(57);
        n <<= 1;
    }

    if c == 2 {
        max_bits <<= 1;
        let two_phase = n == 2;
        let offset = ((log_n + (lm << BITRES)) >> 1)
            - if two_phase { QTHETA_OFFSET_TWOPHASE } else { QTHETA_OFFSET };
        let ndof = 2 * n - 1 - i32::from(two_phase);
        let step = if two_phase { 512 } else { 487 };
        let num = step * (max_bits + ndof * offset);
        let den = (ndof << 9) - step;
        max_bits += ((num + (den >> 1)) / den).min(if two_phase { 64 } else { 61 });
    }

    // Fine energy bits.
    let ndof = c * n + i32::from(c == 2 && n > 2);
    let mut offset = ((log_n + (lm << BITRES)) >> 1) - FINE_OFFSET;
    if n == 2 {
        offset += 1 << BITRES >> 2;
    }
    let num = max_bits + ndof * offset;
    let den = (ndof - 1) << BITRES;
    let qb = ((num + (den >> 1)) / den).min(MAX_FINE_BITS);
    max_bits + ((c * qb) << BITRES)
}
