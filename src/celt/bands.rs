// This module lays out the frequency bands of a custom mode. Standard modes (2.5 ms short
// blocks) reuse the built-in edge table; other modes get linear spacing at the bottom
// and critical-band spacing above, rounded to even bin counts, smoothed at the boundary
// and stripped of empty bands. Allocation vectors are copied for standard modes and
// otherwise interpolated from the default matrix at each band's start frequency.

//! Band layout and allocation vectors.

use super::rate::{log2_frac, BITRES};
use super::tables::{BAND_ALLOCATION, BARK_BANDS, BARK_FREQ, BITALLOC_SIZE, EBAND5MS};

fn is_standard(sample_rate: i32, short_mdct_size: usize) -> bool {
    i64::from(sample_rate) == 400 * short_mdct_size as i64
}

/// Band edges (`nb_ebands + 1` entries) for a mode.
pub fn compute_ebands(sample_rate: i32, short_mdct_size: usize, res: i32) -> Vec<i16> {
    if is_standard(sample_rate, short_mdct_size) {
        return EBAND5MS.to_vec();
    }
    let frame = short_mdct_size as i32;

    let mut n_bark = 1;
    while n_bark < BARK_BANDS && BARK_FREQ[n_bark + 1] * 2 < sample_rate {
        n_bark += 1;
    }

    // Linear part ends where critical bands get wider than one resolution step.
    let mut lin = 0;
    while lin < n_bark && BARK_FREQ[lin + 1] - BARK_FREQ[lin] < res {
        lin += 1;
    }

    let low = ((BARK_FREQ[lin] + res / 2) / res) as usize;
    let high = n_bark - lin;
    let mut nb = low + high;
    let mut edges = vec![0i32; nb + 2];

    for (i, edge) in edges.iter_mut().enumerate().take(low) {
        *edge = i as i32;
    }
    let mut offset = 0;
    if low > 0 {
        offset = edges[low - 1] * res - BARK_FREQ[lin - 1];
    }
    for i in 0..high {
        let target = BARK_FREQ[lin + i];
        edges[i + low] = (target + offset / 2 + res) / (2 * res) * 2;
        offset = edges[i + low] * res - target;
    }
    for (i, edge) in edges.iter_mut().enumerate().take(nb) {
        if *edge < i as i32 {
            *edge = i as i32;
        }
    }
    edges[nb] = ((BARK_FREQ[n_bark] + res) / (2 * res) * 2).min(frame);

    for i in 1..nb.saturating_sub(1) {
        if edges[i + 1] - edges[i] < edges[i] - edges[i - 1] {
            edges[i] -= (2 * edges[i] - edges[i - 1] - edges[i + 1]) / 2;
        }
    }

    let mut j = 0;
    for i in 0..nb {
        if edges[i + 1] > edges[j] {
            j += 1;
            edges[j] = edges[i + 1];
        }
    }
    nb = j;

    log::trace!("{} bands for Fs={} (res {})", nb, sample_rate, res);
    edges.truncate(nb + 1);
    edges.into_iter().map(|e| e as i16).collect()
}

/// Allocation vectors, `BITALLOC_SIZE` rows of one byte per band.
pub fn compute_allocation_table(sample_rate: i32, short_mdct_size: usize, ebands: &[i16]) -> Vec<u8> {
    let nb = ebands.len().saturating_sub(1);
    let max_bands = EBAND5MS.len() - 1;

    if is_standard(sample_rate, short_mdct_size) {
        return BAND_ALLOCATION[..BITALLOC_SIZE * nb].to_vec();
    }

    let fs = i64::from(sample_rate);
    let short = short_mdct_size as i64;
    let mut alloc = Vec::with_capacity(BITALLOC_SIZE * nb);
    for i in 0..BITALLOC_SIZE {
        let row = &BAND_ALLOCATION[i * max_bands..(i + 1) * max_bands];
        for &edge in &ebands[..nb] {
            let hz = i64::from(edge) * fs / short;
            let k = EBAND5MS[..max_bands]
                .iter()
                .position(|&e| 400 * i64::from(e) > hz)
                .unwrap_or(max_bands);

            let value = if k >= max_bands {
                i64::from(row[max_bands - 1])
            } else if k == 0 {
                i64::from(row[0])
            } else {
                let a1 = hz - 400 * i64::from(EBAND5MS[k - 1]);
                let a0 = 400 * i64::from(EBAND5MS[k]) - hz;
                (a0 * i64::from(row[k - 1]) + a1 * i64::from(row[k])) / (a0 + a1)
            };
            alloc.push(value as u8);
        }
    }
    alloc
}

/// `log2_frac` of every band width.
pub fn compute_log_n(ebands: &[i16]) -> Vec<i16> {
    ebands
        .windows(2)
        .map(|w| log2_frac(i32::from(w[1] - w[0]).max(0) as u32, BITRES) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let edges = compute_ebands(48000, 120, 200);
        assert_eq!(edges, EBAND5MS.to_vec());

        let alloc = compute_allocation_table(48000, 120, &edges);
        assert_eq!(alloc, BAND_ALLOCATION.to_vec());
    }

    #[test]
    fn test_standard_log_n() {
        let log_n = compute_log_n(&EBAND5MS);
        assert_eq!(
            log_n,
            vec![0, 0, 0, 0, 0, 0, 0, 0, 8, 8, 8, 8, 16, 16, 16, 21, 21, 24, 29, 34, 36]
        );
    }

    #[test]
    fn test_custom_layout_is_increasing() {
        for (fs, short) in [(8000, 30), (16000, 80), (44100, 128), (32000, 160)] {
            let res = (fs + short as i32) / (2 * short as i32);
            let edges = compute_ebands(fs, short, res);
            assert!(edges.len() > 2, "Fs={fs}");
            assert!(edges.windows(2).all(|w| w[0] < w[1]), "Fs={fs}: {edges:?}");

            let alloc = compute_allocation_table(fs, short, &edges);
            assert_eq!(alloc.len(), BITALLOC_SIZE * (edges.len() - 1));
        }
    }

    #[test]
    fn test_interpolated_vectors_grow_with_row() {
        let edges = compute_ebands(16000, 80, 100);
        let alloc = compute_allocation_table(16000, 80, &edges);
        let nb = edges.len() - 1;
        let last_row = &alloc[(BITALLOC_SIZE - 1) * nb..];
        assert!(last_row.iter().all(|&v| v > 0));
        assert!(alloc[..nb].iter().all(|&v| v == 0));
    }
}
