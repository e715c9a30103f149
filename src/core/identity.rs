// This module derives the identity of a mode: frame size, frame rate, the "standard"
// predicate (band edges equal the built-in 2.5 ms layout, which holds exactly when the
// sample rate is 400 times the short MDCT size) and the dedup keys of every table
// family. A key carries exactly the fields that determine its table's shape and
// contents, so two modes resolving to the same key can share one emitted table. Keys
// render their include guard and symbol names in the naming scheme the CELT runtime
// expects; multi-field keys put an underscore between fields so that distinct keys
// never render to the same guard.

//! Mode identity and table dedup keys.

use std::fmt;

use super::descriptor::ModeDescriptor;
use super::numeric::Word;

/// Band-edge table referenced by standard modes.
pub const DEFAULT_EBANDS_SYMBOL: &str = "eband5ms";

/// Allocation table referenced by standard modes.
pub const DEFAULT_ALLOC_SYMBOL: &str = "band_allocation";

/// Sample rate to short MDCT size ratio of the standard band layout.
pub const STANDARD_RATE_RATIO: i64 = 400;

/// Dedup key of one generated table (or table group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKey {
    BandEdges { sample_rate: i32, frame_size: usize },
    Window { overlap: usize },
    AllocVectors { sample_rate: i32, frame_size: usize },
    LogN { frame_rate: i32 },
    PulseCache { cache_rate: i32 },
    FftTwiddles { sample_rate: i32, frame_size: usize },
    FftBitrev { nfft: usize },
    FftState { sample_rate: i32, frame_size: usize, shift: usize },
    MdctTwiddles { frame_size: usize },
}

impl TableKey {
    /// Include guard protecting the table definition.
    pub fn guard(&self) -> String {
        match *self {
            TableKey::BandEdges { sample_rate, frame_size } => {
                format!("DEF_EBANDS{sample_rate}_{frame_size}")
            }
            TableKey::Window { overlap } => format!("DEF_WINDOW{overlap}"),
            TableKey::AllocVectors { sample_rate, frame_size } => {
                format!("DEF_ALLOC_VECTORS{sample_rate}_{frame_size}")
            }
            TableKey::LogN { frame_rate } => format!("DEF_LOGN{frame_rate}"),
            TableKey::PulseCache { cache_rate } => format!("DEF_PULSE_CACHE{cache_rate}"),
            TableKey::FftTwiddles { sample_rate, frame_size } => {
                format!("FFT_TWIDDLES{sample_rate}_{frame_size}")
            }
            TableKey::FftBitrev { nfft } => format!("FFT_BITREV{nfft}"),
            TableKey::FftState { sample_rate, frame_size, shift } => {
                format!("FFT_STATE{sample_rate}_{frame_size}_{shift}")
            }
            TableKey::MdctTwiddles { frame_size } => format!("MDCT_TWIDDLES{frame_size}"),
        }
    }

    /// Symbol of the table. For the pulse cache group this is the index table.
    pub fn symbol(&self) -> String {
        match *self {
            TableKey::BandEdges { sample_rate, frame_size } => {
                format!("eBands{sample_rate}_{frame_size}")
            }
            TableKey::Window { overlap } => format!("window{overlap}"),
            TableKey::AllocVectors { sample_rate, frame_size } => {
                format!("allocVectors{sample_rate}_{frame_size}")
            }
            TableKey::LogN { frame_rate } => format!("logN{frame_rate}"),
            TableKey::PulseCache { cache_rate } => format!("cache_index{cache_rate}"),
            TableKey::FftTwiddles { sample_rate, frame_size } => {
                format!("fft_twiddles{sample_rate}_{frame_size}")
            }
            TableKey::FftBitrev { nfft } => format!("fft_bitrev{nfft}"),
            TableKey::FftState { sample_rate, frame_size, shift } => {
                format!("fft_state{sample_rate}_{frame_size}_{shift}")
            }
            TableKey::MdctTwiddles { frame_size } => format!("mdct_twiddles{frame_size}"),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Symbols of the three pulse cache tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseCacheSymbols {
    pub index: String,
    pub bits: String,
    pub caps: String,
}

impl PulseCacheSymbols {
    pub fn new(cache_rate: i32) -> Self {
        Self {
            index: format!("cache_index{cache_rate}"),
            bits: format!("cache_bits{cache_rate}"),
            caps: format!("cache_caps{cache_rate}"),
        }
    }
}

/// Keys and names derived from one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeIdentity {
    pub sample_rate: i32,
    pub frame_size: usize,
    pub overlap: usize,
    /// `sample_rate / short_mdct_size`.
    pub frame_rate: i32,
    /// `sample_rate / frame_size`.
    pub cache_rate: i32,
    pub is_standard: bool,
}

impl ModeIdentity {
    pub fn derive<W: Word>(mode: &ModeDescriptor<W>) -> Self {
        let frame_size = mode.frame_size();
        let short = mode.short_mdct_size as i64;
        let rate = i64::from(mode.sample_rate);
        Self {
            sample_rate: mode.sample_rate,
            frame_size,
            overlap: mode.overlap,
            frame_rate: checked_ratio(rate, short),
            cache_rate: checked_ratio(rate, frame_size as i64),
            is_standard: rate == STANDARD_RATE_RATIO * short,
        }
    }

    /// Whether the mode references `eband5ms` instead of its own band edges.
    pub fn uses_default_band_edges(&self) -> bool {
        self.is_standard
    }

    /// Whether the mode references `band_allocation` instead of its own vectors.
    pub fn uses_default_allocation(&self) -> bool {
        self.is_standard
    }

    pub fn band_edges_key(&self) -> TableKey {
        TableKey::BandEdges {
            sample_rate: self.sample_rate,
            frame_size: self.frame_size,
        }
    }

    pub fn window_key(&self) -> TableKey {
        TableKey::Window {
            overlap: self.overlap,
        }
    }

    pub fn alloc_vectors_key(&self) -> TableKey {
        TableKey::AllocVectors {
            sample_rate: self.sample_rate,
            frame_size: self.frame_size,
        }
    }

    pub fn log_n_key(&self) -> TableKey {
        TableKey::LogN {
            frame_rate: self.frame_rate,
        }
    }

    pub fn pulse_cache_key(&self) -> TableKey {
        TableKey::PulseCache {
            cache_rate: self.cache_rate,
        }
    }

    pub fn pulse_cache_symbols(&self) -> PulseCacheSymbols {
        PulseCacheSymbols::new(self.cache_rate)
    }

    pub fn fft_twiddles_key(&self) -> TableKey {
        TableKey::FftTwiddles {
            sample_rate: self.sample_rate,
            frame_size: self.frame_size,
        }
    }

    pub fn fft_state_key(&self, shift: usize) -> TableKey {
        TableKey::FftState {
            sample_rate: self.sample_rate,
            frame_size: self.frame_size,
            shift,
        }
    }

    pub fn mdct_twiddles_key(&self) -> TableKey {
        TableKey::MdctTwiddles {
            frame_size: self.frame_size,
        }
    }

    /// Band edges symbol referenced by the mode record.
    pub fn band_edges_symbol(&self) -> String {
        if self.uses_default_band_edges() {
            DEFAULT_EBANDS_SYMBOL.to_string()
        } else {
            self.band_edges_key().symbol()
        }
    }

    /// Allocation vectors symbol referenced by the mode record.
    pub fn alloc_vectors_symbol(&self) -> String {
        if self.uses_default_allocation() {
            DEFAULT_ALLOC_SYMBOL.to_string()
        } else {
            self.alloc_vectors_key().symbol()
        }
    }

    /// Symbol of the top-level mode record.
    pub fn mode_symbol(&self) -> String {
        format!(
            "mode{}_{}_{}",
            self.sample_rate, self.frame_size, self.overlap
        )
    }
}

// Zero divisors only come from malformed descriptors; they map to 0.
fn checked_ratio(num: i64, den: i64) -> i32 {
    num.checked_div(den).unwrap_or(0) as i32
}
