//! Band-count conversion for the equalizer.
//!
//! Gains are carried across resolutions by nearest-neighbour lookup on a
//! log-frequency scale. No smoothing is applied, so a round trip through a
//! different resolution is lossy.

use serde::{Deserialize, Serialize};

/// 10-band octave centre frequencies (Hz).
pub const TEN_BAND_FREQUENCIES: [f32; 10] = [
    32.0, 64.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// 15-band two-thirds-octave centre frequencies (Hz).
pub const FIFTEEN_BAND_FREQUENCIES: [f32; 15] = [
    25.0, 40.0, 63.0, 100.0, 160.0, 250.0, 400.0, 630.0, 1000.0, 1600.0, 2500.0, 4000.0,
    6300.0, 10000.0, 16000.0,
];

/// Equalizer resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EqType {
    TenBand,
    #[default]
    FifteenBand,
}

impl EqType {
    /// Get the number of bands
    pub fn count(self) -> usize {
        self.frequencies().len()
    }

    /// Get the centre frequencies for this resolution
    pub fn frequencies(self) -> &'static [f32] {
        match self {
            EqType::TenBand => &TEN_BAND_FREQUENCIES,
            EqType::FifteenBand => &FIFTEEN_BAND_FREQUENCIES,
        }
    }

    /// Resolution with exactly `count` bands, if any.
    pub fn for_band_count(count: usize) -> Option<EqType> {
        match count {
            10 => Some(EqType::TenBand),
            15 => Some(EqType::FifteenBand),
            _ => None,
        }
    }

    /// Band index ranges for bass, mids and treble.
    pub fn band_groups(self) -> BandGroups {
        match self {
            EqType::TenBand => BandGroups {
                bass: 0..3,
                mids: 3..7,
                treble: 7..10,
            },
            EqType::FifteenBand => BandGroups {
                bass: 0..5,
                mids: 5..11,
                treble: 11..15,
            },
        }
    }
}

/// Index ranges of the three tonal regions of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandGroups {
    pub bass: std::ops::Range<usize>,
    pub mids: std::ops::Range<usize>,
    pub treble: std::ops::Range<usize>,
}

/// Index of the band in `frequencies` closest to `freq` in octaves.
fn nearest_band(freq: f32, frequencies: &[f32]) -> Option<usize> {
    let mut nearest = None;
    let mut nearest_dist = f32::MAX;

    for (i, &candidate) in frequencies.iter().enumerate() {
        let dist = (freq.log2() - candidate.log2()).abs();
        if dist < nearest_dist {
            nearest_dist = dist;
            nearest = Some(i);
        }
    }

    nearest
}

/// Convert band gains from resolution `from` to resolution `to`.
///
/// `source[i]` is the gain of band `i` of `from`. The output always has
/// exactly `to.count()` entries. When a target band's nearest source band
/// has no entry in `source` its gain is 0.0. Same-resolution input of the
/// right length is returned unchanged.
pub fn remap_bands(source: &[f32], from: EqType, to: EqType) -> Vec<f32> {
    if from == to && source.len() == to.count() {
        return source.to_vec();
    }

    let source_frequencies = from.frequencies();

    to.frequencies()
        .iter()
        .map(|&freq| {
            nearest_band(freq, source_frequencies)
                .and_then(|i| source.get(i).copied())
                .unwrap_or(0.0)
        })
        .collect()
}

/// Bring `bands` to the length `eq_type` expects.
///
/// The source resolution is inferred from the slice length; lengths that
/// match neither resolution are read as `eq_type` with gaps filled by 0.0.
pub fn conform_bands(bands: &[f32], eq_type: EqType) -> Vec<f32> {
    let from = EqType::for_band_count(bands.len()).unwrap_or(eq_type);
    remap_bands(bands, from, eq_type)
}
