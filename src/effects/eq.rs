//! Graphic equalizer unit.
//!
//! Node address layout:
//! - `0`: global gain (dB)
//! - `1`: active band count
//! - `2..`: band gains (dB), one per band

use serde::{Deserialize, Serialize};

use super::eq_mapper::{conform_bands, remap_bands, EqType};
use super::node::{ParamAddress, ProcessingNode};
use super::preset::Preset;
use super::unit::{Unit, UnitKind, UnitType};

/// Band gain limits (dB).
pub const MIN_GAIN: f32 = -20.0;
pub const MAX_GAIN: f32 = 20.0;

const GLOBAL_GAIN: ParamAddress = 0;
const BAND_COUNT: ParamAddress = 1;
const FIRST_BAND: ParamAddress = 2;

/// Equalizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EqParams {
    #[serde(rename = "type")]
    pub eq_type: EqType,
    pub global_gain: f32,
    pub bands: Vec<f32>,
}

impl EqParams {
    /// All bands at 0 dB for the given resolution.
    pub fn flat(eq_type: EqType) -> Self {
        Self {
            eq_type,
            global_gain: 0.0,
            bands: vec![0.0; eq_type.count()],
        }
    }
}

impl Default for EqParams {
    fn default() -> Self {
        Self::flat(EqType::default())
    }
}

pub type EqPreset = Preset<EqParams>;

/// Name of the flat preset, the baseline for bass/mids/treble nudges.
pub const FLAT_PRESET: &str = "Flat";

fn system_preset(name: &str, bands: [f32; 15]) -> EqPreset {
    Preset::system(
        name,
        EqParams {
            eq_type: EqType::FifteenBand,
            global_gain: 0.0,
            bands: bands.to_vec(),
        },
    )
}

/// Equalizer kind descriptor.
pub struct Equalizer;

impl UnitKind for Equalizer {
    const TYPE: UnitType = UnitType::Eq;
    const PARAMETER_COUNT: usize = FIRST_BAND as usize + 15;
    type Params = EqParams;

    fn system_presets() -> Vec<EqPreset> {
        vec![
            system_preset(FLAT_PRESET, [0.0; 15]),
            system_preset(
                "High bass and treble",
                [15.0, 15.0, 12.5, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 12.5, 12.5, 15.0],
            ),
            system_preset(
                "Dance",
                [0.0, 3.5, 7.0, 4.0, 4.0, 0.0, -1.0, -1.0, -2.0, -4.0, -4.0, 0.0, 4.0, 4.0, 5.0],
            ),
            system_preset(
                "Electronic",
                [7.0, 7.0, 6.5, 0.0, 0.0, -2.0, -5.0, -5.0, 0.0, 0.0, 0.0, 0.0, 6.5, 6.5, 7.0],
            ),
            system_preset(
                "Hip Hop",
                [7.0, 7.0, 7.0, 0.0, 0.0, 0.0, -3.0, -3.0, -3.0, -2.0, -2.0, 1.0, 1.0, 1.0, 7.0],
            ),
            system_preset(
                "Jazz",
                [0.0, 0.0, 3.0, 0.0, 0.0, 0.0, -3.0, -3.0, -3.0, 0.0, 0.0, 0.0, 3.0, 3.0, 5.0],
            ),
            system_preset(
                "Latin",
                [8.0, 8.0, 5.0, 0.0, 0.0, 0.0, -4.0, -4.0, -4.0, -4.0, -4.0, 0.0, 6.0, 6.0, 8.0],
            ),
            system_preset(
                "Lounge",
                [-5.0, -5.0, -2.0, 0.0, 0.0, 2.0, 4.0, 4.0, 3.0, 0.0, 0.0, 0.0, 3.0, 3.0, 0.0],
            ),
            system_preset(
                "Piano",
                [1.0, 1.0, -1.0, -3.0, -3.0, 0.0, 1.0, 1.0, -1.0, 2.0, 2.0, 3.0, 1.0, 1.0, 2.0],
            ),
            system_preset(
                "Pop",
                [-2.0, -2.0, -1.5, 0.0, 0.0, 3.0, 7.0, 7.0, 7.0, 3.5, 3.5, 0.0, -2.0, -2.0, -3.0],
            ),
            system_preset(
                "R&B",
                [0.0, 0.0, 7.0, 4.0, 4.0, -3.0, -5.0, -5.0, -4.5, -2.0, -2.0, -1.5, 0.0, 0.0, 1.5],
            ),
            system_preset(
                "Rock",
                [5.0, 5.0, 3.0, 1.5, 1.5, 0.0, -5.0, -5.0, -6.0, -2.5, -2.5, 0.0, 2.5, 2.5, 4.0],
            ),
            system_preset(
                "Soft",
                [0.0, 0.0, 1.0, 2.0, 2.0, 6.0, 8.0, 8.0, 10.0, 12.0, 12.0, 12.0, 13.0, 13.0, 14.0],
            ),
            system_preset(
                "Karaoke",
                [8.0, 8.0, 6.0, 4.0, 4.0, -20.0, -20.0, -20.0, -20.0, -20.0, -20.0, 4.0, 6.0, 6.0, 8.0],
            ),
            system_preset(
                "Vocal",
                [-20.0, -20.0, -20.0, -20.0, -20.0, 12.0, 14.0, 14.0, 14.0, 12.0, 12.0, -20.0, -20.0, -20.0, -20.0],
            ),
        ]
    }

    fn write_to_node(params: &EqParams, node: &dyn ProcessingNode) {
        node.set_parameter(GLOBAL_GAIN, params.global_gain);
        node.set_parameter(BAND_COUNT, params.bands.len() as f32);

        for (i, &gain) in params.bands.iter().enumerate() {
            node.set_parameter(FIRST_BAND + i as ParamAddress, gain);
        }
    }

    fn normalize(mut params: EqParams) -> EqParams {
        if params.bands.len() != params.eq_type.count() {
            params.bands = conform_bands(&params.bands, params.eq_type);
        }
        params
    }

    /// Preset bands are remapped onto the unit's current resolution.
    fn adapt_preset(current: &EqParams, preset: &EqParams) -> EqParams {
        EqParams {
            eq_type: current.eq_type,
            global_gain: preset.global_gain,
            bands: conform_bands(&preset.bands, current.eq_type),
        }
    }
}

pub type EqUnit = Unit<Equalizer>;

/// Which tonal region a nudge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandRegion {
    Bass,
    Mids,
    Treble,
}

impl Unit<Equalizer> {
    pub fn eq_type(&self) -> EqType {
        self.params.eq_type
    }

    /// Switch resolution, carrying the current gains across.
    pub fn set_eq_type(&mut self, eq_type: EqType) {
        if eq_type == self.params.eq_type {
            return;
        }

        let bands = remap_bands(&self.params.bands, self.params.eq_type, eq_type);
        self.set_params(EqParams {
            eq_type,
            global_gain: self.params.global_gain,
            bands,
        });
    }

    pub fn global_gain(&self) -> f32 {
        self.params.global_gain
    }

    pub fn set_global_gain(&mut self, gain: f32) {
        self.params.global_gain = gain;
        self.node.set_parameter(GLOBAL_GAIN, gain);
    }

    pub fn bands(&self) -> &[f32] {
        &self.params.bands
    }

    /// Replace every band gain. Input of another resolution is remapped.
    pub fn set_bands(&mut self, bands: &[f32]) {
        let bands = conform_bands(bands, self.params.eq_type);
        self.set_params(EqParams {
            bands,
            ..self.params.clone()
        });
    }

    pub fn band(&self, index: usize) -> Option<f32> {
        self.params.bands.get(index).copied()
    }

    /// Set one band's gain. Out-of-range indices are ignored.
    pub fn set_band(&mut self, index: usize, gain: f32) {
        if let Some(band) = self.params.bands.get_mut(index) {
            *band = gain;
            self.node
                .set_parameter(FIRST_BAND + index as ParamAddress, gain);
        }
    }

    /// Shift every band of `region` by `delta`, clamped to the gain range.
    ///
    /// Returns the new band gains.
    pub fn adjust_region(&mut self, region: BandRegion, delta: f32) -> Vec<f32> {
        let groups = self.params.eq_type.band_groups();
        let range = match region {
            BandRegion::Bass => groups.bass,
            BandRegion::Mids => groups.mids,
            BandRegion::Treble => groups.treble,
        };

        for index in range {
            if let Some(gain) = self.band(index) {
                self.set_band(index, (gain + delta).clamp(MIN_GAIN, MAX_GAIN));
            }
        }

        self.params.bands.clone()
    }
}
