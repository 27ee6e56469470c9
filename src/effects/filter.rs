//! Multi-band filter unit.
//!
//! Node address layout: `0` band count, then four addresses per band
//! starting at `1 + 4 * index`: type, min frequency, max frequency, bypass.
//! Absent frequencies are written as 0.0.

use serde::{Deserialize, Serialize};

use super::node::{ParamAddress, ProcessingNode};
use super::preset::Preset;
use super::unit::{Unit, UnitKind, UnitType};

/// Maximum number of bands the host filter supports.
pub const MAX_BANDS: usize = 31;

const BAND_COUNT: ParamAddress = 0;
const FIELDS_PER_BAND: ParamAddress = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterBandType {
    BandStop,
    BandPass,
    LowPass,
    HighPass,
}

impl FilterBandType {
    fn code(self) -> f32 {
        match self {
            FilterBandType::BandStop => 0.0,
            FilterBandType::BandPass => 1.0,
            FilterBandType::LowPass => 2.0,
            FilterBandType::HighPass => 3.0,
        }
    }
}

/// One filter band.
///
/// Pass/stop bands use both frequencies. A low-pass band only uses
/// `max_freq` and a high-pass band only uses `min_freq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBand {
    #[serde(rename = "type")]
    pub band_type: FilterBandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_freq: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_freq: Option<f32>,
    #[serde(default)]
    pub bypass: bool,
}

impl FilterBand {
    pub fn band_pass(min_freq: f32, max_freq: f32) -> Self {
        Self::new(FilterBandType::BandPass, Some(min_freq), Some(max_freq))
    }

    pub fn band_stop(min_freq: f32, max_freq: f32) -> Self {
        Self::new(FilterBandType::BandStop, Some(min_freq), Some(max_freq))
    }

    pub fn low_pass(cutoff: f32) -> Self {
        Self::new(FilterBandType::LowPass, None, Some(cutoff))
    }

    pub fn high_pass(cutoff: f32) -> Self {
        Self::new(FilterBandType::HighPass, Some(cutoff), None)
    }

    fn new(band_type: FilterBandType, min_freq: Option<f32>, max_freq: Option<f32>) -> Self {
        Self {
            band_type,
            min_freq,
            max_freq,
            bypass: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParams {
    pub bands: Vec<FilterBand>,
}

pub type FilterPreset = Preset<FilterParams>;

pub struct Filter;

fn band_address(index: usize) -> ParamAddress {
    1 + FIELDS_PER_BAND * index as ParamAddress
}

fn write_band(index: usize, band: &FilterBand, node: &dyn ProcessingNode) {
    let base = band_address(index);
    node.set_parameter(base, band.band_type.code());
    node.set_parameter(base + 1, band.min_freq.unwrap_or(0.0));
    node.set_parameter(base + 2, band.max_freq.unwrap_or(0.0));
    node.set_parameter(base + 3, if band.bypass { 1.0 } else { 0.0 });
}

impl UnitKind for Filter {
    const TYPE: UnitType = UnitType::Filter;
    const PARAMETER_COUNT: usize = 1 + FIELDS_PER_BAND as usize * MAX_BANDS;
    type Params = FilterParams;

    fn system_presets() -> Vec<FilterPreset> {
        vec![
            Preset::system(
                "Bass only",
                FilterParams {
                    bands: vec![FilterBand::low_pass(250.0)],
                },
            ),
            Preset::system(
                "Telephone",
                FilterParams {
                    bands: vec![FilterBand::band_pass(300.0, 3400.0)],
                },
            ),
            Preset::system(
                "Rumble cut",
                FilterParams {
                    bands: vec![FilterBand::high_pass(40.0)],
                },
            ),
            Preset::system(
                "Vocal cut",
                FilterParams {
                    bands: vec![FilterBand::band_stop(300.0, 3000.0)],
                },
            ),
        ]
    }

    fn write_to_node(params: &FilterParams, node: &dyn ProcessingNode) {
        node.set_parameter(BAND_COUNT, params.bands.len() as f32);
        for (i, band) in params.bands.iter().enumerate() {
            write_band(i, band, node);
        }
    }

    fn normalize(mut params: FilterParams) -> FilterParams {
        params.bands.truncate(MAX_BANDS);
        params
    }
}

pub type FilterUnit = Unit<Filter>;

impl Unit<Filter> {
    pub fn bands(&self) -> &[FilterBand] {
        &self.params.bands
    }

    pub fn band(&self, index: usize) -> Option<&FilterBand> {
        self.params.bands.get(index)
    }

    /// Append a band. Returns its index, or `None` when the filter is full.
    pub fn add_band(&mut self, band: FilterBand) -> Option<usize> {
        if self.params.bands.len() >= MAX_BANDS {
            return None;
        }

        let index = self.params.bands.len();
        write_band(index, &band, self.node.as_ref());
        self.params.bands.push(band);
        self.node
            .set_parameter(BAND_COUNT, self.params.bands.len() as f32);

        Some(index)
    }

    /// Replace the band at `index`. Unknown indices are ignored.
    pub fn update_band(&mut self, index: usize, band: FilterBand) {
        if index < self.params.bands.len() {
            write_band(index, &band, self.node.as_ref());
            self.params.bands[index] = band;
        }
    }

    /// Remove the bands at the given indices; later bands shift down.
    pub fn remove_bands(&mut self, indices: &[usize]) {
        let mut indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.params.bands.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        if indices.is_empty() {
            return;
        }

        for index in indices.into_iter().rev() {
            self.params.bands.remove(index);
        }

        Filter::write_to_node(&self.params, self.node.as_ref());
    }

    /// Flip one band's bypass flag. Returns the new flag.
    pub fn toggle_band_bypass(&mut self, index: usize) -> Option<bool> {
        let band = self.params.bands.get_mut(index)?;
        band.bypass = !band.bypass;
        let bypass = band.bypass;

        self.node
            .set_parameter(band_address(index) + 3, if bypass { 1.0 } else { 0.0 });
        Some(bypass)
    }
}
