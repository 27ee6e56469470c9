//! Pitch shift unit.
//!
//! Node address layout: `0` pitch (cents), `1` overlap.

use serde::{Deserialize, Serialize};

use super::node::{ParamAddress, ProcessingNode};
use super::preset::Preset;
use super::unit::{Unit, UnitKind, UnitType};

/// Pitch range in cents (two octaves either way).
pub const MIN_PITCH: f32 = -2400.0;
pub const MAX_PITCH: f32 = 2400.0;

pub const MIN_OVERLAP: f32 = 3.0;
pub const MAX_OVERLAP: f32 = 32.0;

const PITCH: ParamAddress = 0;
const OVERLAP: ParamAddress = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchParams {
    /// Shift in cents.
    pub pitch: f32,
    pub overlap: f32,
}

impl Default for PitchParams {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            overlap: 8.0,
        }
    }
}

pub type PitchPreset = Preset<PitchParams>;

pub struct PitchShift;

impl UnitKind for PitchShift {
    const TYPE: UnitType = UnitType::Pitch;
    const PARAMETER_COUNT: usize = 2;
    type Params = PitchParams;

    fn system_presets() -> Vec<PitchPreset> {
        [
            ("Octave up", 1200.0),
            ("Octave down", -1200.0),
            ("Fifth up", 700.0),
            ("Half step down", -100.0),
        ]
        .into_iter()
        .map(|(name, pitch)| {
            Preset::system(
                name,
                PitchParams {
                    pitch,
                    ..PitchParams::default()
                },
            )
        })
        .collect()
    }

    fn write_to_node(params: &PitchParams, node: &dyn ProcessingNode) {
        node.set_parameter(PITCH, params.pitch);
        node.set_parameter(OVERLAP, params.overlap);
    }
}

pub type PitchShiftUnit = Unit<PitchShift>;

impl Unit<PitchShift> {
    pub fn pitch(&self) -> f32 {
        self.params.pitch
    }

    pub fn set_pitch(&mut self, cents: f32) {
        self.params.pitch = cents;
        self.node.set_parameter(PITCH, cents);
    }

    /// Nudge the pitch by `delta` cents within the supported range.
    pub fn adjust_pitch(&mut self, delta: f32) -> f32 {
        let pitch = (self.params.pitch + delta).clamp(MIN_PITCH, MAX_PITCH);
        self.set_pitch(pitch);
        pitch
    }

    pub fn overlap(&self) -> f32 {
        self.params.overlap
    }

    pub fn set_overlap(&mut self, overlap: f32) {
        self.params.overlap = overlap;
        self.node.set_parameter(OVERLAP, overlap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::node::ParameterNode;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn pitch_unit() -> (PitchShiftUnit, Arc<ParameterNode>) {
        let node = Arc::new(ParameterNode::new(PitchShift::PARAMETER_COUNT));
        (PitchShiftUnit::new(None, node.clone()), node)
    }

    #[test]
    fn test_defaults_reach_node() {
        let (unit, node) = pitch_unit();
        assert_relative_eq!(unit.pitch(), 0.0);
        assert_relative_eq!(node.parameter(OVERLAP), 8.0);
    }

    #[test]
    fn test_adjust_pitch_clamps() {
        let (mut unit, node) = pitch_unit();
        unit.set_pitch(2350.0);
        assert_relative_eq!(unit.adjust_pitch(100.0), MAX_PITCH);
        assert_relative_eq!(node.parameter(PITCH), MAX_PITCH);

        unit.set_pitch(MIN_PITCH);
        assert_relative_eq!(unit.adjust_pitch(-1.0), MIN_PITCH);
    }

    #[test]
    fn test_apply_preset_sets_pitch_only() {
        let (mut unit, node) = pitch_unit();
        unit.set_overlap(16.0);
        unit.apply_preset("Octave down");

        assert_relative_eq!(unit.pitch(), -1200.0);
        assert_relative_eq!(unit.overlap(), 8.0);
        assert_relative_eq!(node.parameter(PITCH), -1200.0);
        assert!(!unit.is_active());
    }
}
