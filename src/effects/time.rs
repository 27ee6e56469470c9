//! Time stretch unit.
//!
//! Node address layout: `0` rate, `1` overlap, `2` shift-pitch flag (0.0/1.0).

use serde::{Deserialize, Serialize};

use super::node::{ParamAddress, ProcessingNode};
use super::preset::Preset;
use super::unit::{Unit, UnitKind, UnitType};

pub const MIN_RATE: f32 = 0.25;
pub const MAX_RATE: f32 = 4.0;

const RATE: ParamAddress = 0;
const OVERLAP: ParamAddress = 1;
const SHIFT_PITCH: ParamAddress = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeParams {
    /// Playback rate multiplier. 1.0 is normal speed.
    pub rate: f32,
    pub overlap: f32,
    /// When set, the pitch follows the rate like a tape machine.
    pub shift_pitch: bool,
}

impl Default for TimeParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            overlap: 8.0,
            shift_pitch: false,
        }
    }
}

pub type TimePreset = Preset<TimeParams>;

pub struct TimeStretch;

impl UnitKind for TimeStretch {
    const TYPE: UnitType = UnitType::Time;
    const PARAMETER_COUNT: usize = 3;
    type Params = TimeParams;

    fn system_presets() -> Vec<TimePreset> {
        vec![
            Preset::system(
                "Half speed",
                TimeParams {
                    rate: 0.5,
                    ..TimeParams::default()
                },
            ),
            Preset::system(
                "Slow",
                TimeParams {
                    rate: 0.75,
                    ..TimeParams::default()
                },
            ),
            Preset::system(
                "Fast",
                TimeParams {
                    rate: 1.5,
                    ..TimeParams::default()
                },
            ),
            Preset::system(
                "Chipmunk",
                TimeParams {
                    rate: 2.0,
                    shift_pitch: true,
                    ..TimeParams::default()
                },
            ),
        ]
    }

    fn write_to_node(params: &TimeParams, node: &dyn ProcessingNode) {
        node.set_parameter(RATE, params.rate);
        node.set_parameter(OVERLAP, params.overlap);
        node.set_parameter(SHIFT_PITCH, flag(params.shift_pitch));
    }
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

pub type TimeStretchUnit = Unit<TimeStretch>;

impl Unit<TimeStretch> {
    pub fn rate(&self) -> f32 {
        self.params.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.params.rate = rate;
        self.node.set_parameter(RATE, rate);
    }

    /// Nudge the rate by `delta` within the supported range.
    pub fn adjust_rate(&mut self, delta: f32) -> f32 {
        let rate = (self.params.rate + delta).clamp(MIN_RATE, MAX_RATE);
        self.set_rate(rate);
        rate
    }

    pub fn overlap(&self) -> f32 {
        self.params.overlap
    }

    pub fn set_overlap(&mut self, overlap: f32) {
        self.params.overlap = overlap;
        self.node.set_parameter(OVERLAP, overlap);
    }

    pub fn shift_pitch(&self) -> bool {
        self.params.shift_pitch
    }

    pub fn set_shift_pitch(&mut self, shift_pitch: bool) {
        self.params.shift_pitch = shift_pitch;
        self.node.set_parameter(SHIFT_PITCH, flag(shift_pitch));
    }

    pub fn toggle_shift_pitch(&mut self) -> bool {
        self.set_shift_pitch(!self.params.shift_pitch);
        self.params.shift_pitch
    }

    /// Pitch change in cents caused by the rate, or 0 when pitch is held.
    pub fn effective_pitch(&self) -> f32 {
        if self.params.shift_pitch {
            1200.0 * self.params.rate.log2()
        } else {
            0.0
        }
    }
}
