//! Delay unit.
//!
//! Node address layout: `0` amount, `1` time, `2` feedback, `3` low-pass cutoff.

use serde::{Deserialize, Serialize};

use super::node::{ParamAddress, ProcessingNode};
use super::preset::Preset;
use super::unit::{Unit, UnitKind, UnitType};

const AMOUNT: ParamAddress = 0;
const TIME: ParamAddress = 1;
const FEEDBACK: ParamAddress = 2;
const LOW_PASS_CUTOFF: ParamAddress = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DelayParams {
    /// Wet/dry mix, 0..=100.
    pub amount: f32,
    /// Delay time in seconds, 0..=2.
    pub time: f32,
    /// Percentage fed back into the line, -100..=100.
    pub feedback: f32,
    /// Cutoff (Hz) of the low-pass inside the feedback loop.
    pub low_pass_cutoff: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            amount: 100.0,
            time: 1.0,
            feedback: 50.0,
            low_pass_cutoff: 15000.0,
        }
    }
}

pub type DelayPreset = Preset<DelayParams>;

pub struct Delay;

impl UnitKind for Delay {
    const TYPE: UnitType = UnitType::Delay;
    const PARAMETER_COUNT: usize = 4;
    type Params = DelayParams;

    fn system_presets() -> Vec<DelayPreset> {
        vec![
            Preset::system(
                "Slapback",
                DelayParams {
                    amount: 40.0,
                    time: 0.1,
                    feedback: 0.0,
                    low_pass_cutoff: 8000.0,
                },
            ),
            Preset::system(
                "Echo",
                DelayParams {
                    amount: 50.0,
                    time: 0.5,
                    feedback: 40.0,
                    low_pass_cutoff: 12000.0,
                },
            ),
            Preset::system(
                "Canyon",
                DelayParams {
                    amount: 60.0,
                    time: 1.5,
                    feedback: 70.0,
                    low_pass_cutoff: 5000.0,
                },
            ),
        ]
    }

    fn write_to_node(params: &DelayParams, node: &dyn ProcessingNode) {
        node.set_parameter(AMOUNT, params.amount);
        node.set_parameter(TIME, params.time);
        node.set_parameter(FEEDBACK, params.feedback);
        node.set_parameter(LOW_PASS_CUTOFF, params.low_pass_cutoff);
    }
}

pub type DelayUnit = Unit<Delay>;

impl Unit<Delay> {
    pub fn amount(&self) -> f32 {
        self.params.amount
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.params.amount = amount;
        self.node.set_parameter(AMOUNT, amount);
    }

    pub fn time(&self) -> f32 {
        self.params.time
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.params.time = seconds;
        self.node.set_parameter(TIME, seconds);
    }

    pub fn feedback(&self) -> f32 {
        self.params.feedback
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.params.feedback = feedback;
        self.node.set_parameter(FEEDBACK, feedback);
    }

    pub fn low_pass_cutoff(&self) -> f32 {
        self.params.low_pass_cutoff
    }

    pub fn set_low_pass_cutoff(&mut self, cutoff: f32) {
        self.params.low_pass_cutoff = cutoff;
        self.node.set_parameter(LOW_PASS_CUTOFF, cutoff);
    }
}
