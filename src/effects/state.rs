//! Three-state activation model shared by every effects unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Activation state of an effects unit.
///
/// A unit is audible only while `Active`. `Suppressed` remembers that the
/// user wanted the unit on while something else (the master bypass, a
/// recording, a preset audition) forces it off. It is never entered from
/// `Bypassed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectsUnitState {
    #[default]
    Bypassed,
    Active,
    Suppressed,
}

impl EffectsUnitState {
    /// All states, in declaration order.
    pub const ALL: [EffectsUnitState; 3] = [
        EffectsUnitState::Bypassed,
        EffectsUnitState::Active,
        EffectsUnitState::Suppressed,
    ];

    /// Direct on/off toggle.
    ///
    /// `Active` goes to `Bypassed`; anything else goes to `Active`, so a
    /// suppressed unit toggled by the user comes back on.
    pub fn toggled(self) -> Self {
        match self {
            EffectsUnitState::Active => EffectsUnitState::Bypassed,
            EffectsUnitState::Bypassed | EffectsUnitState::Suppressed => EffectsUnitState::Active,
        }
    }

    /// `Active -> Suppressed`, identity otherwise.
    pub fn suppressed(self) -> Self {
        match self {
            EffectsUnitState::Active => EffectsUnitState::Suppressed,
            other => other,
        }
    }

    /// `Suppressed -> Active`, identity otherwise.
    pub fn unsuppressed(self) -> Self {
        match self {
            EffectsUnitState::Suppressed => EffectsUnitState::Active,
            other => other,
        }
    }

    pub fn is_active(self) -> bool {
        self == EffectsUnitState::Active
    }

    /// Value for the processing node's bypass flag.
    pub fn node_bypass(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for EffectsUnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EffectsUnitState::Bypassed => "bypassed",
            EffectsUnitState::Active => "active",
            EffectsUnitState::Suppressed => "suppressed",
        };
        f.write_str(label)
    }
}
