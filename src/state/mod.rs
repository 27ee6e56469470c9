//! State Management Module
//!
//! Snapshot types for the effects chain, the on-disk state file and schema
//! migrations. The snapshot shapes match exactly what the units'
//! `persistent_state()` functions produce, so restore-then-capture is lossless.

pub mod migration;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::delay::DelayParams;
use crate::effects::eq::EqParams;
use crate::effects::filter::FilterParams;
use crate::effects::master::MasterPreset;
use crate::effects::pitch::PitchParams;
use crate::effects::preset::Preset;
use crate::effects::reverb::ReverbParams;
use crate::effects::state::EffectsUnitState;
use crate::effects::time::TimeParams;
use crate::effects::unit::UnitType;
use crate::preferences::SoundPreferences;
use crate::profiles::SoundProfiles;

pub use migration::{migrate_state, CURRENT_SCHEMA_VERSION};
pub use store::StateStore;

/// Persisted form of one child unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitState<P> {
    #[serde(default)]
    pub state: EffectsUnitState,
    #[serde(flatten)]
    pub params: P,
    #[serde(default)]
    pub user_presets: Vec<Preset<P>>,
}

fn master_default_state() -> EffectsUnitState {
    EffectsUnitState::Active
}

/// Persisted form of the master unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterUnitState {
    #[serde(default = "master_default_state")]
    pub state: EffectsUnitState,
    /// Children the master holds `Suppressed` while it is off.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gated_units: Vec<UnitType>,
    #[serde(default)]
    pub user_presets: Vec<MasterPreset>,
}

impl Default for MasterUnitState {
    fn default() -> Self {
        Self {
            state: master_default_state(),
            gated_units: Vec::new(),
            user_presets: Vec::new(),
        }
    }
}

/// Persisted form of the six child units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsState {
    pub eq: UnitState<EqParams>,
    pub pitch: UnitState<PitchParams>,
    pub time: UnitState<TimeParams>,
    pub reverb: UnitState<ReverbParams>,
    pub delay: UnitState<DelayParams>,
    pub filter: UnitState<FilterParams>,
}

/// Everything the effects chain needs to come back exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectsChainState {
    pub master: MasterUnitState,
    #[serde(flatten)]
    pub units: UnitsState,
    pub sound_profiles: SoundProfiles,
}

/// Top-level document of the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Schema version for migrations.
    pub schema_version: String,
    /// When the state was written.
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: SoundPreferences,
    #[serde(default)]
    pub effects: EffectsChainState,
}

impl PersistedState {
    /// Stamp a snapshot with the current schema version and time.
    pub fn new(preferences: SoundPreferences, effects: EffectsChainState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            preferences,
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let state: EffectsChainState = serde_json::from_value(json!({
            "reverb": { "state": "active", "space": "cathedral" }
        }))
        .unwrap();

        assert_eq!(state.master.state, EffectsUnitState::Active);
        assert_eq!(state.units.reverb.state, EffectsUnitState::Active);
        assert_eq!(state.units.reverb.params.amount, 50.0);
        assert_eq!(state.units.eq, UnitState::default());
        assert!(state.sound_profiles.is_empty());
    }

    #[test]
    fn test_unit_state_is_flat() {
        let json = serde_json::to_value(UnitState::<PitchParams>::default()).unwrap();
        assert_eq!(json["state"], "bypassed");
        assert_eq!(json["pitch"], 0.0);
        assert_eq!(json["overlap"], 8.0);
        assert!(json["userPresets"].as_array().is_some_and(Vec::is_empty));
    }

    #[test]
    fn test_chain_state_round_trip() {
        let mut state = EffectsChainState::default();
        state.units.delay.state = EffectsUnitState::Suppressed;
        state.units.delay.params.time = 0.3;
        state.units.time.user_presets.push(Preset::user(
            "slower",
            EffectsUnitState::Active,
            TimeParams {
                rate: 0.8,
                ..TimeParams::default()
            },
        ));

        let text = serde_json::to_string(&state).unwrap();
        let restored: EffectsChainState = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, state);
    }
}
