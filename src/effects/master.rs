//! Master unit: whole-chain presets and the chain-level on/off switch.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::chain::EffectsUnits;
use super::delay::DelayPreset;
use super::eq::EqPreset;
use super::filter::FilterPreset;
use super::pitch::PitchPreset;
use super::preset::{NamedPreset, PresetStore};
use super::reverb::ReverbPreset;
use super::state::EffectsUnitState;
use super::time::TimePreset;
use super::unit::{EffectsUnit, UnitEvent, UnitType};
use crate::state::MasterUnitState;

/// One preset per child unit, captured together.
///
/// Child presets carry the child's state, so applying a master preset
/// restores which units were on as well as their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPreset {
    name: String,
    #[serde(skip)]
    system_defined: bool,
    pub eq: EqPreset,
    pub pitch: PitchPreset,
    pub time: TimePreset,
    pub reverb: ReverbPreset,
    pub delay: DelayPreset,
    pub filter: FilterPreset,
}

impl MasterPreset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system_defined(&self) -> bool {
        self.system_defined
    }

    /// State stored for one child kind. `None` for the master itself.
    pub fn child_state(&self, unit: UnitType) -> Option<EffectsUnitState> {
        match unit {
            UnitType::Master => None,
            UnitType::Eq => Some(self.eq.state),
            UnitType::Pitch => Some(self.pitch.state),
            UnitType::Time => Some(self.time.state),
            UnitType::Reverb => Some(self.reverb.state),
            UnitType::Delay => Some(self.delay.state),
            UnitType::Filter => Some(self.filter.state),
        }
    }
}

impl NamedPreset for MasterPreset {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        // Child presets are named after their parent.
        self.eq.set_name(name.clone());
        self.pitch.set_name(name.clone());
        self.time.set_name(name.clone());
        self.reverb.set_name(name.clone());
        self.delay.set_name(name.clone());
        self.filter.set_name(name.clone());
        self.name = name;
    }

    fn is_system_defined(&self) -> bool {
        self.system_defined
    }
}

/// Chain-level switch and whole-chain preset store.
///
/// The master owns no DSP node. Its state gates the children: turning it
/// off suppresses every active child, turning it back on unsuppresses the
/// children it suppressed. Children that were already `Suppressed` for
/// another reason stay that way.
#[derive(Debug)]
pub struct MasterUnit {
    state: EffectsUnitState,
    presets: PresetStore<MasterPreset>,
    /// Children held `Suppressed` by this unit while it is off, in chain order.
    gated: Vec<UnitType>,
    pending_events: Vec<UnitEvent>,
}

impl MasterUnit {
    pub fn new(persisted: Option<MasterUnitState>) -> Self {
        let persisted = persisted.unwrap_or_default();

        let user_presets = persisted
            .user_presets
            .into_iter()
            .filter(|preset| !preset.name().is_empty());

        let gated = if persisted.state.is_active() {
            Vec::new()
        } else {
            UnitType::CHILDREN
                .into_iter()
                .filter(|unit| persisted.gated_units.contains(unit))
                .collect()
        };

        Self {
            state: persisted.state,
            presets: PresetStore::with_presets(Vec::new(), user_presets),
            gated,
            pending_events: Vec::new(),
        }
    }

    pub fn state(&self) -> EffectsUnitState {
        self.state
    }

    /// Whether the chain passes processed signal at all.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Whether `unit` is on but held silent by this unit.
    pub fn is_gated(&self, unit: UnitType) -> bool {
        self.gated.contains(&unit)
    }

    fn gate(&mut self, unit: UnitType) {
        if !self.is_gated(unit) {
            self.gated.push(unit);
            self.gated
                .sort_by_key(|u| UnitType::CHILDREN.iter().position(|c| c == u));
        }
    }

    fn ungate(&mut self, unit: UnitType) {
        self.gated.retain(|&u| u != unit);
    }

    /// Toggle the whole chain on or off.
    pub fn toggle_state(&mut self, units: &mut EffectsUnits) -> EffectsUnitState {
        let new_state = self.state.toggled();
        debug!("master unit: {} -> {}", self.state, new_state);
        self.state = new_state;

        for unit in UnitType::CHILDREN {
            let Some(child) = units.unit_mut(unit) else {
                continue;
            };

            if new_state.is_active() {
                if self.is_gated(unit) {
                    child.unsuppress();
                }
            } else if child.is_active() {
                child.suppress();
                self.gate(unit);
            }
        }

        if new_state.is_active() {
            self.gated.clear();
        }

        // Never `Activated`: the master is not a DSP node.
        self.pending_events.push(UnitEvent::StateChanged {
            unit: UnitType::Master,
            state: new_state,
        });

        new_state
    }

    /// Turn the chain on if it is off.
    pub fn ensure_active(&mut self, units: &mut EffectsUnits) {
        if !self.is_active() {
            self.toggle_state(units);
        }
    }

    /// Toggle one child through the gate.
    ///
    /// While the chain is on this is the child's own toggle. While it is off
    /// a child being switched on lands `Suppressed` and comes on with the
    /// chain; a gated child being switched off goes to `Bypassed`.
    pub fn toggle_child(&mut self, unit: UnitType, units: &mut EffectsUnits) -> EffectsUnitState {
        let Some(child) = units.unit_mut(unit) else {
            return self.state;
        };

        if self.is_active() {
            return child.toggle_state();
        }

        let state = if self.is_gated(unit) {
            self.ungate(unit);
            EffectsUnitState::Bypassed
        } else {
            self.gate(unit);
            EffectsUnitState::Suppressed
        };
        child.set_state(state);
        state
    }

    /// Give a child the state a preset stored for it. While the chain is
    /// off, a stored `Active` lands as a gated `Suppressed`.
    fn land(&mut self, unit: UnitType, stored: EffectsUnitState, units: &mut EffectsUnits) {
        let state = if !self.is_active() && stored.is_active() {
            self.gate(unit);
            EffectsUnitState::Suppressed
        } else {
            self.ungate(unit);
            stored
        };

        if let Some(child) = units.unit_mut(unit) {
            child.set_state(state);
        }
    }

    /// Apply parameters and state of every child preset.
    pub fn apply_preset(&mut self, preset: &MasterPreset, units: &mut EffectsUnits) {
        info!("master unit: applying '{}'", preset.name());

        units.eq.apply_preset_settings(&preset.eq);
        units.pitch.apply_preset_settings(&preset.pitch);
        units.time.apply_preset_settings(&preset.time);
        units.reverb.apply_preset_settings(&preset.reverb);
        units.delay.apply_preset_settings(&preset.delay);
        units.filter.apply_preset_settings(&preset.filter);

        for unit in UnitType::CHILDREN {
            if let Some(stored) = preset.child_state(unit) {
                self.land(unit, stored, units);
            }
        }
    }

    /// Apply a stored preset by name. Unknown names are a silent no-op.
    pub fn apply_preset_named(&mut self, name: &str, units: &mut EffectsUnits) -> bool {
        match self.presets.by_name(name).cloned() {
            Some(preset) => {
                self.apply_preset(&preset, units);
                true
            }
            None => {
                debug!("master unit: no preset named '{}'", name);
                false
            }
        }
    }

    /// Capture every child's parameters and state.
    ///
    /// Children gated by an off master are recorded as `Active`.
    pub fn settings_as_preset(&self, name: &str, units: &EffectsUnits) -> MasterPreset {
        let intent = |unit: UnitType, state: EffectsUnitState| {
            if self.is_gated(unit) {
                state.unsuppressed()
            } else {
                state
            }
        };

        let mut eq = units.eq.settings_as_preset(name);
        eq.state = intent(UnitType::Eq, eq.state);
        let mut pitch = units.pitch.settings_as_preset(name);
        pitch.state = intent(UnitType::Pitch, pitch.state);
        let mut time = units.time.settings_as_preset(name);
        time.state = intent(UnitType::Time, time.state);
        let mut reverb = units.reverb.settings_as_preset(name);
        reverb.state = intent(UnitType::Reverb, reverb.state);
        let mut delay = units.delay.settings_as_preset(name);
        delay.state = intent(UnitType::Delay, delay.state);
        let mut filter = units.filter.settings_as_preset(name);
        filter.state = intent(UnitType::Filter, filter.state);

        MasterPreset {
            name: name.to_string(),
            system_defined: false,
            eq,
            pitch,
            time,
            reverb,
            delay,
            filter,
        }
    }

    /// Capture the chain under `name`. The caller checks uniqueness.
    pub fn save_preset(&mut self, name: &str, units: &EffectsUnits) {
        info!("master unit: saving preset '{}'", name);
        let preset = self.settings_as_preset(name, units);
        self.presets.add(preset);
    }

    pub fn presets(&self) -> &PresetStore<MasterPreset> {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetStore<MasterPreset> {
        &mut self.presets
    }

    pub fn persistent_state(&self) -> MasterUnitState {
        MasterUnitState {
            state: self.state,
            gated_units: self.gated.clone(),
            user_presets: self.presets.user_defined_presets().cloned().collect(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<UnitEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
