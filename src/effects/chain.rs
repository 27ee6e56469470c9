//! The assembled effects chain.

use std::sync::Arc;

use log::{debug, info};

use super::delay::{Delay, DelayUnit};
use super::eq::{EqUnit, Equalizer};
use super::filter::{Filter, FilterUnit};
use super::master::MasterUnit;
use super::node::{ParameterNode, ProcessingNode};
use super::pitch::{PitchShift, PitchShiftUnit};
use super::reverb::{Reverb, ReverbUnit};
use super::state::EffectsUnitState;
use super::time::{TimeStretch, TimeStretchUnit};
use super::unit::{EffectsUnit, UnitEvent, UnitKind, UnitType};
use crate::profiles::SoundProfiles;
use crate::state::{EffectsChainState, UnitsState};

/// Host processing nodes, one per child kind.
#[derive(Clone)]
pub struct ChainNodes {
    pub eq: Arc<dyn ProcessingNode>,
    pub pitch: Arc<dyn ProcessingNode>,
    pub time: Arc<dyn ProcessingNode>,
    pub reverb: Arc<dyn ProcessingNode>,
    pub delay: Arc<dyn ProcessingNode>,
    pub filter: Arc<dyn ProcessingNode>,
}

impl ChainNodes {
    /// Standalone [`ParameterNode`]s sized for each kind, not attached to any audio graph.
    pub fn detached() -> Self {
        fn node<K: UnitKind>() -> Arc<dyn ProcessingNode> {
            Arc::new(ParameterNode::new(K::PARAMETER_COUNT))
        }

        Self {
            eq: node::<Equalizer>(),
            pitch: node::<PitchShift>(),
            time: node::<TimeStretch>(),
            reverb: node::<Reverb>(),
            delay: node::<Delay>(),
            filter: node::<Filter>(),
        }
    }
}

/// The six child units, in signal-chain order.
pub struct EffectsUnits {
    pub eq: EqUnit,
    pub pitch: PitchShiftUnit,
    pub time: TimeStretchUnit,
    pub reverb: ReverbUnit,
    pub delay: DelayUnit,
    pub filter: FilterUnit,
}

impl EffectsUnits {
    pub fn new(state: UnitsState, nodes: ChainNodes) -> Self {
        Self {
            eq: EqUnit::new(Some(state.eq), nodes.eq),
            pitch: PitchShiftUnit::new(Some(state.pitch), nodes.pitch),
            time: TimeStretchUnit::new(Some(state.time), nodes.time),
            reverb: ReverbUnit::new(Some(state.reverb), nodes.reverb),
            delay: DelayUnit::new(Some(state.delay), nodes.delay),
            filter: FilterUnit::new(Some(state.filter), nodes.filter),
        }
    }

    /// Child unit by kind. `None` for [`UnitType::Master`].
    pub fn unit(&self, unit: UnitType) -> Option<&dyn EffectsUnit> {
        match unit {
            UnitType::Master => None,
            UnitType::Eq => Some(&self.eq),
            UnitType::Pitch => Some(&self.pitch),
            UnitType::Time => Some(&self.time),
            UnitType::Reverb => Some(&self.reverb),
            UnitType::Delay => Some(&self.delay),
            UnitType::Filter => Some(&self.filter),
        }
    }

    pub fn unit_mut(&mut self, unit: UnitType) -> Option<&mut dyn EffectsUnit> {
        match unit {
            UnitType::Master => None,
            UnitType::Eq => Some(&mut self.eq),
            UnitType::Pitch => Some(&mut self.pitch),
            UnitType::Time => Some(&mut self.time),
            UnitType::Reverb => Some(&mut self.reverb),
            UnitType::Delay => Some(&mut self.delay),
            UnitType::Filter => Some(&mut self.filter),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn EffectsUnit> + '_ {
        UnitType::CHILDREN.into_iter().filter_map(|kind| self.unit(kind))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn EffectsUnit> + '_ {
        let units: [&mut dyn EffectsUnit; 6] = [
            &mut self.eq,
            &mut self.pitch,
            &mut self.time,
            &mut self.reverb,
            &mut self.delay,
            &mut self.filter,
        ];
        units.into_iter()
    }

    pub fn any_active(&self) -> bool {
        self.iter().any(|unit| unit.is_active())
    }

    pub fn persistent_state(&self) -> UnitsState {
        UnitsState {
            eq: self.eq.persistent_state(),
            pitch: self.pitch.persistent_state(),
            time: self.time.persistent_state(),
            reverb: self.reverb.persistent_state(),
            delay: self.delay.persistent_state(),
            filter: self.filter.persistent_state(),
        }
    }
}

/// Master unit, child units and per-track profiles.
pub struct EffectsChain {
    pub master: MasterUnit,
    pub units: EffectsUnits,
    pub sound_profiles: SoundProfiles,
}

impl EffectsChain {
    /// Build the chain from a snapshot, or from defaults when there is none.
    pub fn new(state: Option<EffectsChainState>, nodes: ChainNodes) -> Self {
        let state = state.unwrap_or_default();

        Self {
            master: MasterUnit::new(Some(state.master)),
            units: EffectsUnits::new(state.units, nodes),
            sound_profiles: state.sound_profiles,
        }
    }

    /// Chain over detached nodes. Used by the CLI and tests.
    pub fn detached(state: Option<EffectsChainState>) -> Self {
        Self::new(state, ChainNodes::detached())
    }

    /// State of any unit, master included.
    pub fn unit_state(&self, unit: UnitType) -> EffectsUnitState {
        match self.units.unit(unit) {
            Some(child) => child.state(),
            None => self.master.state(),
        }
    }

    /// Toggle any unit, master included. Returns the new state.
    ///
    /// Children go through the master's gate, so a child switched on while
    /// the chain is off stays silent until the chain comes back on.
    pub fn toggle(&mut self, unit: UnitType) -> EffectsUnitState {
        match unit {
            UnitType::Master => self.master.toggle_state(&mut self.units),
            child => self.master.toggle_child(child, &mut self.units),
        }
    }

    /// Switch a unit on if it isn't on already. Respects the master's gate.
    pub fn ensure_active(&mut self, unit: UnitType) {
        match unit {
            UnitType::Master => self.master.ensure_active(&mut self.units),
            child => {
                let on = self.unit_state(child).is_active() || self.master.is_gated(child);
                if !on {
                    self.master.toggle_child(child, &mut self.units);
                }
            }
        }
    }

    /// For "effects on" indicators.
    pub fn any_unit_active(&self) -> bool {
        self.master.is_active() && self.units.any_active()
    }

    /// Clear reverb and delay tails so they don't spill into the next track.
    pub fn clear_sound_tails(&self) {
        if self.units.reverb.is_active() {
            self.units.reverb.reset();
        }
        if self.units.delay.is_active() {
            self.units.delay.reset();
        }
    }

    pub fn preset_exists(&self, unit: UnitType, name: &str) -> bool {
        match self.units.unit(unit) {
            Some(child) => child.preset_exists(name),
            None => self.master.presets().exists(name),
        }
    }

    pub fn is_system_preset(&self, unit: UnitType, name: &str) -> bool {
        match self.units.unit(unit) {
            Some(child) => child.is_system_preset(name),
            None => false,
        }
    }

    /// Apply a named preset. Unknown names are a silent no-op.
    pub fn apply_preset(&mut self, unit: UnitType, name: &str) -> bool {
        match self.units.unit_mut(unit) {
            Some(child) => child.apply_preset(name),
            None => self.master.apply_preset_named(name, &mut self.units),
        }
    }

    /// Save the unit's current settings. The caller checks uniqueness.
    pub fn save_preset(&mut self, unit: UnitType, name: &str) {
        match self.units.unit_mut(unit) {
            Some(child) => child.save_preset(name),
            None => self.master.save_preset(name, &self.units),
        }
    }

    /// Delete user presets by name. Returns how many were removed.
    pub fn delete_presets(&mut self, unit: UnitType, names: &[String]) -> usize {
        let removed = match self.units.unit_mut(unit) {
            Some(child) => child.delete_presets(names),
            None => self.master.presets_mut().delete(names).len(),
        };
        debug!("{} unit: deleted {} preset(s)", unit, removed);
        removed
    }

    pub fn rename_preset(&mut self, unit: UnitType, old_name: &str, new_name: &str) {
        match self.units.unit_mut(unit) {
            Some(child) => child.rename_preset(old_name, new_name),
            None => self.master.presets_mut().rename(old_name, new_name),
        }
    }

    /// System-defined then user-defined preset names.
    pub fn preset_names(&self, unit: UnitType) -> (Vec<String>, Vec<String>) {
        match self.units.unit(unit) {
            Some(child) => (child.system_preset_names(), child.user_preset_names()),
            None => (
                Vec::new(),
                self.master
                    .presets()
                    .user_defined_presets()
                    .map(|p| p.name().to_string())
                    .collect(),
            ),
        }
    }

    /// Events from the master and every child since the last drain.
    pub fn drain_events(&mut self) -> Vec<UnitEvent> {
        let mut events = self.master.drain_events();
        for unit in self.units.iter_mut() {
            events.extend(unit.drain_events());
        }
        events
    }

    pub fn persistent_state(&self) -> EffectsChainState {
        info!("capturing effects chain state");
        EffectsChainState {
            master: self.master.persistent_state(),
            units: self.units.persistent_state(),
            sound_profiles: self.sound_profiles.clone(),
        }
    }
}
