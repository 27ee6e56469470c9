//! Generic effects unit.
//!
//! Every effect kind shares the same state machine, preset store and
//! persistence. What differs is captured by a [`UnitKind`] descriptor: the
//! parameter struct, the factory presets and how parameters map onto the
//! processing node.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::node::ProcessingNode;
use super::preset::{NamedPreset, Preset, PresetStore};
use super::state::EffectsUnitState;
use crate::error::FxError;
use crate::state::UnitState;

/// The effect kinds making up the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitType {
    Master,
    Eq,
    Pitch,
    Time,
    Reverb,
    Delay,
    Filter,
}

impl UnitType {
    /// The six child units, in signal-chain order.
    pub const CHILDREN: [UnitType; 6] = [
        UnitType::Eq,
        UnitType::Pitch,
        UnitType::Time,
        UnitType::Reverb,
        UnitType::Delay,
        UnitType::Filter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Master => "master",
            UnitType::Eq => "eq",
            UnitType::Pitch => "pitch",
            UnitType::Time => "time",
            UnitType::Reverb => "reverb",
            UnitType::Delay => "delay",
            UnitType::Filter => "filter",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master" => Ok(UnitType::Master),
            "eq" | "equalizer" => Ok(UnitType::Eq),
            "pitch" | "pitch-shift" => Ok(UnitType::Pitch),
            "time" | "time-stretch" => Ok(UnitType::Time),
            "reverb" => Ok(UnitType::Reverb),
            "delay" => Ok(UnitType::Delay),
            "filter" => Ok(UnitType::Filter),
            _ => Err(FxError::UnknownUnit {
                name: s.to_string(),
            }),
        }
    }
}

/// Buffered notifications, drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEvent {
    /// Any state transition.
    StateChanged {
        unit: UnitType,
        state: EffectsUnitState,
    },

    /// The unit just became audible. Never emitted by the master unit.
    Activated { unit: UnitType },
}

/// Parameter descriptor for one effect kind.
pub trait UnitKind: Send + Sync + 'static {
    const TYPE: UnitType;

    /// Size of the node's parameter table.
    const PARAMETER_COUNT: usize;

    type Params: Clone + PartialEq + fmt::Debug + Default + Serialize + DeserializeOwned;

    /// Factory presets, seeded into every new store.
    fn system_presets() -> Vec<Preset<Self::Params>>;

    /// Write every parameter to the node.
    fn write_to_node(params: &Self::Params, node: &dyn ProcessingNode);

    /// Repair restored parameters that are internally inconsistent.
    fn normalize(params: Self::Params) -> Self::Params {
        params
    }

    /// Parameters to take from `preset` given the unit's current ones.
    fn adapt_preset(_current: &Self::Params, preset: &Self::Params) -> Self::Params {
        preset.clone()
    }
}

/// One effects unit wrapping one processing node.
pub struct Unit<K: UnitKind> {
    pub(crate) state: EffectsUnitState,
    pub(crate) params: K::Params,
    pub(crate) node: Arc<dyn ProcessingNode>,
    presets: PresetStore<Preset<K::Params>>,
    pending_events: Vec<UnitEvent>,
    _kind: PhantomData<K>,
}

impl<K: UnitKind> Unit<K> {
    /// Build a unit from a persisted snapshot, or from defaults when there is none.
    pub fn new(persisted: Option<UnitState<K::Params>>, node: Arc<dyn ProcessingNode>) -> Self {
        let persisted = persisted.unwrap_or_default();
        let params = K::normalize(persisted.params);

        let user_presets = persisted
            .user_presets
            .into_iter()
            .filter(|preset| !preset.name().is_empty());

        K::write_to_node(&params, node.as_ref());
        node.set_bypass(persisted.state.node_bypass());

        Self {
            state: persisted.state,
            params,
            node,
            presets: PresetStore::with_presets(K::system_presets(), user_presets),
            pending_events: Vec::new(),
            _kind: PhantomData,
        }
    }

    pub fn unit_type(&self) -> UnitType {
        K::TYPE
    }

    pub fn state(&self) -> EffectsUnitState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn params(&self) -> &K::Params {
        &self.params
    }

    pub fn node(&self) -> &Arc<dyn ProcessingNode> {
        &self.node
    }

    /// `Bypassed <-> Active`. Returns the new state.
    pub fn toggle_state(&mut self) -> EffectsUnitState {
        self.transition(self.state.toggled());
        self.state
    }

    pub fn suppress(&mut self) {
        self.transition(self.state.suppressed());
    }

    pub fn unsuppress(&mut self) {
        self.transition(self.state.unsuppressed());
    }

    /// Activate the unit if it isn't already. A suppressed unit goes straight to `Active`.
    pub fn ensure_active(&mut self) {
        if !self.is_active() {
            self.toggle_state();
        }
    }

    /// Force a state. Used when a whole-chain preset is applied.
    pub fn set_state(&mut self, state: EffectsUnitState) {
        self.transition(state);
    }

    fn transition(&mut self, new_state: EffectsUnitState) {
        if new_state == self.state {
            return;
        }

        debug!("{} unit: {} -> {}", K::TYPE, self.state, new_state);

        self.state = new_state;
        self.node.set_bypass(new_state.node_bypass());

        self.pending_events.push(UnitEvent::StateChanged {
            unit: K::TYPE,
            state: new_state,
        });

        if new_state.is_active() {
            self.pending_events
                .push(UnitEvent::Activated { unit: K::TYPE });
        }
    }

    /// Replace every parameter and mirror them onto the node. State is untouched.
    pub fn set_params(&mut self, params: K::Params) {
        K::write_to_node(&params, self.node.as_ref());
        self.params = params;
    }

    /// Clear the node's DSP memory.
    pub fn reset(&self) {
        self.node.reset();
    }

    pub fn presets(&self) -> &PresetStore<Preset<K::Params>> {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetStore<Preset<K::Params>> {
        &mut self.presets
    }

    /// Current parameters and state as a (user-defined) preset.
    pub fn settings_as_preset(&self, name: &str) -> Preset<K::Params> {
        Preset::user(name, self.state, self.params.clone())
    }

    /// Capture the current settings under `name`. The caller checks uniqueness.
    pub fn save_preset(&mut self, name: &str) {
        info!("{} unit: saving preset '{}'", K::TYPE, name);
        let preset = self.settings_as_preset(name);
        self.presets.add(preset);
    }

    /// Copy a named preset's parameters into the unit.
    ///
    /// Unknown names are a silent no-op; the return value says whether
    /// anything was applied. State is never changed here.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        let Some(preset) = self.presets.by_name(name) else {
            debug!("{} unit: no preset named '{}'", K::TYPE, name);
            return false;
        };

        let params = K::adapt_preset(&self.params, &preset.params);
        info!("{} unit: applying preset '{}'", K::TYPE, name);
        self.set_params(params);
        true
    }

    /// Copy an arbitrary preset's parameters into the unit. State is untouched.
    pub fn apply_preset_settings(&mut self, preset: &Preset<K::Params>) {
        let params = K::adapt_preset(&self.params, &preset.params);
        self.set_params(params);
    }

    /// Snapshot for persistence.
    pub fn persistent_state(&self) -> UnitState<K::Params> {
        UnitState {
            state: self.state,
            params: self.params.clone(),
            user_presets: self.presets.user_defined_presets().cloned().collect(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<UnitEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}

/// Kind-erased view of a unit, for callers that pick a unit at runtime.
pub trait EffectsUnit {
    fn unit_type(&self) -> UnitType;
    fn state(&self) -> EffectsUnitState;
    fn is_active(&self) -> bool;
    fn toggle_state(&mut self) -> EffectsUnitState;
    fn suppress(&mut self);
    fn unsuppress(&mut self);
    fn ensure_active(&mut self);
    fn set_state(&mut self, state: EffectsUnitState);
    fn reset(&self);
    fn preset_exists(&self, name: &str) -> bool;
    fn is_system_preset(&self, name: &str) -> bool;
    fn apply_preset(&mut self, name: &str) -> bool;
    fn save_preset(&mut self, name: &str);
    fn delete_presets(&mut self, names: &[String]) -> usize;
    fn rename_preset(&mut self, old_name: &str, new_name: &str);
    fn system_preset_names(&self) -> Vec<String>;
    fn user_preset_names(&self) -> Vec<String>;
    fn drain_events(&mut self) -> Vec<UnitEvent>;
}

impl<K: UnitKind> EffectsUnit for Unit<K> {
    fn unit_type(&self) -> UnitType {
        K::TYPE
    }

    fn state(&self) -> EffectsUnitState {
        self.state
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn toggle_state(&mut self) -> EffectsUnitState {
        Unit::toggle_state(self)
    }

    fn suppress(&mut self) {
        Unit::suppress(self)
    }

    fn unsuppress(&mut self) {
        Unit::unsuppress(self)
    }

    fn ensure_active(&mut self) {
        Unit::ensure_active(self)
    }

    fn set_state(&mut self, state: EffectsUnitState) {
        Unit::set_state(self, state)
    }

    fn reset(&self) {
        Unit::reset(self)
    }

    fn preset_exists(&self, name: &str) -> bool {
        self.presets.exists(name)
    }

    fn is_system_preset(&self, name: &str) -> bool {
        self.presets
            .by_name(name)
            .is_some_and(|preset| preset.is_system_defined())
    }

    fn apply_preset(&mut self, name: &str) -> bool {
        Unit::apply_preset(self, name)
    }

    fn save_preset(&mut self, name: &str) {
        Unit::save_preset(self, name)
    }

    fn delete_presets(&mut self, names: &[String]) -> usize {
        self.presets.delete(names).len()
    }

    fn rename_preset(&mut self, old_name: &str, new_name: &str) {
        self.presets.rename(old_name, new_name)
    }

    fn system_preset_names(&self) -> Vec<String> {
        self.presets
            .system_defined_presets()
            .map(|p| p.name().to_string())
            .collect()
    }

    fn user_preset_names(&self) -> Vec<String> {
        self.presets
            .user_defined_presets()
            .map(|p| p.name().to_string())
            .collect()
    }

    fn drain_events(&mut self) -> Vec<UnitEvent> {
        Unit::drain_events(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::node::ParameterNode;

    /// Minimal kind: one gain parameter at address 0.
    struct TestKind;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct TestParams {
        gain: f32,
    }

    impl UnitKind for TestKind {
        const TYPE: UnitType = UnitType::Reverb;
        const PARAMETER_COUNT: usize = 1;
        type Params = TestParams;

        fn system_presets() -> Vec<Preset<TestParams>> {
            vec![Preset::system("Loud", TestParams { gain: 12.0 })]
        }

        fn write_to_node(params: &TestParams, node: &dyn ProcessingNode) {
            node.set_parameter(0, params.gain);
        }
    }

    fn unit_with_node(persisted: Option<UnitState<TestParams>>) -> (Unit<TestKind>, Arc<ParameterNode>) {
        let node = Arc::new(ParameterNode::new(TestKind::PARAMETER_COUNT));
        let unit = Unit::<TestKind>::new(persisted, node.clone());
        (unit, node)
    }

    #[test]
    fn test_construction_wires_node() {
        let persisted = UnitState {
            state: EffectsUnitState::Active,
            params: TestParams { gain: 3.0 },
            user_presets: vec![],
        };
        let (unit, node) = unit_with_node(Some(persisted));

        assert!(unit.is_active());
        assert!(!node.bypass());
        assert_eq!(node.parameter(0), 3.0);
    }

    #[test]
    fn test_defaults_are_bypassed() {
        let (unit, node) = unit_with_node(None);
        assert_eq!(unit.state(), EffectsUnitState::Bypassed);
        assert!(node.bypass());
        assert_eq!(unit.presets().len(), 1);
    }

    #[test]
    fn test_state_transitions_drive_bypass_and_events() {
        let (mut unit, node) = unit_with_node(None);

        assert_eq!(unit.toggle_state(), EffectsUnitState::Active);
        assert!(!node.bypass());

        unit.suppress();
        assert_eq!(unit.state(), EffectsUnitState::Suppressed);
        assert!(node.bypass());

        unit.unsuppress();
        assert!(unit.is_active());

        let events = unit.drain_events();
        let activations = events
            .iter()
            .filter(|e| matches!(e, UnitEvent::Activated { .. }))
            .count();
        assert_eq!(activations, 2);
        assert_eq!(events.len(), 5);
        assert!(!unit.has_pending_events());
    }

    #[test]
    fn test_suppress_from_bypassed_is_noop() {
        let (mut unit, _node) = unit_with_node(None);
        unit.suppress();
        assert_eq!(unit.state(), EffectsUnitState::Bypassed);
        assert!(unit.drain_events().is_empty());
    }

    #[test]
    fn test_ensure_active_from_suppressed() {
        let (mut unit, _node) = unit_with_node(None);
        unit.toggle_state();
        unit.suppress();
        unit.ensure_active();
        assert!(unit.is_active());
    }

    #[test]
    fn test_apply_preset_keeps_state() {
        let (mut unit, node) = unit_with_node(None);

        assert!(unit.apply_preset("Loud"));
        assert_eq!(unit.params().gain, 12.0);
        assert_eq!(node.parameter(0), 12.0);
        assert_eq!(unit.state(), EffectsUnitState::Bypassed);
    }

    #[test]
    fn test_apply_unknown_preset_is_silent() {
        let (mut unit, node) = unit_with_node(None);
        assert!(!unit.apply_preset("nope"));
        assert_eq!(node.parameter(0), 0.0);
    }

    #[test]
    fn test_persisted_preset_named_like_factory_is_dropped() {
        let persisted = UnitState {
            state: EffectsUnitState::Bypassed,
            params: TestParams::default(),
            user_presets: vec![
                Preset::user("Loud", EffectsUnitState::Active, TestParams { gain: -30.0 }),
                Preset::user("mine", EffectsUnitState::Active, TestParams { gain: 1.0 }),
            ],
        };
        let (mut unit, node) = unit_with_node(Some(persisted));

        assert!(unit.is_system_preset("Loud"));
        assert!(unit.apply_preset("Loud"));
        assert_eq!(node.parameter(0), 12.0);

        let stored: Vec<_> = unit.persistent_state().user_presets;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name(), "mine");
    }

    #[test]
    fn test_save_preset_captures_state_and_params() {
        let (mut unit, _node) = unit_with_node(None);
        unit.set_params(TestParams { gain: -4.0 });
        unit.toggle_state();
        unit.save_preset("quiet");

        let preset = unit.presets().by_name("quiet").unwrap();
        assert_eq!(preset.params.gain, -4.0);
        assert_eq!(preset.state, EffectsUnitState::Active);
        assert!(!preset.is_system_defined());
    }

    #[test]
    fn test_persistent_state_round_trip() {
        let snapshot = UnitState {
            state: EffectsUnitState::Suppressed,
            params: TestParams { gain: 0.1 },
            user_presets: vec![Preset::user(
                "a",
                EffectsUnitState::Bypassed,
                TestParams { gain: 7.25 },
            )],
        };

        let (unit, _node) = unit_with_node(Some(snapshot.clone()));
        assert_eq!(unit.persistent_state(), snapshot);
    }

    #[test]
    fn test_reset_forwards_to_node() {
        let (unit, node) = unit_with_node(None);
        unit.reset();
        assert_eq!(node.reset_count(), 1);
    }

    #[test]
    fn test_unit_type_parsing() {
        assert_eq!("EQ".parse::<UnitType>().unwrap(), UnitType::Eq);
        assert_eq!("time-stretch".parse::<UnitType>().unwrap(), UnitType::Time);
        assert!("chorus".parse::<UnitType>().is_err());
    }

    #[test]
    fn test_kind_erased_surface() {
        let (mut unit, _node) = unit_with_node(None);
        let unit: &mut dyn EffectsUnit = &mut unit;

        unit.save_preset("mine");
        assert!(unit.is_system_preset("Loud"));
        assert!(!unit.is_system_preset("mine"));
        assert_eq!(unit.delete_presets(&["Loud".to_string(), "mine".to_string()]), 1);
        assert_eq!(unit.system_preset_names(), vec!["Loud"]);
        assert!(unit.user_preset_names().is_empty());
    }
}
