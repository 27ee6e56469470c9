//! Integration Tests
//!
//! End-to-end tests for the effects chain through its public surface.

use std::sync::Arc;

use approx::assert_relative_eq;

use fxchain::effects::eq_mapper::{remap_bands, EqType};
use fxchain::effects::{
    ChainNodes, EffectsChain, EffectsUnit, EffectsUnitState, FilterBand, NamedPreset,
    ParameterNode, Preset, PresetStore, ProcessingNode, ReverbSpace, UnitEvent, UnitType,
};
use fxchain::EffectsDelegate;

/// A chain whose nodes stay observable from the test.
struct ObservedChain {
    chain: EffectsChain,
    eq: Arc<ParameterNode>,
    reverb: Arc<ParameterNode>,
    delay: Arc<ParameterNode>,
}

fn observed_chain() -> ObservedChain {
    let eq = Arc::new(ParameterNode::new(17));
    let reverb = Arc::new(ParameterNode::new(2));
    let delay = Arc::new(ParameterNode::new(4));

    let mut nodes = ChainNodes::detached();
    nodes.eq = eq.clone();
    nodes.reverb = reverb.clone();
    nodes.delay = delay.clone();

    ObservedChain {
        chain: EffectsChain::new(None, nodes),
        eq,
        reverb,
        delay,
    }
}

// === State Machine Through The Chain ===

#[test]
fn test_child_toggle_drives_node_bypass() {
    let mut fx = observed_chain();
    assert!(fx.reverb.bypass());

    assert_eq!(fx.chain.toggle(UnitType::Reverb), EffectsUnitState::Active);
    assert!(!fx.reverb.bypass());

    assert_eq!(fx.chain.toggle(UnitType::Reverb), EffectsUnitState::Bypassed);
    assert!(fx.reverb.bypass());
}

#[test]
fn test_master_off_suppresses_and_restores() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Reverb);
    assert!(fx.chain.any_unit_active());

    fx.chain.toggle(UnitType::Master);
    assert_eq!(fx.chain.unit_state(UnitType::Reverb), EffectsUnitState::Suppressed);
    assert_eq!(fx.chain.unit_state(UnitType::Delay), EffectsUnitState::Bypassed);
    assert!(fx.reverb.bypass());
    assert!(!fx.chain.any_unit_active());

    fx.chain.toggle(UnitType::Master);
    assert_eq!(fx.chain.unit_state(UnitType::Reverb), EffectsUnitState::Active);
    assert!(!fx.reverb.bypass());
}

#[test]
fn test_activation_events_skip_master() {
    let mut fx = observed_chain();
    fx.chain.drain_events();

    fx.chain.toggle(UnitType::Delay);
    fx.chain.toggle(UnitType::Master);
    fx.chain.toggle(UnitType::Master);

    let events = fx.chain.drain_events();
    assert!(events.contains(&UnitEvent::Activated {
        unit: UnitType::Delay
    }));
    assert!(events.contains(&UnitEvent::StateChanged {
        unit: UnitType::Master,
        state: EffectsUnitState::Bypassed,
    }));
    assert!(!events.contains(&UnitEvent::Activated {
        unit: UnitType::Master
    }));
    assert!(fx.chain.drain_events().is_empty());
}

// === Presets ===

#[test]
fn test_child_apply_keeps_state_and_writes_node() {
    let mut fx = observed_chain();

    assert!(fx.chain.apply_preset(UnitType::Eq, "Rock"));
    assert_eq!(fx.chain.unit_state(UnitType::Eq), EffectsUnitState::Bypassed);
    assert_relative_eq!(fx.eq.parameter(2), 5.0);
    assert_relative_eq!(fx.eq.parameter(1), 15.0);

    assert!(fx.chain.apply_preset(UnitType::Reverb, "Cathedral"));
    assert_eq!(fx.chain.units.reverb.space(), ReverbSpace::Cathedral);
    assert_relative_eq!(fx.reverb.parameter(0), ReverbSpace::Cathedral.index() as f32);
}

#[test]
fn test_unknown_preset_is_a_silent_no_op() {
    let mut fx = observed_chain();
    let before = fx.chain.persistent_state();

    assert!(!fx.chain.apply_preset(UnitType::Pitch, "does not exist"));
    assert!(!fx.chain.apply_preset(UnitType::Master, "does not exist"));
    fx.chain.rename_preset(UnitType::Delay, "missing", "other");
    assert_eq!(fx.chain.delete_presets(UnitType::Delay, &["missing".to_string()]), 0);

    assert_eq!(fx.chain.persistent_state(), before);
}

#[test]
fn test_apply_then_capture_matches_for_every_kind() {
    let mut fx = observed_chain();

    for unit in UnitType::CHILDREN {
        let (system, _) = fx.chain.preset_names(unit);
        let name = system.last().cloned().unwrap();
        assert!(fx.chain.apply_preset(unit, &name), "{} has no '{}'", unit, name);
    }

    let units = &fx.chain.units;
    let eq = units.eq.presets().by_name("Vocal").unwrap();
    assert_eq!(units.eq.settings_as_preset("x").params, eq.params);
    let pitch = units.pitch.presets().by_name("Half step down").unwrap();
    assert_eq!(units.pitch.settings_as_preset("x").params, pitch.params);
    let delay = units.delay.presets().by_name("Canyon").unwrap();
    assert_eq!(units.delay.settings_as_preset("x").params, delay.params);
    let filter = units.filter.presets().by_name("Vocal cut").unwrap();
    assert_eq!(units.filter.settings_as_preset("x").params, filter.params);
}

#[test]
fn test_master_preset_is_state_inclusive() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Eq);
    fx.chain.toggle(UnitType::Delay);
    fx.chain.units.delay.set_feedback(-25.0);
    fx.chain.save_preset(UnitType::Master, "Evening");

    fx.chain.toggle(UnitType::Eq);
    fx.chain.toggle(UnitType::Delay);
    fx.chain.toggle(UnitType::Reverb);
    fx.chain.units.delay.set_feedback(80.0);

    assert!(fx.chain.apply_preset(UnitType::Master, "Evening"));
    let captured = fx
        .chain
        .master
        .settings_as_preset("Evening", &fx.chain.units);
    let saved = fx.chain.master.presets().by_name("Evening").unwrap();

    for unit in UnitType::CHILDREN {
        assert_eq!(captured.child_state(unit), saved.child_state(unit), "{}", unit);
    }
    assert_eq!(captured, *saved);
    assert!(!fx.delay.bypass());
    assert!(fx.reverb.bypass());
    assert_relative_eq!(fx.delay.parameter(2), -25.0);
}

#[test]
fn test_master_apply_while_off_stays_silent() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Reverb);
    fx.chain.save_preset(UnitType::Master, "Wet");
    fx.chain.toggle(UnitType::Reverb);

    fx.chain.toggle(UnitType::Master);
    fx.chain.apply_preset(UnitType::Master, "Wet");
    assert_eq!(fx.chain.unit_state(UnitType::Reverb), EffectsUnitState::Suppressed);
    assert!(fx.reverb.bypass());

    // Captured intent is still "on".
    let captured = fx.chain.master.settings_as_preset("x", &fx.chain.units);
    assert_eq!(captured.child_state(UnitType::Reverb), Some(EffectsUnitState::Active));
}

#[test]
fn test_master_apply_while_off_round_trips_suppressed_children() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Reverb);
    fx.chain.toggle(UnitType::Delay);
    fx.chain.units.delay.suppress();
    fx.chain.save_preset(UnitType::Master, "Mixed");

    fx.chain.toggle(UnitType::Master);
    assert!(fx.chain.apply_preset(UnitType::Master, "Mixed"));

    let captured = fx.chain.master.settings_as_preset("Mixed", &fx.chain.units);
    let saved = fx.chain.master.presets().by_name("Mixed").unwrap();
    for unit in UnitType::CHILDREN {
        assert_eq!(captured.child_state(unit), saved.child_state(unit), "{}", unit);
    }
    assert!(fx.chain.master.is_gated(UnitType::Reverb));
    assert!(!fx.chain.master.is_gated(UnitType::Delay));

    // Switching back on wakes only what the master silenced.
    fx.chain.toggle(UnitType::Master);
    assert_eq!(fx.chain.unit_state(UnitType::Reverb), EffectsUnitState::Active);
    assert_eq!(fx.chain.unit_state(UnitType::Delay), EffectsUnitState::Suppressed);
    assert!(fx.delay.bypass());
}

#[test]
fn test_child_toggle_while_master_off_is_gated() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Master);

    assert_eq!(fx.chain.toggle(UnitType::Reverb), EffectsUnitState::Suppressed);
    assert!(fx.reverb.bypass());
    assert!(!fx.chain.any_unit_active());

    // A second toggle switches the intent back off.
    assert_eq!(fx.chain.toggle(UnitType::Reverb), EffectsUnitState::Bypassed);
    assert_eq!(fx.chain.toggle(UnitType::Reverb), EffectsUnitState::Suppressed);

    fx.chain.toggle(UnitType::Master);
    assert_eq!(fx.chain.unit_state(UnitType::Reverb), EffectsUnitState::Active);
    assert!(!fx.reverb.bypass());
}

#[test]
fn test_system_presets_survive_delete_and_rename() {
    let mut fx = observed_chain();
    fx.chain.save_preset(UnitType::Eq, "Mine");

    let removed = fx
        .chain
        .delete_presets(UnitType::Eq, &["Flat".to_string(), "Mine".to_string()]);
    assert_eq!(removed, 1);
    assert!(fx.chain.preset_exists(UnitType::Eq, "Flat"));
    assert!(!fx.chain.preset_exists(UnitType::Eq, "Mine"));

    fx.chain.rename_preset(UnitType::Eq, "Flat", "Level");
    assert!(fx.chain.is_system_preset(UnitType::Eq, "Flat"));
    assert!(!fx.chain.preset_exists(UnitType::Eq, "Level"));
}

#[test]
fn test_track_change_clears_only_active_tails() {
    let mut fx = observed_chain();
    fx.chain.toggle(UnitType::Reverb);

    fx.chain.clear_sound_tails();
    assert_eq!(fx.reverb.reset_count(), 1);
    assert_eq!(fx.delay.reset_count(), 0);
}

// === EQ Resolution ===

#[test]
fn test_eq_type_switch_remaps_live_bands() {
    let mut fx = observed_chain();
    fx.chain.apply_preset(UnitType::Eq, "Vocal");

    fx.chain.units.eq.set_eq_type(EqType::TenBand);
    let bands = fx.chain.units.eq.bands().to_vec();
    assert_eq!(bands.len(), 10);
    assert_relative_eq!(fx.eq.parameter(1), 10.0);
    assert_relative_eq!(bands[0], -20.0);

    // A 15-band preset lands on the 10-band unit at 10 bands.
    fx.chain.apply_preset(UnitType::Eq, "Rock");
    assert_eq!(fx.chain.units.eq.bands().len(), 10);
}

#[test]
fn test_remap_properties() {
    let ten: Vec<f32> = (0..10).map(|i| i as f32 - 4.5).collect();
    let fifteen: Vec<f32> = (0..15).map(|i| i as f32 * 0.5).collect();

    assert_eq!(remap_bands(&ten, EqType::TenBand, EqType::TenBand), ten);
    assert_eq!(remap_bands(&fifteen, EqType::FifteenBand, EqType::FifteenBand), fifteen);

    let up = remap_bands(&ten, EqType::TenBand, EqType::FifteenBand);
    assert_eq!(up.len(), 15);
    assert!(up.iter().all(|g| g.is_finite()));

    let down = remap_bands(&fifteen, EqType::FifteenBand, EqType::TenBand);
    assert_eq!(down.len(), 10);
    assert!(down.iter().all(|g| fifteen.contains(g)));
}

// === Filter ===

#[test]
fn test_filter_bands_persist_through_chain_state() {
    let mut fx = observed_chain();
    fx.chain.units.filter.add_band(FilterBand::high_pass(80.0));
    fx.chain.units.filter.add_band(FilterBand::band_stop(950.0, 1050.0));
    fx.chain.units.filter.toggle_band_bypass(0);

    let state = fx.chain.persistent_state();
    let restored = EffectsChain::detached(Some(state.clone()));

    assert_eq!(restored.units.filter.bands().len(), 2);
    assert!(restored.units.filter.bands()[0].bypass);
    assert_eq!(restored.persistent_state(), state);
}

// === Preset Store ===

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Level {
    level: f32,
}

#[test]
fn test_preset_store_properties() {
    let mut store = PresetStore::with_presets(
        vec![Preset::system("Factory", Level { level: 1.0 })],
        Vec::new(),
    );

    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        let preset = Preset::user(*name, EffectsUnitState::Active, Level { level: i as f32 });
        store.add(preset.clone());
        assert!(store.exists(name));
        assert_eq!(store.by_name(name), Some(&preset));
    }

    let removed = store.delete(["Factory", "b"]);
    assert_eq!(removed.len(), 1);
    assert!(store.exists("Factory"));
    assert!(!store.exists("b"));

    store.rename("a", "z");
    let names: Vec<&str> = store.user_defined_presets().map(|p| p.name()).collect();
    assert_eq!(names, vec!["z", "c"]);
    assert_eq!(store.by_name("z").map(NamedPreset::is_system_defined), Some(false));
}

// === Delegate Scenario ===

#[test]
fn test_listening_session() {
    let mut delegate = EffectsDelegate::from_persisted(None);

    delegate.increase_bass();
    delegate.increase_bass();
    delegate.decrease_treble();
    delegate.increase_rate();
    delegate.save_preset(UnitType::Master, "Session").unwrap();

    let chain = delegate.chain();
    assert_relative_eq!(chain.units.eq.bands()[0], 2.0);
    assert_relative_eq!(chain.units.eq.bands()[14], -1.0);
    assert_relative_eq!(chain.units.time.rate(), 1.05);
    assert!(chain.any_unit_active());

    delegate.toggle(UnitType::Eq);
    delegate.toggle(UnitType::Time);
    assert!(!delegate.chain().any_unit_active());

    assert!(delegate.apply_preset(UnitType::Master, "Session"));
    assert!(delegate.chain().units.eq.is_active());
    assert!(delegate.chain().units.time.is_active());
    assert!(delegate.chain().units.unit(UnitType::Pitch).is_some_and(|u| !u.is_active()));
}
