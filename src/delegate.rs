//! User-facing effects operations.
//!
//! Nudge commands ("more bass", "faster") switch the target unit on before
//! changing it. When that switch actually happens the unit is first reset
//! to a neutral baseline, so the first nudge starts from flat EQ, zero pitch
//! or normal speed rather than from whatever the unit held while bypassed.

use log::{debug, info};

use crate::effects::chain::EffectsChain;
use crate::effects::eq::{BandRegion, FLAT_PRESET};
use crate::effects::eq_mapper::EqType;
use crate::effects::master::MasterPreset;
use crate::effects::pitch::PitchParams;
use crate::effects::state::EffectsUnitState;
use crate::effects::time::TimeParams;
use crate::effects::unit::{EffectsUnit, UnitType};
use crate::error::{FxError, Result};
use crate::preferences::SoundPreferences;
use crate::state::PersistedState;

/// Name under which the pre-profile settings are captured.
const SYSTEM_PROFILE: &str = "system";

/// Policy layer between callers and the effects chain.
pub struct EffectsDelegate {
    chain: EffectsChain,
    preferences: SoundPreferences,
    /// Settings in force before a track profile took over.
    system_settings: Option<MasterPreset>,
}

impl EffectsDelegate {
    pub fn new(chain: EffectsChain, preferences: SoundPreferences) -> Self {
        Self {
            chain,
            preferences,
            system_settings: None,
        }
    }

    /// Rebuild from a loaded state file, or from defaults.
    pub fn from_persisted(state: Option<PersistedState>) -> Self {
        match state {
            Some(state) => Self::new(EffectsChain::detached(Some(state.effects)), state.preferences),
            None => Self::new(EffectsChain::detached(None), SoundPreferences::default()),
        }
    }

    pub fn chain(&self) -> &EffectsChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut EffectsChain {
        &mut self.chain
    }

    pub fn preferences(&self) -> &SoundPreferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut SoundPreferences {
        &mut self.preferences
    }

    pub fn persistent_state(&self) -> PersistedState {
        PersistedState::new(self.preferences.clone(), self.chain.persistent_state())
    }

    /// Switch a child unit on. Also switches the chain on when it is off.
    ///
    /// Returns true when the unit was off before. A unit held silent by an
    /// off chain was already on.
    fn activate(&mut self, unit: UnitType) -> bool {
        let was_on = self.chain.unit_state(unit) == EffectsUnitState::Active
            || self.chain.master.is_gated(unit);

        self.chain.ensure_active(UnitType::Master);
        if was_on {
            return false;
        }

        self.chain.ensure_active(unit);
        true
    }

    // === Toggles ===

    /// Toggle any unit. A child switched on while the chain is off turns the chain on.
    pub fn toggle(&mut self, unit: UnitType) -> EffectsUnitState {
        let master = &self.chain.master;
        let switching_on = unit != UnitType::Master
            && !master.is_active()
            && !master.is_gated(unit);

        if switching_on {
            self.chain.ensure_active(UnitType::Master);
        }
        self.chain.toggle(unit)
    }

    // === Equalizer ===

    fn nudge_region(&mut self, region: BandRegion, delta: f32) -> Vec<f32> {
        if self.activate(UnitType::Eq) {
            debug!("eq activated, starting from the flat preset");
            self.chain.units.eq.apply_preset(FLAT_PRESET);
        }
        self.chain.units.eq.adjust_region(region, delta)
    }

    pub fn increase_bass(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Bass, self.preferences.eq_delta)
    }

    pub fn decrease_bass(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Bass, -self.preferences.eq_delta)
    }

    pub fn increase_mids(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Mids, self.preferences.eq_delta)
    }

    pub fn decrease_mids(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Mids, -self.preferences.eq_delta)
    }

    pub fn increase_treble(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Treble, self.preferences.eq_delta)
    }

    pub fn decrease_treble(&mut self) -> Vec<f32> {
        self.nudge_region(BandRegion::Treble, -self.preferences.eq_delta)
    }

    pub fn set_eq_type(&mut self, eq_type: EqType) {
        self.chain.units.eq.set_eq_type(eq_type);
    }

    // === Pitch shift ===

    fn nudge_pitch(&mut self, delta: f32) -> f32 {
        if self.activate(UnitType::Pitch) {
            self.chain.units.pitch.set_pitch(PitchParams::default().pitch);
        }
        self.chain.units.pitch.adjust_pitch(delta)
    }

    pub fn increase_pitch(&mut self) -> f32 {
        self.nudge_pitch(self.preferences.pitch_delta)
    }

    pub fn decrease_pitch(&mut self) -> f32 {
        self.nudge_pitch(-self.preferences.pitch_delta)
    }

    // === Time stretch ===

    fn nudge_rate(&mut self, delta: f32) -> f32 {
        if self.activate(UnitType::Time) {
            self.chain.units.time.set_rate(TimeParams::default().rate);
        }
        self.chain.units.time.adjust_rate(delta)
    }

    pub fn increase_rate(&mut self) -> f32 {
        self.nudge_rate(self.preferences.time_delta)
    }

    pub fn decrease_rate(&mut self) -> f32 {
        self.nudge_rate(-self.preferences.time_delta)
    }

    pub fn toggle_shift_pitch(&mut self) -> bool {
        self.chain.units.time.toggle_shift_pitch()
    }

    // === Presets ===

    /// Save the unit's settings under a new name.
    ///
    /// # Errors
    /// `EmptyPresetName` or `PresetExists`.
    pub fn save_preset(&mut self, unit: UnitType, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(FxError::EmptyPresetName);
        }
        if self.chain.preset_exists(unit, name) {
            return Err(FxError::PresetExists {
                unit,
                name: name.to_string(),
            });
        }

        self.chain.save_preset(unit, name);
        Ok(())
    }

    /// Apply a named preset. Unknown names do nothing and return false.
    pub fn apply_preset(&mut self, unit: UnitType, name: &str) -> bool {
        self.chain.apply_preset(unit, name)
    }

    /// Delete user presets. Unknown and built-in names are skipped.
    ///
    /// Returns how many were removed.
    pub fn delete_presets(&mut self, unit: UnitType, names: &[String]) -> usize {
        self.chain.delete_presets(unit, names)
    }

    /// Rename a user preset. Returns false, changing nothing, when
    /// `old_name` is unknown or built-in, or `new_name` is blank or taken.
    pub fn rename_preset(&mut self, unit: UnitType, old_name: &str, new_name: &str) -> bool {
        let renamable = !new_name.trim().is_empty()
            && self.chain.preset_exists(unit, old_name)
            && !self.chain.is_system_preset(unit, old_name)
            && !self.chain.preset_exists(unit, new_name);

        if renamable {
            self.chain.rename_preset(unit, old_name, new_name);
        }
        renamable
    }

    // === Track changes ===

    fn remember_profile(&mut self, track: &str) {
        let settings = self.chain.master.settings_as_preset(track, &self.chain.units);
        self.chain.sound_profiles.add(track, settings);
        debug!("saved sound profile for {}", track);
    }

    fn restore_system_settings(&mut self) {
        if let Some(settings) = self.system_settings.take() {
            info!("restoring system sound settings");
            self.chain.master.apply_preset(&settings, &mut self.chain.units);
        }
    }

    fn apply_profile(&mut self, track: &str) -> bool {
        match self.chain.sound_profiles.get(track) {
            Some(profile) => {
                info!("applying sound profile for {}", track);
                self.chain.master.apply_preset(profile, &mut self.chain.units);
                true
            }
            None => false,
        }
    }

    /// Swap per-track settings when playback moves from `old` to `new`.
    pub fn pre_track_change(&mut self, old: Option<&str>, new: Option<&str>) {
        let remember_all = self.preferences.remember_effects_settings_for_all_tracks;

        match old {
            Some(old) if remember_all || self.chain.sound_profiles.has(old) => {
                self.remember_profile(old);

                let applied = new.is_some_and(|new| self.apply_profile(new));
                if !applied {
                    self.restore_system_settings();
                }
            }
            _ => {
                if let Some(new) = new.filter(|new| self.chain.sound_profiles.has(new)) {
                    if self.system_settings.is_none() {
                        self.system_settings = Some(
                            self.chain
                                .master
                                .settings_as_preset(SYSTEM_PROFILE, &self.chain.units),
                        );
                    }
                    self.apply_profile(new);
                }
            }
        }

        self.chain.clear_sound_tails();
    }

    /// Remember the playing track's settings and put the system settings back for next launch.
    pub fn on_app_exit(&mut self, playing: Option<&str>) {
        if let Some(track) = playing {
            if self.preferences.remember_effects_settings_for_all_tracks
                || self.chain.sound_profiles.has(track)
            {
                self.remember_profile(track);
            }
        }

        self.restore_system_settings();
    }
}
