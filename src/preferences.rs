//! User sound preferences consumed by the delegate layer.

use serde::{Deserialize, Serialize};

/// Step sizes for the nudge commands and the per-track memory switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundPreferences {
    /// Bass/mids/treble step in dB.
    pub eq_delta: f32,
    /// Pitch step in cents.
    pub pitch_delta: f32,
    /// Playback rate step.
    pub time_delta: f32,
    /// Remember the chain settings for every track, not only ones that
    /// already have a profile.
    pub remember_effects_settings_for_all_tracks: bool,
}

impl Default for SoundPreferences {
    fn default() -> Self {
        Self {
            eq_delta: 1.0,
            pitch_delta: 100.0,
            time_delta: 0.05,
            remember_effects_settings_for_all_tracks: false,
        }
    }
}
