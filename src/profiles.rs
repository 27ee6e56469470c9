//! Per-track sound profiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effects::master::MasterPreset;

/// Whole-chain settings remembered per track, keyed by the track's file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundProfiles {
    profiles: BTreeMap<String, MasterPreset>,
}

impl SoundProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, track: &str) -> Option<&MasterPreset> {
        self.profiles.get(track)
    }

    pub fn has(&self, track: &str) -> bool {
        self.profiles.contains_key(track)
    }

    /// Remember `settings` for `track`, replacing any earlier profile.
    pub fn add(&mut self, track: impl Into<String>, settings: MasterPreset) {
        self.profiles.insert(track.into(), settings);
    }

    pub fn remove(&mut self, track: &str) -> Option<MasterPreset> {
        self.profiles.remove(track)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &str> + '_ {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::chain::EffectsChain;

    #[test]
    fn test_add_replace_remove() {
        let chain = EffectsChain::detached(None);
        let mut profiles = SoundProfiles::new();

        profiles.add("/a.mp3", chain.master.settings_as_preset("/a.mp3", &chain.units));
        profiles.add("/b.mp3", chain.master.settings_as_preset("/b.mp3", &chain.units));
        profiles.add("/a.mp3", chain.master.settings_as_preset("/a.mp3", &chain.units));

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles.tracks().collect::<Vec<_>>(), vec!["/a.mp3", "/b.mp3"]);
        assert!(profiles.remove("/a.mp3").is_some());
        assert!(!profiles.has("/a.mp3"));
    }

    #[test]
    fn test_serializes_as_map() {
        let chain = EffectsChain::detached(None);
        let mut profiles = SoundProfiles::new();
        profiles.add("/a.mp3", chain.master.settings_as_preset("/a.mp3", &chain.units));

        let json = serde_json::to_value(&profiles).unwrap();
        assert_eq!(json["/a.mp3"]["name"], "/a.mp3");

        let restored: SoundProfiles = serde_json::from_value(json).unwrap();
        assert_eq!(restored, profiles);
    }
}
