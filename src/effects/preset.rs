//! Named presets and the per-unit preset store.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::state::EffectsUnitState;

/// Anything that can live in a [`PresetStore`].
pub trait NamedPreset {
    fn name(&self) -> &str;

    /// Only the store calls this, from [`PresetStore::rename`].
    fn set_name(&mut self, name: String);

    /// Factory-seeded presets cannot be renamed or deleted.
    fn is_system_defined(&self) -> bool;
}

/// A named snapshot of one unit's parameters plus the state it was saved in.
///
/// `system_defined` is never persisted: everything read back from a snapshot
/// is user-defined, and system presets are re-seeded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset<P> {
    name: String,
    pub state: EffectsUnitState,
    #[serde(skip)]
    system_defined: bool,
    #[serde(flatten)]
    pub params: P,
}

impl<P> Preset<P> {
    pub fn new(
        name: impl Into<String>,
        state: EffectsUnitState,
        params: P,
        system_defined: bool,
    ) -> Self {
        Self {
            name: name.into(),
            state,
            system_defined,
            params,
        }
    }

    /// A factory preset. These are saved in the `Active` state.
    pub fn system(name: impl Into<String>, params: P) -> Self {
        Self::new(name, EffectsUnitState::Active, params, true)
    }

    /// A user-created preset.
    pub fn user(name: impl Into<String>, state: EffectsUnitState, params: P) -> Self {
        Self::new(name, state, params, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system_defined(&self) -> bool {
        self.system_defined
    }
}

impl<P> NamedPreset for Preset<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_system_defined(&self) -> bool {
        self.system_defined
    }
}

/// Name-keyed preset container with system-defined and user-defined orderings.
///
/// Every operation is total: unknown names are silently ignored. Name
/// uniqueness on [`add`](Self::add) is the caller's job (check
/// [`exists`](Self::exists) first); a duplicate replaces the old entry.
#[derive(Debug, Clone)]
pub struct PresetStore<T> {
    presets: HashMap<String, T>,
    system_defined: Vec<String>,
    user_defined: Vec<String>,
}

impl<T> Default for PresetStore<T> {
    fn default() -> Self {
        Self {
            presets: HashMap::new(),
            system_defined: Vec::new(),
            user_defined: Vec::new(),
        }
    }
}

impl<T: NamedPreset> PresetStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with factory presets followed by user presets.
    /// Seed a store. A user preset whose name is already taken is dropped,
    /// so persisted data can never shadow a factory preset.
    pub fn with_presets(
        system_defined: impl IntoIterator<Item = T>,
        user_defined: impl IntoIterator<Item = T>,
    ) -> Self {
        let mut store = Self::new();
        store.add_all(system_defined);
        for preset in user_defined {
            if store.exists(preset.name()) {
                warn!("ignoring stored preset '{}': name already taken", preset.name());
                continue;
            }
            store.add(preset);
        }
        store
    }

    pub fn exists(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.presets.get(name)
    }

    pub fn add(&mut self, preset: T) {
        let name = preset.name().to_string();

        if self.presets.contains_key(&name) {
            self.system_defined.retain(|n| n != &name);
            self.user_defined.retain(|n| n != &name);
        }

        if preset.is_system_defined() {
            self.system_defined.push(name.clone());
        } else {
            self.user_defined.push(name.clone());
        }

        self.presets.insert(name, preset);
    }

    /// Add each preset in input order.
    pub fn add_all(&mut self, presets: impl IntoIterator<Item = T>) {
        for preset in presets {
            self.add(preset);
        }
    }

    /// Rename a user-defined preset in place, keeping its position.
    ///
    /// No-op when `old_name` is absent or system-defined, or when `new_name`
    /// is already taken.
    pub fn rename(&mut self, old_name: &str, new_name: &str) {
        if old_name == new_name || self.exists(new_name) {
            return;
        }

        let Some(position) = self.user_defined.iter().position(|n| n == old_name) else {
            return;
        };

        if let Some(mut preset) = self.presets.remove(old_name) {
            preset.set_name(new_name.to_string());
            self.presets.insert(new_name.to_string(), preset);
            self.user_defined[position] = new_name.to_string();
        }
    }

    /// Delete user-defined presets by name. System-defined names are skipped.
    ///
    /// Returns the presets actually removed.
    pub fn delete<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) -> Vec<T> {
        let mut removed = Vec::new();

        for name in names {
            let name = name.as_ref();
            let Some(position) = self.user_defined.iter().position(|n| n == name) else {
                continue;
            };

            self.user_defined.remove(position);
            if let Some(preset) = self.presets.remove(name) {
                removed.push(preset);
            }
        }

        removed
    }

    pub fn system_defined_presets(&self) -> impl Iterator<Item = &T> + '_ {
        self.system_defined
            .iter()
            .filter_map(move |name| self.presets.get(name))
    }

    pub fn user_defined_presets(&self) -> impl Iterator<Item = &T> + '_ {
        self.user_defined
            .iter()
            .filter_map(move |name| self.presets.get(name))
    }

    /// System-defined presets first, then user-defined, each in its own order.
    pub fn all_presets(&self) -> impl Iterator<Item = &T> + '_ {
        self.system_defined_presets()
            .chain(self.user_defined_presets())
    }

    pub fn user_defined_count(&self) -> usize {
        self.user_defined.len()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
