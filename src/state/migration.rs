//! Schema migration support for the state file.
//!
//! Handles upgrading state files from older schema versions to the current
//! version. Migrations are applied sequentially, allowing files to be
//! upgraded across multiple version jumps.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::effects::eq_mapper::TEN_BAND_FREQUENCIES;
use crate::error::{FxError, Result};

/// Current schema version for state files.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Version assumed for files written before the version field existed.
pub const LEGACY_SCHEMA_VERSION: &str = "0.9.0";

/// Type alias for migration functions.
/// Takes a JSON value and returns the migrated JSON value or an error.
type MigrationFn = fn(Value) -> Result<Value>;

/// Maps (from_version, to_version) tuples to migration functions.
fn get_migration_registry() -> HashMap<(String, String), MigrationFn> {
    let mut registry: HashMap<(String, String), MigrationFn> = HashMap::new();

    registry.insert(
        ("0.9.0".to_string(), "1.0.0".to_string()),
        migrate_0_9_0_to_1_0_0,
    );

    registry
}

/// Get all known schema versions in order.
fn get_version_order() -> Vec<&'static str> {
    vec!["0.9.0", "1.0.0"]
}

/// Migrate a state document from its schema version to the current one.
///
/// # Arguments
/// * `data` - The state JSON data to migrate
///
/// # Returns
/// The migrated JSON data with an updated `schemaVersion` field.
///
/// # Errors
/// Returns `FxError::InvalidSchemaVersion` if the schema version is not recognized.
/// Returns `FxError::MigrationError` if a migration step fails or the file is
/// from a newer version.
pub fn migrate_state(mut data: Value) -> Result<Value> {
    let current_version = data
        .get("schemaVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(LEGACY_SCHEMA_VERSION)
        .to_string();

    let target_version = CURRENT_SCHEMA_VERSION;

    if current_version == target_version {
        return Ok(data);
    }

    let path = find_migration_path(&current_version, target_version);

    if path.is_empty() {
        let known_versions = get_version_order();
        let current_idx = known_versions.iter().position(|&v| v == current_version);
        let Some(current_idx) = current_idx else {
            return Err(FxError::InvalidSchemaVersion {
                version: current_version,
            });
        };

        let target_idx = known_versions
            .iter()
            .position(|&v| v == target_version)
            .unwrap_or(0);

        let reason = if current_idx > target_idx {
            "Cannot downgrade state from newer schema version"
        } else {
            "No migration path found"
        };

        return Err(FxError::MigrationError {
            from: current_version,
            to: target_version.to_string(),
            reason: reason.to_string(),
        });
    }

    let registry = get_migration_registry();

    for (from, to) in path {
        let migration_fn = registry.get(&(from.clone(), to.clone())).ok_or_else(|| {
            FxError::MigrationError {
                from: from.clone(),
                to: to.clone(),
                reason: "Migration function not found in registry".to_string(),
            }
        })?;

        data = migration_fn(data).map_err(|e| FxError::MigrationError {
            from: from.clone(),
            to: to.clone(),
            reason: format!("Migration failed: {}", e),
        })?;

        if let Some(obj) = data.as_object_mut() {
            obj.insert("schemaVersion".to_string(), Value::String(to.clone()));
        }
    }

    Ok(data)
}

/// Find the sequence of migrations needed to go from one version to another.
///
/// Returns an empty vector if from == to or if no path exists.
pub fn find_migration_path(from: &str, to: &str) -> Vec<(String, String)> {
    if from == to {
        return Vec::new();
    }

    let versions = get_version_order();
    let registry = get_migration_registry();

    let (Some(from_idx), Some(to_idx)) = (
        versions.iter().position(|&v| v == from),
        versions.iter().position(|&v| v == to),
    ) else {
        return Vec::new();
    };

    // Upgrades only
    if from_idx >= to_idx {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current_idx = from_idx;

    while current_idx < to_idx {
        let current = versions[current_idx].to_string();

        let next = ((current_idx + 1)..=to_idx).find(|&next_idx| {
            registry.contains_key(&(current.clone(), versions[next_idx].to_string()))
        });

        match next {
            Some(next_idx) => {
                path.push((current, versions[next_idx].to_string()));
                current_idx = next_idx;
            }
            None => return Vec::new(),
        }
    }

    path
}

// ============================================================================
// Migration Functions
// ============================================================================

/// 0.9.0 stored equalizer bands as a map of centre frequency to gain.
/// 1.0.0 stores an index-ordered array plus an explicit resolution.
fn migrate_0_9_0_to_1_0_0(mut data: Value) -> Result<Value> {
    if let Some(effects) = data.get_mut("effects").and_then(Value::as_object_mut) {
        convert_effects_eq(effects);
        record_gated_units(effects);
    }
    Ok(data)
}

/// 0.9.0 did not record which children an off master was holding silent.
/// Every suppressed child under a bypassed master is taken to be one.
fn record_gated_units(effects: &mut Map<String, Value>) {
    let master_off = effects
        .get("master")
        .and_then(|m| m.get("state"))
        .and_then(Value::as_str)
        == Some("bypassed");
    if !master_off {
        return;
    }

    let gated: Vec<Value> = ["eq", "pitch", "time", "reverb", "delay", "filter"]
        .iter()
        .filter(|unit| {
            effects
                .get(**unit)
                .and_then(|u| u.get("state"))
                .and_then(Value::as_str)
                == Some("suppressed")
        })
        .map(|unit| Value::from(*unit))
        .collect();

    if let Some(master) = effects.get_mut("master").and_then(Value::as_object_mut) {
        master.insert("gatedUnits".to_string(), Value::Array(gated));
    }
}

fn convert_effects_eq(effects: &mut Map<String, Value>) {
    if let Some(eq) = effects.get_mut("eq") {
        convert_eq_bands(eq);
        for preset in array_items(eq.get_mut("userPresets")) {
            convert_eq_bands(preset);
        }
    }

    if let Some(master) = effects.get_mut("master") {
        for preset in array_items(master.get_mut("userPresets")) {
            if let Some(eq) = preset.get_mut("eq") {
                convert_eq_bands(eq);
            }
        }
    }

    if let Some(profiles) = effects
        .get_mut("soundProfiles")
        .and_then(Value::as_object_mut)
    {
        for profile in profiles.values_mut() {
            if let Some(eq) = profile.get_mut("eq") {
                convert_eq_bands(eq);
            }
        }
    }
}

fn array_items(value: Option<&mut Value>) -> impl Iterator<Item = &mut Value> {
    value
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
}

/// Rewrite a frequency-keyed `bands` map in place as a 10-band array.
///
/// Each 10-band slot takes the gain of the closest legacy frequency.
fn convert_eq_bands(eq: &mut Value) {
    let Some(obj) = eq.as_object_mut() else {
        return;
    };
    let Some(legacy) = obj.get("bands").and_then(Value::as_object) else {
        return;
    };

    let bands = legacy_gains(legacy);
    let converted: Vec<Value> = TEN_BAND_FREQUENCIES
        .iter()
        .map(|&freq| {
            let gain = bands
                .iter()
                .min_by(|a, b| {
                    let da = (a.0.log2() - freq.log2()).abs();
                    let db = (b.0.log2() - freq.log2()).abs();
                    da.total_cmp(&db)
                })
                .map(|&(_, gain)| gain)
                .unwrap_or(0.0);
            Value::from(gain)
        })
        .collect();

    obj.insert("bands".to_string(), Value::Array(converted));
    obj.insert("type".to_string(), Value::String("tenBand".to_string()));
}

fn legacy_gains(legacy: &Map<String, Value>) -> Vec<(f32, f32)> {
    legacy
        .iter()
        .filter_map(|(freq, gain)| {
            let freq = freq.parse::<f32>().ok().filter(|f| *f > 0.0)?;
            let gain = gain.as_f64()? as f32;
            Some((freq, gain))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_migrate_current_version_unchanged() {
        let data = json!({
            "schemaVersion": CURRENT_SCHEMA_VERSION,
            "effects": { "eq": { "bands": [0.0, 1.0] } }
        });

        let result = migrate_state(data.clone()).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_missing_version_is_legacy() {
        let data = json!({
            "effects": {
                "eq": {
                    "state": "active",
                    "bands": { "32": 3.0, "1000": -2.0, "16000": 6.0 }
                }
            }
        });

        let result = migrate_state(data).unwrap();
        assert_eq!(result["schemaVersion"], CURRENT_SCHEMA_VERSION);

        let eq = &result["effects"]["eq"];
        assert_eq!(eq["type"], "tenBand");
        assert_eq!(eq["state"], "active");

        let bands = eq["bands"].as_array().unwrap();
        assert_eq!(bands.len(), 10);
        assert_eq!(bands[0], 3.0);
        assert_eq!(bands[5], -2.0);
        assert_eq!(bands[9], 6.0);
    }

    #[test]
    fn test_legacy_presets_and_profiles_converted() {
        let legacy_eq = json!({ "name": "x", "state": "active", "bands": { "64": 1.0 } });
        let data = json!({
            "schemaVersion": "0.9.0",
            "effects": {
                "eq": { "bands": {}, "userPresets": [legacy_eq.clone()] },
                "master": { "userPresets": [{ "name": "m", "eq": legacy_eq.clone() }] },
                "soundProfiles": { "/music/a.flac": { "name": "/music/a.flac", "eq": legacy_eq } }
            }
        });

        let result = migrate_state(data).unwrap();
        let effects = &result["effects"];

        assert_eq!(effects["eq"]["bands"], json!(vec![0.0; 10]));
        assert_eq!(effects["eq"]["userPresets"][0]["bands"][1], 1.0);
        assert_eq!(effects["master"]["userPresets"][0]["eq"]["type"], "tenBand");
        assert_eq!(effects["soundProfiles"]["/music/a.flac"]["eq"]["bands"][0], 1.0);
    }

    #[test]
    fn test_legacy_off_master_gates_suppressed_units() {
        let data = json!({
            "schemaVersion": "0.9.0",
            "effects": {
                "master": { "state": "bypassed" },
                "reverb": { "state": "suppressed" },
                "delay": { "state": "active" }
            }
        });

        let result = migrate_state(data).unwrap();
        assert_eq!(result["effects"]["master"]["gatedUnits"], json!(["reverb"]));
    }

    #[test]
    fn test_find_migration_path_same_version() {
        assert!(find_migration_path("1.0.0", "1.0.0").is_empty());
    }

    #[test]
    fn test_find_migration_path_sequential() {
        let path = find_migration_path("0.9.0", "1.0.0");
        assert_eq!(path, vec![("0.9.0".to_string(), "1.0.0".to_string())]);
    }

    #[test]
    fn test_find_migration_path_downgrade_not_supported() {
        assert!(find_migration_path("1.0.0", "0.9.0").is_empty());
    }

    #[test]
    fn test_migrate_invalid_schema_version() {
        let data = json!({ "schemaVersion": "7.0.0" });

        match migrate_state(data) {
            Err(FxError::InvalidSchemaVersion { version }) => assert_eq!(version, "7.0.0"),
            other => panic!("Expected InvalidSchemaVersion error, got {:?}", other),
        }
    }
}
