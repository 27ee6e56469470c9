//! CLI Command Implementations
//!
//! Every command loads the state file (defaults if absent), runs one
//! operation through the delegate and writes the state back.

use std::path::Path;

use log::info;

use super::{Commands, Direction};
use crate::delegate::EffectsDelegate;
use crate::effects::{EffectsChain, UnitType};
use crate::error::{FxError, Result};
use crate::state::{EffectsChainState, MasterUnitState, StateStore, UnitState};

/// Run one command against the state file at `state_path`.
pub fn execute(state_path: &Path, command: Commands) -> Result<()> {
    let store = StateStore::new(state_path);
    let mut delegate = EffectsDelegate::from_persisted(store.load()?);

    let modified = run(&mut delegate, command)?;

    if modified {
        store.save(&delegate.persistent_state())?;
    }

    Ok(())
}

/// Returns whether the command changed anything worth saving.
fn run(delegate: &mut EffectsDelegate, command: Commands) -> Result<bool> {
    match command {
        Commands::Show => {
            show(delegate);
            Ok(false)
        }
        Commands::Toggle { unit } => {
            let state = delegate.toggle(unit);
            println!("{}: {}", unit, state);
            Ok(true)
        }
        Commands::Presets { unit } => {
            list_presets(delegate, unit);
            Ok(false)
        }
        Commands::ApplyPreset { unit, name } => {
            require_preset(delegate, unit, &name)?;
            delegate.apply_preset(unit, &name);
            println!("Applied {} preset '{}'", unit, name);
            Ok(true)
        }
        Commands::SavePreset { unit, name } => {
            delegate.save_preset(unit, &name)?;
            println!("Saved {} preset '{}'", unit, name);
            Ok(true)
        }
        Commands::DeletePreset { unit, names } => {
            for name in &names {
                require_user_preset(delegate, unit, name)?;
            }
            let removed = delegate.delete_presets(unit, &names);
            println!("Deleted {} {} preset(s)", removed, unit);
            Ok(true)
        }
        Commands::RenamePreset {
            unit,
            old_name,
            new_name,
        } => {
            require_user_preset(delegate, unit, &old_name)?;
            if new_name.trim().is_empty() {
                return Err(FxError::EmptyPresetName);
            }
            if delegate.chain().preset_exists(unit, &new_name) {
                return Err(FxError::PresetExists {
                    unit,
                    name: new_name,
                });
            }
            delegate.rename_preset(unit, &old_name, &new_name);
            println!("Renamed {} preset '{}' to '{}'", unit, old_name, new_name);
            Ok(true)
        }
        Commands::Bass { direction } => {
            let bands = match direction {
                Direction::Up => delegate.increase_bass(),
                Direction::Down => delegate.decrease_bass(),
            };
            print_bands(&bands);
            Ok(true)
        }
        Commands::Mids { direction } => {
            let bands = match direction {
                Direction::Up => delegate.increase_mids(),
                Direction::Down => delegate.decrease_mids(),
            };
            print_bands(&bands);
            Ok(true)
        }
        Commands::Treble { direction } => {
            let bands = match direction {
                Direction::Up => delegate.increase_treble(),
                Direction::Down => delegate.decrease_treble(),
            };
            print_bands(&bands);
            Ok(true)
        }
        Commands::Pitch { direction } => {
            let cents = match direction {
                Direction::Up => delegate.increase_pitch(),
                Direction::Down => delegate.decrease_pitch(),
            };
            println!("Pitch: {:+.0} cents", cents);
            Ok(true)
        }
        Commands::Rate { direction } => {
            let rate = match direction {
                Direction::Up => delegate.increase_rate(),
                Direction::Down => delegate.decrease_rate(),
            };
            println!("Rate: {:.2}x", rate);
            Ok(true)
        }
        Commands::ToggleShiftPitch => {
            let shift = delegate.toggle_shift_pitch();
            println!("Shift pitch: {}", if shift { "on" } else { "off" });
            Ok(true)
        }
        Commands::SetEqType { resolution } => {
            delegate.set_eq_type(resolution.into());
            print_bands(delegate.chain().units.eq.bands());
            Ok(true)
        }
        Commands::Reset => {
            reset(delegate);
            println!("All units reset to defaults");
            Ok(true)
        }
    }
}

fn require_preset(delegate: &EffectsDelegate, unit: UnitType, name: &str) -> Result<()> {
    if delegate.chain().preset_exists(unit, name) {
        Ok(())
    } else {
        Err(FxError::PresetNotFound {
            unit,
            name: name.to_string(),
        })
    }
}

/// Only user presets can be deleted or renamed.
fn require_user_preset(delegate: &EffectsDelegate, unit: UnitType, name: &str) -> Result<()> {
    require_preset(delegate, unit, name)?;
    if delegate.chain().is_system_preset(unit, name) {
        return Err(FxError::SystemPresetImmutable {
            unit,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn print_bands(bands: &[f32]) {
    let formatted: Vec<String> = bands.iter().map(|g| format!("{:+.1}", g)).collect();
    println!("EQ bands (dB): {}", formatted.join(" "));
}

fn show(delegate: &EffectsDelegate) {
    let chain = delegate.chain();
    let units = &chain.units;

    println!("master: {}", chain.master.state());
    println!(
        "eq: {} ({:?}, global {:+.1} dB)",
        units.eq.state(),
        units.eq.eq_type(),
        units.eq.global_gain()
    );
    print_bands(units.eq.bands());
    println!(
        "pitch: {} ({:+.0} cents, overlap {})",
        units.pitch.state(),
        units.pitch.pitch(),
        units.pitch.overlap()
    );
    println!(
        "time: {} ({:.2}x, shift pitch {}, {:+.0} cents)",
        units.time.state(),
        units.time.rate(),
        units.time.shift_pitch(),
        units.time.effective_pitch()
    );
    println!(
        "reverb: {} ({}, {:.0}%)",
        units.reverb.state(),
        units.reverb.space(),
        units.reverb.amount()
    );
    println!(
        "delay: {} ({:.0}%, {:.2}s, feedback {:.0}%, cutoff {:.0} Hz)",
        units.delay.state(),
        units.delay.amount(),
        units.delay.time(),
        units.delay.feedback(),
        units.delay.low_pass_cutoff()
    );
    println!(
        "filter: {} ({} band(s))",
        units.filter.state(),
        units.filter.bands().len()
    );
    println!(
        "effects audible: {}",
        if chain.any_unit_active() { "yes" } else { "no" }
    );
}

fn list_presets(delegate: &EffectsDelegate, unit: UnitType) {
    let (system, user) = delegate.chain().preset_names(unit);

    if !system.is_empty() {
        println!("Built-in:");
        for name in &system {
            println!("  {}", name);
        }
    }

    println!("User:");
    if user.is_empty() {
        println!("  (none)");
    }
    for name in &user {
        println!("  {}", name);
    }
}

/// Defaults for every unit's state and parameters. User presets and sound profiles survive.
fn reset(delegate: &mut EffectsDelegate) {
    info!("Resetting all units to defaults");

    let current = delegate.chain().persistent_state();
    let mut state = EffectsChainState {
        master: MasterUnitState {
            user_presets: current.master.user_presets,
            ..Default::default()
        },
        units: Default::default(),
        sound_profiles: current.sound_profiles,
    };

    state.units.eq = UnitState {
        user_presets: current.units.eq.user_presets,
        ..Default::default()
    };
    state.units.pitch = UnitState {
        user_presets: current.units.pitch.user_presets,
        ..Default::default()
    };
    state.units.time = UnitState {
        user_presets: current.units.time.user_presets,
        ..Default::default()
    };
    state.units.reverb = UnitState {
        user_presets: current.units.reverb.user_presets,
        ..Default::default()
    };
    state.units.delay = UnitState {
        user_presets: current.units.delay.user_presets,
        ..Default::default()
    };
    state.units.filter = UnitState {
        user_presets: current.units.filter.user_presets,
        ..Default::default()
    };

    let preferences = delegate.preferences().clone();
    *delegate = EffectsDelegate::new(EffectsChain::detached(Some(state)), preferences);
}
