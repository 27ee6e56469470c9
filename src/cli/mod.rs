//! CLI Module
//!
//! Command-line interface for driving the effects chain against a state file.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::effects::{EqType, UnitType};

/// fxchain - effects chain control for the audio player
#[derive(Parser, Debug)]
#[command(name = "fxchain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// State file to load and save
    #[arg(short, long, global = true, default_value = "fxchain-state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Nudge direction.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Equalizer resolution as typed on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Ten,
    Fifteen,
}

impl From<Resolution> for EqType {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Ten => EqType::TenBand,
            Resolution::Fifteen => EqType::FifteenBand,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every unit's state and settings
    #[command(name = "show")]
    Show,

    /// Toggle a unit on or off
    #[command(name = "toggle")]
    Toggle {
        /// master, eq, pitch, time, reverb, delay or filter
        unit: UnitType,
    },

    /// List a unit's presets
    #[command(name = "presets")]
    Presets { unit: UnitType },

    /// Apply a named preset
    #[command(name = "apply-preset")]
    ApplyPreset { unit: UnitType, name: String },

    /// Save the unit's current settings as a preset
    #[command(name = "save-preset")]
    SavePreset { unit: UnitType, name: String },

    /// Delete user presets
    #[command(name = "delete-preset")]
    DeletePreset {
        unit: UnitType,
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Rename a user preset
    #[command(name = "rename-preset")]
    RenamePreset {
        unit: UnitType,
        old_name: String,
        new_name: String,
    },

    /// Raise or lower the bass bands
    #[command(name = "bass")]
    Bass { direction: Direction },

    /// Raise or lower the mid bands
    #[command(name = "mids")]
    Mids { direction: Direction },

    /// Raise or lower the treble bands
    #[command(name = "treble")]
    Treble { direction: Direction },

    /// Shift pitch up or down
    #[command(name = "pitch")]
    Pitch { direction: Direction },

    /// Speed playback up or down
    #[command(name = "rate")]
    Rate { direction: Direction },

    /// Toggle whether the time stretch changes pitch
    #[command(name = "toggle-shift-pitch")]
    ToggleShiftPitch,

    /// Switch the equalizer resolution
    #[command(name = "eq-type")]
    SetEqType { resolution: Resolution },

    /// Put every unit back to its defaults, keeping user presets
    #[command(name = "reset")]
    Reset,
}
