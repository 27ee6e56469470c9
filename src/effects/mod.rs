//! Effects Module
//!
//! The effects chain: a three-state activation model, per-unit preset
//! stores, one unit per effect kind over a host processing node, and the
//! master unit that snapshots and gates them all.

pub mod chain;
pub mod delay;
pub mod eq;
pub mod eq_mapper;
pub mod filter;
pub mod master;
pub mod node;
pub mod pitch;
pub mod preset;
pub mod reverb;
pub mod state;
pub mod time;
pub mod unit;

pub use chain::{ChainNodes, EffectsChain, EffectsUnits};
pub use delay::{DelayParams, DelayUnit};
pub use eq::{BandRegion, EqParams, EqUnit};
pub use eq_mapper::{remap_bands, EqType};
pub use filter::{FilterBand, FilterBandType, FilterParams, FilterUnit};
pub use master::{MasterPreset, MasterUnit};
pub use node::{ParameterNode, ProcessingNode};
pub use pitch::{PitchParams, PitchShiftUnit};
pub use preset::{NamedPreset, Preset, PresetStore};
pub use reverb::{ReverbParams, ReverbSpace, ReverbUnit};
pub use state::EffectsUnitState;
pub use time::{TimeParams, TimeStretchUnit};
pub use unit::{EffectsUnit, Unit, UnitEvent, UnitKind, UnitType};
