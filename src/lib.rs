//! fxchain - Effects Chain Core for a Desktop Audio Player
//!
//! A set of independently toggleable effects units (equalizer, pitch shift,
//! time stretch, reverb, delay, filter) composed under a master unit.
//!
//! # Architecture
//!
//! - Units never do DSP. Each one configures a host [`ProcessingNode`]
//!   through lock-free parameter writes.
//! - Every unit shares one state machine (`bypassed | active | suppressed`)
//!   and one preset store, parameterized by a [`UnitKind`] descriptor.
//! - The master unit gates the chain and captures it as one preset.
//! - The delegate layer adds user-facing policy; the state module persists
//!   everything losslessly.
//!
//! [`ProcessingNode`]: effects::ProcessingNode
//! [`UnitKind`]: effects::UnitKind

pub mod cli;
pub mod delegate;
pub mod effects;
pub mod error;
pub mod preferences;
pub mod profiles;
pub mod state;

pub use delegate::EffectsDelegate;
pub use error::{FxError, Result};
