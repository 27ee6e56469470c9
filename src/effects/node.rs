//! Processing node seam.
//!
//! Units never do DSP themselves. They configure a node supplied by the host
//! audio framework, which is read concurrently by the real-time render thread.
//! Every setter therefore takes `&self` and must be lock-free.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Address of a single parameter on a processing node.
///
/// Each unit kind documents its own address layout.
pub type ParamAddress = u32;

/// A host-supplied audio processing node for one effect kind.
pub trait ProcessingNode: Send + Sync {
    /// Whether the node currently passes audio through unprocessed.
    fn bypass(&self) -> bool;

    fn set_bypass(&self, bypass: bool);

    /// Read back a parameter. Unknown addresses read as `0.0`.
    fn parameter(&self, address: ParamAddress) -> f32;

    /// Write a parameter. Writes to unknown addresses are ignored.
    fn set_parameter(&self, address: ParamAddress, value: f32);

    /// Clear internal DSP memory (reverb tails, delay lines).
    fn reset(&self);
}

/// An `f32` stored as raw bits in an `AtomicU32`.
pub struct AtomicParam(AtomicU32);

impl AtomicParam {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicParam").field(&self.get()).finish()
    }
}

/// Lock-free node with a fixed parameter table.
///
/// Serves as the headless host node for the CLI and lets tests observe
/// exactly what a unit wrote.
#[derive(Debug)]
pub struct ParameterNode {
    bypass: AtomicBool,
    params: Vec<AtomicParam>,
    resets: AtomicU64,
}

impl ParameterNode {
    /// Create a bypassed node with `parameter_count` zeroed parameters.
    pub fn new(parameter_count: usize) -> Self {
        Self {
            bypass: AtomicBool::new(true),
            params: (0..parameter_count).map(|_| AtomicParam::new(0.0)).collect(),
            resets: AtomicU64::new(0),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Number of `reset()` calls received so far.
    pub fn reset_count(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}

impl ProcessingNode for ParameterNode {
    fn bypass(&self) -> bool {
        self.bypass.load(Ordering::Relaxed)
    }

    fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    fn parameter(&self, address: ParamAddress) -> f32 {
        self.params
            .get(address as usize)
            .map(AtomicParam::get)
            .unwrap_or(0.0)
    }

    fn set_parameter(&self, address: ParamAddress, value: f32) {
        if let Some(param) = self.params.get(address as usize) {
            param.set(value);
        }
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }
}
