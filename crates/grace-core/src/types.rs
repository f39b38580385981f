//! Shared record types.

use serde::{Deserialize, Serialize};

/// Simulation tick counter.
pub type Tick = u64;

/// A sparse stochastic release from a saturated accumulation cell.
///
/// Immutable once appended to a field's event log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManifestationEvent {
    /// Number of steps the field had completed when the event fired.
    ///
    /// This is the field's tick counter, not an index into its history:
    /// it keeps advancing after the history reaches its cap and freezes.
    pub tick: Tick,
    pub row: usize,
    pub col: usize,
    /// `manifestation_strength · trigger probability`.
    pub strength: f64,
}

/// One sample of an oscillator mesh run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshSample {
    /// Integrated time (`ticks · dt`) at the moment of sampling.
    pub time: f64,
    pub global_coherence: f64,
    pub mean_local_coherence: f64,
    /// Fraction of triangles whose local coherence exceeds the harmony gate.
    pub harmonious_fraction: f64,
}
