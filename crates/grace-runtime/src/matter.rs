//! MatterField — per-cell order that builds where the substrate is high.
//!
//! Where the substrate exceeds the threshold a saturating bonus is added;
//! every cell then relaxes toward `baseline_entropy`. Sustained order only
//! builds where the bonus outweighs the relaxation.

use grace_core::error::{check, Result};
use grace_core::grid::Grid;
use grace_core::history::History;
use grace_core::layer::Layer;
use grace_core::resample::match_shape;
use grace_core::types::Tick;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Steepness of the bonus above threshold.
pub const BONUS_SLOPE: f64 = 8.0;
/// Cells above this count toward manifestation potential.
pub const ORDERED_THRESHOLD: f64 = 0.75;
/// Scale applied to the manifestation potential.
pub const POTENTIAL_SCALE: f64 = 10.0;

/// Configuration for the matter layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatterConfig {
    /// Grid side length (default: 180).
    pub size: usize,
    /// Substrate level that must be exceeded for a bonus (default: 0.06).
    pub coherence_threshold: f64,
    /// Upper bound of the per-tick bonus (default: 0.022).
    pub max_coherence_bonus: f64,
    /// Fraction of the gap to baseline closed per tick; higher means
    /// shorter-lived bumps (default: 0.012).
    pub relaxation_rate: f64,
    /// Level every cell relaxes toward (default: 1.0).
    pub baseline_entropy: f64,
    /// Maximum retained snapshots (default: 300).
    pub history_cap: usize,
    /// Reserved for stochastic extensions; the update itself is deterministic.
    pub seed: u64,
}

impl Default for MatterConfig {
    fn default() -> Self {
        Self {
            size: 180,
            coherence_threshold: 0.06,
            max_coherence_bonus: 0.022,
            relaxation_rate: 0.012,
            baseline_entropy: 1.0,
            history_cap: 300,
            seed: 42,
        }
    }
}

impl MatterConfig {
    pub fn validate(&self) -> Result<()> {
        check::at_least("matter.size", self.size, 1)?;
        check::finite("matter.coherence_threshold", self.coherence_threshold)?;
        check::non_negative("matter.max_coherence_bonus", self.max_coherence_bonus)?;
        check::unit_interval("matter.relaxation_rate", self.relaxation_rate)?;
        check::finite("matter.baseline_entropy", self.baseline_entropy)?;
        Ok(())
    }
}

/// Order/coherence grid driven by the substrate.
#[derive(Debug, Clone)]
pub struct MatterField {
    config: MatterConfig,
    coherence: Grid,
    global_extra_order: f64,
    history: History<Grid>,
    tick: Tick,
}

impl MatterField {
    pub fn new(config: MatterConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            size = config.size,
            threshold = config.coherence_threshold,
            relaxation = config.relaxation_rate,
            baseline = config.baseline_entropy,
            "matter field created"
        );
        let coherence = Grid::square(config.size);
        Ok(Self {
            global_extra_order: coherence.mean() - config.baseline_entropy,
            history: History::with_cap(config.history_cap),
            coherence,
            config,
            tick: 0,
        })
    }

    pub fn config(&self) -> &MatterConfig {
        &self.config
    }

    /// Bonus for a substrate value: zero at or below threshold.
    fn bonus(&self, substrate: f64) -> f64 {
        if substrate > self.config.coherence_threshold {
            ((substrate - self.config.coherence_threshold) * BONUS_SLOPE)
                .clamp(0.0, self.config.max_coherence_bonus)
        } else {
            0.0
        }
    }

    /// Respond to one substrate snapshot. The substrate is only read.
    pub fn update_from_substrate(&mut self, substrate: &Grid) -> Result<()> {
        substrate.ensure_valid("substrate grid")?;
        let size = self.config.size;
        let substrate = match_shape(substrate, size, size);

        let rate = self.config.relaxation_rate;
        let baseline = self.config.baseline_entropy;
        for i in 0..self.coherence.len() {
            let bonus = self.bonus(substrate.as_slice()[i]);
            let c = &mut self.coherence.as_mut_slice()[i];
            *c += bonus;
            *c += rate * (baseline - *c);
        }
        self.coherence.clamp(0.0, 1.0);

        self.global_extra_order = self.coherence.mean() - baseline;
        self.tick += 1;
        self.history.record(self.coherence.clone());
        trace!(
            tick = self.tick,
            extra_order = self.global_extra_order,
            "matter update"
        );
        Ok(())
    }

    /// `mean(coherence) − baseline_entropy` as of the last update.
    pub fn global_extra_order(&self) -> f64 {
        self.global_extra_order
    }

    /// `fraction(coherence > 0.75) · global_extra_order · 10`.
    pub fn manifestation_potential(&self) -> f64 {
        self.coherence.fraction_above(ORDERED_THRESHOLD) * self.global_extra_order * POTENTIAL_SCALE
    }
}

impl Layer for MatterField {
    fn grid(&self) -> &Grid {
        &self.coherence
    }

    fn history(&self) -> &History<Grid> {
        &self.history
    }

    fn tick(&self) -> Tick {
        self.tick
    }
}
