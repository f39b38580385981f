//! AccumulationField — pools matter overflow and releases it as sparse events.
//!
//! Spreads more slowly and holds longer than the substrate. Saturated cells
//! may fire a [`ManifestationEvent`], which drains part of their value.
//!
//! Draw order per step: `size²` fluctuation draws (row-major), then one
//! uniform draw per manifestation candidate (row-major).

use grace_core::blur::gaussian_blur;
use grace_core::error::{check, Result};
use grace_core::grid::Grid;
use grace_core::history::History;
use grace_core::layer::Layer;
use grace_core::resample::match_shape;
use grace_core::rng::FieldRng;
use grace_core::types::{ManifestationEvent, Tick};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Lower clamp bound of the accumulation grid.
pub const ACCUMULATION_MIN: f64 = -0.08;
/// Upper clamp bound of the accumulation grid.
pub const ACCUMULATION_MAX: f64 = 0.88;
/// Weight of the unsmoothed grid in the diffusion blend.
pub const SMOOTH_KEEP: f64 = 0.88;
/// Weight of the blurred grid in the diffusion blend.
pub const SMOOTH_MIX: f64 = 0.12;
/// Matter above this level overflows into the accumulation grid.
pub const OVERFLOW_GATE: f64 = 0.45;
/// Largest overflow counted per injection.
pub const OVERFLOW_CAP: f64 = 0.55;
/// Slope from excess over threshold to trigger probability.
pub const TRIGGER_SLOPE: f64 = 3.5;
/// Upper bound of the trigger probability.
pub const TRIGGER_CAP: f64 = 0.85;
/// Fraction of an event's strength drained from its cell.
pub const DRAIN_FACTOR: f64 = 0.65;
/// Standard deviation of the initial state.
pub const INITIAL_SIGMA: f64 = 0.003;
/// Narrow band the initial state is clamped to.
pub const INITIAL_RANGE: (f64, f64) = (-0.02, 0.05);

/// Configuration for the accumulation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulationConfig {
    /// Grid side length (default: 180).
    pub size: usize,
    /// Fraction of matter overflow pooled per injection (default: 0.007).
    pub accumulation_rate: f64,
    /// Blur sigma in cells (default: 0.08).
    pub diffusion: f64,
    /// Constant hum added each tick (default: 0.00018).
    pub baseline_hum: f64,
    /// Per-tick multiplicative retention in [0, 1] (default: 0.988).
    pub decay: f64,
    /// State above which a cell may fire (default: 0.68).
    pub manifestation_threshold: f64,
    /// Strength of an event at probability 1 (default: 0.09).
    pub manifestation_strength: f64,
    /// Standard deviation of per-cell noise (default: 0.0012).
    pub fluctuation: f64,
    /// Maximum retained snapshots (default: 300).
    pub history_cap: usize,
    pub seed: u64,
}

impl Default for AccumulationConfig {
    fn default() -> Self {
        Self {
            size: 180,
            accumulation_rate: 0.007,
            diffusion: 0.08,
            baseline_hum: 0.00018,
            decay: 0.988,
            manifestation_threshold: 0.68,
            manifestation_strength: 0.09,
            fluctuation: 0.0012,
            history_cap: 300,
            seed: 42,
        }
    }
}

impl AccumulationConfig {
    pub fn validate(&self) -> Result<()> {
        check::at_least("accumulation.size", self.size, 1)?;
        check::finite("accumulation.accumulation_rate", self.accumulation_rate)?;
        check::non_negative("accumulation.diffusion", self.diffusion)?;
        check::finite("accumulation.baseline_hum", self.baseline_hum)?;
        check::unit_interval("accumulation.decay", self.decay)?;
        check::finite(
            "accumulation.manifestation_threshold",
            self.manifestation_threshold,
        )?;
        check::non_negative(
            "accumulation.manifestation_strength",
            self.manifestation_strength,
        )?;
        check::non_negative("accumulation.fluctuation", self.fluctuation)?;
        Ok(())
    }
}

/// Slow pooling layer with stochastic manifestation events.
#[derive(Debug, Clone)]
pub struct AccumulationField {
    config: AccumulationConfig,
    state: Grid,
    events: Vec<ManifestationEvent>,
    history: History<Grid>,
    rng: FieldRng,
    tick: Tick,
}

impl AccumulationField {
    pub fn new(config: AccumulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = FieldRng::new(config.seed);
        let mut state = Grid::square(config.size);
        rng.add_noise(state.as_mut_slice(), INITIAL_SIGMA);
        state.clamp(INITIAL_RANGE.0, INITIAL_RANGE.1);

        debug!(
            size = config.size,
            threshold = config.manifestation_threshold,
            decay = config.decay,
            seed = config.seed,
            "accumulation field created"
        );

        Ok(Self {
            history: History::with_cap(config.history_cap),
            config,
            state,
            events: Vec::new(),
            rng,
            tick: 0,
        })
    }

    pub fn config(&self) -> &AccumulationConfig {
        &self.config
    }

    /// Pool overflow from a matter snapshot. Independent of `step`; the
    /// caller chooses the cadence. The matter grid is only read.
    pub fn accumulate_from_matter(&mut self, matter: &Grid) -> Result<()> {
        matter.ensure_valid("matter grid")?;
        let size = self.config.size;
        let matter = match_shape(matter, size, size);
        let rate = self.config.accumulation_rate;
        for (v, &m) in self.state.as_mut_slice().iter_mut().zip(matter.as_slice()) {
            if m > OVERFLOW_GATE {
                *v += rate * (m - OVERFLOW_GATE).clamp(0.0, OVERFLOW_CAP);
            }
        }
        Ok(())
    }

    /// Advance one tick. Returns the events fired during this tick.
    pub fn step(&mut self) -> Vec<ManifestationEvent> {
        for v in self.state.as_mut_slice() {
            *v += self.config.baseline_hum;
        }

        let blurred = gaussian_blur(&self.state, self.config.diffusion);
        for (v, b) in self.state.as_mut_slice().iter_mut().zip(blurred.as_slice()) {
            *v = SMOOTH_KEEP * *v + SMOOTH_MIX * b;
        }

        for v in self.state.as_mut_slice() {
            *v *= self.config.decay;
        }

        self.rng
            .add_noise(self.state.as_mut_slice(), self.config.fluctuation);

        let fired = self.release();

        self.state.clamp(ACCUMULATION_MIN, ACCUMULATION_MAX);
        self.tick += 1;
        self.history.record(self.state.clone());
        trace!(
            tick = self.tick,
            mean = self.state.mean(),
            fired = fired.len(),
            "accumulation step"
        );
        fired
    }

    /// Manifestation check over the current (unclamped) state.
    fn release(&mut self) -> Vec<ManifestationEvent> {
        let threshold = self.config.manifestation_threshold;
        let cols = self.state.cols();
        let mut fired = Vec::new();

        for i in 0..self.state.len() {
            let value = self.state.as_slice()[i];
            if value <= threshold {
                continue;
            }
            let probability = ((value - threshold) * TRIGGER_SLOPE).clamp(0.0, TRIGGER_CAP);
            if !self.rng.chance(probability) {
                continue;
            }
            let event = ManifestationEvent {
                tick: self.tick,
                row: i / cols,
                col: i % cols,
                strength: self.config.manifestation_strength * probability,
            };
            self.state.as_mut_slice()[i] -= event.strength * DRAIN_FACTOR;
            debug!(
                tick = event.tick,
                row = event.row,
                col = event.col,
                strength = event.strength,
                "manifestation"
            );
            fired.push(event);
        }

        self.events.extend_from_slice(&fired);
        fired
    }

    /// Mean of the state grid.
    pub fn global_accumulation(&self) -> f64 {
        self.state.mean()
    }

    /// Number of events fired so far.
    pub fn manifestation_count(&self) -> usize {
        self.events.len()
    }

    /// Full ordered event log.
    pub fn events(&self) -> &[ManifestationEvent] {
        &self.events
    }
}

impl Layer for AccumulationField {
    fn grid(&self) -> &Grid {
        &self.state
    }

    fn history(&self) -> &History<Grid> {
        &self.history
    }

    fn tick(&self) -> Tick {
        self.tick
    }
}
