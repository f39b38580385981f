//! SubstrateField — the slowly diffusing base layer.
//!
//! Each tick:
//! 1. Baseline presence is added everywhere
//! 2. The grid is blended with a Gaussian-blurred copy of itself
//! 3. External coherence above the reward gate is rewarded proportionally
//! 4. Global geometric decay
//! 5. Per-cell Gaussian fluctuation
//! 6. Clamp to the substrate band
//!
//! Noise draw order: `size²` initial draws at construction, then `size²`
//! fluctuation draws per step, row-major.

use grace_core::blur::gaussian_blur;
use grace_core::error::{check, Result};
use grace_core::grid::Grid;
use grace_core::history::History;
use grace_core::layer::Layer;
use grace_core::resample::match_shape;
use grace_core::rng::FieldRng;
use grace_core::types::Tick;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Lower clamp bound of the substrate.
pub const SUBSTRATE_MIN: f64 = -0.12;
/// Upper clamp bound of the substrate.
pub const SUBSTRATE_MAX: f64 = 0.32;
/// Weight of the unsmoothed grid in the diffusion blend.
pub const SMOOTH_KEEP: f64 = 0.84;
/// Weight of the blurred grid in the diffusion blend.
pub const SMOOTH_MIX: f64 = 0.16;
/// External coherence must exceed this to be rewarded.
pub const REWARD_GATE: f64 = 0.55;
/// Cells above this count as "listening".
pub const ACTIVITY_THRESHOLD: f64 = 0.035;
/// Standard deviation of the initial state.
pub const INITIAL_SIGMA: f64 = 0.008;
/// Initial state is clamped to this (wider than the running band on the low side).
pub const INITIAL_RANGE: (f64, f64) = (-0.12, 0.25);

/// Configuration for the substrate layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Grid side length (default: 180).
    pub size: usize,
    /// Constant growth added each tick (default: 0.0006).
    pub baseline_presence: f64,
    /// Blur sigma in cells; higher spreads faster (default: 0.14).
    pub diffusion_strength: f64,
    /// Reward factor for external coherence above the gate (default: 0.006).
    pub coherence_reward: f64,
    /// Per-tick multiplicative retention in [0, 1] (default: 0.992).
    pub natural_decay: f64,
    /// Standard deviation of per-cell noise (default: 0.0035).
    pub fluctuation: f64,
    /// Maximum retained snapshots (default: 400).
    pub history_cap: usize,
    pub seed: u64,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            size: 180,
            baseline_presence: 0.0006,
            diffusion_strength: 0.14,
            coherence_reward: 0.006,
            natural_decay: 0.992,
            fluctuation: 0.0035,
            history_cap: 400,
            seed: 42,
        }
    }
}

impl SubstrateConfig {
    pub fn validate(&self) -> Result<()> {
        check::at_least("substrate.size", self.size, 1)?;
        check::finite("substrate.baseline_presence", self.baseline_presence)?;
        check::non_negative("substrate.diffusion_strength", self.diffusion_strength)?;
        check::finite("substrate.coherence_reward", self.coherence_reward)?;
        check::unit_interval("substrate.natural_decay", self.natural_decay)?;
        check::non_negative("substrate.fluctuation", self.fluctuation)?;
        Ok(())
    }
}

/// Diffusive scalar grid with baseline growth, decay, reward and noise.
#[derive(Debug, Clone)]
pub struct SubstrateField {
    config: SubstrateConfig,
    state: Grid,
    history: History<Grid>,
    rng: FieldRng,
    tick: Tick,
}

impl SubstrateField {
    pub fn new(config: SubstrateConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = FieldRng::new(config.seed);
        let mut state = Grid::square(config.size);
        rng.add_noise(state.as_mut_slice(), INITIAL_SIGMA);
        state.clamp(INITIAL_RANGE.0, INITIAL_RANGE.1);

        debug!(
            size = config.size,
            diffusion = config.diffusion_strength,
            decay = config.natural_decay,
            seed = config.seed,
            "substrate field created"
        );

        Ok(Self {
            history: History::with_cap(config.history_cap),
            config,
            state,
            rng,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SubstrateConfig {
        &self.config
    }

    /// Advance one tick, optionally rewarding an external coherence map.
    ///
    /// The map is resampled to this grid's shape when needed. Malformed or
    /// non-finite input is rejected before anything is mutated.
    pub fn step(&mut self, external_coherence: Option<&Grid>) -> Result<()> {
        let size = self.config.size;
        let external = match external_coherence {
            Some(grid) => {
                grid.ensure_valid("external coherence")?;
                Some(match_shape(grid, size, size))
            }
            None => None,
        };

        for v in self.state.as_mut_slice() {
            *v += self.config.baseline_presence;
        }

        let blurred = gaussian_blur(&self.state, self.config.diffusion_strength);
        for (v, b) in self.state.as_mut_slice().iter_mut().zip(blurred.as_slice()) {
            *v = SMOOTH_KEEP * *v + SMOOTH_MIX * b;
        }

        if let Some(external) = external {
            for (v, &e) in self.state.as_mut_slice().iter_mut().zip(external.as_slice()) {
                if e > REWARD_GATE {
                    *v += self.config.coherence_reward * e;
                }
            }
        }

        for v in self.state.as_mut_slice() {
            *v *= self.config.natural_decay;
        }

        self.rng
            .add_noise(self.state.as_mut_slice(), self.config.fluctuation);
        self.state.clamp(SUBSTRATE_MIN, SUBSTRATE_MAX);

        self.tick += 1;
        self.history.record(self.state.clone());
        trace!(tick = self.tick, mean = self.state.mean(), "substrate step");
        Ok(())
    }

    /// Add a perturbation (e.g. manifestation feedback) directly to the grid.
    ///
    /// Resampled if needed, then clamped to the substrate band. Does not
    /// advance the tick or touch history.
    pub fn absorb_ripple(&mut self, ripple: &Grid) -> Result<()> {
        ripple.ensure_valid("ripple")?;
        let size = self.config.size;
        let ripple = match_shape(ripple, size, size);
        for (v, r) in self.state.as_mut_slice().iter_mut().zip(ripple.as_slice()) {
            *v += r;
        }
        self.state.clamp(SUBSTRATE_MIN, SUBSTRATE_MAX);
        Ok(())
    }

    /// Fraction of cells above the activity threshold.
    pub fn global_listening_quality(&self) -> f64 {
        self.state.fraction_above(ACTIVITY_THRESHOLD)
    }
}

impl Layer for SubstrateField {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> SubstrateField {
        SubstrateField::new(SubstrateConfig {
            size: 12,
            seed,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn initial_state_is_small_noise() {
        let field = small(1);
        let g = field.grid();
        assert_eq!(g.shape(), (12, 12));
        assert!(g.min() >= INITIAL_RANGE.0 && g.max() <= INITIAL_RANGE.1);
        assert!(g.mean().abs() < 0.01);
    }

    #[test]
    fn rejects_bad_config() {
        let bad = SubstrateConfig {
            natural_decay: 1.2,
            ..Default::default()
        };
        assert!(SubstrateField::new(bad).is_err());
        let bad = SubstrateConfig {
            size: 0,
            ..Default::default()
        };
        assert!(SubstrateField::new(bad).is_err());
    }

    #[test]
    fn reward_is_gated_and_proportional() {
        let mut plain = small(9);
        let mut rewarded = small(9);
        let mut coherence = Grid::square(12);
        coherence[(3, 3)] = 0.9;
        coherence[(5, 5)] = 0.55; // exactly at the gate: no reward

        plain.step(None).unwrap();
        rewarded.step(Some(&coherence)).unwrap();

        let decay = plain.config().natural_decay;
        let reward = plain.config().coherence_reward;
        let diff = rewarded.grid()[(3, 3)] - plain.grid()[(3, 3)];
        assert!((diff - reward * 0.9 * decay).abs() < 1e-12);
        assert_eq!(rewarded.grid()[(5, 5)], plain.grid()[(5, 5)]);
    }

    #[test]
    fn non_finite_input_leaves_state_untouched() {
        let mut field = small(4);
        let before = field.grid().clone();
        let mut bad = Grid::square(12);
        bad[(0, 0)] = f64::INFINITY;
        assert!(field.step(Some(&bad)).is_err());
        assert_eq!(field.grid(), &before);
        assert_eq!(field.tick(), 0);
        assert!(field.history().is_empty());
    }

    #[test]
    fn external_input_of_other_shape_is_resampled() {
        let mut field = small(2);
        let coherence = Grid::filled(5, 5, 0.8);
        assert!(field.step(Some(&coherence)).is_ok());
        assert_eq!(field.grid().shape(), (12, 12));
    }

    #[test]
    fn history_freezes_at_cap() {
        let mut field = SubstrateField::new(SubstrateConfig {
            size: 6,
            history_cap: 5,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..12 {
            field.step(None).unwrap();
        }
        assert_eq!(field.history().len(), 5);
        assert_eq!(field.tick(), 12);
    }

    #[test]
    fn ripple_is_additive_and_clamped() {
        let mut field = small(3);
        let before = field.grid().clone();
        let mut ripple = Grid::square(12);
        ripple[(2, 2)] = 0.01;
        ripple[(4, 4)] = 5.0;
        field.absorb_ripple(&ripple).unwrap();
        assert!((field.grid()[(2, 2)] - (before[(2, 2)] + 0.01)).abs() < 1e-15);
        assert_eq!(field.grid()[(4, 4)], SUBSTRATE_MAX);
    }

    #[test]
    fn listening_quality_counts_active_cells() {
        let mut field = small(5);
        let lift = Grid::filled(12, 12, 1.0);
        field.absorb_ripple(&lift).unwrap();
        assert_eq!(field.global_listening_quality(), 1.0);
    }
}
