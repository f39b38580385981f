//! Ecosystem — drives the three grid layers as one loop.
//!
//! Each tick:
//! 1. Occasionally a resonance pulse (a noisy disc of high coherence) appears
//! 2. The substrate steps, rewarding the pulse
//! 3. Matter responds to the substrate
//! 4. Every `injection_interval` ticks the accumulation pools matter overflow
//! 5. The accumulation steps and may manifest
//! 6. A fresh manifestation ripples back into the substrate
//! 7. Layer means and the event count are recorded
//!
//! The layers never see each other; only grids cross between them.

use crate::accumulation::{AccumulationConfig, AccumulationField};
use crate::matter::{MatterConfig, MatterField};
use crate::substrate::{SubstrateConfig, SubstrateField};
use grace_core::error::{check, GraceError, Result};
use grace_core::grid::Grid;
use grace_core::layer::Layer;
use grace_core::rng::FieldRng;
use grace_core::types::{ManifestationEvent, Tick};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Pulse values are `pulse_level` plus a uniform offset in this range.
const PULSE_JITTER: (f64, f64) = (-0.14, 0.16);

/// Driver settings (the layer configs live alongside).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemConfig {
    /// Shared grid side length; overrides the per-layer sizes (default: 180).
    pub size: usize,
    /// Chance of a resonance pulse per tick (default: 0.12).
    pub pulse_probability: f64,
    /// Pulse disc radius in cells (default: 24.0).
    pub pulse_radius: f64,
    /// Minimum distance of a pulse centre from the border (default: 40).
    pub pulse_margin: usize,
    /// Mean coherence inside a pulse (default: 0.68).
    pub pulse_level: f64,
    /// Ticks between matter injections into the accumulation (default: 1).
    pub injection_interval: u64,
    /// Peak ripple added to the substrate per manifestation tick (default: 0.018).
    pub ripple_amplitude: f64,
    /// Ripple cut-off radius in cells (default: 18.0).
    pub ripple_radius: f64,
    /// Exponential fall-off length of the ripple (default: 9.0).
    pub ripple_decay: f64,
    /// Seed of the driver's own stream (pulses).
    pub seed: u64,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            size: 180,
            pulse_probability: 0.12,
            pulse_radius: 24.0,
            pulse_margin: 40,
            pulse_level: 0.68,
            injection_interval: 1,
            ripple_amplitude: 0.018,
            ripple_radius: 18.0,
            ripple_decay: 9.0,
            seed: 42,
        }
    }
}

impl EcosystemConfig {
    pub fn validate(&self) -> Result<()> {
        check::at_least("ecosystem.size", self.size, 1)?;
        check::unit_interval("ecosystem.pulse_probability", self.pulse_probability)?;
        check::non_negative("ecosystem.pulse_radius", self.pulse_radius)?;
        check::finite("ecosystem.pulse_level", self.pulse_level)?;
        if self.injection_interval == 0 {
            return Err(GraceError::invalid_config(
                "ecosystem.injection_interval",
                self.injection_interval,
                "must be >= 1",
            ));
        }
        check::finite("ecosystem.ripple_amplitude", self.ripple_amplitude)?;
        check::non_negative("ecosystem.ripple_radius", self.ripple_radius)?;
        check::positive("ecosystem.ripple_decay", self.ripple_decay)?;
        Ok(())
    }
}

/// Per-tick scalar record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcosystemRecord {
    pub tick: Tick,
    pub substrate_mean: f64,
    pub matter_mean: f64,
    pub accumulation_mean: f64,
    pub manifestation_count: usize,
}

/// Serializable summary of the whole loop.
#[derive(Debug, Clone, Serialize)]
pub struct EcosystemSnapshot {
    pub tick: Tick,
    pub listening_quality: f64,
    pub global_extra_order: f64,
    pub manifestation_potential: f64,
    pub global_accumulation: f64,
    pub manifestation_count: usize,
    pub pulses: usize,
    pub latest: Option<EcosystemRecord>,
}

impl EcosystemSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The three grid layers wired substrate → matter → accumulation.
pub struct Ecosystem {
    config: EcosystemConfig,
    substrate: SubstrateField,
    matter: MatterField,
    accumulation: AccumulationField,
    rng: FieldRng,
    records: Vec<EcosystemRecord>,
    pulses: usize,
    tick: Tick,
}

impl Ecosystem {
    /// Build the loop. Each layer keeps its own seed; sizes are forced to
    /// `config.size`.
    pub fn new(
        config: EcosystemConfig,
        substrate: SubstrateConfig,
        matter: MatterConfig,
        accumulation: AccumulationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let size = config.size;
        let ecosystem = Self {
            substrate: SubstrateField::new(SubstrateConfig { size, ..substrate })?,
            matter: MatterField::new(MatterConfig { size, ..matter })?,
            accumulation: AccumulationField::new(AccumulationConfig {
                size,
                ..accumulation
            })?,
            rng: FieldRng::new(config.seed),
            records: Vec::new(),
            pulses: 0,
            tick: 0,
            config,
        };
        info!(size, "ecosystem assembled");
        Ok(ecosystem)
    }

    /// Defaults everywhere, with the given size and seeds derived from `seed`.
    pub fn with_size(size: usize, seed: u64) -> Result<Self> {
        Self::new(
            EcosystemConfig {
                size,
                seed,
                ..Default::default()
            },
            SubstrateConfig {
                seed: seed.wrapping_add(1),
                ..Default::default()
            },
            MatterConfig {
                seed: seed.wrapping_add(2),
                ..Default::default()
            },
            AccumulationConfig {
                seed: seed.wrapping_add(3),
                ..Default::default()
            },
        )
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    pub fn substrate(&self) -> &SubstrateField {
        &self.substrate
    }

    pub fn matter(&self) -> &MatterField {
        &self.matter
    }

    pub fn accumulation(&self) -> &AccumulationField {
        &self.accumulation
    }

    pub fn records(&self) -> &[EcosystemRecord] {
        &self.records
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Resonance pulse for this tick, or `None` when none occurs.
    fn resonance_pulse(&mut self) -> Option<Grid> {
        if !self.rng.chance(self.config.pulse_probability) {
            return None;
        }
        let size = self.config.size;
        let (lo, hi) = if size > 2 * self.config.pulse_margin {
            (self.config.pulse_margin, size - self.config.pulse_margin)
        } else {
            (0, size)
        };
        let cy = self.rng.index_range(lo, hi) as f64;
        let cx = self.rng.index_range(lo, hi) as f64;
        let r2 = self.config.pulse_radius * self.config.pulse_radius;
        let level = self.config.pulse_level;

        let mut pulse = Grid::square(size);
        for r in 0..size {
            for c in 0..size {
                let (dy, dx) = (r as f64 - cy, c as f64 - cx);
                if dy * dy + dx * dx < r2 {
                    pulse[(r, c)] = level + self.rng.uniform_range(PULSE_JITTER.0, PULSE_JITTER.1);
                }
            }
        }
        self.pulses += 1;
        debug!(tick = self.tick, row = cy, col = cx, "resonance pulse");
        Some(pulse)
    }

    /// Radial ripple around an event.
    fn ripple(&self, event: &ManifestationEvent) -> Grid {
        let size = self.config.size;
        let radius = self.config.ripple_radius;
        let amplitude = self.config.ripple_amplitude;
        let falloff = self.config.ripple_decay;
        Grid::from_fn(size, size, |r, c| {
            let dy = r as f64 - event.row as f64;
            let dx = c as f64 - event.col as f64;
            let d = (dy * dy + dx * dx).sqrt();
            if d < radius {
                amplitude * (-d / falloff).exp()
            } else {
                0.0
            }
        })
    }

    /// Advance the whole loop one tick. Returns events fired this tick.
    pub fn step(&mut self) -> Result<Vec<ManifestationEvent>> {
        let pulse = self.resonance_pulse();
        self.substrate.step(pulse.as_ref())?;

        self.matter.update_from_substrate(self.substrate.grid())?;

        if self.tick % self.config.injection_interval == 0 {
            self.accumulation.accumulate_from_matter(self.matter.grid())?;
        }

        let fired = self.accumulation.step();
        if let Some(last) = fired.last() {
            let ripple = self.ripple(last);
            self.substrate.absorb_ripple(&ripple)?;
        }

        self.tick += 1;
        self.records.push(EcosystemRecord {
            tick: self.tick,
            substrate_mean: self.substrate.mean(),
            matter_mean: self.matter.mean(),
            accumulation_mean: self.accumulation.mean(),
            manifestation_count: self.accumulation.manifestation_count(),
        });
        Ok(fired)
    }

    /// Run `steps` ticks.
    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> EcosystemSnapshot {
        EcosystemSnapshot {
            tick: self.tick,
            listening_quality: self.substrate.global_listening_quality(),
            global_extra_order: self.matter.global_extra_order(),
            manifestation_potential: self.matter.manifestation_potential(),
            global_accumulation: self.accumulation.global_accumulation(),
            manifestation_count: self.accumulation.manifestation_count(),
            pulses: self.pulses,
            latest: self.records.last().copied(),
        }
    }
}

impl std::fmt::Debug for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ecosystem")
            .field("size", &self.config.size)
            .field("tick", &self.tick)
            .field("pulses", &self.pulses)
            .field("manifestations", &self.accumulation.manifestation_count())
            .finish()
    }
}
