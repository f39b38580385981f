//! OscillatorMesh — coupled phase rotators on a triangular lattice.
//!
//! Each tick every vertex phase is pushed by:
//! - a pull toward the shared target phase
//! - a social term toward its neighbours' phases
//! - a reward from its well-synchronised triangles (diminishing near 1)
//! - Gaussian noise
//!
//! then integrated with step `dt` and wrapped into [0, 2π).

use grace_core::error::{check, GraceError, Result};
use grace_core::rng::FieldRng;
use grace_core::types::{MeshSample, Tick};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, trace};

/// Triangles above this local coherence earn a reward.
pub const REWARD_GATE: f64 = 0.7;
/// Triangles above this local coherence count as harmonious in samples.
pub const HARMONY_GATE: f64 = 0.82;

/// Configuration for the oscillator mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Lattice rows; row `r` holds `r + 1` points (default: 12).
    pub rows: usize,
    /// Reward strength for coherent triangles (default: 0.35).
    pub grace: f64,
    /// Neighbour coupling strength (default: 0.8).
    pub tension: f64,
    /// Pull toward the target phase (default: 0.25).
    pub intention_strength: f64,
    /// Standard deviation of per-vertex noise (default: 0.05).
    pub noise: f64,
    /// Integration step (default: 0.1).
    pub dt: f64,
    pub seed: u64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            grace: 0.35,
            tension: 0.8,
            intention_strength: 0.25,
            noise: 0.05,
            dt: 0.1,
            seed: 42,
        }
    }
}

impl MeshConfig {
    pub fn validate(&self) -> Result<()> {
        check::at_least("mesh.rows", self.rows, 2)?;
        check::finite("mesh.grace", self.grace)?;
        check::finite("mesh.tension", self.tension)?;
        check::finite("mesh.intention_strength", self.intention_strength)?;
        check::non_negative("mesh.noise", self.noise)?;
        check::positive("mesh.dt", self.dt)?;
        Ok(())
    }
}

/// Points of a triangular lattice with `rows` rows, row-major.
///
/// Point `(r, c)` sits at `x = c − r/2`, `y = r·√3/2`.
pub fn lattice_points(rows: usize) -> Vec<[f64; 2]> {
    let h = 3f64.sqrt() / 2.0;
    let mut points = Vec::with_capacity(rows * (rows + 1) / 2);
    for r in 0..rows {
        for c in 0..=r {
            points.push([c as f64 - r as f64 / 2.0, r as f64 * h]);
        }
    }
    points
}

/// Delaunay triangulation of [`lattice_points`]: every "up" and "down"
/// unit triangle of the lattice.
pub fn lattice_simplices(rows: usize) -> Vec<[usize; 3]> {
    let idx = |r: usize, c: usize| r * (r + 1) / 2 + c;
    let mut simplices = Vec::with_capacity(rows.saturating_sub(1).pow(2));
    for r in 0..rows.saturating_sub(1) {
        for c in 0..=r {
            simplices.push([idx(r, c), idx(r + 1, c), idx(r + 1, c + 1)]);
            if c < r {
                simplices.push([idx(r, c), idx(r, c + 1), idx(r + 1, c + 1)]);
            }
        }
    }
    simplices
}

/// Undirected adjacency from shared-simplex vertex pairs, frozen into
/// sorted neighbour lists.
fn adjacency(point_count: usize, simplices: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut graph = UnGraph::<(), ()>::with_capacity(point_count, simplices.len() * 3);
    let nodes: Vec<NodeIndex> = (0..point_count).map(|_| graph.add_node(())).collect();
    for s in simplices {
        for (a, b) in [(s[0], s[1]), (s[1], s[2]), (s[0], s[2])] {
            graph.update_edge(nodes[a], nodes[b], ());
        }
    }
    nodes
        .iter()
        .map(|&n| {
            let mut list: Vec<usize> = graph.neighbors(n).map(|m| m.index()).collect();
            list.sort_unstable();
            list
        })
        .collect()
}

/// Magnitude of the mean unit phasor of `phases`, in [0, 1].
pub fn circular_coherence(phases: impl IntoIterator<Item = f64>) -> f64 {
    let (mut re, mut im, mut n) = (0.0, 0.0, 0usize);
    for p in phases {
        re += p.cos();
        im += p.sin();
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    ((re * re + im * im).sqrt() / n as f64).min(1.0)
}

fn wrap(angle: f64) -> f64 {
    let w = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if w >= TAU {
        0.0
    } else {
        w
    }
}

/// Phase oscillators on a triangulated lattice.
#[derive(Debug, Clone)]
pub struct OscillatorMesh {
    config: MeshConfig,
    points: Vec<[f64; 2]>,
    simplices: Vec<[usize; 3]>,
    neighbors: Vec<Vec<usize>>,
    phase: Vec<f64>,
    target_phase: f64,
    rng: FieldRng,
    tick: Tick,
}

impl OscillatorMesh {
    pub fn new(config: MeshConfig) -> Result<Self> {
        config.validate()?;
        let points = lattice_points(config.rows);
        let simplices = lattice_simplices(config.rows);
        let neighbors = adjacency(points.len(), &simplices);

        let mut rng = FieldRng::new(config.seed);
        let phase: Vec<f64> = (0..points.len()).map(|_| rng.angle()).collect();
        let target_phase = rng.angle();

        debug!(
            rows = config.rows,
            points = points.len(),
            simplices = simplices.len(),
            target = target_phase,
            "oscillator mesh created"
        );

        Ok(Self {
            config,
            points,
            simplices,
            neighbors,
            phase,
            target_phase,
            rng,
            tick: 0,
        })
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn simplices(&self) -> &[[usize; 3]] {
        &self.simplices
    }

    /// Sorted neighbour indices of vertex `v`.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    pub fn phases(&self) -> &[f64] {
        &self.phase
    }

    /// Overwrite all phases (wrapped into [0, 2π)).
    pub fn set_phases(&mut self, phases: &[f64]) -> Result<()> {
        if phases.len() != self.phase.len() {
            return Err(GraceError::invalid_shape(format!(
                "expected {} phases, got {}",
                self.phase.len(),
                phases.len()
            )));
        }
        if let Some(i) = phases.iter().position(|p| !p.is_finite()) {
            return Err(GraceError::invalid_shape(format!(
                "phase {} is not finite",
                i
            )));
        }
        for (dst, &src) in self.phase.iter_mut().zip(phases) {
            *dst = wrap(src);
        }
        Ok(())
    }

    pub fn target_phase(&self) -> f64 {
        self.target_phase
    }

    pub fn set_target_phase(&mut self, target: f64) -> Result<()> {
        check::finite("target_phase", target)?;
        self.target_phase = wrap(target);
        Ok(())
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Integrated time, `tick · dt`.
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.config.dt
    }

    /// Circular-mean magnitude per triangle.
    pub fn local_coherence(&self) -> Vec<f64> {
        self.simplices
            .iter()
            .map(|s| circular_coherence(s.iter().map(|&v| self.phase[v])))
            .collect()
    }

    /// Circular-mean magnitude over every vertex.
    pub fn global_coherence(&self) -> f64 {
        circular_coherence(self.phase.iter().copied())
    }

    /// Advance one integration step.
    pub fn step(&mut self) {
        let local = self.local_coherence();
        let n = self.phase.len();
        let cfg = &self.config;

        let mut velocity: Vec<f64> = self
            .phase
            .iter()
            .map(|&p| cfg.intention_strength * (self.target_phase - p).sin())
            .collect();

        for (v, vel) in velocity.iter_mut().enumerate() {
            let nbrs = &self.neighbors[v];
            if nbrs.is_empty() {
                continue;
            }
            let own = self.phase[v];
            let pull: f64 = nbrs.iter().map(|&u| (own - self.phase[u]).sin()).sum();
            *vel += -cfg.tension * pull / nbrs.len() as f64;
        }

        for (s, &lc) in self.simplices.iter().zip(&local) {
            if lc > REWARD_GATE {
                let reward = cfg.grace * (1.0 - lc);
                for &v in s {
                    velocity[v] += reward;
                }
            }
        }

        let dt = cfg.dt;
        let noise = cfg.noise;
        for v in 0..n {
            let kick = self.rng.gaussian(0.0, noise);
            self.phase[v] = wrap(self.phase[v] + dt * (velocity[v] + kick));
        }

        self.tick += 1;
        trace!(tick = self.tick, global = self.global_coherence(), "mesh step");
    }

    /// Current sample of the summary scalars.
    pub fn sample(&self) -> MeshSample {
        let local = self.local_coherence();
        let count = local.len().max(1) as f64;
        MeshSample {
            time: self.time(),
            global_coherence: self.global_coherence(),
            mean_local_coherence: local.iter().sum::<f64>() / count,
            harmonious_fraction: local.iter().filter(|&&c| c > HARMONY_GATE).count() as f64
                / count,
        }
    }

    /// Run `steps` ticks, sampling after every tick whose index is a
    /// multiple of `record_every`.
    pub fn run(&mut self, steps: usize, record_every: usize) -> Result<Vec<MeshSample>> {
        check::at_least("record_every", record_every, 1)?;
        let mut samples = Vec::with_capacity(steps / record_every + 1);
        for i in 0..steps {
            self.step();
            if i % record_every == 0 {
                let sample = self.sample();
                debug!(
                    tick = self.tick,
                    global = sample.global_coherence,
                    harmonious = sample.harmonious_fraction,
                    "mesh sample"
                );
                samples.push(sample);
            }
        }
        Ok(samples)
    }
}
