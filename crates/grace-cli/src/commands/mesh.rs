//! Run the oscillator mesh.

use anyhow::{Context, Result};
use colored::Colorize;
use grace::prelude::*;
use serde::Serialize;
use std::path::Path;

use crate::config::Config;

#[derive(Debug, Serialize)]
struct MeshReport {
    rows: usize,
    points: usize,
    simplices: usize,
    target_phase: f64,
    samples: Vec<MeshSample>,
}

pub fn run(
    steps: usize,
    record_every: usize,
    seed: Option<u64>,
    rows: Option<usize>,
    json: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load()?.mesh;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }

    let mut mesh = OscillatorMesh::new(config).context("Invalid mesh configuration")?;
    println!(
        "{} Relaxing {} oscillators on {} triangles for {} ticks...",
        "→".blue(),
        mesh.points().len().to_string().cyan(),
        mesh.simplices().len().to_string().cyan(),
        steps.to_string().cyan()
    );

    let samples = mesh.run(steps, record_every)?;
    println!("  {:>8}  {:>8}  {:>8}  {:>8}", "time", "global", "local", "harmony");
    for s in &samples {
        println!(
            "  {:8.2}  {:8.4}  {:8.4}  {:7.1}%",
            s.time,
            s.global_coherence,
            s.mean_local_coherence,
            s.harmonious_fraction * 100.0
        );
    }

    println!();
    println!(
        "{} Global coherence: {}",
        "✓".green().bold(),
        format!("{:.4}", mesh.global_coherence()).green()
    );

    if let Some(path) = json {
        let report = MeshReport {
            rows: mesh.config().rows,
            points: mesh.points().len(),
            simplices: mesh.simplices().len(),
            target_phase: mesh.target_phase(),
            samples,
        };
        let content = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("  Report: {}", path.display().to_string().cyan());
    }

    Ok(())
}
