//! Run the layered substrate → matter → accumulation loop.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use grace::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;

/// Everything written by `--json`.
#[derive(Debug, Serialize)]
struct EcosystemReport {
    snapshot: EcosystemSnapshot,
    records: Vec<EcosystemRecord>,
}

pub fn run(
    steps: u64,
    record_every: u64,
    seed: Option<u64>,
    size: Option<usize>,
    json: Option<&Path>,
) -> Result<()> {
    if record_every == 0 {
        bail!("--record-every must be at least 1");
    }

    let mut config = Config::load()?;
    if let Some(seed) = seed {
        config.ecosystem.seed = seed;
        config.substrate.seed = seed.wrapping_add(1);
        config.matter.seed = seed.wrapping_add(2);
        config.accumulation.seed = seed.wrapping_add(3);
    }
    if let Some(size) = size {
        config.ecosystem.size = size;
    }
    let mut ecosystem = Ecosystem::new(
        config.ecosystem.clone(),
        config.substrate.clone(),
        config.matter.clone(),
        config.accumulation.clone(),
    )
    .context("Invalid ecosystem configuration")?;

    println!(
        "{} Running ecosystem ({}x{}) for {} ticks...",
        "→".blue(),
        config.ecosystem.size,
        config.ecosystem.size,
        steps.to_string().cyan()
    );

    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut sampled = Vec::new();
    for i in 0..steps {
        let fired = ecosystem.step()?;
        if !fired.is_empty() {
            tracing::debug!(tick = ecosystem.tick(), count = fired.len(), "manifested");
        }
        if i % record_every == 0 {
            if let Some(record) = ecosystem.records().last().copied() {
                pb.println(format!(
                    "  tick {:5} | substrate {:+.4} | matter {:.4} | accumulation {:+.4} | manifest {}",
                    record.tick,
                    record.substrate_mean,
                    record.matter_mean,
                    record.accumulation_mean,
                    record.manifestation_count
                ));
                sampled.push(record);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let snapshot = ecosystem.snapshot();
    println!();
    println!("{} Ecosystem settled", "✓".green().bold());
    println!(
        "  Listening quality:       {}",
        format!("{:.1}%", snapshot.listening_quality * 100.0).cyan()
    );
    println!(
        "  Extra order:             {}",
        format!("{:+.4}", snapshot.global_extra_order).cyan()
    );
    println!(
        "  Manifestation potential: {}",
        format!("{:.4}", snapshot.manifestation_potential).cyan()
    );
    println!(
        "  Accumulation:            {}",
        format!("{:+.4}", snapshot.global_accumulation).cyan()
    );
    println!(
        "  Manifestations:          {}",
        snapshot.manifestation_count.to_string().yellow()
    );
    println!("  Resonance pulses:        {}", snapshot.pulses);

    if let Some(path) = json {
        let report = EcosystemReport {
            snapshot,
            records: sampled,
        };
        let content = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("  Report:                  {}", path.display().to_string().cyan());
    }

    Ok(())
}
