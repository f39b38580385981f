//! Write a default grace.toml.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let dir = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(&dir)?;
    Config::default().save(&config_path)?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green().bold(),
        config_path.display().to_string().cyan()
    );
    Ok(())
}
