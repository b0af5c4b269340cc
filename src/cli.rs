use anyhow::{Context, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::{Config, DEFAULT_CONFIG_PATH};

/// simlog-filter - chained filters over hardware simulator logs
#[derive(Parser, Debug)]
#[command(name = "slf")]
#[command(version)]
#[command(about = "Chained filters over hardware simulator logs")]
#[command(long_about = "simlog-filter (slf) loads a CSV log produced by a chip simulator and
narrows it with stateful filters on IO direction, cluster, quad, thread ID, area and unit.

Every change recomputes the view from the full log, so filters can be applied,
updated and removed in any order.

Quick start:
  1. Run 'slf --init' to generate a config file
  2. Set log_file in .simlog-filter.toml (or pass --log)
  3. Run 'slf' and type 'help' for commands")]
pub struct Cli {
    /// Path to config file (defaults to .simlog-filter.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// CSV log to load (overrides config file setting)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Initialize a new .simlog-filter.toml config file with the default layout
    #[arg(long)]
    pub init: bool,

    /// Run a command non-interactively (repeatable, runs in order)
    #[arg(short, long = "exec", value_name = "COMMAND")]
    pub exec: Vec<String>,

    /// Print the filter state as JSON after every change
    #[arg(long)]
    pub json: bool,
}

/// Write a default config file. An existing file is never overwritten.
pub fn init_config(config_path: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    if Path::new(config_path).exists() {
        return Err(anyhow!(
            "Config file '{}' already exists.\n\
             Remove it first or pass a different path with --config",
            config_path
        ));
    }

    let config = Config {
        log_file: log_file.map(Path::to_path_buf),
        ..Config::default()
    };
    config
        .save(config_path)
        .with_context(|| format!("Failed to write config to '{}'", config_path))?;

    println!("Created {}", config_path);
    Ok(())
}
