//! Command line argument parsing
//!
//! Subcommands:
//! - `run`: synchronize every configured mapping (the default when no subcommand is given)
//! - `show-config`: show configuration discovery information and the resolved mappings

use crate::sync::RunOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum ExecutionMode {
    Sync(RunConfig),
    ShowConfig { config_override: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub config_override: Option<PathBuf>,
    pub only: Vec<String>,
    pub dry_run: bool,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            config_override: None,
            only: Vec::new(),
            dry_run: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl RunConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            only: self.only.clone(),
            dry_run: self.dry_run,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gantt-sync")]
#[command(author = "Gantt Sync Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render ClickUp task schedules as Gantt charts and publish them to Confluence")]
#[command(long_about = None)]
pub struct Args {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synchronize every configured mapping
    Run {
        /// Configuration file path (JSON, or TOML by extension)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Only process mappings with this name (can be used multiple times)
        #[arg(short = 'o', long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Fetch and render, write PNGs locally, skip Confluence
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,
        /// Directory for dry-run charts
        #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show configuration discovery information
    ShowConfig {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
}

impl Args {
    /// Parse process arguments. Shadows `clap::Parser::parse` on purpose so
    /// callers need not import the trait.
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> ExecutionMode {
        match &self.command {
            Some(Commands::Run {
                config,
                only,
                dry_run,
                output_dir,
            }) => ExecutionMode::Sync(RunConfig {
                config_override: config.clone(),
                only: only.clone(),
                dry_run: *dry_run,
                output_dir: output_dir.clone(),
            }),
            Some(Commands::ShowConfig { config }) => ExecutionMode::ShowConfig {
                config_override: config.clone(),
            },
            None => ExecutionMode::Sync(RunConfig::default()),
        }
    }

    /// `RUST_LOG`-style directive used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "gantt_sync=debug"
        } else {
            "gantt_sync=info"
        }
    }
}
