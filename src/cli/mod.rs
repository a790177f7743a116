//! CLI-specific functionality for gantt-sync
//!
//! This module contains argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, Commands, ExecutionMode, RunConfig};
pub use config::ConfigDiscovery;
