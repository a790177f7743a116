//! # Synchronization Orchestration
//!
//! Ties the ClickUp fetcher, the chart renderer and the Confluence publisher
//! together for each configured project mapping.
//!
//! ## Core Components
//!
//! - **[`SyncSystem`]**: runs every selected mapping in order and collects outcomes
//! - **[`SyncConfig`]**: credentials, mappings and HTTP budgets for one run
//! - **[`SyncSummary`]**: per-mapping results and the process exit code
//!
//! ## Pipeline
//!
//! ```text
//! Mapping ──► ClickUp (list | folder) ──► GanttLayout ──► PNG ──► attachment ──► page body
//! ```
//!
//! A failure at any step ends that mapping only; the remaining mappings still run.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gantt_sync::{RunOptions, SyncConfig, SyncSystem};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SyncConfig::from_file("gantt-sync.toml")?.validate()?;
//!     let system = SyncSystem::new(config)?;
//!
//!     let summary = system.run(&RunOptions::default()).await;
//!     summary.print();
//!     std::process::exit(summary.exit_code());
//! }
//! ```

pub mod config;
pub mod summary;
pub mod system;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, HttpConfig, Mapping, SyncConfig};
pub use summary::{MappingOutcome, SyncSummary};
pub use system::{RunOptions, SyncError, SyncSystem};
