//! # Gantt Sync
//!
//! Renders ClickUp task schedules as Gantt charts and publishes them as PNG
//! attachments on Confluence pages, one chart per configured project mapping.
//!
//! ## Architecture Overview
//!
//! - **[`clickup`]**: task fetching for a list or a whole folder, with escalating-timeout retries
//! - **[`chart`]**: date inference, status colors, bar layout and PNG rasterization
//! - **[`confluence`]**: attachment replacement and page body updates
//! - **[`sync`]**: per-mapping orchestration, configuration and the run summary
//! - **[`cli`]**: argument parsing and configuration discovery
//!
//! ## Features
//!
//! ### 📥 Task Fetching
//! - **List or Folder Sources**: a folder expands into all of its lists; failing lists are skipped
//! - **Bounded Retries**: timeouts and connection failures retried with a longer timeout each attempt
//! - **Permanent Failures**: 401/403/404 and other HTTP errors stop immediately
//!
//! ### 📊 Chart Rendering
//! - **Date Inference**: tasks with only a due or only a start date get a one-day bar
//! - **Status Colors**: done, in progress and everything else, matched by substring
//! - **Self-Contained PNG**: no system fonts or plotting backend required
//!
//! ### 📤 Publishing
//! - **Attachment Replacement**: same-named attachments are removed before upload
//! - **Page Update**: the body is rewritten to embed the chart with the next version number
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gantt_sync::{ConfigDiscovery, RunOptions, SyncSystem};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigDiscovery::discover_config(None)?;
//!     let system = SyncSystem::new(config)?;
//!
//!     let summary = system.run(&RunOptions::default()).await;
//!     summary.print();
//!     Ok(())
//! }
//! ```

/// ClickUp API client.
///
/// Resolves lists and folders into task records, retrying transient failures
/// with an escalating per-attempt timeout.
pub mod clickup;

/// Gantt chart layout and PNG rendering.
pub mod chart;

/// Confluence attachment and page publishing.
pub mod confluence;

/// Mapping orchestration, configuration types and the run summary.
pub mod sync;

/// Environment constants and path utilities.
///
/// Centralizes file names, environment variable names and remote API
/// defaults used throughout the application.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use chart::{ChartError, GanttRenderer, RenderOptions, RenderedArtifact};
pub use cli::ConfigDiscovery;
pub use clickup::{ClickUpClient, ClickUpConfig, ClickUpError, RetryPolicy, TaskRecord, TaskSource};
pub use confluence::{ConfluenceClient, ConfluenceConfig, ConfluenceError, PublishReceipt};
pub use sync::{
    ConfigError, HttpConfig, Mapping, MappingOutcome, RunOptions, SyncConfig, SyncError,
    SyncSummary, SyncSystem,
};
