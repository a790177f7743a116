use crate::chart::{ChartError, GanttRenderer, RenderOptions, RenderedArtifact};
use crate::clickup::{ClickUpClient, ClickUpError};
use crate::confluence::{ConfluenceClient, ConfluenceError, PublishReceipt};
use crate::sync::config::{Mapping, SyncConfig};
use crate::sync::summary::{MappingOutcome, SyncSummary};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// The step at which a mapping failed.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("mapping '{0}' has no ClickUp list or folder")]
    Source(String),
    #[error("could not fetch tasks: {0}")]
    Fetch(#[from] ClickUpError),
    #[error("could not render chart: {0}")]
    Render(#[from] ChartError),
    #[error("could not upload chart: {0}")]
    Upload(#[source] ConfluenceError),
    #[error("could not update page: {0}")]
    Update(#[source] ConfluenceError),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Which mappings to run and what to do with the rendered charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Mapping names to keep; empty keeps all.
    pub only: Vec<String>,
    /// Write PNGs to `output_dir` instead of publishing them.
    pub dry_run: bool,
    pub output_dir: PathBuf,
}

/// Drives fetch, render and publish for every configured mapping.
pub struct SyncSystem {
    config: SyncConfig,
    clickup: ClickUpClient,
    confluence: ConfluenceClient,
    renderer: GanttRenderer,
}

impl SyncSystem {
    pub fn new(config: SyncConfig) -> Result<Self> {
        Self::with_renderer(config, GanttRenderer::new(RenderOptions::default()))
    }

    pub fn with_renderer(config: SyncConfig, renderer: GanttRenderer) -> Result<Self> {
        let clickup = ClickUpClient::new(&config.clickup, config.http.retry_policy())
            .context("Failed to initialize ClickUp client")?;
        let confluence = ConfluenceClient::new(
            config.confluence.clone(),
            config.http.document_timeout(),
            config.http.upload_timeout(),
        )
        .context("Failed to initialize Confluence client")?;

        Ok(Self {
            config,
            clickup,
            confluence,
            renderer,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Mappings whose name is in `only`, or all of them when `only` is empty.
    pub fn select_mappings(&self, only: &[String]) -> Vec<&Mapping> {
        self.config
            .mappings
            .iter()
            .filter(|m| only.is_empty() || only.iter().any(|name| name == &m.name))
            .collect()
    }

    /// Process the selected mappings one after another.
    ///
    /// A failing mapping is recorded and the run moves on to the next one.
    pub async fn run(&self, options: &RunOptions) -> SyncSummary {
        let selected = self.select_mappings(&options.only);
        let mut summary = SyncSummary::default();

        if selected.is_empty() {
            warn!("No mappings matched {:?}", options.only);
            return summary;
        }

        info!("Found {} projects to synchronize", selected.len());

        for mapping in selected {
            let result = if options.dry_run {
                self.preview_mapping(mapping, &options.output_dir)
                    .await
                    .map(|path| info!("Chart for '{}' written to {}", mapping.name, path.display()))
            } else {
                self.sync_mapping(mapping).await.map(|receipt| {
                    info!(
                        "'{}' synchronized (page version {}): {}",
                        mapping.name,
                        receipt.page_version,
                        self.confluence.page_url(&mapping.confluence_page_id)
                    )
                })
            };

            let outcome = match result {
                Ok(()) => MappingOutcome::succeeded(&mapping.name),
                Err(e) => {
                    error!("Mapping '{}' failed: {}", mapping.name, e);
                    MappingOutcome::failed(&mapping.name, e)
                }
            };
            summary.push(outcome);
        }

        summary
    }

    /// Fetch and render one mapping's chart.
    pub async fn render_mapping(&self, mapping: &Mapping) -> Result<RenderedArtifact, SyncError> {
        let source = mapping
            .source()
            .ok_or_else(|| SyncError::Source(mapping.name.clone()))?;

        info!(
            "Processing '{}': ClickUp {} -> Confluence page {}",
            mapping.name, source, mapping.confluence_page_id
        );

        let tasks = self.clickup.fetch_tasks(&source).await?;
        let bytes = self.renderer.render(&tasks, &mapping.name)?;

        Ok(RenderedArtifact {
            filename: RenderedArtifact::filename_for(&mapping.name, Local::now().date_naive()),
            bytes,
        })
    }

    /// Full pipeline: render, upload the PNG, then rewrite the page body.
    pub async fn sync_mapping(&self, mapping: &Mapping) -> Result<PublishReceipt, SyncError> {
        let artifact = self.render_mapping(mapping).await?;
        let page_id = &mapping.confluence_page_id;

        let attachment_id = self
            .confluence
            .upload_attachment(page_id, &artifact.filename, artifact.bytes)
            .await
            .map_err(SyncError::Upload)?;
        let page_version = self
            .confluence
            .update_page(page_id, &artifact.filename, &mapping.name)
            .await
            .map_err(SyncError::Update)?;

        Ok(PublishReceipt {
            attachment_id,
            page_version,
        })
    }

    /// Render one mapping and write the PNG into `output_dir`.
    pub async fn preview_mapping(
        &self,
        mapping: &Mapping,
        output_dir: &Path,
    ) -> Result<PathBuf, SyncError> {
        let artifact = self.render_mapping(mapping).await?;
        let path = output_dir.join(&artifact.filename);

        let write = async {
            tokio::fs::create_dir_all(output_dir).await?;
            tokio::fs::write(&path, &artifact.bytes).await
        };
        write.await.map_err(|source| SyncError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}
