use crate::clickup::{ClickUpConfig, RetryPolicy, TaskSource};
use crate::confluence::ConfluenceConfig;
use crate::env;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file '{path}' not found")]
    NotFound { path: PathBuf },

    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("No project mappings configured")]
    NoMappings,
}

/// One ClickUp source synchronized into one Confluence page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mapping {
    #[serde(default = "default_mapping_name")]
    pub name: String,
    pub confluence_page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickup_list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickup_folder_id: Option<String>,
}

fn default_mapping_name() -> String {
    "ClickUp".to_string()
}

impl Mapping {
    /// The list id takes precedence when a file mapping names both.
    pub fn source(&self) -> Option<TaskSource> {
        let list = self.clickup_list_id.as_deref().filter(|id| !id.is_empty());
        let folder = self.clickup_folder_id.as_deref().filter(|id| !id.is_empty());

        match (list, folder) {
            (Some(list), Some(_)) => {
                warn!(
                    "Mapping '{}' names both a list and a folder; using list {}",
                    self.name, list
                );
                Some(TaskSource::List(list.to_string()))
            }
            (Some(list), None) => Some(TaskSource::List(list.to_string())),
            (None, Some(folder)) => Some(TaskSource::Folder(folder.to_string())),
            (None, None) => None,
        }
    }
}

/// Timeouts and attempt budget, in whole seconds as they appear in config files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub fetch_timeout_secs: u64,
    pub fetch_timeout_step_secs: u64,
    pub max_attempts: u32,
    pub document_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: env::http::FETCH_TIMEOUT_SECS,
            fetch_timeout_step_secs: env::http::FETCH_TIMEOUT_STEP_SECS,
            max_attempts: env::http::MAX_ATTEMPTS,
            document_timeout_secs: env::http::DOCUMENT_TIMEOUT_SECS,
            upload_timeout_secs: env::http::UPLOAD_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_timeout: Duration::from_secs(self.fetch_timeout_secs),
            timeout_step: Duration::from_secs(self.fetch_timeout_step_secs),
        }
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

/// Everything one run needs: credentials for both sides plus the mappings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    pub confluence: ConfluenceConfig,
    pub clickup: ClickUpConfig,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub http: HttpConfig,
}

impl SyncConfig {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a config file; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        let content = fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound { path: path.clone() },
            _ => ConfigError::Io {
                path: path.clone(),
                source,
            },
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml_str(&content).map_err(|e| e.to_string())
        } else {
            Self::from_json_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| ConfigError::Parse { path, reason })
    }

    /// Check credentials, URLs and mappings; trims trailing slashes off URLs.
    ///
    /// A mapping without a ClickUp source is kept; it fails on its own when run.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let required = [
            ("confluence.url", &self.confluence.url),
            ("confluence.user", &self.confluence.user),
            ("confluence.api_token", &self.confluence.api_token),
            ("clickup.api_token", &self.clickup.api_token),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingCredential(field));
            }
        }

        self.confluence.url = normalize_url("confluence.url", &self.confluence.url)?;
        self.clickup.base_url = normalize_url("clickup.base_url", &self.clickup.base_url)?;

        if self.mappings.is_empty() {
            return Err(ConfigError::NoMappings);
        }

        Ok(self)
    }
}

fn normalize_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}
