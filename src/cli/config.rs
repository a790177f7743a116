//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. `--config <path>` given on the command line
//! 2. Current directory: ./config.json, then ./gantt-sync.toml
//! 3. Environment variables, after loading ./.env if present

use crate::clickup::ClickUpConfig;
use crate::confluence::ConfluenceConfig;
use crate::env::{self, vars};
use crate::sync::{ConfigError, HttpConfig, Mapping, SyncConfig};
use std::env as std_env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover, load and validate configuration using the hierarchy
    pub fn discover_config(config_override: Option<&Path>) -> Result<SyncConfig, ConfigError> {
        let config = if let Some(path) = config_override {
            info!("Loading configuration override from: {:?}", path);
            SyncConfig::from_file(path)?
        } else if let Some(path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", path);
            SyncConfig::from_file(path)?
        } else {
            info!("No configuration file found, reading environment variables");
            Self::load_dotenv();
            Self::from_env()?
        };

        config.validate()
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = Self::get_config_candidates();

        for candidate in candidates {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(env::json_config_file_path(&current_dir));
            candidates.push(env::toml_config_file_path(&current_dir));
        }

        candidates
    }

    /// Load `./.env` into the process environment without overriding existing variables
    pub fn load_dotenv() {
        let Ok(current_dir) = std_env::current_dir() else {
            return;
        };
        let path = env::dotenv_file_path(&current_dir);
        if !path.is_file() {
            return;
        }

        match dotenvy::from_path(&path) {
            Ok(()) => debug!("Loaded environment from {:?}", path),
            Err(e) => warn!("Could not load {:?}: {}", path, e),
        }
    }

    /// Build configuration from the process environment
    pub fn from_env() -> Result<SyncConfig, ConfigError> {
        Self::from_env_with(|name| std_env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_env_with<F>(lookup: F) -> Result<SyncConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingCredential(name));

        let confluence = ConfluenceConfig {
            url: require(vars::CONFLUENCE_URL)?,
            user: require(vars::CONFLUENCE_USER)?,
            api_token: require(vars::CONFLUENCE_API_TOKEN)?,
        };
        let clickup = ClickUpConfig {
            api_token: require(vars::CLICKUP_API_TOKEN)?,
            base_url: get(vars::CLICKUP_BASE_URL)
                .unwrap_or_else(|| env::clickup::DEFAULT_BASE_URL.to_string()),
        };

        let mappings = Self::env_mappings(&get);
        if mappings.is_empty() {
            return Err(ConfigError::NoMappings);
        }

        Ok(SyncConfig {
            confluence,
            clickup,
            mappings,
            http: HttpConfig::default(),
        })
    }

    /// Enumerate `_{index}` mappings, stopping at the first index with no ClickUp id.
    ///
    /// Index 1 also accepts the unsuffixed variable names. A folder id wins
    /// over a list id, and an index without a page id is skipped.
    pub fn env_mappings<F>(get: F) -> Vec<Mapping>
    where
        F: Fn(&str) -> Option<String>,
    {
        let indexed = |base: &str, index: usize| {
            get(&vars::indexed(base, index)).or_else(|| if index == 1 { get(base) } else { None })
        };

        let mut mappings = Vec::new();
        for index in 1..=vars::MAX_INDEXED_MAPPINGS {
            let list_id = indexed(vars::CLICKUP_LIST_ID, index);
            let folder_id = indexed(vars::CLICKUP_FOLDER_ID, index);
            if list_id.is_none() && folder_id.is_none() {
                break;
            }

            let Some(page_id) = indexed(vars::CONFLUENCE_PAGE_ID, index) else {
                warn!(
                    "Mapping {} has a ClickUp id but no {}, skipping",
                    index,
                    vars::indexed(vars::CONFLUENCE_PAGE_ID, index)
                );
                continue;
            };

            let name = indexed(vars::PROJECT_NAME, index)
                .unwrap_or_else(|| format!("Proyecto {}", index));
            let (clickup_list_id, clickup_folder_id) = match folder_id {
                Some(folder) => (None, Some(folder)),
                None => (list_id, None),
            };

            mappings.push(Mapping {
                name,
                confluence_page_id: page_id,
                clickup_list_id,
                clickup_folder_id,
            });
        }

        mappings
    }

    /// Render a loaded configuration with credentials redacted
    pub fn describe(config: &SyncConfig) -> String {
        let mut lines = vec![
            format!("Confluence: {} (user {}, token <redacted>)", config.confluence.url, config.confluence.user),
            format!("ClickUp:    {} (token <redacted>)", config.clickup.base_url),
            format!(
                "HTTP:       fetch {}s +{}s x{}, document {}s, upload {}s",
                config.http.fetch_timeout_secs,
                config.http.fetch_timeout_step_secs,
                config.http.max_attempts,
                config.http.document_timeout_secs,
                config.http.upload_timeout_secs
            ),
            format!("Mappings ({}):", config.mappings.len()),
        ];

        for mapping in &config.mappings {
            let source = mapping
                .source()
                .map(|source| source.to_string())
                .unwrap_or_else(|| "no source".to_string());
            lines.push(format!(
                "  - {}: {} -> page {}",
                mapping.name, source, mapping.confluence_page_id
            ));
        }

        lines.join("\n")
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info(config_override: Option<&Path>) -> Result<(), ConfigError> {
        println!("Configuration Discovery Hierarchy:");
        println!();

        if let Some(path) = config_override {
            println!("  0. {:?} - --config override", path);
        }

        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }
        println!("  {}. Environment variables (.env loaded if present)", candidates.len() + 1);

        println!();
        match (config_override, Self::find_config_file()) {
            (Some(path), _) => println!("Active configuration: {:?}", path),
            (None, Some(found)) => println!("Active configuration: {:?}", found),
            (None, None) => println!("Active configuration: environment variables"),
        }
        println!();

        let config = Self::discover_config(config_override)?;
        println!("{}", Self::describe(&config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const CREDENTIALS: &[(&str, &str)] = &[
        ("CONFLUENCE_URL", "https://acme.atlassian.net"),
        ("CONFLUENCE_USER", "bot@acme.io"),
        ("CONFLUENCE_API_TOKEN", "c-token"),
        ("CLICKUP_API_TOKEN", "pk_1"),
    ];

    fn with_credentials(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        CREDENTIALS.iter().copied().chain(extra.iter().copied()).collect()
    }

    #[test]
    fn test_env_enumeration_stops_at_first_gap() {
        let vars = with_credentials(&[
            ("CLICKUP_LIST_ID_1", "L1"),
            ("CONFLUENCE_PAGE_ID_1", "P1"),
            ("PROJECT_NAME_1", "Web"),
            ("CLICKUP_LIST_ID_2", "L2"),
            ("CONFLUENCE_PAGE_ID_2", "P2"),
            ("CLICKUP_LIST_ID_4", "L4"),
            ("CONFLUENCE_PAGE_ID_4", "P4"),
        ]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();

        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings[0].name, "Web");
        assert_eq!(config.mappings[1].name, "Proyecto 2");
        assert_eq!(config.clickup.base_url, "https://api.clickup.com/api/v2");
    }

    #[test]
    fn test_env_index_without_page_is_skipped() {
        let vars = with_credentials(&[
            ("CLICKUP_LIST_ID_1", "L1"),
            ("CLICKUP_LIST_ID_2", "L2"),
            ("CONFLUENCE_PAGE_ID_2", "P2"),
        ]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();

        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.mappings[0].confluence_page_id, "P2");
    }

    #[test]
    fn test_env_folder_preferred_over_list() {
        let vars = with_credentials(&[
            ("CLICKUP_LIST_ID_1", "L1"),
            ("CLICKUP_FOLDER_ID_1", "F1"),
            ("CONFLUENCE_PAGE_ID_1", "P1"),
        ]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();

        assert_eq!(config.mappings[0].clickup_folder_id.as_deref(), Some("F1"));
        assert_eq!(config.mappings[0].clickup_list_id, None);
    }

    #[test]
    fn test_env_unsuffixed_names_for_first_mapping() {
        let vars = with_credentials(&[
            ("CLICKUP_LIST_ID", "L"),
            ("CONFLUENCE_PAGE_ID", "P"),
            ("PROJECT_NAME", "Solo"),
            ("CLICKUP_LIST_ID_2", "L2"),
            ("CONFLUENCE_PAGE_ID_2", "P2"),
        ]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();

        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings[0].name, "Solo");
        assert_eq!(config.mappings[0].clickup_list_id.as_deref(), Some("L"));
    }

    #[test]
    fn test_env_suffixed_name_beats_unsuffixed() {
        let vars = with_credentials(&[
            ("CLICKUP_LIST_ID", "bare"),
            ("CLICKUP_LIST_ID_1", "numbered"),
            ("CONFLUENCE_PAGE_ID", "P"),
            ("PROJECT_NAME_1", "First"),
            ("PROJECT_NAME", "Ignored"),
        ]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();

        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.mappings[0].name, "First");
        assert_eq!(config.mappings[0].clickup_list_id.as_deref(), Some("numbered"));
        assert_eq!(config.mappings[0].confluence_page_id, "P");
    }

    #[test]
    fn test_env_missing_credentials_and_mappings() {
        let result = ConfigDiscovery::from_env_with(lookup(&[("CLICKUP_API_TOKEN", "pk")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential("CONFLUENCE_URL"))
        ));

        let result = ConfigDiscovery::from_env_with(lookup(CREDENTIALS));
        assert!(matches!(result, Err(ConfigError::NoMappings)));
    }

    #[test]
    fn test_describe_redacts_tokens() {
        let vars = with_credentials(&[("CLICKUP_FOLDER_ID", "F"), ("CONFLUENCE_PAGE_ID", "P")]);
        let config = ConfigDiscovery::from_env_with(lookup(&vars)).unwrap();
        let text = ConfigDiscovery::describe(&config);

        assert!(!text.contains("c-token"));
        assert!(!text.contains("pk_1"));
        assert!(text.contains("Proyecto 1: folder F -> page P"));
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].file_name().unwrap() == "config.json");
        assert!(candidates[1].file_name().unwrap() == "gantt-sync.toml");
    }

    #[test]
    fn test_override_file_is_loaded_and_validated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projects.toml");
        std::fs::write(
            &path,
            r#"
[confluence]
url = "https://acme.atlassian.net/"
user = "bot"
api_token = "t"

[clickup]
api_token = "pk"

[[mappings]]
name = "Web"
confluence_page_id = "1"
clickup_list_id = "2"
"#,
        )
        .unwrap();

        let config = ConfigDiscovery::discover_config(Some(path.as_path())).unwrap();
        assert_eq!(config.confluence.url, "https://acme.atlassian.net");
        assert_eq!(config.mappings[0].name, "Web");
    }

    #[test]
    fn test_missing_override_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::discover_config(Some(temp_dir.path().join("nope.json").as_path()));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    #[serial]
    fn test_dotenv_fills_environment() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(".env"),
            "GANTT_SYNC_TEST_DOTENV_VALUE=from-dotenv\n",
        )
        .unwrap();

        let previous = std_env::current_dir().unwrap();
        std_env::set_current_dir(temp_dir.path()).unwrap();
        ConfigDiscovery::load_dotenv();
        std_env::set_current_dir(previous).unwrap();

        assert_eq!(
            std_env::var("GANTT_SYNC_TEST_DOTENV_VALUE").as_deref(),
            Ok("from-dotenv")
        );
    }
}
