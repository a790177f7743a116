//! Environment constants and path utilities for gantt-sync.
//!
//! This module centralizes configuration file names, environment variable
//! names and remote API defaults used throughout the application.

use std::path::{Path, PathBuf};

/// JSON configuration file name, checked first in the working directory
pub const JSON_CONFIG_FILE_NAME: &str = "config.json";

/// TOML configuration file name, checked after the JSON one
pub const TOML_CONFIG_FILE_NAME: &str = "gantt-sync.toml";

/// Dotenv file loaded before falling back to environment variables
pub const DOTENV_FILE_NAME: &str = ".env";

/// Environment variable names for the fallback configuration source
pub mod vars {
    pub const CONFLUENCE_URL: &str = "CONFLUENCE_URL";
    pub const CONFLUENCE_USER: &str = "CONFLUENCE_USER";
    pub const CONFLUENCE_API_TOKEN: &str = "CONFLUENCE_API_TOKEN";
    pub const CLICKUP_API_TOKEN: &str = "CLICKUP_API_TOKEN";
    pub const CLICKUP_BASE_URL: &str = "CLICKUP_BASE_URL";

    /// Per-mapping variables, enumerated with a `_{index}` suffix
    pub const CLICKUP_LIST_ID: &str = "CLICKUP_LIST_ID";
    pub const CLICKUP_FOLDER_ID: &str = "CLICKUP_FOLDER_ID";
    pub const CONFLUENCE_PAGE_ID: &str = "CONFLUENCE_PAGE_ID";
    pub const PROJECT_NAME: &str = "PROJECT_NAME";

    /// Upper bound on the `_{index}` suffixes scanned
    pub const MAX_INDEXED_MAPPINGS: usize = 100;

    /// Build the suffixed variable name for a mapping index (`CLICKUP_LIST_ID_2`)
    pub fn indexed(base: &str, index: usize) -> String {
        format!("{}_{}", base, index)
    }
}

/// ClickUp API defaults
pub mod clickup {
    pub const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";

    /// Fallback name for tasks the API returns without one
    pub const UNNAMED_TASK: &str = "Sin nombre";

    /// Fallback label for tasks without a status
    pub const UNKNOWN_STATUS: &str = "Sin Status";
}

/// Confluence API paths
pub mod confluence {
    /// REST content API, relative to the site URL
    pub const CONTENT_API_PATH: &str = "/wiki/rest/api/content";

    /// Human-facing page path, relative to the site URL
    pub const PAGES_PATH: &str = "/wiki/pages";

    /// Header that disables XSRF checks on attachment uploads
    pub const NO_CHECK_HEADER: (&str, &str) = ("X-Atlassian-Token", "no-check");
}

/// Default timeouts and attempt budget for remote calls
pub mod http {
    pub const FETCH_TIMEOUT_SECS: u64 = 15;
    pub const FETCH_TIMEOUT_STEP_SECS: u64 = 5;
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const DOCUMENT_TIMEOUT_SECS: u64 = 10;
    pub const UPLOAD_TIMEOUT_SECS: u64 = 30;
}

/// Build the JSON config path in a directory
pub fn json_config_file_path(dir: &Path) -> PathBuf {
    dir.join(JSON_CONFIG_FILE_NAME)
}

/// Build the TOML config path in a directory
pub fn toml_config_file_path(dir: &Path) -> PathBuf {
    dir.join(TOML_CONFIG_FILE_NAME)
}

/// Build the dotenv path in a directory
pub fn dotenv_file_path(dir: &Path) -> PathBuf {
    dir.join(DOTENV_FILE_NAME)
}
