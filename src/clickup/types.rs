use crate::env;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Credentials and endpoint for the ClickUp REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickUpConfig {
    pub api_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    env::clickup::DEFAULT_BASE_URL.to_string()
}

/// Where the tasks of one mapping come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    List(String),
    Folder(String),
}

impl TaskSource {
    pub fn id(&self) -> &str {
        match self {
            TaskSource::List(id) | TaskSource::Folder(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TaskSource::List(_) => "list",
            TaskSource::Folder(_) => "folder",
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A task as returned by `GET /list/{id}/task`.
///
/// Timestamps are milliseconds since the Unix epoch. ClickUp sends them as
/// strings, but numbers are accepted too; anything unparseable is treated as
/// absent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TaskRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_epoch_millis")]
    pub start_date: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_epoch_millis")]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: Option<String>,
}

impl TaskRecord {
    pub fn new(
        name: impl Into<String>,
        start_date: Option<i64>,
        due_date: Option<i64>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            start_date,
            due_date,
            status: Some(TaskStatus {
                status: Some(status.into()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(env::clickup::UNNAMED_TASK)
    }

    pub fn status_label(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .unwrap_or(env::clickup::UNKNOWN_STATUS)
    }
}

fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        _ => None,
    })
}

/// A list entry inside `GET /folder/{id}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ListSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderResponse {
    #[serde(default)]
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TasksResponse {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ClickUpError {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("API token rejected or lacking permissions")]
    Unauthorized,
    #[error("Access forbidden to {0}")]
    Forbidden(String),
    #[error("{0} does not exist or is not accessible")]
    NotFound(String),
    #[error("Unexpected HTTP status {status} for {target}")]
    Http { status: u16, target: String },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Could not decode response: {0}")]
    Decode(String),
    #[error("No tasks found in {0}")]
    NoTasks(String),
}

impl ClickUpError {
    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClickUpError::Timeout(_) | ClickUpError::Connection(_))
    }
}
