use crate::clickup::retry::RetryPolicy;
use crate::clickup::types::{
    ClickUpConfig, ClickUpError, FolderResponse, ListSummary, TaskRecord, TaskSource,
    TasksResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read-only client for the ClickUp v2 REST API.
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    retry: RetryPolicy,
}

impl ClickUpClient {
    pub fn new(config: &ClickUpConfig, retry: RetryPolicy) -> Result<Self, ClickUpError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClickUpError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            retry,
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch every task of a list or folder.
    ///
    /// A folder is resolved to its lists first; a list that fails inside a
    /// folder is skipped, but a folder that cannot be resolved fails the
    /// whole fetch. An empty result is reported as [`ClickUpError::NoTasks`].
    pub async fn fetch_tasks(&self, source: &TaskSource) -> Result<Vec<TaskRecord>, ClickUpError> {
        let tasks = match source {
            TaskSource::List(list_id) => {
                info!("Fetching tasks from list {}", list_id);
                let tasks = self.get_list_tasks(list_id).await?;
                info!("Fetched {} tasks", tasks.len());
                tasks
            }
            TaskSource::Folder(folder_id) => {
                info!("Fetching tasks from folder {}", folder_id);
                let lists = self.get_folder_lists(folder_id).await?;

                let mut all_tasks = Vec::new();
                for list in &lists {
                    let list_name = list.name.as_deref().unwrap_or("unnamed");
                    info!("  -> list {} (ID: {})", list_name, list.id);

                    match self.get_list_tasks(&list.id).await {
                        Ok(tasks) => {
                            debug!("     {} tasks", tasks.len());
                            all_tasks.extend(tasks);
                        }
                        Err(e) => warn!("Skipping list {} ({}): {}", list_name, list.id, e),
                    }
                }

                info!("Fetched {} tasks across {} lists", all_tasks.len(), lists.len());
                all_tasks
            }
        };

        if tasks.is_empty() {
            return Err(ClickUpError::NoTasks(source.to_string()));
        }

        debug!("Statuses found: {:?}", status_histogram(&tasks));
        Ok(tasks)
    }

    /// Resolve a folder to the lists it contains.
    pub async fn get_folder_lists(&self, folder_id: &str) -> Result<Vec<ListSummary>, ClickUpError> {
        let url = format!("{}/folder/{}", self.base_url, folder_id);
        let target = format!("folder {}", folder_id);

        let folder: FolderResponse = self.get_json(&url, &[], &target).await?;
        info!("Found {} lists in folder {}", folder.lists.len(), folder_id);
        Ok(folder.lists)
    }

    /// Fetch the tasks of one list, closed tasks included and archived ones excluded.
    pub async fn get_list_tasks(&self, list_id: &str) -> Result<Vec<TaskRecord>, ClickUpError> {
        let url = format!("{}/list/{}/task", self.base_url, list_id);
        let target = format!("list {}", list_id);
        let query = [("archived", "false"), ("include_closed", "true")];

        let response: TasksResponse = self.get_json(&url, &query, &target).await?;
        Ok(response.tasks)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        target: &str,
    ) -> Result<T, ClickUpError> {
        self.retry
            .execute(target, move |timeout| self.get_once::<T>(url, query, target, timeout))
            .await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        target: &str,
        timeout: Duration,
    ) -> Result<T, ClickUpError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.api_token.as_str())
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response.status(), target)?;

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClickUpError::Timeout(e.to_string())
            } else {
                ClickUpError::Decode(e.to_string())
            }
        })
    }
}

fn check_status(status: StatusCode, target: &str) -> Result<(), ClickUpError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(ClickUpError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ClickUpError::Forbidden(target.to_string())),
        StatusCode::NOT_FOUND => Err(ClickUpError::NotFound(target.to_string())),
        s => Err(ClickUpError::Http {
            status: s.as_u16(),
            target: target.to_string(),
        }),
    }
}

fn map_transport_error(err: reqwest::Error) -> ClickUpError {
    if err.is_timeout() {
        ClickUpError::Timeout(err.to_string())
    } else if err.is_connect() {
        ClickUpError::Connection(err.to_string())
    } else {
        ClickUpError::Request(err.to_string())
    }
}

fn status_histogram(tasks: &[TaskRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.status_label()).or_insert(0) += 1;
    }
    counts
}
