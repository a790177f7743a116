use serde::{Deserialize, Serialize};

/// Site URL and basic-auth credentials for Confluence Cloud.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfluenceConfig {
    pub url: String,
    pub user: String,
    pub api_token: String,
}

impl std::fmt::Debug for ConfluenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Result of looking for a same-named attachment before an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingAttachment {
    Found(String),
    Absent,
    /// The listing request itself failed; nothing is known about prior uploads.
    Unavailable(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttachmentResults {
    #[serde(default)]
    pub results: Vec<AttachmentSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageVersion {
    pub number: u64,
}

/// The fields of a page needed to replace its body.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub version: PageVersion,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageUpdate<'a> {
    pub version: PageVersionUpdate,
    pub title: &'a str,
    #[serde(rename = "type")]
    pub page_type: &'a str,
    pub body: PageBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageVersionUpdate {
    pub number: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageBody<'a> {
    pub storage: StorageValue<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StorageValue<'a> {
    pub value: &'a str,
    pub representation: &'static str,
}

/// What a successful publish left behind on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub attachment_id: String,
    pub page_version: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("HTTP {status} from {target}: {body}")]
    Http {
        status: u16,
        target: String,
        body: String,
    },
    #[error("Could not decode response: {0}")]
    Decode(String),
    #[error("Upload response did not include an attachment id")]
    MissingAttachmentId,
}
