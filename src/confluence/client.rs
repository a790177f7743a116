use crate::confluence::content;
use crate::confluence::types::{
    AttachmentResults, ConfluenceConfig, ConfluenceError, ExistingAttachment, PageBody, PageInfo,
    PageUpdate, PageVersionUpdate, StorageValue,
};
use crate::env;
use chrono::Local;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Confluence content API client: page attachments and body updates.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    http: reqwest::Client,
    config: ConfluenceConfig,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl ConfluenceClient {
    pub fn new(
        config: ConfluenceConfig,
        request_timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, ConfluenceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfluenceError::Request(e.to_string()))?;

        Ok(Self {
            http,
            config: ConfluenceConfig {
                url: config.url.trim_end_matches('/').to_string(),
                ..config
            },
            request_timeout,
            upload_timeout,
        })
    }

    /// Human-facing URL of a page.
    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}{}/{}", self.config.url, env::confluence::PAGES_PATH, page_id)
    }

    fn content_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.config.url, env::confluence::CONTENT_API_PATH, id)
    }

    fn attachments_url(&self, page_id: &str) -> String {
        format!("{}/child/attachment", self.content_url(page_id))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.config.user, Some(&self.config.api_token))
    }

    /// Look for an attachment on the page whose title equals `filename`.
    pub async fn find_attachment(&self, page_id: &str, filename: &str) -> ExistingAttachment {
        let request = self
            .authed(self.http.get(self.attachments_url(page_id)))
            .query(&[("filename", filename)])
            .timeout(self.request_timeout);

        let listing: Result<AttachmentResults, _> =
            read_json(request, "attachment listing").await;

        match listing {
            Ok(listing) => listing
                .results
                .into_iter()
                .find(|att| att.title == filename)
                .map(|att| ExistingAttachment::Found(att.id))
                .unwrap_or(ExistingAttachment::Absent),
            Err(e) => ExistingAttachment::Unavailable(e.to_string()),
        }
    }

    pub async fn delete_attachment(&self, attachment_id: &str) -> Result<(), ConfluenceError> {
        let request = self
            .authed(self.http.delete(self.content_url(attachment_id)))
            .timeout(self.request_timeout);

        send_checked(request, "attachment deletion").await?;
        Ok(())
    }

    /// Replace any same-named attachment with `bytes` and return the new id.
    ///
    /// Removing the previous copy is best-effort: listing or deletion failures
    /// are logged and the upload still proceeds.
    pub async fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ConfluenceError> {
        info!("Uploading {} to page {}", filename, page_id);

        match self.find_attachment(page_id, filename).await {
            ExistingAttachment::Found(id) => match self.delete_attachment(&id).await {
                Ok(()) => info!("Removed previous attachment {}", id),
                Err(e) => warn!("Could not remove previous attachment {}: {}", id, e),
            },
            ExistingAttachment::Absent => debug!("No previous attachment named {}", filename),
            ExistingAttachment::Unavailable(reason) => {
                warn!("Could not list attachments of page {}: {}", page_id, reason)
            }
        }

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/png")
            .map_err(|e| ConfluenceError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let (header, value) = env::confluence::NO_CHECK_HEADER;
        let request = self
            .authed(self.http.post(self.attachments_url(page_id)))
            .header(header, value)
            .multipart(form)
            .timeout(self.upload_timeout);

        let uploaded: AttachmentResults = read_json(request, "attachment upload").await?;
        let attachment_id = uploaded
            .results
            .into_iter()
            .next()
            .map(|att| att.id)
            .ok_or(ConfluenceError::MissingAttachmentId)?;

        info!("Image uploaded (attachment {})", attachment_id);
        Ok(attachment_id)
    }

    pub async fn get_page(&self, page_id: &str) -> Result<PageInfo, ConfluenceError> {
        let request = self
            .authed(self.http.get(self.content_url(page_id)))
            .query(&[("expand", "body.storage,version")])
            .timeout(self.request_timeout);

        read_json(request, "page fetch").await
    }

    /// Rewrite the page body to embed `filename`, bumping the version by one.
    ///
    /// A concurrent edit surfaces as a version conflict from the server and is
    /// returned as an error; it is not retried.
    pub async fn update_page(
        &self,
        page_id: &str,
        filename: &str,
        project_name: &str,
    ) -> Result<u64, ConfluenceError> {
        let page = self.get_page(page_id).await?;
        let next_version = page.version.number + 1;
        let updated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let body = content::page_body(project_name, filename, &updated_at);

        let update = PageUpdate {
            version: PageVersionUpdate {
                number: next_version,
            },
            title: &page.title,
            page_type: &page.page_type,
            body: PageBody {
                storage: StorageValue {
                    value: &body,
                    representation: "storage",
                },
            },
        };

        let request = self
            .authed(self.http.put(self.content_url(page_id)))
            .json(&update)
            .timeout(self.request_timeout);

        send_checked(request, "page update").await?;
        info!("Page {} updated to version {}", page_id, next_version);
        Ok(next_version)
    }
}

async fn send_checked(request: RequestBuilder, target: &str) -> Result<Response, ConfluenceError> {
    let response = request
        .send()
        .await
        .map_err(|e| ConfluenceError::Request(format!("{}: {}", target, e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ConfluenceError::Http {
        status: status.as_u16(),
        target: target.to_string(),
        body: body.chars().take(300).collect(),
    })
}

async fn read_json<T: DeserializeOwned>(
    request: RequestBuilder,
    target: &str,
) -> Result<T, ConfluenceError> {
    send_checked(request, target)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ConfluenceError::Decode(format!("{}: {}", target, e)))
}
