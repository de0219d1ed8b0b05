//! Image Storage Collaborator
//!
//! Raw image payloads never touch the message store. They are uploaded to an
//! external storage service and only the returned reference URL is kept on
//! the message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::AppConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    /// No storage service is configured
    #[error("image uploads are not enabled")]
    Disabled,
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("upload response carried no URL")]
    MissingUrl,
}

/// Turns an image payload into a stable reference URL
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, payload: &str) -> Result<String, MediaError>;
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_preset: Option<&'a str>,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Uploads over HTTP to a Cloudinary-style endpoint
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    client: Client,
    upload_url: String,
    upload_preset: Option<String>,
}

impl HttpImageStore {
    pub fn new(upload_url: impl Into<String>, upload_preset: Option<String>) -> Self {
        Self {
            client: Client::new(),
            upload_url: upload_url.into(),
            upload_preset,
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, payload: &str) -> Result<String, MediaError> {
        let response = self
            .client
            .post(&self.upload_url)
            .json(&UploadRequest {
                file: payload,
                upload_preset: self.upload_preset.as_deref(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let url = response
            .json::<UploadResponse>()
            .await?
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or(MediaError::MissingUrl)?;
        tracing::debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}

/// Used when no upload URL is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageStore;

#[async_trait]
impl ImageStore for DisabledImageStore {
    async fn upload(&self, _payload: &str) -> Result<String, MediaError> {
        Err(MediaError::Disabled)
    }
}

/// Pick the image store for a configuration
pub fn image_store_from_config(config: &AppConfig) -> std::sync::Arc<dyn ImageStore> {
    match &config.image_upload_url {
        Some(url) => std::sync::Arc::new(HttpImageStore::new(
            url.clone(),
            config.image_upload_preset.clone(),
        )),
        None => {
            tracing::info!("IMAGE_UPLOAD_URL not set. Image messages are disabled.");
            std::sync::Arc::new(DisabledImageStore)
        }
    }
}
