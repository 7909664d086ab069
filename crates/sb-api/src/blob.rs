//! Client for the blob store holding flash-card images.

use std::time::Duration;

use serde::Serialize;

use crate::{ApiConfig, error::ApiError};

#[derive(Clone, Debug)]
pub struct BlobClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    urls: &'a [String],
}

impl BlobClient {
    pub fn new(api_url: &str, token: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// `None` unless both the API URL and the token are configured.
    pub fn from_config(config: &ApiConfig) -> Result<Option<Self>, reqwest::Error> {
        match (&config.blob_api_url, &config.blob_read_write_token) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                Self::new(url, token.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn delete_endpoint(&self) -> String {
        format!("{}/delete", self.api_url)
    }

    pub async fn delete_urls(&self, urls: &[String]) -> Result<(), ApiError> {
        if urls.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .post(self.delete_endpoint())
            .bearer_auth(&self.token)
            .json(&DeleteRequest { urls })
            .send()
            .await
            .map_err(|e| ApiError::Blob(format!("delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Blob(format!(
                "blob store answered {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Delete images if a blob store is configured. Failures are logged, never returned.
pub async fn delete_images_best_effort(blob: Option<&BlobClient>, urls: &[String]) {
    let Some(blob) = blob else {
        if !urls.is_empty() {
            tracing::debug!(count = urls.len(), "Skipping image deletion, no blob store");
        }
        return;
    };

    match blob.delete_urls(urls).await {
        Ok(()) => tracing::info!(count = urls.len(), "Deleted card images"),
        Err(e) => tracing::error!(error = %e, "Failed to delete card images"),
    }
}
