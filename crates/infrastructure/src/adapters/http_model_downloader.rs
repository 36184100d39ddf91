//! HTTP model downloader - Implements ModelDownloaderPort with reqwest

use std::time::Duration;

use application::error::ApplicationError;
use application::ports::ModelDownloaderPort;
use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::AssetsConfig;

/// Downloads model files over HTTP(S)
///
/// Bodies are buffered in memory and capped at `max_bytes`.
#[derive(Debug, Clone)]
pub struct HttpModelDownloader {
    client: Client,
    max_bytes: u64,
}

impl HttpModelDownloader {
    /// Create a downloader with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("speechbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApplicationError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, max_bytes })
    }

    /// Create a downloader from the asset settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &AssetsConfig) -> Result<Self, ApplicationError> {
        Self::new(config.download_timeout(), config.max_model_bytes)
    }

    fn too_large(&self, url: &str) -> ApplicationError {
        ApplicationError::AssetFetch {
            name: url.to_string(),
            reason: format!("response exceeds {} bytes", self.max_bytes),
        }
    }
}

fn fetch_error(url: &str, err: &reqwest::Error) -> ApplicationError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    ApplicationError::AssetFetch {
        name: url.to_string(),
        reason,
    }
}

#[async_trait]
impl ModelDownloaderPort for HttpModelDownloader {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ApplicationError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Model download rejected");
            return Err(ApplicationError::AssetFetch {
                name: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large(url));
            }
        }

        let capacity = response
            .content_length()
            .and_then(|length| usize::try_from(length).ok())
            .unwrap_or_default();
        let mut body = BytesMut::with_capacity(capacity);

        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_error(url, &e))? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_bytes {
                return Err(self.too_large(url));
            }
        }

        debug!(bytes = body.len(), "Model downloaded");
        Ok(body.to_vec())
    }
}
