//! Text extraction collaborator.
//!
//! PDF/DOCX parsing is delegated to an external extraction service
//! (Tika-style): the gateway posts the raw document bytes and receives
//! plain text back. The pipeline only depends on the [`TextExtractor`]
//! trait, so tests substitute a double.

use async_trait::async_trait;
use reqwest::Client;

use sf_domain::config::ExtractorConfig;
use sf_domain::error::{Error, Result};

/// Abstraction over the text-extraction service.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from raw document bytes.
    async fn extract(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String>;
}

/// REST client for the extraction service.
pub struct RestTextExtractor {
    http: Client,
    base_url: String,
}

impl RestTextExtractor {
    pub fn new(cfg: &ExtractorConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl TextExtractor for RestTextExtractor {
    async fn extract(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String> {
        let url = format!("{}/extract", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", mime_type)
            .header("Accept", "text/plain")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Extract(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Extract(format!(
                "extraction failed ({status}): {body}"
            )));
        }

        resp.text().await.map_err(|e| Error::Extract(e.to_string()))
    }
}
