//! Outbound message delivery and media retrieval.
//!
//! Speaks the Graph-style messaging API: text messages are posted to
//! `{graph_url}/{phone_number_id}/messages`, inbound media is resolved
//! in two steps (media ID → download URL → bytes). Delivery is
//! fire-and-forget from the pipeline's perspective — failures are
//! logged at the call site and never abort a request.

use async_trait::async_trait;
use reqwest::Client;

use sf_domain::config::ChannelConfig;
use sf_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Abstraction over the messaging channel (REST or test double).
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Send a text message to a user.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Resolve a media ID to its download URL.
    async fn media_url(&self, media_id: &str) -> Result<String>;

    /// Download media bytes, refusing payloads larger than `max_bytes`.
    async fn download_media(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Graph API client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// REST client for the Graph-style messaging API.
pub struct ChannelClient {
    http: Client,
    graph_url: String,
    phone_number_id: String,
    token: Option<String>,
}

impl ChannelClient {
    /// Build a client from the channel config. The access token is read
    /// once from the env var named in `cfg.token_env`.
    pub fn new(cfg: &ChannelConfig) -> Result<Self> {
        let token = std::env::var(&cfg.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                env = %cfg.token_env,
                "no channel access token configured — outbound delivery will fail"
            );
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            graph_url: cfg.graph_url.trim_end_matches('/').to_owned(),
            phone_number_id: cfg.phone_number_id.clone(),
            token,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl MessageDelivery for ChannelClient {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.graph_url, self.phone_number_id);
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": text },
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!("send failed ({status}): {body}")));
        }
        Ok(())
    }

    async fn media_url(&self, media_id: &str) -> Result<String> {
        let url = format!("{}/{}", self.graph_url, media_id);
        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        body.get("url")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| Error::Delivery(format!("no url in media lookup for {media_id}")))
    }

    async fn download_media(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Delivery(format!(
                "media download failed: {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        if bytes.len() > max_bytes {
            return Err(Error::Delivery(format!(
                "media exceeds size limit ({} > {max_bytes} bytes)",
                bytes.len()
            )));
        }

        Ok(bytes.to_vec())
    }
}
