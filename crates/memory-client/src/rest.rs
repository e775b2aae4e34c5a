//! REST implementation of [`ScriptMemoryProvider`].
//!
//! `RestScriptMemoryClient` wraps a `reqwest::Client` and translates
//! every trait method into the corresponding HTTP call against the
//! vector-store service, with automatic retry + exponential back-off on
//! transient (5xx / timeout) failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use sf_domain::config::MemoryConfig;
use sf_domain::document::{Chunk, ScoredDocument};
use sf_domain::error::{Error, Result};

use crate::provider::ScriptMemoryProvider;
use crate::types::{ChunkDto, IngestRequest, IngestResponse, SearchRequest, SearchResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the similarity-search service.
///
/// Created once and reused for the lifetime of the gateway process.
/// The underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestScriptMemoryClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RestScriptMemoryClient {
    /// Build a new client from the shared `MemoryConfig`.
    pub fn new(cfg: &MemoryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let base_url = cfg.base_url.trim_end_matches('/').to_owned();

        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard gateway headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("X-Client-Type", "scriptforge")
            .header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }
        rb
    }

    /// Build the full URL for a path like `/api/collections/x/search`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient
    /// errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let rb = self.decorate(build_request());
            let result = rb.send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    tracing::debug!(endpoint, status, duration_ms, "memory call");

                    if resp.status().is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Memory(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if resp.status().is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let resp_status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        if resp_status == StatusCode::UNAUTHORIZED
                            || resp_status == StatusCode::FORBIDDEN
                        {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Memory(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, duration_ms, error = %e, "memory call failed");
                    last_err = Some(from_reqwest(e));
                    // Timeouts and connection errors are transient — retry
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Memory(format!("{endpoint}: all retries exhausted"))))
    }

    async fn run_search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let path = format!("/api/collections/{collection}/search");
        let url = self.url(&path);
        let req = SearchRequest {
            query: query.to_owned(),
            k,
        };

        let resp = self
            .execute_with_retry(&format!("POST {path}"), || self.http.post(&url).json(&req))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Memory(format!("failed to parse search response: {e}: {body}"))
        })?;

        Ok(parsed.hits.into_iter().map(Into::into).collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl ScriptMemoryProvider for RestScriptMemoryClient {
    async fn search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.run_search(collection, query, k).await
    }

    async fn fetch_all(&self, collection: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        // The service treats an empty query as "return any k chunks".
        self.run_search(collection, "", k).await
    }

    async fn ingest(&self, collection: &str, chunks: &[Chunk]) -> Result<IngestResponse> {
        let path = format!("/api/collections/{collection}/documents");
        let url = self.url(&path);
        let req = IngestRequest {
            chunks: chunks.iter().map(ChunkDto::from).collect(),
        };

        let resp = self
            .execute_with_retry(&format!("POST {path}"), || self.http.post(&url).json(&req))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Memory(format!("failed to parse ingest response: {e}: {body}"))
        })
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let url = self.url("/admin/health");
        let resp = self
            .execute_with_retry("GET /admin/health", || self.http.get(&url))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Memory(format!("failed to parse health response: {e}: {body}"))
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
