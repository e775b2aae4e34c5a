use std::sync::Arc;

use sf_domain::config::Config;
use sf_memory::ScriptMemoryProvider;
use sf_providers::LlmProvider;
use sf_quota::QuotaTracker;

use crate::delivery::MessageDelivery;
use crate::extract::TextExtractor;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core** — config, quota tracker
/// - **Collaborators** — similarity search, generation, extraction, delivery
/// - **Security (startup-computed)** — hashed API token
#[derive(Clone)]
pub struct AppState {
    // ── Core ──────────────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub quota: Arc<QuotaTracker>,

    // ── Collaborators ─────────────────────────────────────────────────
    pub memory: Arc<dyn ScriptMemoryProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub extractor: Arc<dyn TextExtractor>,
    pub delivery: Arc<dyn MessageDelivery>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
}
