//! End-to-end pipeline tests with in-memory collaborator doubles.
//!
//! Covers the webhook document flow: quota rejection, script vs
//! briefing routing, inspiration context, degraded search, the
//! generation-error quirk, and the accounting policy.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use sf_domain::config::Config;
use sf_domain::document::{Chunk, ChunkMeta, ScoredDocument};
use sf_domain::error::{Error, Result};
use sf_gateway::delivery::MessageDelivery;
use sf_gateway::extract::TextExtractor;
use sf_gateway::runtime::pipeline::{self, DocumentOutcome};
use sf_gateway::state::AppState;
use sf_memory::types::IngestResponse;
use sf_memory::ScriptMemoryProvider;
use sf_providers::{ChatRequest, ChatResponse, LlmProvider};
use sf_quota::QuotaTracker;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collaborator doubles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct MockMemory {
    /// Returned by both `search` and `fetch_all`.
    library: Vec<ScoredDocument>,
    fail_search: bool,
    ingested: Mutex<Vec<(String, Vec<Chunk>)>>,
}

#[async_trait]
impl ScriptMemoryProvider for MockMemory {
    async fn search(
        &self,
        _collection: &str,
        _query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        if self.fail_search {
            return Err(Error::Memory("search service down".into()));
        }
        Ok(self.library.iter().take(k).cloned().collect())
    }

    async fn fetch_all(&self, _collection: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if self.fail_search {
            return Err(Error::Memory("search service down".into()));
        }
        Ok(self.library.iter().take(k).cloned().collect())
    }

    async fn ingest(&self, collection: &str, chunks: &[Chunk]) -> Result<IngestResponse> {
        self.ingested
            .lock()
            .push((collection.to_owned(), chunks.to_vec()));
        Ok(IngestResponse {
            stored: chunks.len() as u32,
            message: None,
        })
    }

    async fn health(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "status": "ok" }))
    }
}

#[derive(Default)]
struct MockLlm {
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let prompt = req
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().push(prompt);

        if self.fail {
            return Err(Error::Provider {
                provider: "mock".into(),
                message: "model unavailable".into(),
            });
        }
        Ok(ChatResponse {
            content: "GENERATED SCRIPT".into(),
            usage: None,
            model: "mock".into(),
            finish_reason: Some("stop".into()),
        })
    }

    fn provider_id(&self) -> &str {
        "mock"
    }
}

struct MockExtractor;

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, _bytes: Vec<u8>, _mime_type: &str) -> Result<String> {
        Ok("A campaign briefing about winter boots.".into())
    }
}

#[derive(Default)]
struct MockDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageDelivery for MockDelivery {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.sent.lock().push((to.to_owned(), text.to_owned()));
        Ok(())
    }

    async fn media_url(&self, media_id: &str) -> Result<String> {
        Ok(format!("http://media.local/{media_id}"))
    }

    async fn download_media(&self, _url: &str, _max_bytes: usize) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.4 fake".to_vec())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Harness {
    state: AppState,
    memory: Arc<MockMemory>,
    llm: Arc<MockLlm>,
    delivery: Arc<MockDelivery>,
    _dir: tempfile::TempDir,
}

fn harness(memory: MockMemory, llm: MockLlm) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.quota.state_path = dir.path().to_path_buf();

    let memory = Arc::new(memory);
    let llm = Arc::new(llm);
    let delivery = Arc::new(MockDelivery::default());

    let state = AppState {
        quota: Arc::new(QuotaTracker::new(config.quota.clone())),
        config: Arc::new(config),
        memory: memory.clone(),
        llm: llm.clone(),
        extractor: Arc::new(MockExtractor),
        delivery: delivery.clone(),
        api_token_hash: None,
    };

    Harness {
        state,
        memory,
        llm,
        delivery,
        _dir: dir,
    }
}

fn library_chunk(doc_id: &str, chunk_index: usize, content: &str) -> ScoredDocument {
    ScoredDocument {
        content: content.into(),
        score: 0.9,
        meta: ChunkMeta {
            doc_id: doc_id.into(),
            title: format!("Script {doc_id}"),
            date: "2025-06-01T10:00:00-03:00".into(),
            chunk_index,
            user_id: Some("5511999990000".into()),
        },
    }
}

const USER: &str = "5511999990000";
const PDF: &str = "application/pdf";

async fn run_briefing(h: &Harness) -> DocumentOutcome {
    pipeline::handle_document(&h.state, USER, "media-1", PDF, "campaign-briefing.pdf")
        .await
        .expect("pipeline should not error")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn briefing_generates_delivers_and_spends_one_unit() {
    let h = harness(MockMemory::default(), MockLlm::default());

    let outcome = run_briefing(&h).await;
    assert!(matches!(outcome, DocumentOutcome::Generated { .. }));

    let sent = h.delivery.sent.lock();
    let (to, text) = sent.last().expect("script delivered");
    assert_eq!(to, USER);
    assert!(text.contains("Script generated successfully"));
    assert!(text.contains("GENERATED SCRIPT"));

    let stats = h.state.quota.stats(USER);
    assert_eq!(stats.daily_used, 1);
    assert_eq!(stats.monthly_used, 1);
}

#[tokio::test]
async fn briefing_is_stored_in_the_shared_pool() {
    let h = harness(MockMemory::default(), MockLlm::default());
    run_briefing(&h).await;

    let ingested = h.memory.ingested.lock();
    let (collection, chunks) = ingested.first().expect("briefing ingested");
    assert_eq!(collection, "shared_scripts");
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].meta.chunk_index, 0);
}

#[tokio::test]
async fn quota_rejection_delivers_message_and_skips_all_work() {
    let h = harness(MockMemory::default(), MockLlm::default());
    h.state.quota.set_limits(USER, Some(0), None);

    let outcome = run_briefing(&h).await;
    assert!(matches!(outcome, DocumentOutcome::RateLimited));

    let sent = h.delivery.sent.lock();
    let (_, text) = sent.last().expect("rejection delivered");
    assert!(text.contains("Daily limit of 0"));

    assert!(h.llm.prompts.lock().is_empty(), "no generation on reject");
    assert!(h.memory.ingested.lock().is_empty(), "no ingest on reject");
}

#[tokio::test]
async fn user_scripts_become_inspiration_context() {
    let memory = MockMemory {
        library: vec![
            library_chunk("docA", 1, "A later part"),
            library_chunk("docB", 0, "B opens like this"),
            library_chunk("docA", 0, "A opens like this"),
        ],
        ..MockMemory::default()
    };
    let h = harness(memory, MockLlm::default());

    run_briefing(&h).await;

    let prompts = h.llm.prompts.lock();
    let prompt = prompts.last().expect("llm called");
    assert!(prompt.contains("Inspiration from the user's previous scripts"));
    // Representative chunk is each document's opening chunk.
    assert!(prompt.contains("A opens like this"));
    assert!(prompt.contains("B opens like this"));
    assert!(!prompt.contains("A later part"));
}

#[tokio::test]
async fn search_failure_degrades_to_uninspired_generation() {
    let memory = MockMemory {
        fail_search: true,
        ..MockMemory::default()
    };
    let h = harness(memory, MockLlm::default());

    let outcome = run_briefing(&h).await;
    assert!(matches!(outcome, DocumentOutcome::Generated { .. }));

    let prompts = h.llm.prompts.lock();
    let prompt = prompts.last().expect("llm still called");
    assert!(!prompt.contains("Inspiration from"));

    // The unit is still spent: output was produced and delivered.
    assert_eq!(h.state.quota.stats(USER).daily_used, 1);
}

#[tokio::test]
async fn generation_failure_surfaces_error_text_as_script() {
    let llm = MockLlm {
        fail: true,
        ..MockLlm::default()
    };
    let h = harness(MockMemory::default(), llm);

    let outcome = run_briefing(&h).await;
    let DocumentOutcome::Generated { script } = outcome else {
        panic!("expected Generated outcome");
    };
    assert!(script.contains("model unavailable"));

    let sent = h.delivery.sent.lock();
    let (_, text) = sent.last().unwrap();
    assert!(text.contains("model unavailable"));
}

#[tokio::test]
async fn script_upload_is_stored_for_the_user_without_spending_quota() {
    let h = harness(MockMemory::default(), MockLlm::default());

    let outcome =
        pipeline::handle_document(&h.state, USER, "media-9", PDF, "my_script_v1.pdf")
            .await
            .unwrap();
    assert!(matches!(outcome, DocumentOutcome::ScriptStored));

    let ingested = h.memory.ingested.lock();
    let (collection, chunks) = ingested.first().expect("script ingested");
    assert_eq!(collection, "user_5511999990000_scripts");
    assert_eq!(chunks[0].meta.user_id.as_deref(), Some(USER));

    assert!(h.llm.prompts.lock().is_empty(), "no generation for scripts");
    assert_eq!(h.state.quota.stats(USER).daily_used, 0);

    let sent = h.delivery.sent.lock();
    let (_, text) = sent.last().unwrap();
    assert!(text.contains("Context received and stored"));
}

#[tokio::test]
async fn unsupported_mime_type_is_ignored() {
    let h = harness(MockMemory::default(), MockLlm::default());

    let outcome = pipeline::handle_document(&h.state, USER, "media-2", "image/png", "photo.png")
        .await
        .unwrap();
    assert!(matches!(outcome, DocumentOutcome::Unsupported));
    assert!(h.delivery.sent.lock().is_empty());
    assert_eq!(h.state.quota.stats(USER).daily_used, 0);
}

#[tokio::test]
async fn stats_command_replies_without_spending_quota() {
    let h = harness(MockMemory::default(), MockLlm::default());

    pipeline::handle_text(&h.state, USER, "/stats").await;

    let sent = h.delivery.sent.lock();
    let (_, text) = sent.last().expect("stats reply delivered");
    assert!(text.contains("Your usage"));
    assert!(text.contains("0/5"));
    assert_eq!(h.state.quota.stats(USER).daily_used, 0);
}

#[tokio::test]
async fn help_command_lists_remaining_limits() {
    let h = harness(MockMemory::default(), MockLlm::default());
    h.state.quota.increment(USER);

    pipeline::handle_text(&h.state, USER, "/help").await;

    let sent = h.delivery.sent.lock();
    let (_, text) = sent.last().unwrap();
    assert!(text.contains("/stats"));
    assert!(text.contains("4 generations remaining today"));
}
