//! The `ScriptMemoryProvider` trait defines the interface for all
//! similarity-search backends (REST, mock/test).

use async_trait::async_trait;

use sf_domain::document::{Chunk, ScoredDocument};
use sf_domain::error::Result;

use crate::types::IngestResponse;

/// Abstraction over the similarity-search service.
///
/// Implementations may talk to the real REST API or a test double. All
/// methods return `sf_domain::error::Result`; callers in the gateway
/// convert failures into tagged fallbacks rather than propagating them.
#[async_trait]
pub trait ScriptMemoryProvider: Send + Sync {
    /// Scored nearest-neighbor search within one collection, highest
    /// relevance first.
    async fn search(&self, collection: &str, query: &str, k: usize)
        -> Result<Vec<ScoredDocument>>;

    /// "All documents" mode: up to `k` chunks in arbitrary order,
    /// without a query. Used for context-without-query.
    async fn fetch_all(&self, collection: &str, k: usize) -> Result<Vec<ScoredDocument>>;

    /// Store pre-split chunks into a collection.
    async fn ingest(&self, collection: &str, chunks: &[Chunk]) -> Result<IngestResponse>;

    /// Health check (GET /admin/health).
    async fn health(&self) -> Result<serde_json::Value>;
}
