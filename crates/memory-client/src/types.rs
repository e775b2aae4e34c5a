//! Data Transfer Objects for the similarity-search service API.
//!
//! Field names use `camelCase` on the wire and `snake_case` in Rust
//! code via `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

use sf_domain::document::{Chunk, ChunkMeta, ScoredDocument};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/collections/{collection}/search — request body.
///
/// An empty `query` selects the service's "all documents" mode: up to
/// `k` chunks in arbitrary order, no similarity scoring guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub k: usize,
}

/// POST /api/collections/{collection}/search — response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHitDto>,
    #[serde(default)]
    pub count: u32,
}

/// One scored chunk on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitDto {
    pub content: String,
    /// Similarity score; larger = more similar. The "all documents"
    /// mode may omit it.
    #[serde(default)]
    pub score: Option<f64>,
    pub metadata: ChunkMetaDto,
}

/// Chunk metadata on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetaDto {
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub chunk_index: usize,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<SearchHitDto> for ScoredDocument {
    fn from(hit: SearchHitDto) -> Self {
        ScoredDocument {
            content: hit.content,
            score: hit.score.unwrap_or(0.0),
            meta: ChunkMeta {
                doc_id: hit.metadata.doc_id,
                title: hit.metadata.title,
                date: hit.metadata.date,
                chunk_index: hit.metadata.chunk_index,
                user_id: hit.metadata.user_id,
            },
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ingest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/collections/{collection}/documents — request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub chunks: Vec<ChunkDto>,
}

/// One chunk being stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDto {
    pub content: String,
    pub metadata: ChunkMetaDto,
}

impl From<&Chunk> for ChunkDto {
    fn from(chunk: &Chunk) -> Self {
        ChunkDto {
            content: chunk.content.clone(),
            metadata: ChunkMetaDto {
                doc_id: chunk.meta.doc_id.clone(),
                title: chunk.meta.title.clone(),
                date: chunk.meta.date.clone(),
                chunk_index: chunk.meta.chunk_index,
                user_id: chunk.meta.user_id.clone(),
            },
        }
    }
}

/// POST /api/collections/{collection}/documents — response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    #[serde(default)]
    pub stored: u32,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_hit_parses_without_score() {
        let raw = r#"{
            "content": "some chunk",
            "metadata": { "docId": "d1", "title": "T", "chunkIndex": 2 }
        }"#;
        let hit: SearchHitDto = serde_json::from_str(raw).unwrap();
        assert!(hit.score.is_none());
        let doc: ScoredDocument = hit.into();
        assert_eq!(doc.meta.doc_id, "d1");
        assert_eq!(doc.meta.chunk_index, 2);
        assert_eq!(doc.score, 0.0);
    }

    #[test]
    fn search_request_uses_camel_case() {
        let req = SearchRequest {
            query: "q".into(),
            k: 6,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"query\""));
        assert!(json.contains("\"k\":6"));
    }

    #[test]
    fn chunk_dto_round_trips_metadata() {
        let chunk = Chunk {
            content: "body".into(),
            meta: ChunkMeta {
                doc_id: "d2".into(),
                title: "My Script".into(),
                date: "2025-06-10T12:00:00-03:00".into(),
                chunk_index: 0,
                user_id: Some("alice".into()),
            },
        };
        let dto = ChunkDto::from(&chunk);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"docId\":\"d2\""));
        assert!(json.contains("\"userId\":\"alice\""));
        assert!(json.contains("\"chunkIndex\":0"));
    }
}
