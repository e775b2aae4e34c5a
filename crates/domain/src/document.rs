//! Document, chunk, and search-result types shared across the workspace.
//!
//! A *chunk* is a bounded slice of a larger document produced at ingest
//! time; a *scored document* is a chunk as returned by the similarity
//! search service, decorated with its similarity score.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chunk metadata
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Metadata carried by every stored chunk.
///
/// `doc_id` ties the chunks of one source document back together;
/// `chunk_index` is the chunk's position within that document (0 = the
/// document's opening chunk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub doc_id: String,
    pub title: String,
    /// RFC 3339 timestamp of when the document was stored.
    pub date: String,
    pub chunk_index: usize,
    /// Owning user for per-user collections; `None` in the shared pool.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A single stored chunk: content plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub meta: ChunkMeta,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chunk returned by the similarity search service.
///
/// Larger `score` means more similar, matching the search service's
/// convention. The gateway never re-sorts these; the service returns
/// highest-relevance first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub content: String,
    pub score: f64,
    pub meta: ChunkMeta,
}

impl ScoredDocument {
    /// A short preview of the chunk content for listings.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.content.len() <= max_chars {
            return self.content.clone();
        }
        let mut end = max_chars;
        while !self.content.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &self.content[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> ScoredDocument {
        ScoredDocument {
            content: content.into(),
            score: 0.9,
            meta: ChunkMeta {
                doc_id: "d1".into(),
                title: "t".into(),
                date: String::new(),
                chunk_index: 0,
                user_id: None,
            },
        }
    }

    #[test]
    fn preview_short_content_unchanged() {
        assert_eq!(doc("hello").preview(100), "hello");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let p = doc("abcdefghij").preview(4);
        assert_eq!(p, "abcd...");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let p = doc("héllo wörld").preview(2);
        assert!(p.ends_with("..."));
    }
}
