//! Tagged wrappers around the similarity-search collaborator.
//!
//! Every call site distinguishes "found context", "nothing relevant",
//! and "the service failed" explicitly instead of collapsing failures
//! into silent empties. Failures degrade to no-context generation; the
//! distinction still matters for logs and tests.

use sf_context::filter_by_threshold;
use sf_domain::document::ScoredDocument;
use sf_memory::ScriptMemoryProvider;

/// Outcome of a context-retrieval call.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Relevant chunks, highest-relevance first.
    Hits(Vec<ScoredDocument>),
    /// The service answered but nothing survived (or nothing is stored).
    Empty,
    /// The service call failed; treat as "no context".
    Failed(String),
}

impl SearchOutcome {
    /// The hits, if any — `Empty` and `Failed` both yield `&[]`.
    pub fn hits(&self) -> &[ScoredDocument] {
        match self {
            SearchOutcome::Hits(docs) => docs,
            _ => &[],
        }
    }
}

/// Query a collection for chunks relevant to `query`.
///
/// Over-fetches `2k` candidates before thresholding: the threshold can
/// eliminate most of a `k`-sized result set, and under-fetching would
/// silently starve the context.
pub async fn search_scripts(
    memory: &dyn ScriptMemoryProvider,
    collection: &str,
    query: &str,
    k: usize,
    threshold: f64,
) -> SearchOutcome {
    match memory.search(collection, query, k * 2).await {
        Ok(docs) => {
            let kept = filter_by_threshold(docs, k, threshold);
            if kept.is_empty() {
                SearchOutcome::Empty
            } else {
                SearchOutcome::Hits(kept)
            }
        }
        Err(e) => {
            tracing::warn!(collection, error = %e, "script search failed");
            SearchOutcome::Failed(e.to_string())
        }
    }
}

/// Fetch a user's stored scripts without a query (inspiration mode).
///
/// Over-fetches `2 × max_scripts` chunks; the caller groups them back
/// into at most `max_scripts` whole documents.
pub async fn fetch_user_library(
    memory: &dyn ScriptMemoryProvider,
    collection: &str,
    max_scripts: usize,
) -> SearchOutcome {
    match memory.fetch_all(collection, max_scripts * 2).await {
        Ok(docs) if docs.is_empty() => SearchOutcome::Empty,
        Ok(docs) => SearchOutcome::Hits(docs),
        Err(e) => {
            tracing::warn!(collection, error = %e, "fetching user scripts failed");
            SearchOutcome::Failed(e.to_string())
        }
    }
}
