//! Context assembly — scored chunk hits in, generation-ready text out.
//!
//! The search service returns *chunks*, several of which may belong to
//! the same source document. The assembler deduplicates them back into
//! whole documents (first-seen order, opening chunk as representative),
//! bounds the result, and serializes it for the generation prompt.

use std::collections::HashMap;

use sf_domain::document::ScoredDocument;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Bundle types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One representative chunk chosen for the generation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub title: String,
    pub content: String,
}

/// Bounded, ordered set of representative chunks, one per distinct
/// source document.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    pub entries: Vec<ContextEntry>,
}

impl ContextBundle {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assembly policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Keep hits scoring at least `threshold`, capped at the first `k`
/// survivors in arrival order.
///
/// The search service returns highest-relevance first and this function
/// never re-sorts. Callers over-fetch `2k` candidates before filtering:
/// thresholding can eliminate most of a `k`-sized result set, and
/// under-fetching would silently starve the context.
pub fn filter_by_threshold(
    docs: Vec<ScoredDocument>,
    k: usize,
    threshold: f64,
) -> Vec<ScoredDocument> {
    docs.into_iter()
        .filter(|d| d.score >= threshold)
        .take(k)
        .collect()
}

/// Group chunks by `doc_id` (first-seen order of distinct ids), keep at
/// most `max_documents` groups, and pick each group's lowest
/// `chunk_index` member — the document's opening chunk — as its
/// representative.
pub fn group_into_context(chunks: &[ScoredDocument], max_documents: usize) -> ContextBundle {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ScoredDocument>> = HashMap::new();

    for doc in chunks {
        let id = doc.meta.doc_id.as_str();
        if !groups.contains_key(id) {
            order.push(id);
        }
        groups.entry(id).or_default().push(doc);
    }

    let mut entries = Vec::new();
    for id in order.into_iter().take(max_documents) {
        let Some(group) = groups.get(id) else { continue };
        let Some(rep) = group.iter().min_by_key(|d| d.meta.chunk_index) else {
            continue;
        };
        let title = if rep.meta.title.is_empty() {
            format!("Script {}", entries.len() + 1)
        } else {
            rep.meta.title.clone()
        };
        entries.push(ContextEntry {
            title,
            content: rep.content.clone(),
        });
    }

    ContextBundle { entries }
}

/// Render a bundle as prompt text.
///
/// An empty bundle serializes to the empty string — callers treat that
/// as "no context available" and fall back to uninspired generation.
pub fn serialize_context(bundle: &ContextBundle) -> String {
    if bundle.entries.is_empty() {
        return String::new();
    }

    let mut out = String::from("Inspiration from the user's previous scripts:\n\n");
    for entry in &bundle.entries {
        out.push_str("--- ");
        out.push_str(&entry.title);
        out.push_str(" ---\n");
        out.push_str(&entry.content);
        out.push_str("\n\n");
    }
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
