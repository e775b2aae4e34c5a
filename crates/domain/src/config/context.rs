use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tuning knobs for document splitting and context retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Target chunk size in characters for the ingest splitter.
    #[serde(default = "d_1000")]
    pub chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    #[serde(default = "d_200")]
    pub chunk_overlap: usize,
    /// Minimum similarity score a search hit must reach to be used
    /// as generation context.
    #[serde(default = "d_threshold")]
    pub similarity_threshold: f64,
    /// Maximum number of sources included when generating from a
    /// briefing query.
    #[serde(default = "d_3")]
    pub max_sources: usize,
    /// Maximum number of prior scripts used as inspiration in the
    /// no-query webhook flow.
    #[serde(default = "d_4")]
    pub max_inspiration_scripts: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            similarity_threshold: 0.7,
            max_sources: 3,
            max_inspiration_scripts: 4,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_1000() -> usize {
    1000
}
fn d_200() -> usize {
    200
}
fn d_threshold() -> f64 {
    0.7
}
fn d_3() -> usize {
    3
}
fn d_4() -> usize {
    4
}
