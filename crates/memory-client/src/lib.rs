//! `sf-memory` — client for the external similarity-search service.
//!
//! Provides the [`ScriptMemoryProvider`] trait that abstracts over the
//! vector-store API holding the script collections, a production REST
//! implementation ([`RestScriptMemoryClient`]), and the typed DTOs for
//! its wire format.
//!
//! Collections are opaque string keys on the service side. The gateway
//! uses one shared pool plus one collection per user; the naming
//! helpers below keep that convention in a single place.

pub mod provider;
pub mod rest;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::ScriptMemoryProvider;
pub use rest::{from_reqwest, RestScriptMemoryClient};
pub use types::{ChunkDto, IngestRequest, IngestResponse, SearchHitDto, SearchRequest, SearchResponse};

/// Collection holding documents shared by all users.
pub const SHARED_COLLECTION: &str = "shared_scripts";

/// Collection name for one user's scripts.
///
/// `user_key` must already be sanitized (see `sf_quota::sanitize_user_key`);
/// this function only applies the naming convention.
pub fn user_collection(user_key: &str) -> String {
    format!("user_{user_key}_scripts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_collection_naming() {
        assert_eq!(user_collection("5511999990000"), "user_5511999990000_scripts");
    }
}
