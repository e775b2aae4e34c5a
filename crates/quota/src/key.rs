//! User identifier sanitization.
//!
//! Raw channel identifiers (phone numbers with `+`, JIDs with `@`, …)
//! are mapped to a safe key alphabet before use as a storage or
//! collection key. Substitution alone can collide (`"a b"` and `"a:b"`
//! both clean to `"a_b"`), so any key that needed cleaning gets a short
//! digest of the raw identifier appended.

use sha2::{Digest, Sha256};

/// Max length of the cleaned portion of a key.
const MAX_KEY_LEN: usize = 64;

/// Sanitize a raw user identifier into a safe storage key.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`. Identifiers that are
/// already clean pass through unchanged and stay human-readable; any
/// identifier that required substitution (or was empty, `"."`, `".."`,
/// or over-long) is suffixed with the first 8 hex digits of its
/// SHA-256, which keeps distinct raw identifiers distinct.
pub fn sanitize_user_key(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let truncated = cleaned.len() > MAX_KEY_LEN;
    if truncated {
        cleaned.truncate(MAX_KEY_LEN);
    }

    let degenerate = cleaned.is_empty() || cleaned == "." || cleaned == "..";
    if cleaned == raw && !degenerate && !truncated {
        return cleaned;
    }

    let digest = Sha256::digest(raw.as_bytes());
    let tag = hex::encode(&digest[..4]);
    if degenerate {
        format!("u-{tag}")
    } else {
        format!("{cleaned}-{tag}")
    }
}
