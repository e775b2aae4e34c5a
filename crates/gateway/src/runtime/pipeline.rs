//! The webhook processing pipeline.
//!
//! Sequences extraction → quota check → search → context assembly →
//! generation → accounting → delivery. The quota lock is only ever held
//! inside the tracker calls; every slow external call happens outside
//! it.
//!
//! Accounting policy: `can_send` runs before any work, `increment` runs
//! only after generation produced output and before delivery. A crash
//! in between under-counts by at most one unit; a user is never charged
//! for a generation they did not receive.

use chrono::Local;
use uuid::Uuid;

use sf_context::{group_into_context, serialize_context, split_text};
use sf_domain::document::{Chunk, ChunkMeta};
use sf_domain::error::Result;
use sf_memory::{user_collection, SHARED_COLLECTION};
use sf_providers::{ChatRequest, Message};
use sf_quota::{sanitize_user_key, UsageStats};

use crate::prompts;
use crate::runtime::search::{fetch_user_library, SearchOutcome};
use crate::state::AppState;

/// Filename keywords that mark an upload as a prior script rather than
/// a briefing.
const SCRIPT_KEYWORDS: &[&str] = &["script", "roteiro", "screenplay"];

/// What the webhook document path did, for the HTTP status payload.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// MIME type not accepted; nothing happened.
    Unsupported,
    /// Quota exhausted; the limit message was delivered.
    RateLimited,
    /// The upload was a script and is now stored as inspiration.
    ScriptStored,
    /// The upload was a briefing; a script was generated and delivered.
    Generated { script: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document flow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process one inbound document message.
///
/// Returns `Err` only for internal failures (media retrieval,
/// extraction, script-store failures); the caller notifies the user and
/// answers the webhook with an error status.
pub async fn handle_document(
    state: &AppState,
    from: &str,
    media_id: &str,
    mime_type: &str,
    filename: &str,
) -> Result<DocumentOutcome> {
    if !state
        .config
        .channel
        .accepted_mime_types
        .iter()
        .any(|m| m == mime_type)
    {
        tracing::debug!(mime_type, "ignoring unsupported document type");
        return Ok(DocumentOutcome::Unsupported);
    }

    // ── 1. Quota admission ────────────────────────────────────────
    let (allowed, reason) = state.quota.can_send(from);
    if !allowed {
        tracing::info!(user = %from, %reason, "quota rejected");
        deliver_best_effort(state, from, &reason).await;
        return Ok(DocumentOutcome::RateLimited);
    }

    // ── 2. Fetch and extract ──────────────────────────────────────
    let url = state.delivery.media_url(media_id).await?;
    let bytes = state
        .delivery
        .download_media(&url, state.config.channel.max_file_size)
        .await?;
    let text = state.extractor.extract(bytes, mime_type).await?;

    let title = if filename.is_empty() {
        format!("Document_{}", Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        filename.to_owned()
    };

    // ── 3. Script upload: store as inspiration and stop ───────────
    if is_script_filename(filename) {
        let key = sanitize_user_key(from);
        let doc_id = store_chunks(state, &user_collection(&key), Some(from), &text, &title).await?;
        tracing::info!(user = %from, doc_id = %doc_id, title = %title, "user script stored");
        deliver_best_effort(
            state,
            from,
            "Context received and stored! It will be used in the next scripts I generate for you.",
        )
        .await;
        return Ok(DocumentOutcome::ScriptStored);
    }

    // ── 4. Briefing upload: store, assemble context, generate ─────
    if let Err(e) = store_chunks(state, SHARED_COLLECTION, None, &text, &title).await {
        tracing::warn!(error = %e, "storing briefing failed; continuing with generation");
    }

    let key = sanitize_user_key(from);
    let max_scripts = state.config.context.max_inspiration_scripts;
    let outcome = fetch_user_library(
        state.memory.as_ref(),
        &user_collection(&key),
        max_scripts,
    )
    .await;

    let bundle = group_into_context(outcome.hits(), max_scripts);
    let context_text = serialize_context(&bundle);
    if let SearchOutcome::Failed(_) = outcome {
        tracing::warn!(user = %from, "context retrieval failed — generating without inspiration");
    }

    let script = generate_script(state, &text, &context_text).await;

    // ── 5. Spend the unit, then deliver ───────────────────────────
    state.quota.increment(from);
    deliver_best_effort(
        state,
        from,
        &format!("Script generated successfully!\n\n{script}"),
    )
    .await;

    Ok(DocumentOutcome::Generated { script })
}

/// Split `text` and ingest the chunks into `collection` under a fresh
/// document ID. Returns the ID.
pub async fn store_chunks(
    state: &AppState,
    collection: &str,
    owner: Option<&str>,
    text: &str,
    title: &str,
) -> Result<String> {
    let doc_id = Uuid::new_v4().to_string();
    let date = Local::now().to_rfc3339();
    let cfg = &state.config.context;

    let chunks: Vec<Chunk> = split_text(text, cfg.chunk_size, cfg.chunk_overlap)
        .into_iter()
        .enumerate()
        .map(|(i, content)| Chunk {
            content,
            meta: ChunkMeta {
                doc_id: doc_id.clone(),
                title: title.to_owned(),
                date: date.clone(),
                chunk_index: i,
                user_id: owner.map(String::from),
            },
        })
        .collect();

    state.memory.ingest(collection, &chunks).await?;
    Ok(doc_id)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the generation call, choosing the prompt by whether context is
/// available.
///
/// A provider failure surfaces the error text *as* the generated
/// output. Callers (webhook delivery, the `/v1/scripts` endpoints) pass
/// it through rather than failing the request.
pub async fn generate_script(state: &AppState, briefing: &str, context_text: &str) -> String {
    let (system, prompt) = if context_text.is_empty() {
        (prompts::SYSTEM_PROMPT, prompts::base_prompt(briefing))
    } else {
        (
            prompts::SYSTEM_PROMPT_INSPIRED,
            prompts::inspired_prompt(briefing, context_text),
        )
    };

    let req = ChatRequest {
        messages: vec![Message::system(system), Message::user(prompt)],
        temperature: None,
        max_tokens: None,
        model: None,
    };

    match state.llm.chat(req).await {
        Ok(resp) => resp.content,
        Err(e) => {
            tracing::warn!(error = %e, "generation failed — returning error text as output");
            e.to_string()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Text / command flow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reply to a plain text message. Commands never consume quota.
pub async fn handle_text(state: &AppState, from: &str, text: &str) {
    let stats = state.quota.stats(from);

    let reply = match text.trim() {
        "/stats" => stats_reply(&stats),
        "/help" => help_reply(&stats),
        _ => usage_hint(&stats),
    };

    deliver_best_effort(state, from, &reply).await;
}

fn stats_reply(stats: &UsageStats) -> String {
    let member_since: String = stats.created_at.chars().take(10).collect();
    format!(
        "Your usage:\n\
         Daily: {}/{} ({} remaining)\n\
         Monthly: {}/{} ({} remaining)\n\
         Premium: {}\n\
         Member since: {}",
        stats.daily_used,
        stats.daily_limit,
        stats.daily_remaining(),
        stats.monthly_used,
        stats.monthly_limit,
        stats.monthly_remaining(),
        if stats.is_premium { "yes" } else { "no" },
        member_since,
    )
}

fn help_reply(stats: &UsageStats) -> String {
    format!(
        "Available commands:\n\
         /stats - show your usage statistics\n\
         /help - show this message\n\n\
         Your current limits:\n\
         Daily: {} generations remaining today\n\
         Monthly: {} generations remaining this month\n\n\
         Send a briefing document and I will generate a script from it. \
         Upload one of your own scripts (name the file \"script\") and I \
         will use it as inspiration.",
        stats.daily_remaining(),
        stats.monthly_remaining(),
    )
}

fn usage_hint(stats: &UsageStats) -> String {
    format!(
        "Hi! Send me a briefing document and I will generate a script for you.\n\n\
         Today: {} of {} generations available\n\
         This month: {} of {} available\n\n\
         Type /stats for details or /help for all commands.",
        stats.daily_remaining(),
        stats.daily_limit,
        stats.monthly_remaining(),
        stats.monthly_limit,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Case-insensitive check for the script filename keywords.
pub fn is_script_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SCRIPT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Send a message, logging instead of propagating failures — delivery
/// is fire-and-forget.
pub async fn deliver_best_effort(state: &AppState, to: &str, text: &str) {
    if let Err(e) = state.delivery.send_text(to, text).await {
        tracing::warn!(user = %to, error = %e, "message delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_filenames_are_detected() {
        assert!(is_script_filename("my_script_v2.pdf"));
        assert!(is_script_filename("Roteiro-final.docx"));
        assert!(is_script_filename("SCREENPLAY.pdf"));
        assert!(!is_script_filename("campaign-briefing.pdf"));
    }
}
