//! Messaging webhook endpoints.
//!
//! - `GET /webhook` — Meta-style verification handshake: echoes
//!   `hub.challenge` when `hub.verify_token` matches the configured
//!   token.
//! - `POST /webhook` — inbound event envelope. When an app secret is
//!   configured the raw body is verified against the
//!   `X-Hub-Signature-256: sha256=<hex>` HMAC header before parsing.
//!
//! Processing failures never bubble up as HTTP errors to the channel —
//! the user gets a courtesy message and the webhook is acknowledged, so
//! the channel does not retry a payload that will fail again.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::runtime::pipeline::{self, DocumentOutcome};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Envelope shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Option<Vec<InboundMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextPayload>,
    #[serde(default)]
    pub document: Option<DocumentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentPayload {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Envelope {
    /// The first message of the first change, the only slot the channel
    /// populates in practice.
    pub fn first_message(&self) -> Option<&InboundMessage> {
        self.entry
            .first()?
            .changes
            .first()?
            .value
            .messages
            .as_ref()?
            .first()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /webhook — verification handshake
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `GET /webhook` — echo `hub.challenge` when the verify token matches.
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let provided = params.get("hub.verify_token").map(String::as_str);
    let expected = state.config.channel.verify_token.as_deref();

    match (provided, expected) {
        (Some(p), Some(e)) if p == e => {
            let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
            (StatusCode::OK, challenge).into_response()
        }
        _ => (StatusCode::FORBIDDEN, "token invalid").into_response(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /webhook — inbound events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `POST /webhook` — verify the signature, parse the envelope, and run
/// the pipeline.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Signature check first, against the raw body.
    if let Some(ref secret) = state.config.channel.app_secret {
        let sig_header = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !signature_matches(secret, &body, sig_header) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "invalid webhook signature" })),
            )
                .into_response();
        }
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable webhook payload");
            return Json(serde_json::json!({ "status": "ignored" })).into_response();
        }
    };

    let Some(message) = envelope.first_message() else {
        return Json(serde_json::json!({ "status": "ignored" })).into_response();
    };

    match message.kind.as_str() {
        "document" => {
            let Some(doc) = &message.document else {
                return Json(serde_json::json!({ "status": "ignored" })).into_response();
            };
            let mime = doc.mime_type.as_deref().unwrap_or("");
            let filename = doc.filename.as_deref().unwrap_or("");

            match pipeline::handle_document(&state, &message.from, &doc.id, mime, filename).await
            {
                Ok(DocumentOutcome::Unsupported) => {
                    Json(serde_json::json!({ "status": "ignored" })).into_response()
                }
                Ok(DocumentOutcome::RateLimited) => {
                    Json(serde_json::json!({ "status": "rate_limited" })).into_response()
                }
                Ok(DocumentOutcome::ScriptStored) => {
                    Json(serde_json::json!({ "status": "script_received" })).into_response()
                }
                Ok(DocumentOutcome::Generated { .. }) => {
                    Json(serde_json::json!({ "status": "doc_processed" })).into_response()
                }
                Err(e) => {
                    tracing::warn!(user = %message.from, error = %e, "document processing failed");
                    pipeline::deliver_best_effort(
                        &state,
                        &message.from,
                        "Something went wrong while processing your document. Please try again in a few minutes.",
                    )
                    .await;
                    Json(serde_json::json!({ "status": "error" })).into_response()
                }
            }
        }
        "text" => {
            let text = message.text.as_ref().map(|t| t.body.as_str()).unwrap_or("");
            pipeline::handle_text(&state, &message.from, text).await;
            Json(serde_json::json!({ "status": "text_received" })).into_response()
        }
        other => {
            tracing::debug!(kind = %other, "ignoring unsupported message type");
            Json(serde_json::json!({ "status": "ignored" })).into_response()
        }
    }
}

/// Verify a GitHub/Meta-style `sha256=<hex>` HMAC signature against the
/// raw request body, in constant time.
fn signature_matches(secret: &str, body: &[u8], sig_header: &str) -> bool {
    let sig_hex = sig_header.strip_prefix("sha256=").unwrap_or(sig_header);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    computed.as_bytes().ct_eq(sig_hex.as_bytes()).unwrap_u8() == 1
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_document_message() {
        let raw = serde_json::json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "5511999990000",
                            "type": "document",
                            "document": {
                                "id": "media-1",
                                "mime_type": "application/pdf",
                                "filename": "briefing.pdf"
                            }
                        }]
                    }
                }]
            }]
        });
        let envelope: Envelope = serde_json::from_value(raw).unwrap();
        let msg = envelope.first_message().unwrap();
        assert_eq!(msg.from, "5511999990000");
        assert_eq!(msg.kind, "document");
        let doc = msg.document.as_ref().unwrap();
        assert_eq!(doc.id, "media-1");
        assert_eq!(doc.filename.as_deref(), Some("briefing.pdf"));
    }

    #[test]
    fn envelope_without_messages_yields_none() {
        let envelope: Envelope =
            serde_json::from_value(serde_json::json!({ "entry": [] })).unwrap();
        assert!(envelope.first_message().is_none());

        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "entry": [{ "changes": [{ "value": {} }] }]
        }))
        .unwrap();
        assert!(envelope.first_message().is_none());
    }

    #[test]
    fn signature_accepts_valid_hmac() {
        let secret = "shh";
        let body = b"{\"entry\":[]}";

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let header = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(signature_matches(secret, body, &header));
    }

    #[test]
    fn signature_rejects_tampered_body() {
        let secret = "shh";
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(b"original");
        let header = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(!signature_matches(secret, b"tampered", &header));
        assert!(!signature_matches(secret, b"original", "sha256=deadbeef"));
    }
}
