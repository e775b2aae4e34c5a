use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messaging channel (inbound webhook + outbound delivery)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the messaging channel the gateway is wired to.
///
/// Inbound: the webhook verification handshake and optional payload
/// signature check. Outbound: the Graph-style message/media API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL of the Graph-style messaging API.
    #[serde(default = "d_graph_url")]
    pub graph_url: String,
    /// Sender account ID used on the outbound messages path.
    #[serde(default)]
    pub phone_number_id: String,
    /// Environment variable holding the channel access token.
    #[serde(default = "d_token_env")]
    pub token_env: String,
    /// Token echoed back during the `GET /webhook` verification
    /// handshake. `None` disables the handshake (verification requests
    /// are rejected).
    #[serde(default)]
    pub verify_token: Option<String>,
    /// App secret for HMAC-SHA256 webhook payload verification
    /// (`X-Hub-Signature-256`). `None` skips signature checks.
    #[serde(default)]
    pub app_secret: Option<String>,
    /// Maximum accepted document size in bytes.
    #[serde(default = "d_max_file_size")]
    pub max_file_size: usize,
    /// MIME types accepted on the webhook document path.
    #[serde(default = "d_accepted_mime_types")]
    pub accepted_mime_types: Vec<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            graph_url: d_graph_url(),
            phone_number_id: String::new(),
            token_env: d_token_env(),
            verify_token: None,
            app_secret: None,
            max_file_size: d_max_file_size(),
            accepted_mime_types: d_accepted_mime_types(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_graph_url() -> String {
    "https://graph.facebook.com/v19.0".into()
}
fn d_token_env() -> String {
    "SF_CHANNEL_TOKEN".into()
}
fn d_max_file_size() -> usize {
    10 * 1024 * 1024
}
fn d_accepted_mime_types() -> Vec<String> {
    vec![
        "application/pdf".into(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
    ]
}
