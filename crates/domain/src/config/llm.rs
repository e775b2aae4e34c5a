use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the text-generation provider.
///
/// Any OpenAI-compatible chat-completions endpoint works; the API key is
/// read once at startup from the env var named in `api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_model")]
    pub default_model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_2048")]
    pub max_tokens: u32,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            default_model: d_model(),
            temperature: d_temperature(),
            max_tokens: 2048,
            timeout_ms: 120_000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_api_key_env() -> String {
    "SF_LLM_API_KEY".into()
}
fn d_model() -> String {
    "gpt-4.1".into()
}
fn d_temperature() -> f32 {
    1.0
}
fn d_2048() -> u32 {
    2048
}
fn d_120000() -> u64 {
    120_000
}
