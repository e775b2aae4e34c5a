use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-user usage quotas
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Daily/monthly usage quota configuration.
///
/// The default limits apply to any user record created lazily on first
/// contact; the premium limits replace them when a user is flagged
/// premium. Per-user overrides are set at runtime through the admin API
/// and persisted with the user record, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Generations allowed per calendar day for a standard user.
    #[serde(default = "d_5")]
    pub default_daily_limit: u32,
    /// Generations allowed per calendar month for a standard user.
    #[serde(default = "d_50")]
    pub default_monthly_limit: u32,
    /// Daily limit applied when a user is flagged premium.
    #[serde(default = "d_50")]
    pub premium_daily_limit: u32,
    /// Monthly limit applied when a user is flagged premium.
    #[serde(default = "d_500")]
    pub premium_monthly_limit: u32,
    /// Directory holding the persisted usage store (`users.json`).
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_daily_limit: 5,
            default_monthly_limit: 50,
            premium_daily_limit: 50,
            premium_monthly_limit: 500,
            state_path: d_state_path(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_5() -> u32 {
    5
}
fn d_50() -> u32 {
    50
}
fn d_500() -> u32 {
    500
}
fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
