//! Durable usage store.
//!
//! Persists per-user usage counters in `users.json` under the configured
//! state path. The whole map is rewritten on every mutation; at the
//! write volumes of a messaging bot that is cheaper than it sounds and
//! keeps the file human-readable for operators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// User usage record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Usage counters and limits for a single user.
///
/// `last_reset_date` / `last_monthly_reset` mark the window the counters
/// belong to; the tracker zeroes a counter the first time it touches the
/// record after the corresponding calendar boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUsage {
    pub user_id: String,
    #[serde(default)]
    pub daily_count: u32,
    #[serde(default)]
    pub monthly_count: u32,
    pub daily_limit: u32,
    pub monthly_limit: u32,
    /// Calendar date of the last daily-window reset.
    pub last_reset_date: NaiveDate,
    /// First day of the month of the last monthly-window reset.
    pub last_monthly_reset: NaiveDate,
    #[serde(default)]
    pub is_premium: bool,
    /// RFC 3339 local timestamp of record creation.
    pub created_at: String,
    /// RFC 3339 local timestamp of the last counted usage.
    pub last_activity: String,
}

impl UserUsage {
    /// Fresh record for an unseen user with the given default limits.
    pub fn new(
        user_id: &str,
        daily_limit: u32,
        monthly_limit: u32,
        now: DateTime<Local>,
    ) -> Self {
        let today = now.date_naive();
        Self {
            user_id: user_id.to_owned(),
            daily_count: 0,
            monthly_count: 0,
            daily_limit,
            monthly_limit,
            last_reset_date: today,
            last_monthly_reset: month_start(today),
            is_premium: false,
            created_at: now.to_rfc3339(),
            last_activity: now.to_rfc3339(),
        }
    }
}

/// First day of the month `date` falls in.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Usage store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// JSON-file-backed map of sanitized user key to [`UserUsage`].
///
/// Not internally synchronized — [`crate::QuotaTracker`] owns the store
/// behind a single mutex guarding every load-modify-persist sequence.
pub struct UsageStore {
    path: PathBuf,
    users: HashMap<String, UserUsage>,
}

impl UsageStore {
    /// Load or create the store at `state_path/users.json`.
    ///
    /// A missing file means no users yet; an unreadable or corrupt file
    /// is logged and treated the same way, favoring availability over
    /// strict durability.
    pub fn load(state_path: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(state_path) {
            tracing::warn!(path = %state_path.display(), error = %e, "failed to create state dir");
        }
        let path = state_path.join("users.json");

        let users = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str(&raw) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "usage store corrupt, starting empty"
                        );
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "usage store unreadable, starting empty"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::info!(users = users.len(), path = %path.display(), "usage store loaded");

        Self { path, users }
    }

    pub fn get(&self, key: &str) -> Option<&UserUsage> {
        self.users.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut UserUsage> {
        self.users.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.users.contains_key(key)
    }

    pub fn insert(&mut self, key: String, usage: UserUsage) {
        self.users.insert(key, usage);
    }

    /// Look up `key`, creating the record with `make` when absent.
    /// Returns the record and whether it was just created.
    pub fn ensure_with(
        &mut self,
        key: &str,
        make: impl FnOnce() -> UserUsage,
    ) -> (&mut UserUsage, bool) {
        let mut created = false;
        let user = self.users.entry(key.to_owned()).or_insert_with(|| {
            created = true;
            make()
        });
        (user, created)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Rewrite the whole store file.
    ///
    /// A write failure is logged and swallowed: the in-memory state
    /// stays authoritative for the rest of the process lifetime, and
    /// unpersisted increments are lost on restart. That data-loss
    /// window is a documented property of the store, not an oversight.
    pub fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self.users) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "serializing usage store failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "usage store write failed");
        }
    }
}
