//! Quota admission, spending, and administration.
//!
//! [`QuotaTracker`] owns the [`UsageStore`] behind a single mutex; every
//! operation is a short load-modify-persist sequence under that lock.
//! Callers must not hold results of one call as a reservation — the
//! admit/spend pair is two calls by design (see crate docs).

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;

use sf_domain::config::QuotaConfig;

use crate::key::sanitize_user_key;
use crate::store::{month_start, UsageStore, UserUsage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Read-only snapshot of one user's usage, window-corrected.
#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub user_id: String,
    pub daily_used: u32,
    pub daily_limit: u32,
    pub monthly_used: u32,
    pub monthly_limit: u32,
    pub is_premium: bool,
    pub created_at: String,
    pub last_activity: String,
}

impl UsageStats {
    pub fn daily_remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.daily_used)
    }

    pub fn monthly_remaining(&self) -> u32 {
        self.monthly_limit.saturating_sub(self.monthly_used)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// QuotaTracker
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Daily/monthly quota tracker with durable counters.
///
/// User records are created lazily on first reference with the
/// configured default limits and are never deleted. Window resets use
/// wall-clock date comparison, so a process that slept across any
/// number of boundaries still resets exactly once on next access.
pub struct QuotaTracker {
    config: QuotaConfig,
    store: Mutex<UsageStore>,
}

impl QuotaTracker {
    pub fn new(config: QuotaConfig) -> Self {
        let store = Mutex::new(UsageStore::load(&config.state_path));
        Self { config, store }
    }

    /// Whether `user_id` may run another generation right now.
    ///
    /// Returns `(true, "OK")` or `(false, <human-readable reason>)`.
    /// The daily check wins when both windows are exhausted. Window
    /// resets applied here are persisted even though nothing was
    /// incremented — a reset must survive a restart.
    pub fn can_send(&self, user_id: &str) -> (bool, String) {
        self.can_send_at(user_id, Local::now())
    }

    pub fn can_send_at(&self, user_id: &str, now: DateTime<Local>) -> (bool, String) {
        let key = sanitize_user_key(user_id);
        let mut store = self.store.lock();

        let defaults = (
            self.config.default_daily_limit,
            self.config.default_monthly_limit,
        );
        let (user, created) =
            store.ensure_with(&key, || UserUsage::new(user_id, defaults.0, defaults.1, now));
        let reset = apply_window_resets(user, now);

        let decision = if user.daily_count >= user.daily_limit {
            (
                false,
                format!(
                    "Daily limit of {} generations reached. Try again tomorrow.",
                    user.daily_limit
                ),
            )
        } else if user.monthly_count >= user.monthly_limit {
            (
                false,
                format!(
                    "Monthly limit of {} generations reached. Try again next month.",
                    user.monthly_limit
                ),
            )
        } else {
            (true, "OK".to_owned())
        };

        if created || reset {
            store.persist();
        }
        decision
    }

    /// Spend one unit of usage.
    ///
    /// Increments both counters unconditionally and stamps
    /// `last_activity`; does not check limits. The caller decides when
    /// the unit is spent — in the gateway, after generation succeeded.
    pub fn increment(&self, user_id: &str) {
        self.increment_at(user_id, Local::now());
    }

    pub fn increment_at(&self, user_id: &str, now: DateTime<Local>) {
        let key = sanitize_user_key(user_id);
        let mut store = self.store.lock();

        let defaults = (
            self.config.default_daily_limit,
            self.config.default_monthly_limit,
        );
        let (user, _) =
            store.ensure_with(&key, || UserUsage::new(user_id, defaults.0, defaults.1, now));
        apply_window_resets(user, now);

        user.daily_count += 1;
        user.monthly_count += 1;
        user.last_activity = now.to_rfc3339();

        store.persist();
    }

    /// Overwrite either or both limits for a user.
    pub fn set_limits(&self, user_id: &str, daily: Option<u32>, monthly: Option<u32>) {
        let now = Local::now();
        let key = sanitize_user_key(user_id);
        let mut store = self.store.lock();

        let defaults = (
            self.config.default_daily_limit,
            self.config.default_monthly_limit,
        );
        let (user, _) =
            store.ensure_with(&key, || UserUsage::new(user_id, defaults.0, defaults.1, now));
        apply_window_resets(user, now);

        if let Some(d) = daily {
            user.daily_limit = d;
        }
        if let Some(m) = monthly {
            user.monthly_limit = m;
        }

        store.persist();
    }

    /// Set or clear the premium flag, resetting both limits to the
    /// matching tier defaults. Idempotent.
    pub fn set_premium(&self, user_id: &str, is_premium: bool) {
        let now = Local::now();
        let key = sanitize_user_key(user_id);
        let mut store = self.store.lock();

        let defaults = (
            self.config.default_daily_limit,
            self.config.default_monthly_limit,
        );
        let (user, _) =
            store.ensure_with(&key, || UserUsage::new(user_id, defaults.0, defaults.1, now));
        apply_window_resets(user, now);

        user.is_premium = is_premium;
        if is_premium {
            user.daily_limit = self.config.premium_daily_limit;
            user.monthly_limit = self.config.premium_monthly_limit;
        } else {
            user.daily_limit = self.config.default_daily_limit;
            user.monthly_limit = self.config.default_monthly_limit;
        }

        store.persist();
    }

    /// Window-corrected usage snapshot for a user.
    pub fn stats(&self, user_id: &str) -> UsageStats {
        self.stats_at(user_id, Local::now())
    }

    pub fn stats_at(&self, user_id: &str, now: DateTime<Local>) -> UsageStats {
        let key = sanitize_user_key(user_id);
        let mut store = self.store.lock();

        let defaults = (
            self.config.default_daily_limit,
            self.config.default_monthly_limit,
        );
        let (user, created) =
            store.ensure_with(&key, || UserUsage::new(user_id, defaults.0, defaults.1, now));
        let reset = apply_window_resets(user, now);

        let stats = UsageStats {
            user_id: user.user_id.clone(),
            daily_used: user.daily_count,
            daily_limit: user.daily_limit,
            monthly_used: user.monthly_count,
            monthly_limit: user.monthly_limit,
            is_premium: user.is_premium,
            created_at: user.created_at.clone(),
            last_activity: user.last_activity.clone(),
        };

        if created || reset {
            store.persist();
        }
        stats
    }

    /// Rewrite the store file from the current in-memory state.
    ///
    /// Every mutation already persists; this exists as a periodic and
    /// shutdown-time safety net for mutations whose write failed.
    pub fn flush(&self) {
        self.store.lock().persist();
    }
}

/// Zero counters whose calendar window has rolled over. Returns whether
/// anything changed. Both resets are independent and may fire together.
fn apply_window_resets(user: &mut UserUsage, now: DateTime<Local>) -> bool {
    let today = now.date_naive();
    let mut changed = false;

    if user.last_reset_date != today {
        user.daily_count = 0;
        user.last_reset_date = today;
        changed = true;
    }

    let current_month = month_start(today);
    if user.last_monthly_reset != current_month {
        user.monthly_count = 0;
        user.last_monthly_reset = current_month;
        changed = true;
    }

    changed
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sf_domain::config::QuotaConfig;

    fn make_tracker(dir: &tempfile::TempDir) -> QuotaTracker {
        QuotaTracker::new(QuotaConfig {
            state_path: dir.path().to_path_buf(),
            ..QuotaConfig::default()
        })
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_user_is_admitted_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);

        let (allowed, reason) = tracker.can_send("alice");
        assert!(allowed);
        assert_eq!(reason, "OK");

        let stats = tracker.stats("alice");
        assert_eq!(stats.daily_limit, 5);
        assert_eq!(stats.monthly_limit, 50);
        assert!(!stats.is_premium);
    }

    #[test]
    fn daily_limit_rejects_with_numeric_limit_in_message() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        let now = at(2025, 6, 10);

        for _ in 0..5 {
            let (allowed, _) = tracker.can_send_at("bob", now);
            assert!(allowed);
            tracker.increment_at("bob", now);
        }

        let (allowed, reason) = tracker.can_send_at("bob", now);
        assert!(!allowed);
        assert!(reason.contains("Daily limit of 5"), "got: {reason}");
    }

    #[test]
    fn monthly_limit_rejects_after_daily_allows() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        tracker.set_limits("carol", Some(1000), Some(3));
        let now = at(2025, 6, 10);

        for _ in 0..3 {
            tracker.increment_at("carol", now);
        }

        let (allowed, reason) = tracker.can_send_at("carol", now);
        assert!(!allowed);
        assert!(reason.contains("Monthly limit of 3"), "got: {reason}");
    }

    #[test]
    fn daily_message_wins_when_both_windows_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        tracker.set_limits("dave", Some(1), Some(1));
        let now = at(2025, 6, 10);
        tracker.increment_at("dave", now);

        let (allowed, reason) = tracker.can_send_at("dave", now);
        assert!(!allowed);
        assert!(reason.contains("Daily"), "got: {reason}");
    }

    #[test]
    fn daily_count_resets_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);

        let day1 = at(2025, 6, 10);
        for _ in 0..5 {
            tracker.increment_at("erin", day1);
        }
        assert!(!tracker.can_send_at("erin", day1).0);

        // Next day: admitted again, monthly count untouched.
        let day2 = at(2025, 6, 11);
        let (allowed, _) = tracker.can_send_at("erin", day2);
        assert!(allowed);

        let stats = tracker.stats_at("erin", day2);
        assert_eq!(stats.daily_used, 0);
        assert_eq!(stats.monthly_used, 5);
    }

    #[test]
    fn monthly_count_resets_on_month_change() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        tracker.set_limits("frank", Some(100), Some(4));

        let june = at(2025, 6, 28);
        for _ in 0..4 {
            tracker.increment_at("frank", june);
        }
        assert!(!tracker.can_send_at("frank", june).0);

        let july = at(2025, 7, 2);
        assert!(tracker.can_send_at("frank", july).0);
        assert_eq!(tracker.stats_at("frank", july).monthly_used, 0);
    }

    #[test]
    fn offline_across_many_days_resets_once() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);

        tracker.increment_at("gina", at(2025, 3, 1));
        let stats = tracker.stats_at("gina", at(2025, 6, 20));
        assert_eq!(stats.daily_used, 0);
        assert_eq!(stats.monthly_used, 0);
    }

    #[test]
    fn premium_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);

        tracker.set_premium("henry", true);
        let once = tracker.stats("henry");
        tracker.set_premium("henry", true);
        let twice = tracker.stats("henry");

        assert_eq!(once.daily_limit, twice.daily_limit);
        assert_eq!(once.monthly_limit, twice.monthly_limit);
        assert_eq!(once.daily_limit, 50);
        assert_eq!(once.monthly_limit, 500);
        assert!(twice.is_premium);
    }

    #[test]
    fn premium_downgrade_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);

        tracker.set_premium("iris", true);
        tracker.set_premium("iris", false);
        let stats = tracker.stats("iris");
        assert_eq!(stats.daily_limit, 5);
        assert_eq!(stats.monthly_limit, 50);
        assert!(!stats.is_premium);
    }

    #[test]
    fn resets_from_can_send_are_persisted() {
        let dir = tempfile::tempdir().unwrap();

        {
            let tracker = make_tracker(&dir);
            for _ in 0..5 {
                tracker.increment_at("judy", at(2025, 6, 10));
            }
        }

        // New process, next day: the reset performed by can_send alone
        // must reach disk before any increment happens.
        {
            let tracker = make_tracker(&dir);
            assert!(tracker.can_send_at("judy", at(2025, 6, 11)).0);
        }

        let tracker = make_tracker(&dir);
        let stats = tracker.stats_at("judy", at(2025, 6, 11));
        assert_eq!(stats.daily_used, 0);
    }

    #[test]
    fn counters_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let now = at(2025, 6, 10);

        {
            let tracker = make_tracker(&dir);
            tracker.increment_at("kate", now);
            tracker.increment_at("kate", now);
        }

        let tracker = make_tracker(&dir);
        let stats = tracker.stats_at("kate", now);
        assert_eq!(stats.daily_used, 2);
        assert_eq!(stats.monthly_used, 2);
    }

    #[test]
    fn five_per_day_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        let day1 = at(2025, 9, 3);

        // Five documents in one day against the default daily limit of 5:
        // the 5th is admitted, the 6th is rejected.
        for i in 0..5 {
            let (allowed, _) = tracker.can_send_at("leo", day1);
            assert!(allowed, "send {} should be admitted", i + 1);
            tracker.increment_at("leo", day1);
        }
        let (allowed, reason) = tracker.can_send_at("leo", day1);
        assert!(!allowed);
        assert!(reason.contains("Daily"));

        // After midnight the equivalent call is admitted again.
        let day2 = at(2025, 9, 4);
        assert!(tracker.can_send_at("leo", day2).0);
    }

    #[test]
    fn distinct_raw_ids_never_share_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = make_tracker(&dir);
        let now = at(2025, 6, 10);

        tracker.increment_at("user a", now);
        tracker.increment_at("user:a", now);

        assert_eq!(tracker.stats_at("user a", now).daily_used, 1);
        assert_eq!(tracker.stats_at("user:a", now).daily_used, 1);
    }
}
