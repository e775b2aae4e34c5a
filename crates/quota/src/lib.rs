//! `sf-quota` — per-user usage metering and quota enforcement.
//!
//! [`QuotaTracker`] decides whether a user may run another generation,
//! counting usage in calendar-aligned daily and monthly windows with
//! premium tier overrides. State lives in [`UsageStore`], a JSON file
//! rewritten wholesale on every mutation so that a process restart
//! never forgets counts or window resets.
//!
//! Admission and spending are deliberately separate calls: the gateway
//! asks [`QuotaTracker::can_send`] before doing any work and calls
//! [`QuotaTracker::increment`] only once generation has produced
//! output.

pub mod key;
pub mod store;
pub mod tracker;

pub use key::sanitize_user_key;
pub use store::{UsageStore, UserUsage};
pub use tracker::{QuotaTracker, UsageStats};
