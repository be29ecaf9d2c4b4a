//! Time utilities for did-wallet.
//!
//! All timestamps are Unix epoch microseconds (u64).

use std::time::Duration;

/// Return the current time as microseconds since Unix epoch.
///
/// A clock set before the epoch reads as zero.
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Convert microseconds to an RFC 3339 string.
pub fn micros_to_rfc3339(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    let dt = chrono::DateTime::from_timestamp(secs, nsecs).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Return `true` if a value observed at `observed_at` is older than `max_age`
/// relative to `now`.
pub fn is_older_than(observed_at: u64, max_age: Duration, now: u64) -> bool {
    now.saturating_sub(observed_at) > max_age.as_micros() as u64
}
