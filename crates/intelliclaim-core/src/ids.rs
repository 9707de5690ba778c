//! Session-unique ids and timestamps.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Next id: wall-clock milliseconds, bumped past the previous id when two
/// calls land in the same millisecond.
pub fn next_id() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => prev = actual,
        }
    }
}

/// Current time as an RFC 3339 string with millisecond precision (`Z` suffix).
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
