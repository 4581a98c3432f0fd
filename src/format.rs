//! "Last updated" formatting

use chrono::{DateTime, Utc};

/// Renders how long ago `timestamp` was, relative to `now`
///
/// `None` renders as "Never". Timestamps in the future count as zero seconds.
pub fn format_elapsed(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "Never".to_string();
    };

    let secs = now.signed_duration_since(timestamp).num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// [`format_elapsed`] against the wall clock
pub fn format_elapsed_now(timestamp: Option<DateTime<Utc>>) -> String {
    format_elapsed(timestamp, Utc::now())
}
