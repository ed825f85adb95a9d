//! Human-readable "last saved" label for the editor status line.

use crate::types::Timestamp;

/// Describe how long ago `saved_at` was, relative to `now`.
///
/// Under a minute reads "just now"; under an hour counts minutes; under a
/// day counts hours; anything older falls back to the absolute time.
pub fn format_last_saved(saved_at: Timestamp, now: Timestamp) -> String {
    let minutes = (now - saved_at).num_minutes();

    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes == 1 {
        return "1 minute ago".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }

    let hours = minutes / 60;
    if hours == 1 {
        return "1 hour ago".to_string();
    }
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    saved_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
