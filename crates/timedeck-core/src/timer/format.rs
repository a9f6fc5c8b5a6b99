//! Display formatting for durations.
//!
//! All functions are total over unsigned input. Hours are never wrapped at 24.

/// Split whole seconds into `(hours, minutes, seconds)`.
pub fn split_hms(total_secs: u64) -> (u64, u64, u64) {
    (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60)
}

/// Format a countdown triple as `HH:MM:SS`.
///
/// Fields are padded but not normalized, so `(0, 90, 0)` renders as `00:90:00`.
pub fn format_countdown(hours: u64, minutes: u64, seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format elapsed milliseconds as `HH:MM:SS.mmm`.
pub fn format_stopwatch(elapsed_ms: u64) -> String {
    let (h, m, s) = split_hms(elapsed_ms / 1000);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, elapsed_ms % 1000)
}

/// Format remaining seconds as `MM:SS` with unbounded minutes.
pub fn format_focus_cycle(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// Parse `HH:MM:SS`, `MM:SS` or `SS` into whole seconds.
///
/// Fields may exceed their usual range (`00:90:00` is 5400 seconds).
pub fn parse_hms(input: &str) -> Option<u64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut total: u64 = 0;
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u64 = part.parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}
