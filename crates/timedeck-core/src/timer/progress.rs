/// Percentage (0.0 ..= 100.0) of `total` covered by `elapsed`.
///
/// A zero `total` yields 0 rather than NaN.
pub fn progress(elapsed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (elapsed as f64 / total as f64 * 100.0).min(100.0)
}

/// Progress of a timer that counts `remaining` down from `total`.
pub fn remaining_progress(remaining: u64, total: u64) -> f64 {
    progress(total.saturating_sub(remaining), total)
}
