//! Countdown engine.
//!
//! ```text
//! Idle --start (total > 0)--> Running --tick to 0--> Expired
//!  ^                            |
//!  +-----------pause------------+
//! ```
//!
//! The running flag itself belongs to the coordinator; this type only owns the
//! remaining fields and the duration snapshotted when the countdown was armed.

use serde::{Deserialize, Serialize};

use super::format::{format_countdown, split_hms};
use super::progress::remaining_progress;
use super::TickOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    hours: u64,
    minutes: u64,
    seconds: u64,
    /// Duration captured by `set` or `arm`, used for progress.
    initial_secs: u64,
    expired: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn fields(&self) -> (u64, u64, u64) {
        (self.hours, self.minutes, self.seconds)
    }

    pub fn total_secs(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    pub fn initial_secs(&self) -> u64 {
        self.initial_secs
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn can_start(&self) -> bool {
        self.total_secs() > 0
    }

    pub fn display(&self) -> String {
        format_countdown(self.hours, self.minutes, self.seconds)
    }

    /// 0.0 .. 100.0, measured against the armed duration.
    pub fn progress_pct(&self) -> f64 {
        remaining_progress(self.total_secs(), self.initial_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the fields. Values are kept as given and normalized on the next tick.
    pub fn set(&mut self, hours: u64, minutes: u64, seconds: u64) {
        self.hours = hours;
        self.minutes = minutes;
        self.seconds = seconds;
        self.initial_secs = self.total_secs();
        self.expired = false;
    }

    /// Prepare for running. Keeps the snapshot taken by `set` across pause/resume.
    pub fn arm(&mut self) {
        let total = self.total_secs();
        if self.initial_secs < total {
            self.initial_secs = total;
        }
        self.expired = false;
    }

    /// Advance by one second.
    ///
    /// Returns `Finished(initial_secs)` on arrival at zero and `Cue` on every
    /// other whole minute.
    pub fn tick(&mut self) -> TickOutcome<u64> {
        let total = self.total_secs();
        if total == 0 {
            return TickOutcome::Quiet;
        }

        let next = total - 1;
        let (h, m, s) = split_hms(next);
        self.hours = h;
        self.minutes = m;
        self.seconds = s;

        if next == 0 {
            let initial = self.initial_secs;
            self.initial_secs = 0;
            self.expired = true;
            TickOutcome::Finished(initial)
        } else if next % 60 == 0 {
            TickOutcome::Cue
        } else {
            TickOutcome::Quiet
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
