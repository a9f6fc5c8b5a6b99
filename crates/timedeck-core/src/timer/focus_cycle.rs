//! Focus-cycle (work / short break / long break) phase machine.
//!
//! ## Transitions
//!
//! ```text
//! Work --(n < interval)--> ShortBreak --> Work
//! Work --(n = interval)--> LongBreak  --> Work   (n back to 0)
//! ```
//!
//! `n` is the number of work phases completed since the last long break.
//! After every transition the caller must leave the timer paused.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::format_focus_cycle;
use super::progress::remaining_progress;
use super::TickOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Work)
    }
}

/// Phase lengths in seconds and the long-break interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusDurations {
    #[serde(default = "default_work_secs")]
    pub work_secs: u64,
    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u64,
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: u64,
    /// Completed work phases that earn a long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

fn default_work_secs() -> u64 {
    25 * 60
}
fn default_short_break_secs() -> u64 {
    5 * 60
}
fn default_long_break_secs() -> u64 {
    15 * 60
}
fn default_long_break_interval() -> u32 {
    4
}

impl Default for FocusDurations {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl FocusDurations {
    pub fn duration(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }
}

/// What happened when a phase finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    /// Work phases completed since the last long break, after the transition.
    pub completed_work_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusCycle {
    durations: FocusDurations,
    phase: Phase,
    remaining_secs: u64,
    completed_work_count: u32,
    /// Lifetime count of finished work phases; only `reset` clears it.
    cycles_completed: u32,
}

impl Default for FocusCycle {
    fn default() -> Self {
        Self::new(FocusDurations::default())
    }
}

impl FocusCycle {
    /// Starts in `Work` with the full work duration.
    pub fn new(durations: FocusDurations) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            remaining_secs: durations.work_secs,
            completed_work_count: 0,
            cycles_completed: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn completed_work_count(&self) -> u32 {
        self.completed_work_count
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn phase_duration(&self) -> u64 {
        self.durations.duration(self.phase)
    }

    pub fn display(&self) -> String {
        format_focus_cycle(self.remaining_secs)
    }

    pub fn progress_pct(&self) -> f64 {
        remaining_progress(self.remaining_secs, self.phase_duration())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance by one second.
    ///
    /// A phase that is already at zero (zero-length phase) finishes on the
    /// first tick.
    pub fn tick(&mut self) -> TickOutcome<PhaseTransition> {
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs > 0 {
                return if self.remaining_secs % 60 == 0 {
                    TickOutcome::Cue
                } else {
                    TickOutcome::Quiet
                };
            }
        }
        TickOutcome::Finished(self.complete_phase())
    }

    /// Finish the current phase immediately.
    pub fn skip(&mut self) -> PhaseTransition {
        self.complete_phase()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.durations);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> PhaseTransition {
        let from = self.phase;
        let to = match from {
            Phase::Work => {
                self.completed_work_count += 1;
                self.cycles_completed += 1;
                if self.completed_work_count >= self.durations.long_break_interval.max(1) {
                    self.completed_work_count = 0;
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };

        self.phase = to;
        self.remaining_secs = self.durations.duration(to);
        debug!(?from, ?to, count = self.completed_work_count, "focus phase advanced");

        PhaseTransition {
            from,
            to,
            completed_work_count: self.completed_work_count,
        }
    }
}
