use serde::{Deserialize, Serialize};

use super::format::format_stopwatch;
use super::TickOutcome;

/// Elapsed time added per tick, and the tick period, in milliseconds.
pub const STOPWATCH_QUANTUM_MS: u64 = 10;

/// A recorded snapshot of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    /// 1-based position in the lap list.
    pub index: usize,
    pub elapsed_ms: u64,
    /// Time since the previous lap (or since zero for the first lap).
    pub split_ms: u64,
}

/// Fixed-quantum stopwatch.
///
/// Each tick adds exactly [`STOPWATCH_QUANTUM_MS`]; there is no wall-clock
/// correction, so a late tick is simply a slow stopwatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed_ms: u64,
    laps: Vec<Lap>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn display(&self) -> String {
        format_stopwatch(self.elapsed_ms)
    }

    /// Returns `Cue` whenever elapsed lands on a whole second.
    pub fn tick(&mut self) -> TickOutcome {
        self.elapsed_ms = self.elapsed_ms.saturating_add(STOPWATCH_QUANTUM_MS);
        if self.elapsed_ms % 1000 == 0 {
            TickOutcome::Cue
        } else {
            TickOutcome::Quiet
        }
    }

    /// Record the current elapsed value. Allowed in any state; callers decide
    /// whether a paused stopwatch may take laps.
    pub fn lap(&mut self) -> Lap {
        let previous = self.laps.last().map(|l| l.elapsed_ms).unwrap_or(0);
        let lap = Lap {
            index: self.laps.len() + 1,
            elapsed_ms: self.elapsed_ms,
            split_ms: self.elapsed_ms.saturating_sub(previous),
        };
        self.laps.push(lap);
        lap
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.laps.clear();
    }
}
