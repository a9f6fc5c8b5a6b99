mod countdown;
mod focus_cycle;
pub mod format;
mod progress;
mod stopwatch;

pub use countdown::Countdown;
pub use focus_cycle::{FocusCycle, FocusDurations, Phase, PhaseTransition};
pub use format::{format_countdown, format_focus_cycle, format_stopwatch, parse_hms, split_hms};
pub use progress::{progress, remaining_progress};
pub use stopwatch::{Lap, Stopwatch, STOPWATCH_QUANTUM_MS};

/// Result of advancing one engine by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome<T = ()> {
    /// Time advanced, nothing to announce.
    Quiet,
    /// Time advanced onto a cue boundary (whole minute or second).
    Cue,
    /// The engine reached its terminal point.
    Finished(T),
}
