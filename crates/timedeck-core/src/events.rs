use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::Mode;
use crate::settings::Theme;
use crate::sound::Cue;
use crate::timer::{Lap, Phase};

/// Every state change in the engine produces an Event.
/// Renderers print them; the sound dispatcher listens for cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ModeChanged {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: Mode,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        at: DateTime<Utc>,
    },
    /// Periodic cue boundary reached (whole minute, or whole second for the stopwatch).
    TickCue {
        mode: Mode,
        at: DateTime<Utc>,
    },
    CountdownSet {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownExpired {
        initial_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        from: Phase,
        to: Phase,
        completed_work_count: u32,
        at: DateTime<Utc>,
    },
    PhaseSkipped {
        from: Phase,
        to: Phase,
        completed_work_count: u32,
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap: Lap,
        at: DateTime<Utc>,
    },
    TimezoneChanged {
        zone: String,
        at: DateTime<Utc>,
    },
    SoundToggled {
        enabled: bool,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: Theme,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The audible cue this event calls for, if any.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Event::TickCue { .. } => Some(Cue::Tick),
            Event::CountdownExpired { .. } | Event::PhaseCompleted { .. } => Some(Cue::Alarm),
            _ => None,
        }
    }

    /// True for events that end a timed run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::CountdownExpired { .. } | Event::PhaseCompleted { .. }
        )
    }
}
