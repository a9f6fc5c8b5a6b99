use serde::{Deserialize, Serialize};

use crate::ambient::AmbientReading;
use crate::clock::ClockReading;
use crate::engine::Mode;
use crate::settings::Theme;
use crate::timer::{Lap, Phase};

/// Everything a renderer needs, in one value.
///
/// Built fresh from engine state; renderers never write back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub running: bool,
    /// Primary display string for the active mode.
    pub display: String,
    /// Progress of the active mode (0 for clock and stopwatch).
    pub progress_pct: f64,
    pub theme: Theme,
    pub sound_enabled: bool,
    pub clock: ClockReading,
    pub countdown: CountdownView,
    pub stopwatch: StopwatchView,
    pub focus: FocusView,
    pub ambient: Option<AmbientReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownView {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    /// Duration progress is measured against; 0 once expired or reset.
    pub initial_secs: u64,
    pub display: String,
    pub progress_pct: f64,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopwatchView {
    pub elapsed_ms: u64,
    pub display: String,
    pub laps: Vec<Lap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusView {
    pub phase: Phase,
    pub phase_label: String,
    pub remaining_secs: u64,
    pub display: String,
    pub progress_pct: f64,
    pub completed_work_count: u32,
    pub cycles_completed: u32,
}
