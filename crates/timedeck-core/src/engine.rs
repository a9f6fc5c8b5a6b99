//! Mode/session coordinator.
//!
//! `TimeEngine` owns one engine per mode plus a single running flag shared by
//! all of them. Only the active mode is ticked, and `reset` only touches the
//! active mode. Switching modes does not stop a running timer: the flag stays
//! set and follows the user to the new mode.
//!
//! The engine has no clock of its own. The caller drives it with `tick()` at
//! the period given by [`ArmKey::period`] and with `sample_clock()` once a
//! second.
//!
//! ## Usage
//!
//! ```
//! use timedeck_core::{Mode, TimeEngine};
//!
//! let mut engine = TimeEngine::default();
//! engine.set_mode(Mode::Countdown);
//! engine.set_countdown(0, 0, 3);
//! engine.toggle_running();
//! for _ in 0..3 {
//!     engine.tick();
//! }
//! assert!(!engine.is_running());
//! assert!(engine.countdown().is_expired());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ambient::AmbientReading;
use crate::clock::{WallClock, Zone};
use crate::error::TimezoneError;
use crate::events::Event;
use crate::settings::Settings;
use crate::snapshot::{CountdownView, FocusView, Snapshot, StopwatchView};
use crate::storage::Config;
use crate::timer::{
    Countdown, FocusCycle, FocusDurations, Phase, Stopwatch, TickOutcome, STOPWATCH_QUANTUM_MS,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Clock,
    Countdown,
    Stopwatch,
    Focus,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Clock, Mode::Countdown, Mode::Stopwatch, Mode::Focus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Clock => "clock",
            Mode::Countdown => "countdown",
            Mode::Stopwatch => "stopwatch",
            Mode::Focus => "focus",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clock" | "wall-clock" => Ok(Mode::Clock),
            "countdown" | "timer" => Ok(Mode::Countdown),
            "stopwatch" => Ok(Mode::Stopwatch),
            "focus" | "pomodoro" => Ok(Mode::Focus),
            other => Err(format!(
                "unknown mode '{other}' (expected clock, countdown, stopwatch or focus)"
            )),
        }
    }
}

/// The inputs that decide which engine timer should be armed.
///
/// Whenever this changes, the previous timer must be cancelled before a new
/// one is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArmKey {
    pub mode: Mode,
    pub running: bool,
    /// Only set in focus mode.
    pub phase: Option<Phase>,
}

impl ArmKey {
    /// Tick period for this key, or `None` if no engine should tick.
    pub fn period(&self) -> Option<Duration> {
        if !self.running {
            return None;
        }
        match self.mode {
            Mode::Clock => None,
            Mode::Countdown | Mode::Focus => Some(Duration::from_secs(1)),
            Mode::Stopwatch => Some(Duration::from_millis(STOPWATCH_QUANTUM_MS)),
        }
    }
}

/// Core engine: all timing state for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEngine {
    mode: Mode,
    running: bool,
    countdown: Countdown,
    stopwatch: Stopwatch,
    focus: FocusCycle,
    clock: WallClock,
    settings: Settings,
    ambient: Option<AmbientReading>,
}

impl Default for TimeEngine {
    fn default() -> Self {
        Self::new(
            FocusDurations::default(),
            Settings::default(),
            Zone::default(),
            Utc::now(),
        )
    }
}

impl TimeEngine {
    pub fn new(
        durations: FocusDurations,
        settings: Settings,
        zone: Zone,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            mode: Mode::Clock,
            running: false,
            countdown: Countdown::new(),
            stopwatch: Stopwatch::new(),
            focus: FocusCycle::new(durations),
            clock: WallClock::new(zone, now),
            settings,
            ambient: None,
        }
    }

    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        Self::new(config.focus, config.settings(), config.zone(), now)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn focus(&self) -> &FocusCycle {
        &self.focus
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ambient(&self) -> Option<AmbientReading> {
        self.ambient
    }

    pub fn arm_key(&self) -> ArmKey {
        ArmKey {
            mode: self.mode,
            running: self.running,
            phase: (self.mode == Mode::Focus).then(|| self.focus.phase()),
        }
    }

    /// Display string of the active mode.
    pub fn display(&self) -> String {
        match self.mode {
            Mode::Clock => self.clock.reading(self.settings.hour12).time,
            Mode::Countdown => self.countdown.display(),
            Mode::Stopwatch => self.stopwatch.display(),
            Mode::Focus => self.focus.display(),
        }
    }

    /// Progress of the active mode, 0.0 .. 100.0.
    pub fn progress_pct(&self) -> f64 {
        match self.mode {
            Mode::Countdown => self.countdown.progress_pct(),
            Mode::Focus => self.focus.progress_pct(),
            Mode::Clock | Mode::Stopwatch => 0.0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (hours, minutes, seconds) = self.countdown.fields();
        Snapshot {
            mode: self.mode,
            running: self.running,
            display: self.display(),
            progress_pct: self.progress_pct(),
            theme: self.settings.theme,
            sound_enabled: self.settings.sound_enabled,
            clock: self.clock.reading(self.settings.hour12),
            countdown: CountdownView {
                hours,
                minutes,
                seconds,
                initial_secs: self.countdown.initial_secs(),
                display: self.countdown.display(),
                progress_pct: self.countdown.progress_pct(),
                expired: self.countdown.is_expired(),
            },
            stopwatch: StopwatchView {
                elapsed_ms: self.stopwatch.elapsed_ms(),
                display: self.stopwatch.display(),
                laps: self.stopwatch.laps().to_vec(),
            },
            focus: FocusView {
                phase: self.focus.phase(),
                phase_label: self.focus.phase().label().to_string(),
                remaining_secs: self.focus.remaining_secs(),
                display: self.focus.display(),
                progress_pct: self.focus.progress_pct(),
                completed_work_count: self.focus.completed_work_count(),
                cycles_completed: self.focus.cycles_completed(),
            },
            ambient: self.ambient,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch the active mode. The running flag is left alone.
    pub fn set_mode(&mut self, mode: Mode) -> Option<Event> {
        if self.mode == mode {
            return None;
        }
        let from = self.mode;
        self.mode = mode;
        debug!(%from, to = %mode, running = self.running, "mode changed");
        Some(Event::ModeChanged {
            from,
            to: mode,
            at: Utc::now(),
        })
    }

    /// Flip the shared running flag.
    ///
    /// Starting in countdown mode is a no-op while the countdown is at zero.
    pub fn toggle_running(&mut self) -> Option<Event> {
        if self.running {
            self.running = false;
            return Some(Event::TimerPaused {
                mode: self.mode,
                at: Utc::now(),
            });
        }

        if self.mode == Mode::Countdown {
            if !self.countdown.can_start() {
                return None;
            }
            self.countdown.arm();
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.toggle_running()
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.toggle_running()
    }

    /// Reset the active mode only. Stops the timer; a no-op in clock mode.
    pub fn reset(&mut self) -> Option<Event> {
        match self.mode {
            Mode::Clock => return None,
            Mode::Countdown => self.countdown.reset(),
            Mode::Stopwatch => self.stopwatch.reset(),
            Mode::Focus => self.focus.reset(),
        }
        self.running = false;
        Some(Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        })
    }

    /// Overwrite the countdown fields. Ignored while the countdown is ticking.
    pub fn set_countdown(&mut self, hours: u64, minutes: u64, seconds: u64) -> Option<Event> {
        if self.running && self.mode == Mode::Countdown {
            return None;
        }
        self.countdown.set(hours, minutes, seconds);
        Some(Event::CountdownSet {
            total_secs: self.countdown.total_secs(),
            at: Utc::now(),
        })
    }

    /// Record a lap. Only allowed while the stopwatch is the active, running mode.
    pub fn lap(&mut self) -> Option<Event> {
        if self.mode != Mode::Stopwatch || !self.running {
            return None;
        }
        let lap = self.stopwatch.lap();
        Some(Event::LapRecorded {
            lap,
            at: Utc::now(),
        })
    }

    /// Jump to the next focus phase without an alarm. Leaves the timer paused.
    pub fn skip_phase(&mut self) -> Option<Event> {
        if self.mode != Mode::Focus {
            return None;
        }
        self.running = false;
        let t = self.focus.skip();
        Some(Event::PhaseSkipped {
            from: t.from,
            to: t.to,
            completed_work_count: t.completed_work_count,
            at: Utc::now(),
        })
    }

    /// Switch the displayed zone.
    ///
    /// An unknown identifier switches to UTC and returns the error so the
    /// caller can tell the user.
    pub fn select_timezone(&mut self, id: &str) -> Result<Event, TimezoneError> {
        let result = Zone::parse(id);
        let zone = match &result {
            Ok(zone) => *zone,
            Err(e) => {
                warn!(error = %e, "falling back to UTC");
                Zone::Named(chrono_tz::Tz::UTC)
            }
        };
        self.clock.set_zone(zone);
        result.map(|zone| Event::TimezoneChanged {
            zone: zone.id().to_string(),
            at: Utc::now(),
        })
    }

    pub fn toggle_sound(&mut self) -> Event {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        Event::SoundToggled {
            enabled: self.settings.sound_enabled,
            at: Utc::now(),
        }
    }

    pub fn cycle_theme(&mut self) -> Event {
        self.settings.theme = self.settings.theme.next();
        Event::ThemeChanged {
            theme: self.settings.theme,
            at: Utc::now(),
        }
    }

    pub fn sample_clock(&mut self, now: DateTime<Utc>) {
        self.clock.sample(now);
    }

    pub fn sample_ambient(&mut self, reading: AmbientReading) {
        self.ambient = Some(reading);
    }

    /// Advance the active engine by one of its ticks.
    ///
    /// Does nothing unless running. Terminal events clear the running flag.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let at = Utc::now();
        match self.mode {
            Mode::Clock => None,
            Mode::Countdown if self.countdown.total_secs() == 0 => {
                // Running flag carried over from another mode onto an empty countdown.
                self.running = false;
                debug!("countdown empty, timer stopped");
                None
            }
            Mode::Countdown => match self.countdown.tick() {
                TickOutcome::Quiet => None,
                TickOutcome::Cue => Some(Event::TickCue {
                    mode: Mode::Countdown,
                    at,
                }),
                TickOutcome::Finished(initial_secs) => {
                    self.running = false;
                    info!(initial_secs, "countdown expired");
                    Some(Event::CountdownExpired { initial_secs, at })
                }
            },
            Mode::Stopwatch => match self.stopwatch.tick() {
                TickOutcome::Cue => Some(Event::TickCue {
                    mode: Mode::Stopwatch,
                    at,
                }),
                _ => None,
            },
            Mode::Focus => match self.focus.tick() {
                TickOutcome::Quiet => None,
                TickOutcome::Cue => Some(Event::TickCue {
                    mode: Mode::Focus,
                    at,
                }),
                TickOutcome::Finished(t) => {
                    self.running = false;
                    info!(from = ?t.from, to = ?t.to, "focus phase completed");
                    Some(Event::PhaseCompleted {
                        from: t.from,
                        to: t.to,
                        completed_work_count: t.completed_work_count,
                        at,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine() -> TimeEngine {
        TimeEngine::new(
            FocusDurations::default(),
            Settings::default(),
            Zone::Named(chrono_tz::Tz::UTC),
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn starts_in_clock_mode_idle() {
        let e = engine();
        assert_eq!(e.mode(), Mode::Clock);
        assert!(!e.is_running());
        assert_eq!(e.display(), "12:00:00");
        assert_eq!(e.focus().remaining_secs(), 1_500);
        assert_eq!(e.countdown().total_secs(), 0);
        assert_eq!(e.stopwatch().elapsed_ms(), 0);
    }

    #[test]
    fn countdown_at_zero_does_not_start() {
        let mut e = engine();
        e.set_mode(Mode::Countdown);
        assert!(e.toggle_running().is_none());
        assert!(!e.is_running());
    }

    #[test]
    fn countdown_runs_to_expiry_with_one_alarm() {
        let mut e = engine();
        e.set_mode(Mode::Countdown);
        e.set_countdown(0, 0, 10);
        assert!(matches!(e.toggle_running(), Some(Event::TimerStarted { .. })));

        let alarms = (0..10)
            .filter_map(|_| e.tick())
            .filter(|ev| matches!(ev, Event::CountdownExpired { initial_secs: 10, .. }))
            .count();
        assert_eq!(alarms, 1);
        assert_eq!(e.countdown().fields(), (0, 0, 0));
        assert!(!e.is_running());
        assert!(e.tick().is_none());
    }

    #[test]
    fn set_countdown_ignored_while_ticking() {
        let mut e = engine();
        e.set_mode(Mode::Countdown);
        e.set_countdown(0, 1, 0);
        e.toggle_running();
        assert!(e.set_countdown(0, 5, 0).is_none());
        assert_eq!(e.countdown().total_secs(), 60);
    }

    #[test]
    fn stopwatch_ticks_and_laps() {
        let mut e = engine();
        e.set_mode(Mode::Stopwatch);
        e.toggle_running();
        for _ in 0..150 {
            e.tick();
        }
        assert_eq!(e.stopwatch().elapsed_ms(), 1_500);
        assert!(matches!(e.lap(), Some(Event::LapRecorded { .. })));
        e.reset();
        assert_eq!(e.stopwatch().elapsed_ms(), 0);
        assert!(e.stopwatch().laps().is_empty());
        assert!(!e.is_running());
    }

    #[test]
    fn lap_needs_running_stopwatch() {
        let mut e = engine();
        e.set_mode(Mode::Stopwatch);
        assert!(e.lap().is_none());
        e.toggle_running();
        e.set_mode(Mode::Focus);
        assert!(e.lap().is_none());
    }

    #[test]
    fn focus_phase_completion_pauses() {
        let mut e = engine();
        e.set_mode(Mode::Focus);
        e.toggle_running();
        let mut completed = None;
        for _ in 0..1_500 {
            if let Some(ev @ Event::PhaseCompleted { .. }) = e.tick() {
                completed = Some(ev);
            }
        }
        match completed {
            Some(Event::PhaseCompleted {
                from,
                to,
                completed_work_count,
                ..
            }) => {
                assert_eq!(from, Phase::Work);
                assert_eq!(to, Phase::ShortBreak);
                assert_eq!(completed_work_count, 1);
            }
            other => panic!("expected PhaseCompleted, got {other:?}"),
        }
        assert!(!e.is_running());
        assert_eq!(e.focus().remaining_secs(), 300);
    }

    #[test]
    fn switching_modes_keeps_timer_running() {
        let mut e = engine();
        e.set_mode(Mode::Stopwatch);
        e.toggle_running();
        e.tick();
        e.set_mode(Mode::Clock);
        assert!(e.is_running());
        // Clock mode ticks nothing.
        assert!(e.tick().is_none());
        e.set_mode(Mode::Stopwatch);
        e.tick();
        assert_eq!(e.stopwatch().elapsed_ms(), 20);
    }

    #[test]
    fn running_flag_stops_on_empty_countdown() {
        let mut e = engine();
        e.set_mode(Mode::Stopwatch);
        e.start();
        e.set_mode(Mode::Countdown);
        assert!(e.is_running());

        let events: Vec<Event> = (0..5).filter_map(|_| e.tick()).collect();
        assert!(events.is_empty(), "no alarm for a countdown that never ran");
        assert!(!e.is_running());
        assert_eq!(e.arm_key().period(), None);
        assert_eq!(e.countdown().fields(), (0, 0, 0));
        assert!(!e.countdown().is_expired());

        assert!(e.set_countdown(0, 0, 10).is_some());
        assert_eq!(e.countdown().total_secs(), 10);
    }

    #[test]
    fn clock_toggle_into_empty_countdown_stops() {
        let mut e = engine();
        e.toggle_running();
        e.set_mode(Mode::Countdown);
        assert!(e.tick().is_none());
        assert!(!e.is_running());
    }

    #[test]
    fn only_active_mode_advances() {
        let mut e = engine();
        e.set_countdown(0, 0, 30);
        e.set_mode(Mode::Stopwatch);
        e.toggle_running();
        for _ in 0..5 {
            e.tick();
        }
        assert_eq!(e.countdown().total_secs(), 30);
        assert_eq!(e.focus().remaining_secs(), 1_500);
    }

    #[test]
    fn reset_touches_active_mode_only() {
        let mut e = engine();
        e.set_mode(Mode::Stopwatch);
        e.toggle_running();
        e.tick();
        e.set_countdown(0, 0, 5);
        e.set_mode(Mode::Countdown);
        e.reset();
        assert_eq!(e.countdown().total_secs(), 0);
        assert_eq!(e.stopwatch().elapsed_ms(), 10);
    }

    #[test]
    fn reset_is_idempotent_on_every_mode() {
        for mode in Mode::ALL {
            let mut e = engine();
            e.set_mode(Mode::Focus);
            e.toggle_running();
            e.tick();
            e.set_countdown(0, 2, 0);
            e.set_mode(mode);
            e.reset();
            let once = e.snapshot();
            e.reset();
            assert_eq!(e.snapshot(), once, "mode {mode}");
        }
    }

    #[test]
    fn clock_reset_is_noop() {
        let mut e = engine();
        e.toggle_running();
        assert!(e.reset().is_none());
        assert!(e.is_running());
    }

    #[test]
    fn skip_phase_only_in_focus() {
        let mut e = engine();
        assert!(e.skip_phase().is_none());
        e.set_mode(Mode::Focus);
        e.toggle_running();
        assert!(matches!(
            e.skip_phase(),
            Some(Event::PhaseSkipped { to: Phase::ShortBreak, .. })
        ));
        assert!(!e.is_running());
    }

    #[test]
    fn timezone_selection_and_fallback() {
        let mut e = engine();
        assert!(e.select_timezone("Asia/Tokyo").is_ok());
        assert_eq!(e.clock().zone().id(), "Asia/Tokyo");
        assert_eq!(e.snapshot().clock.time, "21:00:00");

        assert_eq!(
            e.select_timezone("Moon/Base"),
            Err(TimezoneError::Unknown("Moon/Base".into()))
        );
        assert_eq!(e.clock().zone().id(), "UTC");
    }

    #[test]
    fn sound_and_theme_toggles() {
        let mut e = engine();
        assert!(matches!(e.toggle_sound(), Event::SoundToggled { enabled: false, .. }));
        assert!(!e.settings().sound_enabled);
        e.cycle_theme();
        assert_eq!(e.settings().theme, crate::settings::Theme::Light);
    }

    #[test]
    fn arm_key_tracks_mode_running_and_phase() {
        let mut e = engine();
        assert_eq!(e.arm_key().period(), None);
        e.set_mode(Mode::Stopwatch);
        e.toggle_running();
        assert_eq!(e.arm_key().period(), Some(Duration::from_millis(10)));
        e.set_mode(Mode::Focus);
        let key = e.arm_key();
        assert_eq!(key.phase, Some(Phase::Work));
        assert_eq!(key.period(), Some(Duration::from_secs(1)));
        e.set_mode(Mode::Clock);
        assert_eq!(e.arm_key().period(), None);
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("pomodoro".parse::<Mode>(), Ok(Mode::Focus));
        assert_eq!("Timer".parse::<Mode>(), Ok(Mode::Countdown));
        assert!("metronome".parse::<Mode>().is_err());
    }

    #[test]
    fn snapshot_progress_follows_active_mode() {
        let mut e = engine();
        e.set_mode(Mode::Countdown);
        e.set_countdown(0, 0, 4);
        e.toggle_running();
        e.tick();
        let snap = e.snapshot();
        assert_eq!(snap.display, "00:00:03");
        assert_eq!(snap.progress_pct, 25.0);
        assert_eq!(snap.countdown.progress_pct, 25.0);
        assert_eq!(snap.countdown.initial_secs, 4);
        assert_eq!(snap.focus.progress_pct, 0.0);
    }
}
