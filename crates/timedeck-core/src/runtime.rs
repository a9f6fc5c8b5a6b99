//! Cooperative tick driver.
//!
//! One `select!` loop owns the engine and every periodic source:
//!
//! - wall-clock sampling, every second, always;
//! - ambient refresh, every five minutes, always;
//! - at most one engine timer, chosen by [`ArmKey`].
//!
//! All mutations happen inside a single loop iteration, so a renderer never
//! sees a half-applied update. The engine timer lives in a [`TimerSlot`] that
//! drops the old interval before arming a new one whenever the key changes.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::ambient::{AmbientReading, AMBIENT_PERIOD};
use crate::clock::CLOCK_PERIOD;
use crate::engine::{ArmKey, Mode, TimeEngine};
use crate::events::Event;
use crate::snapshot::Snapshot;
use crate::sound::SoundDispatcher;

/// Requests a host shell can send to a running [`TickLoop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    ToggleRunning,
    Start,
    Pause,
    Reset,
    Lap,
    SkipPhase,
    SetCountdown {
        hours: u64,
        minutes: u64,
        seconds: u64,
    },
    SelectTimezone(String),
    ToggleSound,
    CycleTheme,
    Quit,
}

/// Holds at most one armed engine timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<ArmedTimer>,
    arm_count: u64,
}

#[derive(Debug)]
struct ArmedTimer {
    key: ArmKey,
    interval: Interval,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the slot match `key`. Returns true if anything was cancelled or armed.
    ///
    /// Must be called inside a tokio runtime.
    pub fn sync(&mut self, key: ArmKey) -> bool {
        let current = self.armed.as_ref().map(|a| a.key);
        if current == Some(key) {
            return false;
        }
        if current.is_none() && key.period().is_none() {
            return false;
        }

        if let Some(old) = self.armed.take() {
            debug!(key = ?old.key, "engine timer cancelled");
        }

        if let Some(period) = key.period() {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.armed = Some(ArmedTimer { key, interval });
            self.arm_count += 1;
            debug!(?key, ?period, "engine timer armed");
        }
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_key(&self) -> Option<ArmKey> {
        self.armed.as_ref().map(|a| a.key)
    }

    /// Number of timers created over the slot's lifetime.
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }

    /// Wait for the armed timer; pends forever when nothing is armed.
    pub async fn tick(&mut self) {
        match self.armed.as_mut() {
            Some(armed) => {
                armed.interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

fn periodic(period: std::time::Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Drives a [`TimeEngine`] until told to quit.
pub struct TickLoop {
    engine: TimeEngine,
    sound: SoundDispatcher,
    events: Option<mpsc::UnboundedSender<Event>>,
    rng: StdRng,
}

impl TickLoop {
    pub fn new(engine: TimeEngine, sound: SoundDispatcher) -> Self {
        Self {
            engine,
            sound,
            events: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Forward every engine event to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Use a fixed seed for the ambient reading.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Initial snapshot, for building the watch channel.
    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// Run until `Quit` or until every command sender is gone.
    ///
    /// Returns the engine in its final state.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<Snapshot>,
    ) -> TimeEngine {
        let mut clock = periodic(CLOCK_PERIOD);
        let mut ambient = periodic(AMBIENT_PERIOD);
        let mut slot = TimerSlot::new();

        self.engine.sample_clock(Utc::now());
        self.engine.sample_ambient(AmbientReading::sample(&mut self.rng));
        publish(&snapshots, self.engine.snapshot());

        loop {
            slot.sync(self.engine.arm_key());

            tokio::select! {
                _ = clock.tick() => {
                    self.engine.sample_clock(Utc::now());
                }
                _ = ambient.tick() => {
                    self.engine.sample_ambient(AmbientReading::sample(&mut self.rng));
                }
                _ = slot.tick() => {
                    if let Some(event) = self.engine.tick() {
                        self.emit(event);
                    }
                }
                cmd = commands.recv() => {
                    match cmd {
                        None | Some(Command::Quit) => break,
                        Some(cmd) => self.apply(cmd),
                    }
                }
            }

            publish(&snapshots, self.engine.snapshot());
        }

        debug!(arm_count = slot.arm_count(), "tick loop stopped");
        self.engine
    }

    fn apply(&mut self, cmd: Command) {
        let event = match cmd {
            Command::SetMode(mode) => self.engine.set_mode(mode),
            Command::ToggleRunning => self.engine.toggle_running(),
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Reset => self.engine.reset(),
            Command::Lap => self.engine.lap(),
            Command::SkipPhase => self.engine.skip_phase(),
            Command::SetCountdown {
                hours,
                minutes,
                seconds,
            } => self.engine.set_countdown(hours, minutes, seconds),
            Command::SelectTimezone(id) => match self.engine.select_timezone(&id) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(error = %e, "timezone change fell back to UTC");
                    Some(Event::TimezoneChanged {
                        zone: self.engine.clock().zone().id().to_string(),
                        at: Utc::now(),
                    })
                }
            },
            Command::ToggleSound => Some(self.engine.toggle_sound()),
            Command::CycleTheme => Some(self.engine.cycle_theme()),
            Command::Quit => None,
        };
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn emit(&mut self, event: Event) {
        if let Some(cue) = event.cue() {
            self.sound.dispatch(cue, self.engine.settings());
        }
        if let Some(tx) = &self.events {
            // Receiver may already be gone.
            let _ = tx.send(event);
        }
    }
}

fn publish(snapshots: &watch::Sender<Snapshot>, snapshot: Snapshot) {
    snapshots.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
