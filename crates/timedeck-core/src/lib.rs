//! # timedeck Core Library
//!
//! This library provides the timing logic behind timedeck: a wall clock, a
//! countdown, a stopwatch and a focus-cycle (work/break) timer sharing one
//! surface and one play/pause control. Front-ends (the CLI in this workspace)
//! are thin shells that send commands and render snapshots.
//!
//! ## Architecture
//!
//! - **Timer engines**: pure per-mode state machines advanced one tick at a time
//! - **Coordinator**: [`TimeEngine`] owns the mode, the shared running flag and
//!   every engine, and dispatches ticks to the active one
//! - **Runtime**: [`TickLoop`] arms exactly one engine timer for the current
//!   (mode, running, phase) and re-arms it whenever that changes
//! - **Collaborators**: timezone formatting via `chrono-tz`, sound via the
//!   [`SoundPlayer`] trait
//! - **Storage**: TOML-based configuration only; no timer state is persisted
//!
//! ## Key Components
//!
//! - [`TimeEngine`]: mode/session coordinator
//! - [`Snapshot`]: everything a renderer needs
//! - [`Event`]: what each command or tick did
//! - [`Config`]: application configuration management

pub mod ambient;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod runtime;
pub mod settings;
pub mod snapshot;
pub mod sound;
pub mod storage;
pub mod timer;

pub use ambient::AmbientReading;
pub use clock::{ClockReading, WallClock, Zone, PRESET_ZONES};
pub use engine::{ArmKey, Mode, TimeEngine};
pub use error::{ConfigError, CoreError, SoundError, TimezoneError};
pub use events::Event;
pub use runtime::{Command, TickLoop, TimerSlot};
pub use settings::{Settings, Theme};
pub use snapshot::Snapshot;
pub use sound::{Cue, RecordingPlayer, SilentPlayer, SoundDispatcher, SoundPlayer};
pub use storage::Config;
pub use timer::{FocusDurations, Lap, Phase};
