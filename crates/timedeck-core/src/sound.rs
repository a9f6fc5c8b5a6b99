//! Audible cues.
//!
//! The engines only report *that* a cue is due. A [`SoundDispatcher`] applies
//! the enabled flag and volume and hands the cue to a [`SoundPlayer`]. Player
//! failures never reach the tick loop.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::SoundError;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Periodic, non-terminal cue.
    Tick,
    /// Countdown expiry or focus phase completion.
    Alarm,
}

/// Something that can make a noise.
pub trait SoundPlayer: Send {
    /// `volume` is a gain in 0.0 ..= 1.0.
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), SoundError>;
}

/// Player that discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&mut self, _cue: Cue, _volume: f32) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Player that remembers what it was asked to play. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    played: Arc<Mutex<Vec<Cue>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played
            .lock()
            .map(|cues| cues.clone())
            .unwrap_or_default()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&mut self, cue: Cue, _volume: f32) -> Result<(), SoundError> {
        self.played
            .lock()
            .map_err(|e| SoundError::Unavailable(e.to_string()))?
            .push(cue);
        Ok(())
    }
}

pub struct SoundDispatcher {
    player: Box<dyn SoundPlayer>,
}

impl SoundDispatcher {
    pub fn new(player: impl SoundPlayer + 'static) -> Self {
        Self {
            player: Box::new(player),
        }
    }

    pub fn silent() -> Self {
        Self::new(SilentPlayer)
    }

    /// Play `cue` if sound is enabled. Returns whether the player accepted it.
    pub fn dispatch(&mut self, cue: Cue, settings: &Settings) -> bool {
        if !settings.sound_enabled {
            return false;
        }
        match self.player.play(cue, settings.gain()) {
            Ok(()) => true,
            Err(e) => {
                debug!(?cue, error = %e, "sound cue dropped");
                false
            }
        }
    }
}

impl std::fmt::Debug for SoundDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundDispatcher").finish_non_exhaustive()
    }
}
