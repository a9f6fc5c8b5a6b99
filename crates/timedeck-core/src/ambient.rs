use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often the ambient reading is refreshed.
pub const AMBIENT_PERIOD: Duration = Duration::from_secs(300);

const MIN_CELSIUS: i32 = 18;
const MAX_CELSIUS: i32 = 26;

/// Decorative room-temperature reading. Not a sensor; purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientReading {
    pub celsius: i32,
}

impl AmbientReading {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            celsius: rng.gen_range(MIN_CELSIUS..=MAX_CELSIUS),
        }
    }

    pub fn display(&self) -> String {
        format!("{}°C", self.celsius)
    }
}
