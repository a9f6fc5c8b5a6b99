//! Wall clock and timezone handling.
//!
//! Zone data comes from `chrono-tz`. The special identifier `local` means
//! whatever zone the host resolves to.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

use crate::error::TimezoneError;

/// Period between wall-clock samples.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Zones offered by the picker. Any other IANA identifier is also accepted.
pub const PRESET_ZONES: &[&str] = &[
    "local",
    "UTC",
    "America/New_York",
    "Europe/London",
    "Asia/Tokyo",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    #[default]
    Local,
    Named(Tz),
}

impl Zone {
    pub fn parse(id: &str) -> Result<Self, TimezoneError> {
        let trimmed = id.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Zone::Named(Tz::UTC));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| TimezoneError::Unknown(trimmed.to_string()))
    }

    /// Like [`Zone::parse`] but never fails: unknown identifiers become UTC.
    pub fn parse_or_utc(id: &str) -> Self {
        Self::parse(id).unwrap_or_else(|e| {
            warn!(error = %e, "falling back to UTC");
            Zone::Named(Tz::UTC)
        })
    }

    pub fn id(&self) -> &'static str {
        match self {
            Zone::Local => "local",
            Zone::Named(tz) => tz.name(),
        }
    }

    /// Render `at` in this zone.
    pub fn reading(&self, at: DateTime<Utc>, hour12: bool) -> ClockReading {
        match self {
            Zone::Local => render(local_name(), at.with_timezone(&Local), hour12),
            Zone::Named(tz) => render(self.id(), at.with_timezone(tz), hour12),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// IANA zone the host resolves to, from `TZ` or the `/etc/localtime` link.
pub fn resolve_local() -> Option<Tz> {
    std::env::var("TZ")
        .ok()
        .and_then(|value| tz_from_env_value(&value))
        .or_else(|| {
            std::fs::read_link("/etc/localtime")
                .ok()
                .and_then(|target| tz_from_zoneinfo_path(&target))
        })
}

/// Display name for [`Zone::Local`], resolved once per process.
fn local_name() -> &'static str {
    static NAME: OnceLock<&'static str> = OnceLock::new();
    NAME.get_or_init(|| resolve_local().map_or("local", |tz| tz.name()))
}

fn tz_from_env_value(value: &str) -> Option<Tz> {
    value.trim().trim_start_matches(':').parse().ok()
}

fn tz_from_zoneinfo_path(path: &Path) -> Option<Tz> {
    let (_, name) = path.to_str()?.split_once("zoneinfo/")?;
    name.parse().ok()
}

/// Formatted date and time for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// IANA name; for the host zone, `local` only when it cannot be resolved.
    pub zone: String,
    /// `HH:MM:SS`, or `hh:MM:SS AM` in 12-hour mode.
    pub time: String,
    /// e.g. `Tuesday, March 4, 2025`
    pub date: String,
    /// Zone abbreviation where the database has one, else the offset.
    pub abbreviation: String,
    /// `+HH:MM`
    pub offset: String,
}

fn render<T: TimeZone>(zone: &str, at: DateTime<T>, hour12: bool) -> ClockReading
where
    T::Offset: fmt::Display,
{
    let time_fmt = if hour12 { "%I:%M:%S %p" } else { "%H:%M:%S" };
    ClockReading {
        zone: zone.to_string(),
        time: at.format(time_fmt).to_string(),
        date: at.format("%A, %B %-d, %Y").to_string(),
        abbreviation: at.format("%Z").to_string(),
        offset: at.format("%:z").to_string(),
    }
}

/// Format `at` for an arbitrary identifier, falling back to UTC.
pub fn format_in_zone(id: &str, at: DateTime<Utc>, hour12: bool) -> ClockReading {
    Zone::parse_or_utc(id).reading(at, hour12)
}

/// The most recent wall-clock sample and the zone it is shown in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallClock {
    zone: Zone,
    sample: DateTime<Utc>,
}

impl WallClock {
    pub fn new(zone: Zone, now: DateTime<Utc>) -> Self {
        Self { zone, sample: now }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn set_zone(&mut self, zone: Zone) {
        self.zone = zone;
    }

    pub fn sample(&mut self, now: DateTime<Utc>) {
        self.sample = now;
    }

    pub fn sampled_at(&self) -> DateTime<Utc> {
        self.sample
    }

    pub fn reading(&self, hour12: bool) -> ClockReading {
        self.zone.reading(self.sample, hour12)
    }
}
