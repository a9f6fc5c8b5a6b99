use chrono::Utc;
use timedeck_core::clock::format_in_zone;
use timedeck_core::Config;

/// Print one reading. Without `--tz` the configured zone is used.
pub fn run(tz: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let zone = tz.unwrap_or(&config.clock.timezone);
    let reading = format_in_zone(zone, Utc::now(), config.ui.hour12);

    if json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        println!("{}  {} ({} {})", reading.time, reading.date, reading.zone, reading.offset);
    }
    Ok(())
}
