use timedeck_core::clock::resolve_local;
use timedeck_core::PRESET_ZONES;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    for zone in PRESET_ZONES {
        match (*zone, resolve_local()) {
            ("local", Some(tz)) => println!("local ({})", tz.name()),
            _ => println!("{zone}"),
        }
    }
    Ok(())
}
