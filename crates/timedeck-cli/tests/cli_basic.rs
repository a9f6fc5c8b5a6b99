//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway config directory.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_timedeck"));
    cmd.env("TIMEDECK_CONFIG_DIR", home.path())
        .env_remove("TIMEDECK_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a session, feeding `input` on stdin.
fn run_session(home: &TempDir, args: &[&str], input: &str) -> (String, i32) {
    let mut child = cli(home)
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn session");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect()
}

fn types(lines: &[serde_json::Value]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_zones_lists_presets() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["zones"]);
    assert_eq!(code, 0);
    let zones: Vec<&str> = stdout.lines().collect();
    assert_eq!(zones.len(), 5);
    assert!(zones[0].starts_with("local"), "{}", zones[0]);
    assert_eq!(
        &zones[1..],
        &["UTC", "America/New_York", "Europe/London", "Asia/Tokyo"]
    );
}

#[test]
fn test_zones_names_local_from_tz() {
    let home = TempDir::new().unwrap();
    let output = cli(&home)
        .arg("zones")
        .env("TZ", "Asia/Tokyo")
        .output()
        .expect("Failed to execute CLI command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().next(), Some("local (Asia/Tokyo)"));
}

#[test]
fn test_clock_json_in_utc() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["clock", "--tz", "UTC", "--json"]);
    assert_eq!(code, 0);
    let reading: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reading["zone"], "UTC");
    assert_eq!(reading["offset"], "+00:00");
    assert_eq!(reading["time"].as_str().unwrap().len(), 8);
}

#[test]
fn test_clock_unknown_zone_falls_back() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["clock", "--tz", "Mars/Olympus", "--json"]);
    assert_eq!(code, 0);
    let reading: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reading["zone"], "UTC");
}

#[test]
fn test_config_get_default() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "focus.work_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1500");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&home, &["config", "set", "sound.volume", "30"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "sound.volume"]);
    assert_eq!(stdout.trim(), "30");

    let (stdout, _, code) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("volume = 30"));
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "set", "sound.volume", "loud"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");

    let (_, _, code) = run_cli(&home, &["config", "set", "clock.timezone", "Nowhere/Land"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(&home, &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_reset() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["config", "set", "focus.work_secs", "60"]);
    let (_, _, code) = run_cli(&home, &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "focus.work_secs"]);
    assert_eq!(stdout.trim(), "1500");
}

#[test]
fn test_run_rejects_bad_countdown() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["run", "--countdown", "ten"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid countdown"));
}

#[test]
fn test_run_session_commands() {
    let home = TempDir::new().unwrap();
    let (stdout, code) = run_session(
        &home,
        &["--json", "--mute"],
        "mode stopwatch\nstart\nlap\npause\ntheme\nquit\n",
    );
    assert_eq!(code, 0);

    let lines = json_lines(&stdout);
    let seen = types(&lines);
    for expected in ["Snapshot", "ModeChanged", "TimerStarted", "LapRecorded", "TimerPaused"] {
        assert!(seen.iter().any(|t| t == expected), "missing {expected}: {seen:?}");
    }
    let theme = lines
        .iter()
        .find(|v| v["type"] == "ThemeChanged")
        .expect("theme event");
    assert_eq!(theme["theme"], "light");
}

#[test]
fn test_run_ends_when_stdin_closes() {
    let home = TempDir::new().unwrap();
    let (stdout, code) = run_session(&home, &["--json", "--mode", "focus"], "");
    assert_eq!(code, 0);
    let lines = json_lines(&stdout);
    assert_eq!(lines[0]["snapshot"]["mode"], "focus");
    assert_eq!(lines[0]["snapshot"]["display"], "25:00");
}

#[test]
fn test_run_countdown_exits_on_finish() {
    let home = TempDir::new().unwrap();
    let (stdout, code) = run_session(
        &home,
        &[
            "--countdown",
            "00:00:01",
            "--start",
            "--exit-on-finish",
            "--json",
            "--mute",
        ],
        "",
    );
    assert_eq!(code, 0);

    let lines = json_lines(&stdout);
    let expired = lines
        .iter()
        .find(|v| v["type"] == "CountdownExpired")
        .expect("countdown should expire");
    assert_eq!(expired["initial_secs"], 1);
}
