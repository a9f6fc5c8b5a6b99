//! Interactive session: stdin commands in, status line (or JSON lines) out.

use std::io::{BufRead, Write};

use chrono::Utc;
use clap::Args;
use timedeck_core::timer::{format_countdown, format_stopwatch, parse_hms, split_hms};
use timedeck_core::{
    Command, Config, CoreError, Cue, Event, Mode, SilentPlayer, Snapshot, SoundDispatcher,
    SoundError, SoundPlayer, TickLoop, TimeEngine,
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

#[derive(Args)]
pub struct RunArgs {
    /// Starting mode: clock, countdown, stopwatch or focus
    #[arg(long)]
    mode: Option<Mode>,
    /// Countdown duration as HH:MM:SS, MM:SS or SS (implies --mode countdown)
    #[arg(long)]
    countdown: Option<String>,
    /// Start the timer immediately
    #[arg(long)]
    start: bool,
    /// Emit JSON lines instead of a status line
    #[arg(long)]
    json: bool,
    /// Timezone for the clock
    #[arg(long)]
    tz: Option<String>,
    /// Disable sound for this session
    #[arg(long)]
    mute: bool,
    /// Quit when a countdown expires or a focus phase completes
    #[arg(long)]
    exit_on_finish: bool,
}

/// Rings the terminal bell on stderr. Alarms ring three times.
struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), SoundError> {
        if volume <= 0.0 {
            return Ok(());
        }
        let bells = match cue {
            Cue::Tick => "\x07",
            Cue::Alarm => "\x07\x07\x07",
        };
        let mut err = std::io::stderr().lock();
        err.write_all(bells.as_bytes())?;
        err.flush()?;
        Ok(())
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

fn build_engine(args: &RunArgs, config: &Config) -> timedeck_core::error::Result<TimeEngine> {
    let mut engine = TimeEngine::from_config(config, Utc::now());

    if let Some(tz) = &args.tz {
        if let Err(e) = engine.select_timezone(tz) {
            eprintln!("warning: {e}, using UTC");
        }
    }
    if args.mute && engine.settings().sound_enabled {
        engine.toggle_sound();
    }
    if let Some(text) = &args.countdown {
        let total = parse_hms(text)
            .ok_or_else(|| CoreError::Custom(format!("invalid countdown '{text}'")))?;
        let (h, m, s) = split_hms(total);
        engine.set_mode(Mode::Countdown);
        engine.set_countdown(h, m, s);
    }
    if let Some(mode) = args.mode {
        engine.set_mode(mode);
    }
    if args.start {
        engine.start();
    }
    Ok(engine)
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = build_engine(&args, &config)?;

    let sound = if args.mute {
        SoundDispatcher::new(SilentPlayer)
    } else {
        SoundDispatcher::new(TerminalBell)
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    let tick_loop = TickLoop::new(engine, sound).with_events(ev_tx);
    let (snap_tx, mut snap_rx) = watch::channel(tick_loop.snapshot());
    let handle = tokio::spawn(tick_loop.run(cmd_rx, snap_tx));

    spawn_stdin_reader(cmd_tx.clone());
    // Without --exit-on-finish, closing stdin ends the session.
    let finish_tx = args.exit_on_finish.then_some(cmd_tx);

    let mut out = Renderer::new(args.json);
    out.snapshot(&snap_rx.borrow_and_update())?;

    loop {
        tokio::select! {
            changed = snap_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snap_rx.borrow_and_update().clone();
                out.snapshot(&snapshot)?;
            }
            event = ev_rx.recv() => {
                let Some(event) = event else { break };
                out.event(&event)?;
                if event.is_terminal() {
                    if let Some(tx) = &finish_tx {
                        let _ = tx.send(Command::Quit).await;
                    }
                }
            }
        }
    }
    while let Ok(event) = ev_rx.try_recv() {
        out.event(&event)?;
    }

    let engine = handle.await?;
    out.finish()?;
    debug!(mode = %engine.mode(), "session ended");
    Ok(())
}

/// Forward stdin lines to the tick loop from a plain thread.
fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                Ok(None) => {}
                Ok(Some(cmd)) => {
                    let quit = cmd == Command::Quit;
                    if tx.blocking_send(cmd).is_err() || quit {
                        break;
                    }
                }
                Err(message) => eprintln!("{message}"),
            }
        }
    });
}

/// Parse one line of session input. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let cmd = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("mode", Some(m)) => Command::SetMode(m.parse()?),
        ("start", None) => Command::Start,
        ("pause", None) => Command::Pause,
        ("toggle", None) | ("space", None) => Command::ToggleRunning,
        ("reset", None) => Command::Reset,
        ("lap", None) => Command::Lap,
        ("skip", None) => Command::SkipPhase,
        ("set", Some(text)) => {
            let total = parse_hms(text).ok_or_else(|| format!("invalid duration '{text}'"))?;
            let (hours, minutes, seconds) = split_hms(total);
            Command::SetCountdown {
                hours,
                minutes,
                seconds,
            }
        }
        ("tz", Some(zone)) => Command::SelectTimezone(zone.to_string()),
        ("sound", None) => Command::ToggleSound,
        ("theme", None) => Command::CycleTheme,
        ("quit", None) | ("q", None) | ("exit", None) => Command::Quit,
        (other, _) => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(cmd))
}

struct Renderer {
    json: bool,
    out: std::io::Stdout,
}

impl Renderer {
    fn new(json: bool) -> Self {
        Self {
            json,
            out: std::io::stdout(),
        }
    }

    fn snapshot(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let mut out = self.out.lock();
        if self.json {
            let line = serde_json::json!({ "type": "Snapshot", "snapshot": snapshot });
            writeln!(out, "{line}")?;
        } else {
            write!(out, "\r\x1b[2K{}", status_line(snapshot))?;
        }
        out.flush()
    }

    fn event(&mut self, event: &Event) -> std::io::Result<()> {
        let mut out = self.out.lock();
        if self.json {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        } else if let Some(message) = describe(event) {
            writeln!(out, "\r\x1b[2K{message}")?;
        }
        out.flush()
    }

    fn finish(&mut self) -> std::io::Result<()> {
        if !self.json {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

fn status_line(s: &Snapshot) -> String {
    let state = if s.running { "running" } else { "paused" };
    let mut line = match s.mode {
        Mode::Clock => format!("[clock] {} {}", s.display, s.clock.abbreviation),
        Mode::Countdown => format!("[countdown] {} {state} {:.0}%", s.display, s.progress_pct),
        Mode::Stopwatch => format!(
            "[stopwatch] {} {state} laps:{}",
            s.display,
            s.stopwatch.laps.len()
        ),
        Mode::Focus => format!(
            "[focus:{}] {} {state} {:.0}% #{}",
            s.focus.phase_label, s.display, s.progress_pct, s.focus.cycles_completed
        ),
    };
    if s.mode != Mode::Clock {
        line.push_str(&format!(" | {}", s.clock.time));
    }
    if let Some(ambient) = s.ambient {
        line.push_str(&format!(" | {}", ambient.display()));
    }
    if !s.sound_enabled {
        line.push_str(" | muted");
    }
    line
}

/// One-line message for events worth keeping in the scrollback.
fn describe(event: &Event) -> Option<String> {
    match event {
        Event::CountdownExpired { initial_secs, .. } => {
            let (h, m, s) = split_hms(*initial_secs);
            Some(format!(
                "countdown {} finished",
                format_countdown(h, m, s)
            ))
        }
        Event::PhaseCompleted { from, to, .. } => Some(if to.is_break() {
            format!("{} finished, take a {}", from.label(), to.label().to_lowercase())
        } else {
            format!("{} finished, back to work", from.label())
        }),
        Event::PhaseSkipped { from, to, .. } => {
            Some(format!("{} skipped, next: {}", from.label(), to.label()))
        }
        Event::LapRecorded { lap, .. } => Some(format!(
            "lap {}: {}",
            lap.index,
            format_stopwatch(lap.elapsed_ms)
        )),
        Event::TimezoneChanged { zone, .. } => Some(format!("timezone: {zone}")),
        Event::ThemeChanged { theme, .. } => Some(format!("theme: {theme}")),
        _ => None,
    }
}
