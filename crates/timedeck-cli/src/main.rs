use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "timedeck", version, about = "Clock, countdown, stopwatch and focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive timer session driven from stdin
    Run(commands::run::RunArgs),
    /// Print the current time once
    Clock {
        /// Timezone identifier (e.g. "Asia/Tokyo", "local", "UTC")
        #[arg(long)]
        tz: Option<String>,
        /// Print the reading as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the preset timezones
    Zones,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TIMEDECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Clock { tz, json } => commands::clock::run(tz.as_deref(), json),
        Commands::Zones => commands::zones::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
