//! Chiptone CLI - play retro square-wave tones and note strings.

mod commands;

use std::path::PathBuf;

use chiptone_config::EngineConfig;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chiptone")]
#[command(author, version, about = "Retro multi-voice tone generator", long_about = None)]
struct Cli {
    /// Engine config file (default: user config dir, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single tone
    Tone(commands::tone::ToneArgs),

    /// Play a note string
    Notes(commands::notes::NotesArgs),

    /// Show how a note string is parsed, without playing it
    Parse(commands::parse::ParseArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = EngineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Tone(args) => commands::tone::run(args, config),
        Commands::Notes(args) => commands::notes::run(args, config),
        Commands::Parse(args) => commands::parse::run(args, &config),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
