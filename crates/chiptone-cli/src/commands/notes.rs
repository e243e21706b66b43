//! Note string playback command.

use chiptone_config::EngineConfig;
use chiptone_io::{Error, MAX_INCREMENT_MS, MIN_INCREMENT_MS};
use chiptone_synth::{MAX_VOLUME, VOICE_COUNT};
use clap::Args;

use super::common::start_engine;

#[derive(Args)]
pub struct NotesArgs {
    /// Note string, e.g. "G ^A B C D E F# G"
    notation: String,

    /// Length of one note unit in milliseconds (minimum 100)
    #[arg(short, long, default_value = "200", value_parser = clap::value_parser!(u32).range(i64::from(MIN_INCREMENT_MS)..=i64::from(MAX_INCREMENT_MS)))]
    increment: u32,

    /// Volume (0-10)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_VOLUME)))]
    volume: u8,

    /// Voice to play on (default from config)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..VOICE_COUNT as i64))]
    voice: Option<u8>,

    /// Output device name (overrides config)
    #[arg(long)]
    device: Option<String>,
}

pub fn run(args: NotesArgs, config: EngineConfig) -> anyhow::Result<()> {
    let voice = args
        .voice
        .map(usize::from)
        .unwrap_or(config.default_voice);
    let engine = start_engine(config, args.device)?;

    let report = match engine.play_notes_on(voice, args.increment, args.volume, &args.notation) {
        Ok(report) => report,
        // Ctrl+C closed the engine mid-melody
        Err(Error::AlreadyClosed) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    engine.close()?;

    for skipped in &report.skipped {
        eprintln!("skipped {skipped}");
    }
    println!(
        "Played {} notes in {:.1}s",
        report.notes.len(),
        report.elapsed.as_secs_f32()
    );
    Ok(())
}
