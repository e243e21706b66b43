//! Single tone command.

use std::thread;
use std::time::{Duration, Instant};

use chiptone_config::EngineConfig;
use chiptone_io::EngineState;
use chiptone_synth::{Effect, EffectKind, MAX_EFFECT_LEVEL, MAX_VOLUME, VOICE_COUNT};
use clap::{Args, ValueEnum};

use super::common::start_engine;

#[derive(Args)]
pub struct ToneArgs {
    /// Frequency in Hz (0 = silence)
    #[arg(long)]
    hz: u32,

    /// Voice to play on
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..VOICE_COUNT as i64))]
    voice: u8,

    /// Duration in milliseconds (0 = until Ctrl+C)
    #[arg(short, long, default_value = "1000")]
    duration: u32,

    /// Volume (0-10)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_VOLUME)))]
    volume: u8,

    /// Effect applied to the tone
    #[arg(short, long, value_enum, default_value = "none")]
    effect: EffectArg,

    /// Effect level (0-16000)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_EFFECT_LEVEL)))]
    level: u32,

    /// Lower bound for the bounce effect (0-16000)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_EFFECT_LEVEL)))]
    low: u32,

    /// Output device name (overrides config)
    #[arg(long)]
    device: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum EffectArg {
    None,
    Fixed,
    Up,
    Down,
    Bounce,
}

impl From<EffectArg> for EffectKind {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::None => EffectKind::None,
            EffectArg::Fixed => EffectKind::Fixed,
            EffectArg::Up => EffectKind::Up,
            EffectArg::Down => EffectKind::Down,
            EffectArg::Bounce => EffectKind::Bounce,
        }
    }
}

pub fn run(args: ToneArgs, config: EngineConfig) -> anyhow::Result<()> {
    let effect = Effect::from_kind(args.effect.into(), args.level, args.low);
    let engine = start_engine(config, args.device)?;

    engine.play_tone(
        usize::from(args.voice),
        args.hz,
        args.duration,
        args.volume,
        effect,
    )?;

    if args.duration == 0 {
        println!(
            "Playing {} Hz on voice {} (Ctrl+C to stop)",
            args.hz, args.voice
        );
    } else {
        println!(
            "Playing {} Hz on voice {} for {} ms",
            args.hz, args.voice, args.duration
        );
    }

    let deadline = (args.duration > 0)
        .then(|| Instant::now() + Duration::from_millis(u64::from(args.duration)));
    while engine.state() == EngineState::Running {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    engine.close()?;
    Ok(())
}
