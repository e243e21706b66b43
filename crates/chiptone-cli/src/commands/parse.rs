//! Note string inspection command.

use chiptone_config::EngineConfig;
use chiptone_synth::{MAX_OCTAVE, NotationParser};
use clap::Args;

#[derive(Args)]
pub struct ParseArgs {
    /// Note string to parse
    notation: String,

    /// Octave of unshifted notes (default from config)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_OCTAVE)))]
    base_octave: Option<u8>,
}

pub fn run(args: ParseArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let base_octave = args.base_octave.unwrap_or(config.base_octave);
    let parsed = NotationParser::new(base_octave).parse(&args.notation);

    println!("{:>4}  {:<6} {:>6} {:>6} {:>5}", "#", "token", "octave", "hz", "units");
    for (i, token) in parsed.tokens.iter().enumerate() {
        let hz = if token.is_rest() {
            "-".to_string()
        } else {
            token.frequency().to_string()
        };
        println!(
            "{:>4}  {:<6} {:>6} {:>6} {:>5}",
            i,
            token.to_string(),
            token.octave,
            hz,
            token.multiplier
        );
    }
    println!();
    println!(
        "{} tokens, {} units",
        parsed.tokens.len(),
        parsed.total_units()
    );

    for skipped in &parsed.skipped {
        println!("skipped {skipped}");
    }
    Ok(())
}
