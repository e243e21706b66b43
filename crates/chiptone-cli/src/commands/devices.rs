//! Audio device listing command.

use std::fmt::Write as _;

use chiptone_io::{AudioBackend, CpalBackend};
use clap::Args;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    print!("{}", device_report(&backend)?);
    Ok(())
}

/// Render the output device table for `backend`.
fn device_report(backend: &dyn AudioBackend) -> anyhow::Result<String> {
    let devices = backend.list_devices()?;
    let mut out = String::new();

    if devices.is_empty() {
        writeln!(out, "No audio output devices found.")?;
        return Ok(out);
    }

    writeln!(out, "Output Devices ({})", backend.name())?;
    writeln!(out, "==============\n")?;
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " (default)" } else { "" };
        writeln!(
            out,
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        )?;
    }
    if let Some(default) = backend.default_output_device()? {
        writeln!(out, "\nDefault output: {}", default.name)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Tip: pick a device by partial name with --device or in the config file:"
    )?;
    writeln!(out, "  chiptone tone --hz 440 --device \"USB\"")?;
    Ok(out)
}
