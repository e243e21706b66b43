//! Output device discovery via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::Result;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the system default output.
    pub is_default: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

fn describe(device: &Device, is_default: bool) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (default_sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));
    Some(AudioDevice {
        name,
        is_default,
        default_sample_rate,
        channels,
    })
}

/// List all output devices on the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            let is_default = device_name(&device).ok() == default_name;
            if let Some(info) = describe(&device, is_default) {
                devices.push(info);
            }
        }
    }

    Ok(devices)
}

/// Get the default output device info.
pub fn default_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host
        .default_output_device()
        .and_then(|d| describe(&d, true)))
}
