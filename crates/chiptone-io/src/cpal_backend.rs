//! cpal-based output backend.
//!
//! [`CpalBackend`] plays through the platform audio system: ALSA on Linux,
//! CoreAudio on macOS, WASAPI on Windows.
//!
//! ```rust,ignore
//! use chiptone_io::{AudioBackend, BackendStreamConfig, CpalBackend};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &BackendStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32]| buffer.fill(0.0)),
//!     Box::new(|err| eprintln!("Audio error: {}", err)),
//! )?;
//! // Silence plays until `stream` is dropped.
//! ```

use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
use crate::stream::device_name;
use crate::{AudioDevice, Error, Result};

/// cpal-based audio backend using the platform's default host.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Find an output device whose name contains `name` (case-insensitive),
    /// or the default output.
    fn find_output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => {
                let search_lower = search.to_lowercase();
                let devices = self
                    .host
                    .output_devices()
                    .map_err(|e| Error::Stream(e.to_string()))?;

                for device in devices {
                    if let Ok(dev_name) = device_name(&device)
                        && dev_name.to_lowercase().contains(search_lower.as_str())
                    {
                        return Ok(device);
                    }
                }
                Err(Error::DeviceNotFound(format!(
                    "no output device matching '{}'",
                    search
                )))
            }
            None => self.host.default_output_device().ok_or(Error::NoDevice),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::stream::list_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        crate::stream::default_device()
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_output_device(config.device_name.as_deref())?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    /// The requested rate if the device supports it with the requested
    /// channel count, otherwise the device's default rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        let Ok(device) = self.find_output_device(config.device_name.as_deref()) else {
            return config.sample_rate;
        };

        let supported = device
            .supported_output_configs()
            .map(|mut ranges| {
                ranges.any(|r| {
                    r.channels() == config.channels
                        && r.min_sample_rate() <= config.sample_rate
                        && config.sample_rate <= r.max_sample_rate()
                })
            })
            .unwrap_or(false);

        if supported {
            config.sample_rate
        } else {
            device
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(config.sample_rate)
        }
    }
}
