//! Pluggable audio output abstraction.
//!
//! The tone engine never talks to a platform audio API directly. It asks an
//! [`AudioBackend`] for an output stream and hands it a callback that fills
//! interleaved sample buffers:
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │            ToneEngine            │
//! └──────────────┬───────────────────┘
//!                │ build_output_stream
//!                ▼
//! ┌──────────────────────────────────┐
//! │        AudioBackend trait        │
//! └──────────────┬───────────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌───────────────┐
//! │ CpalBackend │  │ OfflineBackend│
//! │ (speakers)  │  │ (pull-driven) │
//! └─────────────┘  └───────────────┘
//! ```
//!
//! Callbacks are boxed closures so the trait stays object-safe, and streams
//! come back as a type-erased [`StreamHandle`] that stops output on drop.

use chiptone_config::EngineConfig;

use crate::{AudioDevice, Result};

/// Parameters for opening an output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Optional device name (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for BackendStreamConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
            channels: config.channels,
            device_name: config.device_name.clone(),
        }
    }
}

/// Type-erased output stream handle.
///
/// The stream runs while this handle exists; dropping it stops output.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Output callback: fill a buffer of interleaved f32 samples.
///
/// Runs on the audio thread. For stereo the layout is `[L0, R0, L1, R1, ...]`
/// and the length is `frames * channels`.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Error callback: receives a human-readable message for a stream error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Source of output streams.
pub trait AudioBackend: Send {
    /// Human-readable backend name (e.g. "cpal", "offline").
    fn name(&self) -> &str;

    /// List output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The system default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Open an output stream that pulls samples from `callback`.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Sample rate the backend will actually run `config` at.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}
