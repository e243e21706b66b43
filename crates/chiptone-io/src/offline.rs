//! Pull-driven backend with no audio hardware.
//!
//! [`OfflineBackend`] accepts an output stream like any other backend but never
//! calls it on its own. The owner pulls blocks with [`OfflineBackend::render`],
//! which makes engine output deterministic and inspectable in tests and on
//! headless machines.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
use crate::{AudioDevice, Error, Result};

const DEVICE_NAME: &str = "offline";

#[derive(Default)]
struct OfflineState {
    callback: Option<OutputCallback>,
    channels: u16,
    sample_rate: u32,
    streams_opened: usize,
    unavailable: bool,
}

/// Backend whose output is rendered on demand.
///
/// Clones share the same stream, so a test can keep a clone after handing the
/// backend to an engine.
#[derive(Clone, Default)]
pub struct OfflineBackend {
    state: Arc<Mutex<OfflineState>>,
}

impl OfflineBackend {
    /// Create a backend that accepts one stream at a time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose streams always fail to open.
    pub fn unavailable() -> Self {
        let backend = Self::default();
        backend.lock().unavailable = true;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, OfflineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a stream is currently open.
    pub fn is_streaming(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Number of streams opened so far.
    pub fn streams_opened(&self) -> usize {
        self.lock().streams_opened
    }

    /// Channel count of the open stream (0 when closed).
    pub fn channels(&self) -> u16 {
        self.lock().channels
    }

    /// Sample rate the last stream was opened at.
    pub fn sample_rate(&self) -> u32 {
        self.lock().sample_rate
    }

    /// Pull `frames` frames of interleaved output.
    ///
    /// Returns silence when no stream is open.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut state = self.lock();
        let channels = usize::from(state.channels.max(1));
        let mut buffer = vec![0.0f32; frames * channels];
        if let Some(callback) = state.callback.as_mut() {
            callback(&mut buffer);
        }
        buffer
    }

    /// Pull `frames` frames and keep only the first channel.
    pub fn render_mono(&self, frames: usize) -> Vec<f32> {
        let channels = usize::from(self.channels().max(1));
        self.render(frames).into_iter().step_by(channels).collect()
    }
}

/// Clears the callback when the engine drops its stream handle.
struct OfflineStream {
    state: Arc<Mutex<OfflineState>>,
}

impl Drop for OfflineStream {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.callback = None;
        state.channels = 0;
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(self.default_output_device()?.into_iter().collect())
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(Some(AudioDevice {
            name: DEVICE_NAME.to_string(),
            is_default: true,
            default_sample_rate: 48000,
            channels: 2,
        }))
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(Error::NoDevice);
        }
        if let Some(name) = config.device_name.as_deref()
            && !DEVICE_NAME.contains(name.to_lowercase().as_str())
        {
            return Err(Error::DeviceNotFound(format!(
                "no output device matching '{}'",
                name
            )));
        }
        if state.callback.is_some() {
            return Err(Error::Stream("offline stream already open".to_string()));
        }

        state.callback = Some(callback);
        state.channels = config.channels;
        state.sample_rate = config.sample_rate;
        state.streams_opened += 1;
        tracing::debug!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            "offline stream opened"
        );

        Ok(StreamHandle::new(OfflineStream {
            state: Arc::clone(&self.state),
        }))
    }
}
