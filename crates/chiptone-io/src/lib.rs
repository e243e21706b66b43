//! Audio output and tone engine for chiptone.
//!
//! This crate provides:
//!
//! - **Tone engine**: [`ToneEngine`] with `init`, `close`, `play_tone` and
//!   `play_notes`
//! - **Sequencing**: [`Sequencer`] plays parsed note strings through any
//!   [`ToneTarget`]
//! - **Backends**: [`CpalBackend`] for real output, [`OfflineBackend`] for
//!   pull-driven rendering without hardware
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chiptone_config::EngineConfig;
//! use chiptone_io::ToneEngine;
//! use chiptone_synth::Effect;
//!
//! let engine = ToneEngine::with_cpal(EngineConfig::default())?;
//! engine.init()?;
//!
//! // Rising "laser" on voice 1 for two seconds
//! engine.play_tone(1, 880, 2000, 6, Effect::Up { level: 6 })?;
//!
//! // Blocks until the melody ends
//! engine.play_notes(200, 5, "G ^A B C D E F# G")?;
//! engine.close()?;
//! ```

pub mod backend;
pub mod cpal_backend;
mod engine;
mod offline;
mod sequencer;
mod stream;

pub use backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use engine::{EngineState, MAX_INCREMENT_MS, MIN_INCREMENT_MS, ToneEngine};
pub use offline::OfflineBackend;
pub use sequencer::{PlayReport, Sequencer, ToneTarget};
pub use stream::{AudioDevice, default_device, list_devices};

use chiptone_config::ConfigError;
use chiptone_synth::ToneError;

/// Error types for the tone engine and audio output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tone was requested before `init`.
    #[error("engine not initialized")]
    NotInitialized,

    /// The engine was closed and cannot be used again.
    #[error("engine already closed")]
    AlreadyClosed,

    /// Voice index or tone parameter out of range.
    #[error(transparent)]
    Tone(#[from] ToneError),

    /// The output sink could not be opened.
    #[error("audio output unavailable: {0}")]
    SinkUnavailable(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// Engine configuration rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
