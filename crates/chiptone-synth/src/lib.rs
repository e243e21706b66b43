//! Chiptone Synth - square-wave voices and note notation for the chiptone engine
//!
//! This crate holds everything that turns tone requests into samples. It has
//! no audio I/O of its own; `chiptone-io` drives it from an output stream.
//!
//! # Core Components
//!
//! ## Effects
//!
//! Sweep effects modulate a playing tone over time:
//!
//! - [`Effect`] - Tagged effect descriptor (None, Fixed, Up, Down, Bounce)
//! - [`EffectKind`] - Flat effect selector used by callers and the CLI
//! - [`modulate`] - Offset of an effect after a number of sweep steps
//!
//! ```rust
//! use chiptone_synth::{Effect, modulate};
//!
//! let up = Effect::Up { level: 4 };
//! assert_eq!(modulate(up, 0), 0.0);
//! assert_eq!(modulate(up, 1000), 4.0);
//! ```
//!
//! ## Voices
//!
//! - [`Voice`] - One square-wave channel with its own effect and duration
//! - [`VoiceBank`] - Fixed set of voices summed into one output block
//! - [`ToneRequest`] - Everything a voice needs to start a tone
//!
//! ```rust
//! use chiptone_synth::{Effect, ToneRequest, VoiceBank};
//!
//! let mut bank: VoiceBank<5> = VoiceBank::new(22050.0);
//! bank.set(0, ToneRequest::new(440, 0, 5, Effect::None)).unwrap();
//!
//! let mut block = [0.0f32; 256];
//! bank.render(&mut block);
//! assert!(block.iter().any(|s| *s != 0.0));
//! ```
//!
//! ## Notation
//!
//! - [`parse_notation`] - Turns a note string such as `"G ^A B C"` into tokens
//! - [`NoteToken`] - One parsed note or rest with octave shift and multiplier
//!
//! ```rust
//! use chiptone_synth::parse_notation;
//!
//! let parsed = parse_notation("4C D");
//! assert_eq!(parsed.tokens.len(), 2);
//! assert_eq!(parsed.tokens[0].multiplier, 4);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! chiptone-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod bank;
pub mod effect;
pub mod error;
pub mod notation;
pub mod pitch;
pub mod voice;

pub use bank::{VOICE_COUNT, VoiceBank};
pub use effect::{
    Effect, EffectKind, MAX_EFFECT_LEVEL, STEPS_PER_LEVEL, modulate, sweep_at, sweep_steps,
};
pub use error::ToneError;
pub use notation::{
    MAX_MULTIPLIER, MalformedNotation, MalformedReason, Notation, NotationParser, NoteToken, Pitch,
    parse_notation,
};
pub use pitch::{Accidental, MAX_OCTAVE, PitchClass, note_frequency};
pub use voice::{DEFAULT_SWEEP_STEP_MS, MAX_VOLUME, ToneRequest, VOICE_GAIN, Voice};
