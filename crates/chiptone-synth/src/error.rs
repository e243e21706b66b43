//! Error types for tone requests.

use thiserror::Error;

/// Errors raised when a tone request is rejected.
///
/// A rejected request never touches voice state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToneError {
    /// Voice index outside `0..count`.
    #[error("voice {voice} out of range (engine has {count} voices)")]
    VoiceOutOfRange {
        /// Requested voice index.
        voice: usize,
        /// Number of voices available.
        count: usize,
    },

    /// A numeric parameter outside its documented bounds.
    #[error("{name} = {value} out of range ({min}..={max})")]
    InvalidParameter {
        /// Parameter name as the caller knows it.
        name: &'static str,
        /// Value that was supplied.
        value: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
}

impl ToneError {
    /// Check `value` against `min..=max`, naming the parameter on failure.
    pub fn check_range(name: &'static str, value: u32, min: u32, max: u32) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ToneError::InvalidParameter {
                name,
                value,
                min,
                max,
            })
        }
    }
}
