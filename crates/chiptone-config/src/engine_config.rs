//! Engine configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use chiptone_synth::{DEFAULT_SWEEP_STEP_MS, MAX_OCTAVE, VOICE_COUNT};

use crate::error::ConfigError;
use crate::paths::default_config_path;

/// Runtime settings for the tone engine.
///
/// Every field has a default, so an empty file is a valid config.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100
/// buffer_size = 256
/// channels = 2
/// device = "USB Audio"
/// sweep_step_ms = 10
/// base_octave = 2
/// default_voice = 0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Requested output sample rate in Hz. The device may run at another rate.
    pub sample_rate: u32,

    /// Output buffer size in frames.
    pub buffer_size: u32,

    /// Output channel count. The mono mix is written to every channel.
    pub channels: u16,

    /// Output device name (fuzzy match). `None` uses the system default.
    #[serde(rename = "device", skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Length of one effect sweep step in milliseconds.
    pub sweep_step_ms: u32,

    /// Octave that unshifted notes in note notation play in.
    pub base_octave: u8,

    /// Voice used for note sequences.
    pub default_voice: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            channels: 2,
            device_name: None,
            sweep_step_ms: DEFAULT_SWEEP_STEP_MS,
            base_octave: 0,
            default_voice: 0,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise from the user config file if it
    /// exists, otherwise return defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!("{} is outside 8000..=192000", self.sample_rate),
            ));
        }
        if !(16..=8192).contains(&self.buffer_size) {
            return Err(ConfigError::invalid(
                "buffer_size",
                format!("{} is outside 16..=8192", self.buffer_size),
            ));
        }
        if self.channels == 0 {
            return Err(ConfigError::invalid("channels", "must be at least 1"));
        }
        if !(1..=1000).contains(&self.sweep_step_ms) {
            return Err(ConfigError::invalid(
                "sweep_step_ms",
                format!("{} is outside 1..=1000", self.sweep_step_ms),
            ));
        }
        if self.base_octave > MAX_OCTAVE {
            return Err(ConfigError::invalid(
                "base_octave",
                format!("{} is above {MAX_OCTAVE}", self.base_octave),
            ));
        }
        if self.default_voice >= VOICE_COUNT {
            return Err(ConfigError::invalid(
                "default_voice",
                format!("{} is not below {VOICE_COUNT}", self.default_voice),
            ));
        }
        Ok(())
    }

    /// Set the requested sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the output device name.
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep_step_ms, 10);
        assert_eq!(config.default_voice, 0);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml("sample_rate = 22050\ndevice = \"USB\"").unwrap();
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.device_name.as_deref(), Some("USB"));
        assert_eq!(config.buffer_size, 512);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let err = EngineConfig::from_toml("sample_rate = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sample_rate",
                ..
            }
        ));
    }

    #[test]
    fn default_voice_out_of_range_rejected() {
        let toml = format!("default_voice = {VOICE_COUNT}");
        let err = EngineConfig::from_toml(&toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_voice",
                ..
            }
        ));
    }

    #[test]
    fn other_fields_validated() {
        for toml in [
            "buffer_size = 1",
            "channels = 0",
            "sweep_step_ms = 0",
            "base_octave = 99",
        ] {
            assert!(EngineConfig::from_toml(toml).is_err(), "{toml} accepted");
        }
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = EngineConfig::from_toml("sample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn builders() {
        let config = EngineConfig::default()
            .with_sample_rate(44100)
            .with_device("Speakers");
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.device_name.as_deref(), Some("Speakers"));
    }
}
