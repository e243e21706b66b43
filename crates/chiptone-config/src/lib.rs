//! Configuration for the chiptone engine.
//!
//! Engine settings live in a small TOML file. Every field is optional; missing
//! fields take their defaults and the result is validated before use.
//!
//! # Example
//!
//! ```rust,no_run
//! use chiptone_config::{EngineConfig, paths};
//!
//! // Explicit file
//! let config = EngineConfig::load("chiptone.toml").unwrap();
//!
//! // User config file if present, defaults otherwise
//! let config = EngineConfig::load_or_default(None).unwrap();
//! println!("config file: {}", paths::default_config_path().display());
//! ```

mod engine_config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

pub use engine_config::EngineConfig;
pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};
