//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod notes;
pub mod parse;
pub mod tone;
