//! Configuration management module
//!
//! Client configuration with its merge rules, plus settings loaded from the environment

pub mod magic;
pub mod settings;

pub use magic::{MagicConfig, DEFAULT_API_URL, DEFAULT_RETRIES};
pub use settings::{ClientSettings, LoggingConfig, Settings};
