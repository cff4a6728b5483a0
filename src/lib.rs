//! Magic Client Library
//! 
//! Client for a remote structured-data generation service: describe the
//! output shape, pass input values, get normalized results back while the
//! client keeps track of cost and retries unusable generations.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{MagicConfig, Settings};
pub use models::{Meta, OptionalReturns, Returns, Specs};
pub use services::{
    CallArgs, CostContainer, ForkOptions, HttpTransport, Magic, Postprocess, PostprocessOutcome, Transport,
};
pub use utils::error::{MagicError, MagicResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
