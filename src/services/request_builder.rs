//! Request building
//!
//! Turns an effective configuration plus `returns`/`input` into a `/generate` request

use crate::config::MagicConfig;
use crate::models::{GenerateRequest, Returns, WireRequest};
use serde_json::Value;

/// Route of a generation request, suffixed by the descriptor when one is set
pub fn generate_path(descriptor: Option<&str>) -> String {
    match descriptor.filter(|d| !d.is_empty()) {
        Some(descriptor) => format!("/generate/{}", descriptor),
        None => "/generate".to_string(),
    }
}

/// Join a route onto the base URL
pub fn build_url(api_url: &str, path: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), path)
}

/// Build the `/generate` request for one attempt
pub fn build(config: &MagicConfig, returns: &Returns, input: &Value) -> WireRequest {
    WireRequest {
        path: generate_path(config.descriptor.as_deref()),
        body: GenerateRequest {
            returns: returns.clone(),
            input: input.clone(),
            openai_key: config.openai_key.clone(),
            specs: config.specs.clone(),
            examples: config.examples.clone(),
            parameters: config.parameters.clone(),
            optional_returns: config.optional_returns.clone(),
            retries: config.retries(),
        },
    }
}
