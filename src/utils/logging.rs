//! Logging utilities
//!
//! Subscriber setup and request summaries for debug logs

use crate::config::LoggingConfig;
use serde_json::Value;

/// Set to true to include full request bodies in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

const MAX_STRING_LEN: usize = 200;

/// Install the global tracing subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!("Logging system initialized");
    Ok(())
}

/// Truncate a string with a note about original length
fn truncate_content(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", kept, s.chars().count() - max_len)
    } else {
        s.to_string()
    }
}

fn truncate_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(truncate_content(s, MAX_STRING_LEN)),
        Value::Array(items) => Value::Array(items.iter().map(truncate_strings).collect()),
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, value)| (key.clone(), truncate_strings(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Create a summary of a request body for logging
///
/// The OpenAI key is always masked. Long strings are truncated and examples
/// are collapsed to a count unless verbose logging is enabled.
pub fn create_request_log_summary(body: &Value) -> Value {
    let mut summary = if VERBOSE_REQUEST_LOGGING {
        body.clone()
    } else {
        truncate_strings(body)
    };

    if let Some(object) = summary.as_object_mut() {
        if object.get("openaiKey").map_or(false, |key| !key.is_null()) {
            object.insert("openaiKey".to_string(), Value::String("[redacted]".to_string()));
        }
        if !VERBOSE_REQUEST_LOGGING {
            if let Some(Value::Array(examples)) = object.get("examples") {
                let collapsed = Value::String(format!("[...{} examples]", examples.len()));
                object.insert("examples".to_string(), collapsed);
            }
        }
    }

    summary
}
