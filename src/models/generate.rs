//! Generation endpoint models
//!
//! Defines the `/generate` request body and the per-call metadata returned with every response

use super::returns::{OptionalReturns, Returns, Specs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a `/generate` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Requested output fields
    pub returns: Returns,
    /// Input values
    pub input: Value,
    /// OpenAI key forwarded to the service (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    /// Specs forwarded verbatim (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<Specs>,
    /// Few-shot examples (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    /// Model parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Fields the service may omit (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_returns: Option<OptionalReturns>,
    /// Retry budget, forwarded so the service can size its own attempts
    pub retries: u32,
}

/// A request ready to be posted: route plus body
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// Route relative to the API base URL, e.g. `/generate/summary`
    pub path: String,
    pub body: GenerateRequest,
}

/// Per-call metadata reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Approximate cost of the call in USD
    #[serde(default)]
    pub approximate_cost: f64,
    /// Tokens consumed
    #[serde(default)]
    pub token_count: u64,
}

impl Meta {
    /// Field names used for metadata in the legacy flat response shape
    pub const FIELDS: [&'static str; 2] = ["approximateCost", "tokenCount"];

    /// Read metadata from an object, defaulting missing or malformed numbers to zero
    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            approximate_cost: object
                .get("approximateCost")
                .and_then(Value::as_f64)
                .unwrap_or_default(),
            token_count: object
                .get("tokenCount")
                .and_then(|count| {
                    count
                        .as_u64()
                        .or_else(|| count.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization_skips_unset_fields() {
        let request = GenerateRequest {
            returns: Returns::from("summary"),
            input: json!({"text": "hello"}),
            openai_key: None,
            specs: None,
            examples: None,
            parameters: Map::new(),
            optional_returns: None,
            retries: 2,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "returns": "summary",
                "input": {"text": "hello"},
                "parameters": {},
                "retries": 2
            })
        );
    }

    #[test]
    fn test_meta_from_object() {
        let object = json!({"approximateCost": 0.25, "tokenCount": 120, "title": "x"});
        let meta = Meta::from_object(object.as_object().unwrap());
        assert_eq!(meta.approximate_cost, 0.25);
        assert_eq!(meta.token_count, 120);

        let meta = Meta::from_object(&Map::new());
        assert_eq!(meta, Meta::default());
    }

    #[test]
    fn test_meta_float_token_count() {
        let object = json!({"approximateCost": 0.1, "tokenCount": 12.0});
        let meta = Meta::from_object(object.as_object().unwrap());
        assert_eq!(meta.token_count, 12);
    }
}
