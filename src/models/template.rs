//! Template and feedback endpoint models
//!
//! Bodies for `/run` (stored template execution) and `/upvote`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a `/run` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Templates database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    /// Template slug
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    /// Template variables
    pub variables: Value,
    /// Model parameters
    pub parameters: Map<String, Value>,
}

/// Body of an `/upvote` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteRequest {
    /// Upvotes database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    pub generation_id: String,
}
