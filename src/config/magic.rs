//! Client configuration
//!
//! `MagicConfig` is both the instance configuration and the per-call override.
//! Every field is optional so that an override only replaces what it sets.

use crate::models::{OptionalReturns, Returns, Specs};
use crate::services::cost::CostContainer;
use crate::services::retry::{Postprocess, PostprocessOutcome};
use serde_json::{Map, Value};

/// Fallback base URL of the generation service
pub const DEFAULT_API_URL: &str = "https://ideality.app/api/polygon";

/// Default postprocess retry budget
pub const DEFAULT_RETRIES: u32 = 2;

/// Generation client configuration
#[derive(Debug, Clone, Default)]
pub struct MagicConfig {
    /// Service base URL
    pub api_url: Option<String>,
    /// OpenAI key forwarded to the service
    pub openai_key: Option<String>,
    /// Database holding templates for `run`
    pub templates_database_id: Option<String>,
    /// Database receiving upvotes
    pub upvotes_database_id: Option<String>,
    /// Model parameters, merged key-by-key
    pub parameters: Map<String, Value>,
    /// Specs, possibly carrying a default `returns`
    pub specs: Option<Specs>,
    /// Few-shot examples
    pub examples: Option<Vec<Value>>,
    /// Postprocess retry budget
    pub retries: Option<u32>,
    /// Keep single-field results wrapped in an object
    pub always_return_object: Option<bool>,
    /// Fields the service may omit
    pub optional_returns: Option<OptionalReturns>,
    /// Validation/transformation applied to every result
    pub postprocess: Option<Postprocess>,
    /// Named generation endpoint
    pub descriptor: Option<String>,
    /// Silence the ambiguous-call warning
    pub ignore_ambiguity_warnings: Option<bool>,
    /// Spend recorded on this configuration
    pub usd_spent: Option<f64>,
    /// Shared spend owner, replaces `usd_spent` when present
    pub external_cost_container: Option<CostContainer>,
    /// Deprecated spelling of `specs.returns`
    pub output_keys: Option<Value>,
}

impl MagicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `overlay` on top of `self`
    ///
    /// Fields set on the overlay replace the base value. `parameters` is the
    /// exception and is merged key-by-key with the overlay winning. `self` is
    /// left untouched.
    pub fn merge(&self, overlay: Option<&MagicConfig>) -> MagicConfig {
        let Some(overlay) = overlay else {
            return self.clone();
        };

        let mut parameters = self.parameters.clone();
        for (key, value) in &overlay.parameters {
            parameters.insert(key.clone(), value.clone());
        }

        MagicConfig {
            api_url: overlay.api_url.clone().or_else(|| self.api_url.clone()),
            openai_key: overlay.openai_key.clone().or_else(|| self.openai_key.clone()),
            templates_database_id: overlay
                .templates_database_id
                .clone()
                .or_else(|| self.templates_database_id.clone()),
            upvotes_database_id: overlay
                .upvotes_database_id
                .clone()
                .or_else(|| self.upvotes_database_id.clone()),
            parameters,
            specs: overlay.specs.clone().or_else(|| self.specs.clone()),
            examples: overlay.examples.clone().or_else(|| self.examples.clone()),
            retries: overlay.retries.or(self.retries),
            always_return_object: overlay.always_return_object.or(self.always_return_object),
            optional_returns: overlay
                .optional_returns
                .clone()
                .or_else(|| self.optional_returns.clone()),
            postprocess: overlay.postprocess.clone().or_else(|| self.postprocess.clone()),
            descriptor: overlay.descriptor.clone().or_else(|| self.descriptor.clone()),
            ignore_ambiguity_warnings: overlay
                .ignore_ambiguity_warnings
                .or(self.ignore_ambiguity_warnings),
            usd_spent: overlay.usd_spent.or(self.usd_spent),
            external_cost_container: overlay
                .external_cost_container
                .clone()
                .or_else(|| self.external_cost_container.clone()),
            output_keys: overlay.output_keys.clone().or_else(|| self.output_keys.clone()),
        }
    }

    /// Default `returns` carried by `specs`
    pub fn returns(&self) -> Option<&Returns> {
        self.specs.as_ref().and_then(Specs::returns)
    }

    /// Effective base URL
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Effective retry budget
    pub fn retries(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }

    pub fn always_return_object(&self) -> bool {
        self.always_return_object.unwrap_or(false)
    }

    pub fn ignore_ambiguity_warnings(&self) -> bool {
        self.ignore_ambiguity_warnings.unwrap_or(false)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = Some(key.into());
        self
    }

    pub fn with_templates_database_id(mut self, id: impl Into<String>) -> Self {
        self.templates_database_id = Some(id.into());
        self
    }

    pub fn with_upvotes_database_id(mut self, id: impl Into<String>) -> Self {
        self.upvotes_database_id = Some(id.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_specs(mut self, specs: Specs) -> Self {
        self.specs = Some(specs);
        self
    }

    /// Shorthand for `specs: { returns }`, keeping other spec keys
    pub fn with_returns(mut self, returns: impl Into<Returns>) -> Self {
        let mut specs = self.specs.take().unwrap_or_default();
        specs.returns = Some(returns.into());
        self.specs = Some(specs);
        self
    }

    pub fn with_examples(mut self, examples: Vec<Value>) -> Self {
        self.examples = Some(examples);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_always_return_object(mut self, enabled: bool) -> Self {
        self.always_return_object = Some(enabled);
        self
    }

    pub fn with_optional_returns(mut self, optional: OptionalReturns) -> Self {
        self.optional_returns = Some(optional);
        self
    }

    pub fn with_postprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> PostprocessOutcome + Send + Sync + 'static,
    {
        self.postprocess = Some(Postprocess::new(f));
        self
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    pub fn with_ignore_ambiguity_warnings(mut self, ignore: bool) -> Self {
        self.ignore_ambiguity_warnings = Some(ignore);
        self
    }

    pub fn with_usd_spent(mut self, usd_spent: f64) -> Self {
        self.usd_spent = Some(usd_spent);
        self
    }

    pub fn with_external_cost_container(mut self, container: CostContainer) -> Self {
        self.external_cost_container = Some(container);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_set_fields_only() {
        let base = MagicConfig::new()
            .with_api_url("https://base.example.com")
            .with_openai_key("sk-base")
            .with_retries(5)
            .with_descriptor("summary");
        let overlay = MagicConfig::new().with_openai_key("sk-call").with_retries(0);

        let merged = base.merge(Some(&overlay));
        assert_eq!(merged.api_url(), "https://base.example.com");
        assert_eq!(merged.openai_key.as_deref(), Some("sk-call"));
        assert_eq!(merged.retries(), 0);
        assert_eq!(merged.descriptor.as_deref(), Some("summary"));

        // base untouched
        assert_eq!(base.openai_key.as_deref(), Some("sk-base"));
        assert_eq!(base.retries(), 5);
    }

    #[test]
    fn test_merge_parameters_key_by_key() {
        let base = MagicConfig::new()
            .with_parameter("temperature", json!(0.2))
            .with_parameter("max_tokens", json!(100));
        let overlay = MagicConfig::new().with_parameter("temperature", json!(0.9));

        let merged = base.merge(Some(&overlay));
        assert_eq!(merged.parameters["temperature"], json!(0.9));
        assert_eq!(merged.parameters["max_tokens"], json!(100));
    }

    #[test]
    fn test_merge_replaces_specs_wholesale() {
        let mut specs = Specs::with_returns("x");
        specs.extra.insert("tone".to_string(), json!("formal"));
        let base = MagicConfig::new().with_specs(specs);
        let overlay = MagicConfig::new().with_returns("y");

        let merged = base.merge(Some(&overlay));
        let merged_specs = merged.specs.unwrap();
        assert_eq!(merged_specs.returns(), Some(&Returns::from("y")));
        assert!(merged_specs.extra.is_empty());
    }

    #[test]
    fn test_merge_without_overlay() {
        let base = MagicConfig::new().with_retries(3);
        assert_eq!(base.merge(None).retries(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = MagicConfig::new();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.retries(), DEFAULT_RETRIES);
        assert!(!config.always_return_object());
        assert!(!config.ignore_ambiguity_warnings());
        assert!(config.returns().is_none());
    }
}
