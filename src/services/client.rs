//! Generation client
//!
//! `Magic` ties the pipeline together: call shape resolution, config merging,
//! request building, transport, normalization, the postprocess retry loop and
//! cost accounting.

use super::call_shape::{self, CallArg, CallArgs, CallShape};
use super::cost::{CostOwner, CostTracker};
use super::normalizer;
use super::request_builder::{self, build_url};
use super::retry;
use super::transport::{HttpTransport, Transport};
use crate::config::{MagicConfig, Settings, DEFAULT_RETRIES};
use crate::models::{Meta, Returns, RunRequest, UpvoteRequest};
use crate::utils::error::{helpers, MagicError, MagicResult};
use crate::utils::logging::create_request_log_summary;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Options for [`Magic::fork`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ForkOptions {
    /// Combine `specs` key-by-key instead of replacing them
    pub merge_specs: bool,
}

/// Generation service client
pub struct Magic {
    config: MagicConfig,
    transport: Arc<dyn Transport>,
    costs: CostTracker,
}

impl Magic {
    /// Create a client with the default HTTP transport
    pub fn new(config: MagicConfig) -> MagicResult<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()?))
    }

    /// Create a client from environment settings
    pub fn from_settings(settings: &Settings) -> MagicResult<Self> {
        let transport = HttpTransport::with_timeout(settings.client.timeout)?;
        Self::with_transport(settings.to_magic_config(), Arc::new(transport))
    }

    /// Create a client over a custom transport
    ///
    /// Spend ownership is settled here: an external cost container, when
    /// present, owns all accumulation for the lifetime of the client.
    pub fn with_transport(config: MagicConfig, transport: Arc<dyn Transport>) -> MagicResult<Self> {
        let mut config = apply_defaults(config)?;
        let costs = CostTracker::new(&config);
        config.usd_spent = None;

        debug!(
            "Client created for {} (external cost container: {})",
            config.api_url(),
            costs.owner().is_external()
        );

        Ok(Self {
            config,
            transport,
            costs,
        })
    }

    /// Construct a client and run a single generation
    pub async fn oneshot(returns: impl Into<Returns>, input: Value, config: MagicConfig) -> MagicResult<Value> {
        let returns: Returns = returns.into();
        Magic::new(config)?.generate((returns, input)).await
    }

    /// Generate a result
    ///
    /// Accepts `()`, `input` or `returns`, `(input, config)` or
    /// `(returns, input)`, and `(returns, input, config)`; see
    /// [`call_shape`](super::call_shape) for how the arguments are read.
    pub async fn generate(&self, args: impl Into<CallArgs>) -> MagicResult<Value> {
        let shape = call_shape::resolve(args.into(), &self.config)?;
        if let Some(warning) = shape.warning {
            warn!("{}", warning);
        }
        self.generate_shape(shape).await
    }

    /// Generate with the predefined `returns`, never warning about ambiguity
    pub async fn generate_for(&self, input: Value, config: Option<MagicConfig>) -> MagicResult<Value> {
        if self.config.returns().is_none() {
            return Err(helpers::configuration_error(
                "`generate_for` can only be used if `config.specs.returns` is set, either at \
                 construction or later through `config_mut()`",
            ));
        }

        let config = config.unwrap_or_default().with_ignore_ambiguity_warnings(true);
        self.generate(CallArgs::Two(input, CallArg::Config(config))).await
    }

    async fn generate_shape(&self, shape: CallShape) -> MagicResult<Value> {
        let config = self.config.merge(shape.config.as_ref());
        let request = request_builder::build(&config, &shape.returns, &shape.input);
        let url = build_url(config.api_url(), &request.path);
        let body = serde_json::to_value(&request.body)?;

        let span = info_span!("generate", request_id = %Uuid::new_v4(), path = %request.path);

        async {
            debug!("Generation request: {}", create_request_log_summary(&body));

            let url = url.as_str();
            let body = &body;
            let returns = &shape.returns;
            let always_return_object = config.always_return_object();
            let transport = &self.transport;
            let costs = &self.costs;

            let value = retry::run(
                move |attempt| async move {
                    debug!("Generation attempt {}", attempt);
                    let response = transport.post(url, body).await?;
                    let (meta, payload) = normalizer::split_meta(response)?;
                    costs.record(meta);
                    let payload = normalizer::reduce(payload, returns, always_return_object)?;
                    Ok::<_, MagicError>(payload)
                },
                config.postprocess.as_ref(),
                config.retries(),
            )
            .await?;

            info!("Generation completed, total spent ${:.6}", self.usd_spent());
            Ok::<Value, MagicError>(value)
        }
        .instrument(span)
        .await
    }

    /// Execute a stored template
    ///
    /// `parameters` are laid over the configured ones. The raw response is
    /// returned; its top-level `approximateCost`/`tokenCount` feed the cost
    /// accounting.
    pub async fn run(
        &self,
        slug: &str,
        variables: Value,
        parameters: Map<String, Value>,
        config: Option<&MagicConfig>,
    ) -> MagicResult<Value> {
        let c = self.config.merge(config);

        let mut merged_parameters = c.parameters.clone();
        merged_parameters.extend(parameters);

        let request = RunRequest {
            database_id: c.templates_database_id.clone(),
            slug: slug.to_string(),
            openai_key: c.openai_key.clone(),
            variables: if variables.is_null() { Value::Object(Map::new()) } else { variables },
            parameters: merged_parameters,
        };
        let body = serde_json::to_value(&request)?;
        let url = build_url(c.api_url(), "/run");

        let span = info_span!("run", request_id = %Uuid::new_v4(), slug = %slug);

        async {
            debug!("Run request: {}", create_request_log_summary(&body));

            let data = self.transport.post(&url, &body).await?;
            let meta = data.as_object().map(Meta::from_object).unwrap_or_default();
            self.costs.record(meta);

            info!("Template run completed, total spent ${:.6}", self.usd_spent());
            Ok::<Value, MagicError>(data)
        }
        .instrument(span)
        .await
    }

    /// Upvote a generation
    pub async fn upvote(&self, generation_id: &str, config: Option<&MagicConfig>) -> MagicResult<Value> {
        let c = self.config.merge(config);

        let request = UpvoteRequest {
            database_id: c.upvotes_database_id.clone(),
            generation_id: generation_id.to_string(),
        };
        let body = serde_json::to_value(&request)?;
        let url = build_url(c.api_url(), "/upvote");

        let span = info_span!("upvote", request_id = %Uuid::new_v4(), generation_id = %generation_id);

        async {
            let data = self.transport.post(&url, &body).await?;
            debug!("Upvote recorded");
            Ok::<Value, MagicError>(data)
        }
        .instrument(span)
        .await
    }

    /// Create a new client with `config` laid over this one's
    ///
    /// The transport is shared. An external cost container is shared too,
    /// while spend owned by this client's configuration is copied.
    pub fn fork(&self, config: MagicConfig, options: ForkOptions) -> MagicResult<Magic> {
        let mut base = self.config.clone();
        if !self.costs.owner().is_external() {
            base.usd_spent = Some(self.usd_spent());
        }

        let mut forked = base.merge(Some(&config));
        if options.merge_specs {
            forked.specs = match (&base.specs, &config.specs) {
                (Some(original), Some(overlay)) => Some(original.merge(overlay)),
                (original, overlay) => overlay.clone().or_else(|| original.clone()),
            };
        }

        Magic::with_transport(forked, self.transport.clone())
    }

    /// Instance configuration
    pub fn config(&self) -> &MagicConfig {
        &self.config
    }

    /// Mutable instance configuration
    ///
    /// Spend ownership was fixed at construction; changing
    /// `external_cost_container` or `usd_spent` here has no effect on it.
    pub fn config_mut(&mut self) -> &mut MagicConfig {
        &mut self.config
    }

    /// Total USD spent, read from whichever object owns it
    pub fn usd_spent(&self) -> f64 {
        self.costs.usd_spent()
    }

    /// Overwrite the total USD spent on whichever object owns it
    pub fn set_usd_spent(&self, value: f64) {
        self.costs.set_usd_spent(value);
    }

    /// Metadata of the last wire call
    pub fn last_meta(&self) -> Option<Meta> {
        self.costs.last_meta()
    }

    /// Object owning the spend, fixed at construction
    pub fn cost_owner(&self) -> &CostOwner {
        self.costs.owner()
    }
}

/// Fill defaults and migrate the deprecated `output_keys`
fn apply_defaults(mut config: MagicConfig) -> MagicResult<MagicConfig> {
    if let Some(output_keys) = config.output_keys.take() {
        warn!("`output_keys` is deprecated and will be removed in a future version. Please use `specs.returns` instead.");

        if config.returns().is_some() {
            return Err(helpers::configuration_error(
                "`output_keys` and `specs.returns` are both set; use `specs.returns` only",
            ));
        }
        let returns = Returns::from_value(output_keys)?;
        config = config.with_returns(returns);
    }

    config.retries.get_or_insert(DEFAULT_RETRIES);
    Ok(config)
}
