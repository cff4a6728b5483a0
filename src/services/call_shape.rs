//! Call shape resolution
//!
//! `generate` accepts zero to three positional arguments whose meaning depends
//! on whether the client already carries a default `returns`. This module turns
//! the raw arguments into one explicit call variant and from there into the
//! canonical `returns`/`input`/`config` triple.

use crate::config::MagicConfig;
use crate::models::Returns;
use crate::utils::error::{helpers, MagicError, MagicResult};
use serde_json::{Map, Value};
use std::fmt;

/// Positional arguments of a `generate` call, by arity
#[derive(Debug, Clone)]
pub enum CallArgs {
    None,
    One(Value),
    Two(Value, CallArg),
    Three(Value, Value, MagicConfig),
}

/// Second positional argument: input values or a per-call config
#[derive(Debug, Clone)]
pub enum CallArg {
    Value(Value),
    Config(MagicConfig),
}

impl From<()> for CallArgs {
    fn from(_: ()) -> Self {
        CallArgs::None
    }
}

impl From<Value> for CallArgs {
    fn from(value: Value) -> Self {
        CallArgs::One(value)
    }
}

impl From<Returns> for CallArgs {
    fn from(returns: Returns) -> Self {
        CallArgs::One(returns_to_value(returns))
    }
}

impl From<(Value, Value)> for CallArgs {
    fn from((first, second): (Value, Value)) -> Self {
        CallArgs::Two(first, CallArg::Value(second))
    }
}

impl From<(Value, MagicConfig)> for CallArgs {
    fn from((first, config): (Value, MagicConfig)) -> Self {
        CallArgs::Two(first, CallArg::Config(config))
    }
}

impl From<(Returns, Value)> for CallArgs {
    fn from((returns, input): (Returns, Value)) -> Self {
        CallArgs::Two(returns_to_value(returns), CallArg::Value(input))
    }
}

impl From<(Value, Value, MagicConfig)> for CallArgs {
    fn from((first, second, config): (Value, Value, MagicConfig)) -> Self {
        CallArgs::Three(first, second, config)
    }
}

impl From<(Returns, Value, MagicConfig)> for CallArgs {
    fn from((returns, input, config): (Returns, Value, MagicConfig)) -> Self {
        CallArgs::Three(returns_to_value(returns), input, config)
    }
}

fn returns_to_value(returns: Returns) -> Value {
    serde_json::to_value(returns).unwrap_or(Value::Null)
}

/// A `generate` call with every argument assigned its role
#[derive(Debug, Clone)]
pub enum ResolvedCall {
    /// No arguments, `returns` from the instance
    Predefined,
    /// `(input)`, `returns` from the instance
    InputOnly { input: Value },
    /// `(input, config)`, `returns` from the instance
    InputAndConfig { input: Value, config: MagicConfig },
    /// `(returns)`
    ReturnsOnly { returns: Returns },
    /// `(returns, input)`
    ReturnsAndInput { returns: Returns, input: Value },
    /// `(returns, input, config)`
    ReturnsInputConfig { returns: Returns, input: Value, config: MagicConfig },
}

/// Advisory for calls read under the "returns predefined" convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityWarning {
    /// A single argument was taken as `input`
    InputOnly,
    /// Two arguments were taken as `input` and `config`
    InputAndConfig,
}

impl fmt::Display for AmbiguityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityWarning::InputOnly => write!(
                f,
                "Treating the argument as `input`. To avoid misinterpreting it as `returns`, \
                 consider using `generate_for(input)` instead."
            ),
            AmbiguityWarning::InputAndConfig => write!(
                f,
                "Treating the first argument as `input` and the second as `config`, taking \
                 `returns` from `config.specs`. To avoid misinterpreting this call as having \
                 `returns` first, consider using `generate_for(input, config)` instead."
            ),
        }
    }
}

/// Canonical form of a `generate` call
#[derive(Debug, Clone)]
pub struct CallShape {
    pub returns: Returns,
    pub input: Value,
    /// Per-call override, merged over the instance configuration
    pub config: Option<MagicConfig>,
    /// Set unless the warning was suppressed
    pub warning: Option<AmbiguityWarning>,
}

/// Assign roles to the positional arguments
pub fn disambiguate(args: CallArgs, instance: &MagicConfig) -> MagicResult<ResolvedCall> {
    let predefined = instance.returns().is_some();

    match (args, predefined) {
        (CallArgs::None, true) => Ok(ResolvedCall::Predefined),
        (CallArgs::None, false) => Err(helpers::configuration_error(
            "You must either pass in a `returns` argument, or configure the client with \
             `specs: { returns: ... }`",
        )),
        (CallArgs::One(input), true) => Ok(ResolvedCall::InputOnly { input }),
        (CallArgs::One(returns), false) => Ok(ResolvedCall::ReturnsOnly {
            returns: Returns::from_value(returns)?,
        }),
        (CallArgs::Two(input, CallArg::Config(config)), true) => {
            Ok(ResolvedCall::InputAndConfig { input, config })
        }
        (CallArgs::Two(_, CallArg::Value(_)), true) => Err(helpers::configuration_error(
            "`returns` is predefined in `config.specs`, so the second argument must be a config",
        )),
        (CallArgs::Two(returns, CallArg::Value(input)), false) => Ok(ResolvedCall::ReturnsAndInput {
            returns: Returns::from_value(returns)?,
            input,
        }),
        (CallArgs::Two(_, CallArg::Config(_)), false) => Err(helpers::configuration_error(
            "No `returns` is predefined, so the call must be `(returns, input)`",
        )),
        (CallArgs::Three(..), true) => Err(redundant_returns()),
        (CallArgs::Three(returns, input, config), false) => {
            if config.returns().is_some() {
                return Err(redundant_returns());
            }
            Ok(ResolvedCall::ReturnsInputConfig {
                returns: Returns::from_value(returns)?,
                input,
                config,
            })
        }
    }
}

fn redundant_returns() -> MagicError {
    helpers::configuration_error(
        "You can't pass in `returns` twice (both as the first argument and in `config.specs.returns`)",
    )
}

impl ResolvedCall {
    /// Warning to emit for this call, if any
    ///
    /// The one-argument form consults the instance configuration; the
    /// two-argument form consults the per-call config it was handed.
    pub fn warning(&self, instance: &MagicConfig) -> Option<AmbiguityWarning> {
        match self {
            ResolvedCall::InputOnly { .. } if !instance.ignore_ambiguity_warnings() => {
                Some(AmbiguityWarning::InputOnly)
            }
            ResolvedCall::InputAndConfig { config, .. } if !config.ignore_ambiguity_warnings() => {
                Some(AmbiguityWarning::InputAndConfig)
            }
            _ => None,
        }
    }

    /// Produce the canonical triple
    pub fn into_shape(self, instance: &MagicConfig) -> MagicResult<CallShape> {
        let warning = self.warning(instance);
        let predefined = || {
            instance.returns().cloned().ok_or_else(|| {
                helpers::configuration_error("`returns` is not set in `config.specs`")
            })
        };

        let (returns, input, config) = match self {
            ResolvedCall::Predefined => (predefined()?, Value::Null, None),
            ResolvedCall::InputOnly { input } => (predefined()?, input, None),
            ResolvedCall::InputAndConfig { input, config } => (predefined()?, input, Some(config)),
            ResolvedCall::ReturnsOnly { returns } => (returns, Value::Null, None),
            ResolvedCall::ReturnsAndInput { returns, input } => (returns, input, None),
            ResolvedCall::ReturnsInputConfig { returns, input, config } => {
                (returns, input, Some(config))
            }
        };

        Ok(CallShape {
            returns,
            input: normalize_input(input),
            config,
            warning,
        })
    }
}

/// Resolve raw arguments against the instance configuration
pub fn resolve(args: CallArgs, instance: &MagicConfig) -> MagicResult<CallShape> {
    disambiguate(args, instance)?.into_shape(instance)
}

fn normalize_input(input: Value) -> Value {
    match input {
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}
