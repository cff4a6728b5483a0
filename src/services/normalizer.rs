//! Response normalization
//!
//! Reduces the two response shapes the service produces to one caller-facing value:
//!
//! - wrapped: `{"_meta": {"approximateCost", "tokenCount"}, "choices": [...]}`
//! - legacy: `{"approximateCost", "tokenCount", ...values}`

use crate::models::{Meta, Returns};
use crate::utils::error::{helpers, MagicResult};
use serde_json::{Map, Value};

/// Key of the metadata object in wrapped responses and in result elements
pub const META_KEY: &str = "_meta";

const CHOICES_KEY: &str = "choices";

/// Result payload, one value or one per choice
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Single(Value),
    Many(Vec<Value>),
}

impl Payload {
    pub fn into_value(self) -> Value {
        match self {
            Payload::Single(value) => value,
            Payload::Many(values) => Value::Array(values),
        }
    }

    fn map<F>(self, mut f: F) -> MagicResult<Payload>
    where
        F: FnMut(Value) -> MagicResult<Value>,
    {
        Ok(match self {
            Payload::Single(value) => Payload::Single(f(value)?),
            Payload::Many(values) => Payload::Many(values.into_iter().map(f).collect::<MagicResult<_>>()?),
        })
    }
}

/// Normalized response
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub payload: Payload,
    pub meta: Meta,
}

/// Normalize a `/generate` response
pub fn normalize(response: Value, returns: &Returns, always_return_object: bool) -> MagicResult<Normalized> {
    let (meta, payload) = split_meta(response)?;
    let payload = reduce(payload, returns, always_return_object)?;
    Ok(Normalized { payload, meta })
}

/// Separate the call metadata from the raw payload
///
/// Fails only on a malformed response, never on payload contents.
pub fn split_meta(response: Value) -> MagicResult<(Meta, Payload)> {
    let mut object = match response {
        Value::Object(object) => object,
        other => {
            return Err(helpers::unexpected_response(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            )))
        }
    };

    match object.remove(META_KEY) {
        Some(Value::Object(meta)) => {
            let meta = Meta::from_object(&meta);
            let payload = match object.remove(CHOICES_KEY) {
                Some(Value::Array(choices)) => Payload::Many(choices),
                Some(choice) => Payload::Single(choice),
                None => Payload::Single(Value::Object(object)),
            };
            Ok((meta, payload))
        }
        Some(other) => Err(helpers::unexpected_response(format!(
            "`_meta` must be an object, got {}",
            type_name(&other)
        ))),
        None => {
            let meta = Meta::from_object(&object);
            for field in Meta::FIELDS {
                object.remove(field);
            }
            Ok((meta, legacy_payload(object)))
        }
    }
}

/// Reduce a raw payload to the caller-facing shape
///
/// Single-field results are unwrapped to their value unless
/// `always_return_object` is set.
pub fn reduce(payload: Payload, returns: &Returns, always_return_object: bool) -> MagicResult<Payload> {
    match returns.single_field() {
        Some(field) if !always_return_object => payload.map(|value| unwrap_only_value(field, value)),
        _ => Ok(payload),
    }
}

/// A legacy remainder made only of a `choices` array is that array
fn legacy_payload(mut object: Map<String, Value>) -> Payload {
    if object.len() == 1 && matches!(object.get(CHOICES_KEY), Some(Value::Array(_))) {
        if let Some(Value::Array(choices)) = object.remove(CHOICES_KEY) {
            return Payload::Many(choices);
        }
    }
    Payload::Single(Value::Object(object))
}

/// Reduce a single-field result object to its value
///
/// The service re-cases field names, so the value is taken from the one and
/// only key rather than looked up by name. When extra keys are present the
/// key matching the field up to case and punctuation is used; with no such
/// key the response is rejected.
pub fn unwrap_only_value(field: &str, value: Value) -> MagicResult<Value> {
    let mut object = match value {
        Value::Object(object) => object,
        scalar => return Ok(scalar),
    };
    object.remove(META_KEY);

    if object.len() == 1 {
        return Ok(object.into_iter().next().map(|(_, only)| only).unwrap_or(Value::Null));
    }

    if object.is_empty() {
        return Err(helpers::unexpected_response(format!(
            "result for `{}` is an empty object",
            field
        )));
    }

    let wanted = fold_key(field);
    let matching: Vec<String> = object
        .keys()
        .filter(|key| fold_key(key) == wanted)
        .cloned()
        .collect();

    match matching.as_slice() {
        [key] => Ok(object.remove(key).unwrap_or(Value::Null)),
        _ => Err(helpers::unexpected_response(format!(
            "result for `{}` has {} keys ({}) and none identifies the field",
            field,
            object.len(),
            object.keys().cloned().collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
