//! Output shape models
//!
//! Defines the `returns` specification and the `specs` sub-object that may carry a default one

use crate::utils::error::{ErrorContext, MagicResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Requested output fields
///
/// The service accepts a single field name, an ordered list of field names,
/// or a mapping from field name to a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Returns {
    /// A single field; results are unwrapped to the bare value
    Field(String),
    /// Several fields; results stay objects
    Fields(Vec<String>),
    /// Fields with descriptions
    Described(BTreeMap<String, ReturnDescription>),
}

/// Description of one requested field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReturnDescription {
    /// Plain description text
    Text(String),
    /// Description with an optional flag
    Detailed {
        description: String,
        #[serde(default)]
        optional: bool,
    },
}

impl Returns {
    /// Parse a loosely typed positional argument
    pub fn from_value(value: Value) -> MagicResult<Self> {
        serde_json::from_value(value)
            .configuration_context("`returns` must be a string, an array of strings or an object")
    }

    /// Field name when exactly one field was requested as a plain string
    pub fn single_field(&self) -> Option<&str> {
        match self {
            Returns::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Names of all requested fields
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Returns::Field(name) => vec![name.as_str()],
            Returns::Fields(names) => names.iter().map(String::as_str).collect(),
            Returns::Described(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// An empty field name counts as "not set"
    pub fn is_blank(&self) -> bool {
        matches!(self, Returns::Field(name) if name.is_empty())
    }
}

impl From<&str> for Returns {
    fn from(name: &str) -> Self {
        Returns::Field(name.to_string())
    }
}

impl From<String> for Returns {
    fn from(name: String) -> Self {
        Returns::Field(name)
    }
}

impl From<Vec<String>> for Returns {
    fn from(names: Vec<String>) -> Self {
        Returns::Fields(names)
    }
}

impl From<Vec<&str>> for Returns {
    fn from(names: Vec<&str>) -> Self {
        Returns::Fields(names.into_iter().map(str::to_string).collect())
    }
}

impl ReturnDescription {
    pub fn description(&self) -> &str {
        match self {
            ReturnDescription::Text(text) => text,
            ReturnDescription::Detailed { description, .. } => description,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, ReturnDescription::Detailed { optional: true, .. })
    }
}

/// Generation specs
///
/// Forwarded verbatim to the service. Only `returns` is interpreted client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    /// Default output shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<Returns>,
    /// Anything else the service understands
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Specs {
    pub fn with_returns(returns: impl Into<Returns>) -> Self {
        Self {
            returns: Some(returns.into()),
            extra: Map::new(),
        }
    }

    /// The default `returns`, ignoring a blank one
    pub fn returns(&self) -> Option<&Returns> {
        self.returns.as_ref().filter(|r| !r.is_blank())
    }

    /// Combine key-by-key, `other` wins on overlap
    pub fn merge(&self, other: &Specs) -> Specs {
        let mut extra = self.extra.clone();
        for (key, value) in &other.extra {
            extra.insert(key.clone(), value.clone());
        }
        Specs {
            returns: other.returns.clone().or_else(|| self.returns.clone()),
            extra,
        }
    }
}

/// Fields the service may leave out
///
/// Serialized as a list of names, or as `true` for "all of them".
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalReturns {
    Fields(Vec<String>),
    All,
}

impl Serialize for OptionalReturns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionalReturns::Fields(names) => names.serialize(serializer),
            OptionalReturns::All => serializer.serialize_bool(true),
        }
    }
}

impl<'de> Deserialize<'de> for OptionalReturns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Fields(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(OptionalReturns::All),
            Raw::Flag(false) => Ok(OptionalReturns::Fields(Vec::new())),
            Raw::Fields(names) => Ok(OptionalReturns::Fields(names)),
        }
    }
}
