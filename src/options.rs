//! Validated option bags for managers and operations.
//!
//! Higher layers in the cache interface family hand drivers a free-form
//! "meta" mapping. Instead of passing that through opaquely, the accepted
//! fields are spelled out here and everything else is rejected at the
//! boundary: unknown fields, mistyped fields, and non-mapping input are all
//! local `InvalidOptions` errors raised before the client is touched.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Options bound into a manager at creation time.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerOptions {
    /// Extra client construction options applied on top of the parsed
    /// connection string.
    #[serde(default)]
    pub client_options: Option<ClientOptions>,
}

/// Overrides applied to the parsed connection info before the client is
/// built. Fields left unset keep whatever the connection string said.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientOptions {
    /// Password override (the original driver accepted this as an
    /// alternative to encoding credentials in the connection string).
    #[serde(default)]
    pub password: Option<String>,

    /// Logical database index override.
    #[serde(default)]
    pub db: Option<i64>,
}

/// Options for a cache flush.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlushOptions {
    /// Logical database to flush. When unset, the connection's currently
    /// selected database is flushed.
    #[serde(default)]
    pub db: Option<i64>,
}

fn from_mapping<T: for<'de> Deserialize<'de>>(what: &str, value: Value) -> Result<T> {
    if !value.is_object() {
        return Err(Error::InvalidOptions(format!(
            "{} must be a mapping, got {}",
            what,
            json_type_name(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidOptions(format!("{}: {}", what, e)))
}

impl ManagerOptions {
    /// Parse a loosely-typed options bag, rejecting anything that is not a
    /// mapping of the known fields.
    pub fn from_value(value: Value) -> Result<Self> {
        from_mapping("manager options", value)
    }
}

impl FlushOptions {
    /// Parse a loosely-typed options bag for a flush.
    pub fn from_value(value: Value) -> Result<Self> {
        from_mapping("flush options", value)
    }
}

/// Human-readable name of a JSON value's shape, for validation messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
