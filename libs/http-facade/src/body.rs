use std::fmt;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::merge::flatten_pairs;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// How request parameters are encoded into the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMode {
    /// JSON document
    Json,
    /// `application/x-www-form-urlencoded` fields
    FormParams,
}

impl BodyMode {
    /// Key under which the parameters appear in the request options
    #[must_use]
    pub fn option_key(self) -> &'static str {
        match self {
            BodyMode::Json => "json",
            BodyMode::FormParams => "form_params",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            BodyMode::Json => CONTENT_TYPE_JSON,
            BodyMode::FormParams => CONTENT_TYPE_FORM,
        }
    }

    /// Mode owning the given option key, if any
    #[must_use]
    pub fn from_option_key(key: &str) -> Option<Self> {
        match key {
            "json" => Some(BodyMode::Json),
            "form_params" => Some(BodyMode::FormParams),
            _ => None,
        }
    }

    /// Serialize `value` for this mode.
    ///
    /// A form body must be a map; nested maps and arrays are flattened into
    /// bracketed keys.
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] when the value cannot be encoded.
    pub fn encode(self, value: &Value) -> Result<Bytes, ClientError> {
        match self {
            BodyMode::Json => Ok(Bytes::from(serde_json::to_vec(value)?)),
            BodyMode::FormParams => {
                let fields = match value {
                    Value::Object(fields) => flatten_pairs(fields),
                    Value::Null => Vec::new(),
                    other => {
                        return Err(ClientError::Serialization(format!(
                            "form_params must be a map, got {}",
                            kind(other)
                        )));
                    }
                };
                Ok(Bytes::from(serde_urlencoded::to_string(fields)?))
            }
        }
    }
}

impl fmt::Display for BodyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_key())
    }
}

/// Encode a map of parameters as a query string
pub(crate) fn encode_query(query: &Map<String, Value>) -> Result<String, ClientError> {
    Ok(serde_urlencoded::to_string(flatten_pairs(query))?)
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
