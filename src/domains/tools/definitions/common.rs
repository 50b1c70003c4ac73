//! Helpers shared by the method definitions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::domains::tools::ToolError;

/// Encoding of a `content` string on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Plain UTF-8 text.
    #[default]
    Utf8,
    /// Standard base64, for binary content.
    Base64,
}

impl Encoding {
    /// Decode wire content into raw bytes.
    pub fn decode(self, content: &str) -> Result<Vec<u8>, ToolError> {
        match self {
            Self::Utf8 => Ok(content.as_bytes().to_vec()),
            Self::Base64 => STANDARD
                .decode(content)
                .map_err(|e| ToolError::invalid_params(format!("content is not valid base64: {e}"))),
        }
    }

    pub fn encode_binary(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }
}

/// Deserialize method params; absent params count as `{}`.
pub fn parse_params<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::invalid_params(e.to_string()))
}

/// Serialize a method result.
pub fn to_result<T: Serialize>(result: &T) -> Result<Value, ToolError> {
    serde_json::to_value(result).map_err(|e| {
        error!("Failed to serialize result: {}", e);
        ToolError::Internal
    })
}

/// Reject line numbers below 1 and inverted ranges.
pub fn validate_line_range(start: Option<usize>, end: Option<usize>) -> Result<(), ToolError> {
    if start == Some(0) || end == Some(0) {
        return Err(ToolError::invalid_params("line numbers start at 1"));
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ToolError::invalid_params("end_line must not be before start_line"));
        }
    }
    Ok(())
}
