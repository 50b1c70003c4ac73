//! JSON-RPC 2.0 envelope types and line decoding.
//!
//! Every message on the wire is one JSON object. Requests are decoded in two
//! steps (syntax, then shape) so that an `id` can still be echoed back when a
//! syntactically valid message has the wrong structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes plus the server-defined range.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;

    pub const IO_ERROR: i32 = -32000;
    pub const INVALID_PATH: i32 = -32001;
    pub const PATH_NOT_ALLOWED: i32 = -32002;
    pub const EXTENSION_NOT_ALLOWED: i32 = -32003;
    pub const FILE_TOO_LARGE: i32 = -32004;
    pub const NOT_FOUND: i32 = -32005;
    pub const IS_A_DIRECTORY: i32 = -32006;
    pub const NOT_A_DIRECTORY: i32 = -32007;
    pub const DIRECTORY_NOT_EMPTY: i32 = -32008;
    pub const ALREADY_EXISTS_AS_FILE: i32 = -32009;
    pub const DESTINATION_EXISTS: i32 = -32010;
    pub const CONFLICTING_EDIT: i32 = -32011;
}

/// Caller-visible error classification.
///
/// The kind name is sent in `error.data.kind`, so it is part of the wire
/// contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPath,
    PathNotAllowed,
    ExtensionNotAllowed,
    FileTooLarge,
    NotFound,
    IsADirectory,
    NotADirectory,
    DirectoryNotEmpty,
    AlreadyExistsAsFile,
    DestinationExists,
    ConflictingEdit,
    MethodNotFound,
    InvalidParams,
    ParseError,
    IoError,
}

impl ErrorKind {
    /// Stable name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPath => "InvalidPath",
            Self::PathNotAllowed => "PathNotAllowed",
            Self::ExtensionNotAllowed => "ExtensionNotAllowed",
            Self::FileTooLarge => "FileTooLarge",
            Self::NotFound => "NotFound",
            Self::IsADirectory => "IsADirectory",
            Self::NotADirectory => "NotADirectory",
            Self::DirectoryNotEmpty => "DirectoryNotEmpty",
            Self::AlreadyExistsAsFile => "AlreadyExistsAsFile",
            Self::DestinationExists => "DestinationExists",
            Self::ConflictingEdit => "ConflictingEdit",
            Self::MethodNotFound => "MethodNotFound",
            Self::InvalidParams => "InvalidParams",
            Self::ParseError => "ParseError",
            Self::IoError => "IOError",
        }
    }

    /// JSON-RPC error code for this kind.
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            Self::InvalidPath => INVALID_PATH,
            Self::PathNotAllowed => PATH_NOT_ALLOWED,
            Self::ExtensionNotAllowed => EXTENSION_NOT_ALLOWED,
            Self::FileTooLarge => FILE_TOO_LARGE,
            Self::NotFound => NOT_FOUND,
            Self::IsADirectory => IS_A_DIRECTORY,
            Self::NotADirectory => NOT_A_DIRECTORY,
            Self::DirectoryNotEmpty => DIRECTORY_NOT_EMPTY,
            Self::AlreadyExistsAsFile => ALREADY_EXISTS_AS_FILE,
            Self::DestinationExists => DESTINATION_EXISTS,
            Self::ConflictingEdit => CONFLICTING_EDIT,
            Self::MethodNotFound => METHOD_NOT_FOUND,
            Self::InvalidParams => INVALID_PARAMS,
            Self::ParseError => PARSE_ERROR,
            Self::IoError => IO_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded JSON-RPC call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,

    /// Correlation token. `None` marks a notification; an explicit JSON
    /// `null` is kept as `Some(Value::Null)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request with the given id.
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Whether the caller expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The id to echo back, `null` when absent.
    pub fn response_id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }
}

/// JSON-RPC response. `result` and `error` are mutually exclusive by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Either the success value or the error object of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Error object for the given kind, with `data.kind` filled in.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_code(kind.code(), kind, message)
    }

    /// Error object with an explicit code but a standard kind name.
    pub fn with_code(code: i32, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(serde_json::json!({ "kind": kind.as_str() })),
        }
    }

    /// Kind name carried in `data`, if any.
    pub fn kind(&self) -> Option<&str> {
        self.data.as_ref()?.get("kind")?.as_str()
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    /// Create an error response.
    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Error(error),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::failure(
            id,
            JsonRpcError::new(ErrorKind::MethodNotFound, format!("Method not found: {method}")),
        )
    }

    /// Invalid params error.
    pub fn invalid_params(id: Value, msg: impl Into<String>) -> Self {
        Self::failure(id, JsonRpcError::new(ErrorKind::InvalidParams, msg))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Result(_) => None,
            ResponsePayload::Error(error) => Some(error),
        }
    }
}

/// A line that could not be turned into a request.
///
/// Always answerable: `id` is the recovered request id, or `null`.
#[derive(Debug, Clone)]
pub struct DecodeError {
    pub id: Value,
    pub error: JsonRpcError,
}

impl DecodeError {
    fn syntax(err: serde_json::Error) -> Self {
        Self {
            id: Value::Null,
            error: JsonRpcError::new(ErrorKind::ParseError, format!("Parse error: {err}")),
        }
    }

    /// A line whose bytes are not UTF-8. JSON text must be UTF-8, so this
    /// is a parse error even when the rest of the line is well formed.
    pub fn invalid_utf8(err: std::str::Utf8Error) -> Self {
        Self {
            id: Value::Null,
            error: JsonRpcError::new(
                ErrorKind::ParseError,
                format!("Parse error: invalid UTF-8 at byte {}", err.valid_up_to()),
            ),
        }
    }

    fn invalid(id: Value, reason: impl std::fmt::Display) -> Self {
        Self {
            id,
            error: JsonRpcError::with_code(
                error_codes::INVALID_REQUEST,
                ErrorKind::ParseError,
                format!("Invalid request: {reason}"),
            ),
        }
    }

    /// Response to send back for this failure.
    pub fn into_response(self) -> JsonRpcResponse {
        JsonRpcResponse::failure(self.id, self.error)
    }
}

/// Decode one line of text into a request.
pub fn decode_line(line: &str) -> Result<JsonRpcRequest, DecodeError> {
    let value: Value = serde_json::from_str(line.trim()).map_err(DecodeError::syntax)?;
    decode_value(value)
}

/// Decode an already-parsed JSON value into a request.
pub fn decode_value(value: Value) -> Result<JsonRpcRequest, DecodeError> {
    let Value::Object(ref object) = value else {
        return Err(DecodeError::invalid(Value::Null, "expected a JSON object"));
    };

    let id = object.get("id").cloned();
    let echo_id = match &id {
        None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Number(_)) => {
            id.clone().unwrap_or(Value::Null)
        }
        Some(_) => return Err(DecodeError::invalid(Value::Null, "id must be a string or number")),
    };

    let mut request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|e| DecodeError::invalid(echo_id.clone(), e))?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err(DecodeError::invalid(echo_id, "jsonrpc must be \"2.0\""));
    }

    // serde folds an explicit `"id": null` into `None`; keep the distinction.
    request.id = id;
    Ok(request)
}

/// Serialize a response as one newline-terminated line.
pub fn frame_response(response: &JsonRpcResponse) -> serde_json::Result<String> {
    let mut json = serde_json::to_string(response)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_valid_request() {
        let request =
            decode_line(r#"{"jsonrpc":"2.0","id":7,"method":"read_file","params":{"path":"a"}}"#)
                .unwrap();
        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.method, "read_file");
        assert_eq!(request.params, Some(json!({"path": "a"})));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_decode_notification_has_no_id() {
        let request = decode_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .unwrap();
        assert!(request.is_notification());
        assert_eq!(request.response_id(), Value::Null);
    }

    #[test]
    fn test_decode_explicit_null_id_is_not_a_notification() {
        let request = decode_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(Value::Null));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_decode_syntax_error_has_null_id() {
        let err = decode_line("{not json").unwrap_err();
        assert_eq!(err.id, Value::Null);
        assert_eq!(err.error.code, error_codes::PARSE_ERROR);
        assert_eq!(err.error.kind(), Some("ParseError"));
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let line = b"{\"path\":\"a\xff.txt\"}";
        let err = DecodeError::invalid_utf8(std::str::from_utf8(line).unwrap_err());
        assert_eq!(err.id, Value::Null);
        assert_eq!(err.error.code, error_codes::PARSE_ERROR);
        assert_eq!(err.error.kind(), Some("ParseError"));
        assert!(err.error.message.contains("byte 10"));
    }

    #[test]
    fn test_decode_bad_shape_recovers_id() {
        let err = decode_line(r#"{"jsonrpc":"2.0","id":"abc","params":{}}"#).unwrap_err();
        assert_eq!(err.id, json!("abc"));
        assert_eq!(err.error.code, error_codes::INVALID_REQUEST);
        assert_eq!(err.error.kind(), Some("ParseError"));
    }

    #[test]
    fn test_decode_wrong_version() {
        let err = decode_line(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.id, json!(3));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_line("[1,2,3]").unwrap_err();
        assert_eq!(err.id, Value::Null);
        assert_eq!(err.error.code, error_codes::INVALID_REQUEST);
    }

    #[test]
    fn test_response_shapes_are_exclusive() {
        let ok = serde_json::to_value(JsonRpcResponse::success(json!(1), json!({"x": 1}))).unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 1, "result": {"x": 1}}));
        assert!(ok.get("error").is_none());

        let err =
            serde_json::to_value(JsonRpcResponse::method_not_found(json!("q"), "foo_bar")).unwrap();
        assert_eq!(err["id"], json!("q"));
        assert_eq!(err["error"]["code"], json!(-32601));
        assert_eq!(err["error"]["data"]["kind"], json!("MethodNotFound"));
        assert!(err.get("result").is_none());
    }

    #[test]
    fn test_frame_response_is_single_line() {
        let framed = frame_response(&JsonRpcResponse::success(json!(1), json!("a\nb"))).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }

    #[test]
    fn test_error_kind_codes_are_distinct() {
        let kinds = [
            ErrorKind::InvalidPath,
            ErrorKind::PathNotAllowed,
            ErrorKind::ExtensionNotAllowed,
            ErrorKind::FileTooLarge,
            ErrorKind::NotFound,
            ErrorKind::IsADirectory,
            ErrorKind::NotADirectory,
            ErrorKind::DirectoryNotEmpty,
            ErrorKind::AlreadyExistsAsFile,
            ErrorKind::DestinationExists,
            ErrorKind::ConflictingEdit,
            ErrorKind::MethodNotFound,
            ErrorKind::InvalidParams,
            ErrorKind::ParseError,
            ErrorKind::IoError,
        ];
        let codes: std::collections::HashSet<i32> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
