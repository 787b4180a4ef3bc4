// JSON-RPC 2.0 framing, as used by MCP.
//
// Deviations from the JSON-RPC spec:
// * Messages flow client to server only. The server never issues requests of its own.
// * `id: null` is accepted on requests (JSON-RPC permits it, MCP does not).
use serde::{de, Deserialize, Serialize};
use serde_json::Value;

/// Message ID, which according to the MCP spec must be either a number or a string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Num(u64),
    Str(String),
    /// No id (used for request errors and notifications)
    Null,
}

impl RequestId {
    #[inline]
    pub const fn null() -> Self {
        RequestId::Null
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, RequestId::Null)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Num(n) => write!(f, "{n}"),
            RequestId::Str(s) => write!(f, "{s}"),
            RequestId::Null => f.write_str("null"),
        }
    }
}

/// Protocol version marker. Only "2.0" is accepted.
#[derive(Debug, PartialEq, Clone, Copy, Hash, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JsonRpcVersion {
    V2,
}

impl TryFrom<String> for JsonRpcVersion {
    type Error = serde::de::value::Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "2.0" => Ok(JsonRpcVersion::V2),
            _ => Err(de::Error::custom("not a valid JSON-RPC 2.0 message")),
        }
    }
}

impl From<JsonRpcVersion> for String {
    fn from(version: JsonRpcVersion) -> Self {
        match version {
            JsonRpcVersion::V2 => "2.0".to_string(),
        }
    }
}

/// Structured parameters which may be included in a request or notification.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Params {
    Array(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl TryFrom<Value> for Params {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(vec) => Ok(Params::Array(vec)),
            Value::Object(map) => Ok(Params::Map(map)),
            other => Err(de::Error::custom(format!(
                "JSON-RPC params must be either an array or object, got {other}"
            ))),
        }
    }
}

/// An RPC method call (known in the JSON-RPC spec as a "request").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MethodCall {
    jsonrpc: JsonRpcVersion,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl MethodCall {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            id,
            method: method.into(),
            params,
        }
    }
}

/// A message without an `id`. The server never answers these.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    jsonrpc: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            method: method.into(),
            params,
        }
    }
}

/// A single JSON-RPC message.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SendableMessage {
    Request(MethodCall),
    Notification(Notification),
    /// Well-formed JSON that isn't a valid message. The id is kept when it can be recovered.
    Invalid {
        #[serde(default = "RequestId::null")]
        id: RequestId,
    },
}

impl SendableMessage {
    pub fn method(&self) -> Option<&str> {
        match self {
            SendableMessage::Request(call) => Some(&call.method),
            SendableMessage::Notification(note) => Some(&note.method),
            SendableMessage::Invalid { .. } => None,
        }
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            SendableMessage::Request(call) => Some(&call.id),
            SendableMessage::Invalid { id } => Some(id),
            SendableMessage::Notification(_) => None,
        }
    }
}

impl From<MethodCall> for SendableMessage {
    fn from(request: MethodCall) -> Self {
        SendableMessage::Request(request)
    }
}

impl From<Notification> for SendableMessage {
    fn from(notification: Notification) -> Self {
        SendableMessage::Notification(notification)
    }
}

impl<'de> Deserialize<'de> for SendableMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if let Ok(call) = MethodCall::deserialize(&value) {
            return Ok(SendableMessage::Request(call));
        }
        if let Ok(note) = Notification::deserialize(&value) {
            return Ok(SendableMessage::Notification(note));
        }

        let id = value
            .as_object()
            .and_then(|map| map.get("id"))
            .and_then(|id| RequestId::deserialize(id).ok())
            .unwrap_or_else(RequestId::null);
        Ok(SendableMessage::Invalid { id })
    }
}

/// Everything read from one line of the transport: a single message or a batch.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Request {
    Single(SendableMessage),
    Batch(Vec<SendableMessage>),
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(SendableMessage::deserialize)
                .collect::<Result<Vec<_>, _>>()
                .map(Request::Batch)
                .map_err(de::Error::custom),
            other => SendableMessage::deserialize(other)
                .map(Request::Single)
                .map_err(de::Error::custom),
        }
    }
}

/// What gets written back for one `Request`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Single(Option<ResponseItem>),
    Batch(Vec<ResponseItem>),
}

impl Response {
    pub fn is_empty(&self) -> bool {
        match self {
            Response::Single(item) => item.is_none(),
            Response::Batch(items) => items.is_empty(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum ResponseItem {
    Success {
        jsonrpc: JsonRpcVersion,
        id: RequestId,
        result: Value,
    },
    Error {
        jsonrpc: JsonRpcVersion,
        id: RequestId,
        error: ErrorData,
    },
}

impl ResponseItem {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Success {
            jsonrpc: JsonRpcVersion::V2,
            id,
            result,
        }
    }

    pub fn error(id: RequestId, error: ErrorData) -> Self {
        Self::Error {
            jsonrpc: JsonRpcVersion::V2,
            id,
            error,
        }
    }

    pub fn id(&self) -> &RequestId {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id,
        }
    }
}

/// Standard JSON-RPC error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist / is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
    /// Custom, implementation-defined server errors.
    Custom(i32),
}

impl ErrorCode {
    pub const fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Custom(code) => *code,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            other => Self::Custom(other),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(ErrorCode::from)
    }
}

/// Error information for JSON-RPC error responses.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorData {
    pub code: ErrorCode,

    /// A short description of the error. The message SHOULD be limited to a concise single sentence.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorData {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_round_trip_through_json() {
        let ids: Vec<RequestId> = serde_json::from_str(r#"[null, 7, "abc"]"#).unwrap();
        assert_eq!(
            ids,
            vec![RequestId::Null, RequestId::Num(7), RequestId::Str("abc".into())]
        );
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[null,7,"abc"]"#);
    }

    #[test]
    fn method_call_serialises_without_params() {
        let call = MethodCall::new(RequestId::Num(1), "tools/list", None);
        assert_eq!(
            serde_json::to_string(&call).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#
        );
    }

    #[test]
    fn message_kinds_are_distinguished() {
        let msg: SendableMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#).unwrap();
        assert!(matches!(msg, SendableMessage::Request(_)));
        assert_eq!(msg.method(), Some("ping"));

        let msg: SendableMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(matches!(msg, SendableMessage::Notification(_)));
        assert_eq!(msg.id(), None);
    }

    #[test]
    fn wrong_version_is_invalid_but_keeps_id() {
        let msg: SendableMessage =
            serde_json::from_str(r#"{"jsonrpc":"1.0","id":4,"method":"ping"}"#).unwrap();
        assert_eq!(
            msg,
            SendableMessage::Invalid {
                id: RequestId::Num(4)
            }
        );

        let err = serde_json::from_str::<MethodCall>(r#"{"jsonrpc":"1.0","id":1,"method":"x"}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("not a valid JSON-RPC 2.0 message"));
    }

    #[test]
    fn batches_decode_element_by_element() {
        let request: Request = serde_json::from_str(
            r#"[{"jsonrpc":"2.0","id":1,"method":"tools/list"}, {"jsonrpc":"2.0","method":"n"}, 3]"#,
        )
        .unwrap();
        let Request::Batch(messages) = request else {
            panic!("expected a batch");
        };
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], SendableMessage::Request(_)));
        assert!(matches!(messages[1], SendableMessage::Notification(_)));
        assert_eq!(messages[2], SendableMessage::Invalid { id: RequestId::Null });
    }

    #[test]
    fn error_response_wire_shape() {
        let item = ResponseItem::error(
            RequestId::Num(42),
            ErrorData::new(ErrorCode::MethodNotFound, "Method not found: foo"),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            json!({"jsonrpc": "2.0", "id": 42, "error": {"code": -32601, "message": "Method not found: foo"}})
        );
        let back: ResponseItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
        assert_eq!(back.id(), &RequestId::Num(42));
    }

    #[test]
    fn unknown_codes_are_custom() {
        assert_eq!(ErrorCode::from(-32000), ErrorCode::Custom(-32000));
        assert_eq!(ErrorCode::from(-32602), ErrorCode::InvalidParams);
    }

    #[test]
    fn empty_responses() {
        assert!(Response::Single(None).is_empty());
        assert!(Response::Batch(vec![]).is_empty());
        assert!(!Response::Single(Some(ResponseItem::success(RequestId::Num(1), json!({})))).is_empty());
    }
}
