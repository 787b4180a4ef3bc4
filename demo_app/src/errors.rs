use demo_app_protocol::jsonrpc::{ErrorCode, ErrorData};
use thiserror::Error;

/// Errors raised while *processing* a request, which become JSON-RPC error responses.
///
/// These cover malformed protocol messages only. Tool-level problems (bad arguments, unknown tool
/// names) and unknown resource URIs are reported inside successful responses instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid request")]
    InvalidRequest,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RequestError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            RequestError::InvalidParams(_) => ErrorCode::InvalidParams,
            RequestError::InvalidRequest => ErrorCode::InvalidRequest,
            RequestError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<RequestError> for ErrorData {
    fn from(err: RequestError) -> Self {
        ErrorData::new(err.code(), err.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Internal(format!("JSON serialization error: {err}"))
    }
}
