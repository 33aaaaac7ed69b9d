use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// RPC status code carried by every failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    /// The caller gave up before or during processing.
    Cancelled,
    /// Malformed input (unparseable timestamp, undecodable body).
    InvalidArgument,
    /// The requested id does not exist.
    NotFound,
    /// Backend failure or a result that could not be encoded.
    Internal,
    /// The server does not expose the requested method.
    Unimplemented,
}

/// Non-standard "client closed request" status, as used by nginx.
const CLIENT_CLOSED_REQUEST: u16 = 499;

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Cancelled => "CANCELLED",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::NotFound => "NOT_FOUND",
            Code::Internal => "INTERNAL",
            Code::Unimplemented => "UNIMPLEMENTED",
        }
    }

    /// HTTP status used when the code travels over the JSON transport.
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                .expect("499 lies in the valid status code range"),
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Best-effort reverse mapping for failures that arrive without a body.
    ///
    /// 408 comes from the server's request timeout layer, which abandons the
    /// call the same way a departing client does.
    pub fn from_http_status(status: StatusCode) -> Self {
        match status.as_u16() {
            CLIENT_CLOSED_REQUEST | 408 => Code::Cancelled,
            400 | 422 => Code::InvalidArgument,
            404 | 405 | 501 => Code::Unimplemented,
            _ => Code::Internal,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified RPC failure: a stable [`Code`] plus a human-readable
/// message naming the failing field or operation.
///
/// Serialized as `{"code": "NOT_FOUND", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

/// Convenience type alias for handler return values.
pub type RpcResult<T> = Result<T, Status>;

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The caller is no longer waiting for the response.
    pub fn cancelled() -> Self {
        Self::new(Code::Cancelled, "Client cancelled, abandoning.")
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        if self.code == Code::Internal {
            tracing::error!(error = %self.message, "RPC failed with internal error");
        }

        (self.code.http_status(), axum::Json(self)).into_response()
    }
}
