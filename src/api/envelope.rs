//! The `{ok, result}` wrapper every endpoint responds with.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::error::ErrorCode;

/// Outcome of a request as seen by clients.
///
/// Serializes to `{"ok":"true","result":<T>}` or
/// `{"ok":"false","result":"<CODE>"}`. `ok` is a string, not a boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// Successful result.
    Ok(T),
    /// Client-visible failure.
    Err(ErrorCode),
}

impl<T> Envelope<T> {
    /// HTTP status for this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            Envelope::Ok(_) => StatusCode::OK,
            Envelope::Err(code) => code.status(),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Envelope::Ok(result) => {
                envelope.serialize_field("ok", "true")?;
                envelope.serialize_field("result", result)?;
            }
            Envelope::Err(code) => {
                envelope.serialize_field("ok", "false")?;
                envelope.serialize_field("result", code)?;
            }
        }
        envelope.end()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl ErrorCode {
    /// HTTP status the code is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::ApiKeyNotFound | ErrorCode::ApiKeyInvalid => StatusCode::NOT_FOUND,
            ErrorCode::RuntimeUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}
