//! Handler error types and the injectable error sink

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by handler hooks and serialization
#[derive(Error, Debug)]
pub enum HandlerError {
    /// No descriptor matches the request; hooks return this to signal
    /// a clean miss rather than a failure
    #[error("descriptor not found")]
    DescriptorNotFound,

    /// A resolver or provider hook failed
    #[error("resolver error: {0}")]
    Resolver(String),

    /// JSON serialization of a response body failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Serialization(err.to_string())
    }
}

/// Renders handler errors into HTTP responses.
///
/// Every handler holds a sink from construction time; there is no lazy
/// default installation on the request path.
pub trait ErrorSink: Send + Sync {
    /// Convert an error into the response written to the client
    fn handle(&self, err: &HandlerError) -> Response;
}

/// The default sink: `500 Internal Server Error` with the error text as body
#[derive(Debug, Default)]
pub struct DefaultErrorSink;

impl ErrorSink for DefaultErrorSink {
    fn handle(&self, err: &HandlerError) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
    }
}
