//! WebFinger endpoint handler (RFC 7033)
//!
//! The handler dispatches `resource` query strings to a user-supplied
//! resolver and serializes the resulting JRD. It performs no caching and no
//! method restriction; route-level enforcement is the host's job.

use async_trait::async_trait;
use axum::http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use profilefed_core::{WebFingerDescriptor, JRD_MEDIA_TYPE};
use std::sync::Arc;
use tracing::warn;

use crate::error::{DefaultErrorSink, ErrorSink, HandlerError};

/// Resolves resource strings to WebFinger descriptors.
///
/// Called on every request to the WebFinger endpoint.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Resolve a resource string to its JRD
    async fn resolve(&self, resource: &str) -> Result<WebFingerDescriptor, HandlerError>;
}

/// Handler for the `/.well-known/webfinger` endpoint
pub struct WebFingerHandler {
    resolver: Arc<dyn ResourceResolver>,
    error_sink: Arc<dyn ErrorSink>,
}

impl WebFingerHandler {
    /// Create a handler with the default error sink
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            resolver,
            error_sink: Arc::new(DefaultErrorSink),
        }
    }

    /// Replace the error sink
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Serve one WebFinger request for the given `resource` query value
    pub async fn handle(&self, resource: &str) -> Response {
        let descriptor = match self.resolver.resolve(resource).await {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(resource, error = %err, "WebFinger resolution failed");
                return self.error_sink.handle(&err);
            }
        };

        let body = match serde_json::to_vec(&descriptor) {
            Ok(body) => body,
            Err(err) => return self.error_sink.handle(&err.into()),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JRD_MEDIA_TYPE));
        (headers, body).into_response()
    }
}
