//! Profile descriptor endpoint handler
//!
//! Serves one or all profile descriptors for a resource, signed by the
//! server's current private key. The query is forwarded to the provider
//! hooks so they can honor the `id` parameter when a user has several
//! descriptors.

use async_trait::async_trait;
use axum::http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use ed25519_dalek::SigningKey;
use profilefed_core::{crypto, Descriptor, PFD_MEDIA_TYPE, SIGNATURE_HEADER};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::{DefaultErrorSink, ErrorSink, HandlerError};

/// Query parameters of a profile request, forwarded to provider hooks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileQuery {
    /// Selects one of several descriptors for the resource
    pub id: Option<String>,
    /// `"1"` requests all descriptors keyed by id
    pub all: Option<String>,
}

impl ProfileQuery {
    /// Whether the request asks for all descriptors
    pub fn wants_all(&self) -> bool {
        self.all.as_deref() == Some("1")
    }
}

/// Supplies profile descriptors to the handler.
///
/// Both hooks signal a clean miss with [`HandlerError::DescriptorNotFound`].
#[async_trait]
pub trait DescriptorProvider: Send + Sync {
    /// Return a single descriptor. Implementations should check
    /// `query.id` when the user has several descriptors available.
    async fn descriptor(&self, query: &ProfileQuery) -> Result<Descriptor, HandlerError>;

    /// Return all descriptors known for the resource, keyed by id
    async fn all_descriptors(
        &self,
        query: &ProfileQuery,
    ) -> Result<HashMap<String, Descriptor>, HandlerError>;
}

/// Handler for the profile descriptor endpoint advertised in the JRD
pub struct ProfileHandler {
    signing_key: SigningKey,
    provider: Arc<dyn DescriptorProvider>,
    error_sink: Arc<dyn ErrorSink>,
}

impl ProfileHandler {
    /// Create a handler with the default error sink
    pub fn new(signing_key: SigningKey, provider: Arc<dyn DescriptorProvider>) -> Self {
        Self {
            signing_key,
            provider,
            error_sink: Arc::new(DefaultErrorSink),
        }
    }

    /// Replace the error sink
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Serve one profile request
    pub async fn handle(&self, query: &ProfileQuery) -> Response {
        let body = if query.wants_all() {
            match self.provider.all_descriptors(query).await {
                Ok(descriptors) => serde_json::to_vec(&descriptors),
                Err(err) => {
                    warn!(error = %err, "all-descriptors hook failed");
                    return self.error_sink.handle(&err);
                }
            }
        } else {
            match self.provider.descriptor(query).await {
                Ok(descriptor) => serde_json::to_vec(&descriptor),
                Err(err) => {
                    warn!(id = ?query.id, error = %err, "descriptor hook failed");
                    return self.error_sink.handle(&err);
                }
            }
        };

        let body = match body {
            Ok(body) => body,
            Err(err) => return self.error_sink.handle(&err.into()),
        };

        let sig = crypto::sign_base64(&self.signing_key, &body);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PFD_MEDIA_TYPE));
        match HeaderValue::from_str(&sig) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(SIGNATURE_HEADER), value);
            }
            Err(err) => {
                return self
                    .error_sink
                    .handle(&HandlerError::Serialization(err.to_string()));
            }
        }

        (headers, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use profilefed_core::crypto::{decode_signature, generate_keypair, verify_detached};
    use profilefed_core::Role;

    struct TwoProfiles;

    fn profile(id: &str) -> Descriptor {
        Descriptor {
            id: id.into(),
            username: format!("user-{id}"),
            role: Role::user(),
            ..Descriptor::default()
        }
    }

    #[async_trait]
    impl DescriptorProvider for TwoProfiles {
        async fn descriptor(&self, query: &ProfileQuery) -> Result<Descriptor, HandlerError> {
            match query.id.as_deref() {
                None | Some("a") => Ok(profile("a")),
                Some("b") => Ok(profile("b")),
                Some(_) => Err(HandlerError::DescriptorNotFound),
            }
        }

        async fn all_descriptors(
            &self,
            _query: &ProfileQuery,
        ) -> Result<HashMap<String, Descriptor>, HandlerError> {
            Ok([("a".to_string(), profile("a")), ("b".to_string(), profile("b"))].into())
        }
    }

    #[tokio::test]
    async fn test_single_descriptor_signed() {
        let key = generate_keypair();
        let handler = ProfileHandler::new(key.clone(), Arc::new(TwoProfiles));

        let res = handler.handle(&ProfileQuery::default()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-pfd+json"
        );

        let sig = decode_signature(
            res.headers()
                .get(SIGNATURE_HEADER)
                .unwrap()
                .to_str()
                .unwrap(),
        )
        .unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(verify_detached(&key.verifying_key(), &body, &sig));

        let decoded: Descriptor = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.id, "a");
    }

    #[tokio::test]
    async fn test_id_parameter_reaches_the_hook() {
        let key = generate_keypair();
        let handler = ProfileHandler::new(key, Arc::new(TwoProfiles));

        let query = ProfileQuery {
            id: Some("b".into()),
            all: None,
        };
        let res = handler.handle(&query).await;
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let decoded: Descriptor = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.id, "b");
    }

    #[tokio::test]
    async fn test_all_descriptors_keyed_by_id() {
        let key = generate_keypair();
        let handler = ProfileHandler::new(key.clone(), Arc::new(TwoProfiles));

        let query = ProfileQuery {
            id: None,
            all: Some("1".into()),
        };
        let res = handler.handle(&query).await;
        let sig = decode_signature(
            res.headers()
                .get(SIGNATURE_HEADER)
                .unwrap()
                .to_str()
                .unwrap(),
        )
        .unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(verify_detached(&key.verifying_key(), &body, &sig));

        let decoded: HashMap<String, Descriptor> = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["b"].username, "user-b");
    }

    #[tokio::test]
    async fn test_not_found_goes_to_sink() {
        let key = generate_keypair();
        let handler = ProfileHandler::new(key, Arc::new(TwoProfiles));

        let query = ProfileQuery {
            id: Some("missing".into()),
            all: None,
        };
        let res = handler.handle(&query).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
