//! Server-info endpoint handler
//!
//! Serves the signed document that binds `(server_name, previous_names,
//! current pubkey)`. The body is marshaled once; the exact same buffer is
//! signed by every previous key, signed by the current key, and written to
//! the client. Any re-serialization between signing and writing would break
//! signature equality.

use axum::http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use ed25519_dalek::SigningKey;
use profilefed_core::{crypto, ServerInfo, PREVIOUS_SIGNATURE_HEADER, SIGNATURE_HEADER};
use std::sync::Arc;

use crate::error::{DefaultErrorSink, ErrorSink, HandlerError};

/// Handler for the `/_profilefed/server` endpoint
pub struct ServerInfoHandler {
    /// The server's current name; must match the domain clients use
    server_name: String,
    /// Names this server was previously known under
    previous_names: Vec<String>,
    /// The current signing key
    signing_key: SigningKey,
    /// Previously used signing keys. If these are missing after a key
    /// change, clients will not trust the new key and will reject every
    /// response.
    previous_keys: Vec<SigningKey>,
    error_sink: Arc<dyn ErrorSink>,
}

impl ServerInfoHandler {
    /// Create a handler for a server with no rename or rotation history
    pub fn new(server_name: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            server_name: server_name.into(),
            previous_names: Vec::new(),
            signing_key,
            previous_keys: Vec::new(),
            error_sink: Arc::new(DefaultErrorSink),
        }
    }

    /// Declare the names this server was previously known under
    pub fn with_previous_names(mut self, names: Vec<String>) -> Self {
        self.previous_names = names;
        self
    }

    /// Provide previously used signing keys for continuity signatures
    pub fn with_previous_keys(mut self, keys: Vec<SigningKey>) -> Self {
        self.previous_keys = keys;
        self
    }

    /// Replace the error sink
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Serve one server-info request
    pub async fn handle(&self) -> Response {
        let info = ServerInfo::new(
            self.server_name.clone(),
            self.previous_names.clone(),
            &self.signing_key.verifying_key(),
        );

        let body = match serde_json::to_vec(&info) {
            Ok(body) => body,
            Err(err) => return self.error_sink.handle(&HandlerError::from(err)),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let prev_name = HeaderName::from_static(PREVIOUS_SIGNATURE_HEADER);
        for key in &self.previous_keys {
            let sig = crypto::sign_base64(key, &body);
            if let Ok(value) = HeaderValue::from_str(&sig) {
                headers.append(prev_name.clone(), value);
            }
        }

        let sig = crypto::sign_base64(&self.signing_key, &body);
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
    use profilefed_core::crypto::{decode_signature, generate_keypair, verify_detached};

    #[tokio::test]
    async fn test_signed_bytes_equal_written_bytes() {
        let key = generate_keypair();
        let handler = ServerInfoHandler::new("example.com", key.clone());

        let res = handler.handle().await;
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

        let info: ServerInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(info.server_name, "example.com");
        assert!(info.previous_names.is_empty());
    }

    #[tokio::test]
    async fn test_previous_keys_countersign_same_body() {
        let old_key = generate_keypair();
        let older_key = generate_keypair();
        let key = generate_keypair();

        let handler = ServerInfoHandler::new("example.com", key.clone())
            .with_previous_keys(vec![older_key.clone(), old_key.clone()]);

        let res = handler.handle().await;
        let prev_sigs: Vec<Vec<u8>> = res
            .headers()
            .get_all(PREVIOUS_SIGNATURE_HEADER)
            .iter()
            .map(|v| decode_signature(v.to_str().unwrap()).unwrap())
            .collect();
        assert_eq!(prev_sigs.len(), 2);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        // Headers appear in construction order
        assert!(verify_detached(&older_key.verifying_key(), &body, &prev_sigs[0]));
        assert!(verify_detached(&old_key.verifying_key(), &body, &prev_sigs[1]));
    }

    #[tokio::test]
    async fn test_previous_names_are_published() {
        let key = generate_keypair();
        let handler = ServerInfoHandler::new("new.example.com", key)
            .with_previous_names(vec!["old.example.com".into()]);

        let res = handler.handle().await;
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let info: ServerInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(info.previous_names, vec!["old.example.com".to_string()]);
    }
}
