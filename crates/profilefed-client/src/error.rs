//! Client error taxonomy

use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by lookups.
///
/// [`LookupError::PubkeyNotFound`] is control flow inside the client (it
/// dispatches first contact) and is not returned by the public operations.
#[derive(Error, Debug)]
pub enum LookupError {
    /// An acct form lacks `@` or a URL failed to parse
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// The HTTP request failed before a status was received
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response had a non-200 status
    #[error("{operation}: {status}")]
    HttpStatus {
        /// The operation that observed the status
        operation: &'static str,
        /// The status line
        status: String,
    },

    /// The JRD carries no `application/x-pfd+json` link
    #[error("server does not support the profilefed protocol")]
    UnsupportedProtocol,

    /// The pubkey store has no entry for the server
    #[error("server pubkey not found")]
    PubkeyNotFound,

    /// The response carries no `X-ProfileFed-Sig` header
    #[error("response contains no signature")]
    NoSignature,

    /// A verification step failed after exhausting recovery
    #[error("message does not match server signature")]
    SignatureMismatch,

    /// Malformed JSON or malformed base64
    #[error("decode error: {0}")]
    Decode(String),

    /// The pubkey store backend failed
    #[error("pubkey store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Decode(err.to_string())
    }
}

impl From<profilefed_core::ProfileFedError> for LookupError {
    fn from(err: profilefed_core::ProfileFedError) -> Self {
        LookupError::Decode(err.to_string())
    }
}

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LookupError::PubkeyNotFound,
            StoreError::Backend(msg) => LookupError::Store(msg),
        }
    }
}
