//! Error types for the ProfileFed protocol crates

use thiserror::Error;

/// Result type alias using ProfileFedError
pub type Result<T> = std::result::Result<T, ProfileFedError>;

/// Errors that can occur in the ProfileFed core
#[derive(Error, Debug)]
pub enum ProfileFedError {
    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A public key failed to decode or has the wrong length
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    /// A signature failed to decode
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<serde_json::Error> for ProfileFedError {
    fn from(err: serde_json::Error) -> Self {
        ProfileFedError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for ProfileFedError {
    fn from(err: base64::DecodeError) -> Self {
        ProfileFedError::InvalidSignature(err.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for ProfileFedError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        ProfileFedError::InvalidKey(err.to_string())
    }
}
