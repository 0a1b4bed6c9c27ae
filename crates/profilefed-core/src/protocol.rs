//! Protocol constants and the server-info wire document
//!
//! The server-info document binds `(server_name, previous_names, pubkey)`
//! and is the message signed by the current key and by every previous key
//! during rotation and rename ceremonies.

use crate::crypto;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

/// Media type of ProfileFed profile descriptors
pub const PFD_MEDIA_TYPE: &str = "application/x-pfd+json";

/// Media type of WebFinger JSON Resource Descriptors (RFC 7033)
pub const JRD_MEDIA_TYPE: &str = "application/jrd+json";

/// Header carrying the base64 Ed25519 signature over the exact response body
pub const SIGNATURE_HEADER: &str = "x-profilefed-sig";

/// Header carrying a base64 Ed25519 signature by a previous private key
/// over the same body; may appear any number of times
pub const PREVIOUS_SIGNATURE_HEADER: &str = "x-profilefed-previous";

/// Path of the server-info endpoint
pub const SERVER_INFO_PATH: &str = "/_profilefed/server";

/// Path of the WebFinger endpoint (RFC 7033)
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";

/// Maximum number of response body bytes a client will consume.
/// Excess bytes are discarded; the retained prefix must still decode
/// as a complete JSON document.
pub const RESPONSE_SIZE_LIMIT: usize = 32_000_000;

/// Server-info wire document served at [`SERVER_INFO_PATH`]
///
/// Clients never store this document; they extract `pubkey` and
/// `previous_names` and discard the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// The server's current name (host, with port if non-default)
    pub server_name: String,
    /// Names this server was previously known under
    pub previous_names: Vec<String>,
    /// Base64-encoded Ed25519 public key
    pub pubkey: String,
}

impl ServerInfo {
    /// Build a server-info document for the given identity
    pub fn new(
        server_name: impl Into<String>,
        previous_names: Vec<String>,
        pubkey: &VerifyingKey,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            previous_names,
            pubkey: crypto::encode_verifying_key(pubkey),
        }
    }
}
