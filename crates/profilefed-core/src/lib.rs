//! # ProfileFed Core
//!
//! Wire types and cryptographic primitives for ProfileFed, a federated
//! profile-discovery protocol layered on WebFinger (RFC 7033).
//!
//! ## Key Concepts
//!
//! - **Descriptor**: the profile document a server publishes about a user
//! - **JRD**: the WebFinger response that bootstraps discovery; the profile
//!   endpoint is the first link typed `application/x-pfd+json`
//! - **Server info**: a signed document binding a server's name, previous
//!   names, and current Ed25519 public key
//! - **Signature headers**: every protocol response carries a detached
//!   Ed25519 signature over its exact body bytes in `X-ProfileFed-Sig`;
//!   previous keys countersign via `X-ProfileFed-Previous`
//!
//! Long-term identity is bound to a server's name through trust-on-first-use;
//! key rotation and server renames are proven by continuity signatures from
//! previously trusted keys.

pub mod crypto;
pub mod descriptor;
pub mod error;
pub mod protocol;
pub mod webfinger;

pub use descriptor::{Descriptor, Extra, Role};
pub use error::{ProfileFedError, Result};
pub use protocol::{
    ServerInfo, JRD_MEDIA_TYPE, PFD_MEDIA_TYPE, PREVIOUS_SIGNATURE_HEADER, RESPONSE_SIZE_LIMIT,
    SERVER_INFO_PATH, SIGNATURE_HEADER, WEBFINGER_PATH,
};
pub use webfinger::{Link, WebFingerDescriptor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
