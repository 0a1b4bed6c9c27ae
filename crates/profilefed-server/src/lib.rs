//! ProfileFed Server
//!
//! HTTP handlers for publishing signed profile descriptors:
//!
//! - `GET /.well-known/webfinger?resource=...`: RFC 7033 discovery;
//!   dispatches resource strings to a user-supplied resolver
//! - `GET /_profilefed/server`: the signed server-info document binding
//!   the server's name, previous names, and current Ed25519 public key,
//!   countersigned by every previous key
//! - `GET <profile url>?id=...&all=1`: one or all profile descriptors,
//!   signed by the current key
//!
//! Every response body is marshaled exactly once; the signature in
//! `X-ProfileFed-Sig` covers the bytes written to the wire. Handlers take
//! their lookup capabilities ([`ResourceResolver`], [`DescriptorProvider`])
//! and an [`ErrorSink`] at construction; the default sink answers
//! `500 Internal Server Error` with the error text.

pub mod error;
pub mod keys;
pub mod profile;
pub mod router;
pub mod server_info;
pub mod webfinger;

pub use error::{DefaultErrorSink, ErrorSink, HandlerError};
pub use keys::{load_or_generate_keys, load_private_key, load_private_keys, KeyError};
pub use profile::{DescriptorProvider, ProfileHandler, ProfileQuery};
pub use router::{create_router, PROFILE_PATH};
pub use server_info::ServerInfoHandler;
pub use webfinger::{ResourceResolver, WebFingerHandler};
