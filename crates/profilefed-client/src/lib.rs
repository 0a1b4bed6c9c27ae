//! ProfileFed Client
//!
//! Discovers, fetches, and cryptographically verifies profile descriptors
//! published by ProfileFed servers.
//!
//! ## Trust model
//!
//! Long-term identity is bound to a server's name (host) through
//! trust-on-first-use: the first public key observed for a name is stored
//! and every later response must verify against it. Two ceremonies move
//! trust forward:
//!
//! - **Rotation**: the server changes its key but keeps its name. Accepted
//!   only when the previously trusted key countersigns the new server-info
//!   document (the continuity signature).
//! - **Rename**: the server changes its name. At first contact with the new
//!   name, every previously known old name must be attested by the key the
//!   client already holds for it; the store entry for each old name is then
//!   swept in the same step that installs the new one.
//!
//! A fresh key alone can never forge a valid transition: both ceremonies
//! require a signature chain back to a key the client already trusts.
//!
//! The [`PubkeyStore`] is the only long-lived trust anchor. If it is lost,
//! every first contact is trust-on-first-use again.

pub mod client;
pub mod error;
pub mod fetch;
pub mod store;
pub mod webfinger;

pub use client::Client;
pub use error::LookupError;
pub use store::{MemoryPubkeyStore, PubkeyStore, StoreError};
