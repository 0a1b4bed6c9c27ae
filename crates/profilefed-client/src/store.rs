//! Pubkey store abstraction
//!
//! The store is the client's only long-lived trust anchor: a mapping from
//! server name (host, with port if non-default) to the server's current
//! Ed25519 public key. Entries are created on first contact and mutated
//! only by the rotation/rename ceremony.

use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

/// Error type for pubkey store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No key is stored for the server name. The client uses this to
    /// trigger first contact.
    #[error("server pubkey not found")]
    NotFound,

    /// The backing store failed
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Storage for server public keys.
///
/// Implementations must be safe under concurrent invocation from many
/// lookups, and `save` must be atomic with respect to `get`: once `save`
/// returns, no caller can observe the old mapping for `server_name` or a
/// residual mapping for any of `previous_names`.
#[async_trait]
pub trait PubkeyStore: Send + Sync {
    /// Retrieve the public key for a server, or [`StoreError::NotFound`]
    async fn get(&self, server_name: &str) -> Result<VerifyingKey, StoreError>;

    /// Install the key for `server_name` and delete every entry in
    /// `previous_names` as a single observable step (the rename sweep)
    async fn save(
        &self,
        server_name: &str,
        previous_names: &[String],
        pubkey: &VerifyingKey,
    ) -> Result<(), StoreError>;
}

/// In-memory pubkey store.
///
/// Suitable for demonstrations and tests. Restarting a process that uses
/// an in-memory store loses every trust anchor and re-exposes each peer to
/// trust-on-first-use; production clients should persist keys to a
/// database or similar.
#[derive(Debug, Default)]
pub struct MemoryPubkeyStore {
    keys: RwLock<HashMap<String, VerifyingKey>>,
}

impl MemoryPubkeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PubkeyStore for MemoryPubkeyStore {
    async fn get(&self, server_name: &str) -> Result<VerifyingKey, StoreError> {
        let keys = self.keys.read().unwrap();
        keys.get(server_name).copied().ok_or(StoreError::NotFound)
    }

    async fn save(
        &self,
        server_name: &str,
        previous_names: &[String],
        pubkey: &VerifyingKey,
    ) -> Result<(), StoreError> {
        // One write-lock acquisition makes the install and the rename
        // sweep a single observable step.
        let mut keys = self.keys.write().unwrap();
        keys.insert(server_name.to_string(), *pubkey);
        for name in previous_names {
            keys.remove(name);
        }
        debug!(
            server = server_name,
            swept = previous_names.len(),
            "Saved server pubkey"
        );
        Ok(())
    }
}
