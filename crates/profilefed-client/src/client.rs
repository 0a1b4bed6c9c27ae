//! Verifying profile client
//!
//! A lookup discovers the profile URL through WebFinger, consults the
//! pubkey store for the profile host, fetches the descriptor, and verifies
//! the response signature. On a signature failure the client runs the
//! rotation ceremony against the server-info endpoint before accepting or
//! rejecting, and on first contact it trusts the presented key after
//! auditing any claimed previous names against keys it already holds.
//!
//! The store is only ever mutated by a successful first contact or a fully
//! proven rotation; a rejected rotation or rename leaves it untouched.

use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use profilefed_core::{
    crypto, Descriptor, Role, ServerInfo, WebFingerDescriptor, PFD_MEDIA_TYPE,
    RESPONSE_SIZE_LIMIT, SERVER_INFO_PATH,
};

use crate::error::LookupError;
use crate::fetch::{
    check_status, get_previous_signatures, get_signature, host_with_port, read_limited,
    set_query_param,
};
use crate::store::{MemoryPubkeyStore, PubkeyStore, StoreError};
use crate::webfinger;

/// A server-info response, decoded alongside the raw bytes it was signed over
struct FetchedServerInfo {
    info: ServerInfo,
    body: Vec<u8>,
    sig: Vec<u8>,
    previous_sigs: Vec<Vec<u8>>,
}

/// A verifying ProfileFed client
pub struct Client {
    http: reqwest::Client,
    store: Arc<dyn PubkeyStore>,
}

impl Client {
    /// Create a client backed by the given pubkey store
    pub fn new(store: Arc<dyn PubkeyStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            store,
        }
    }

    /// Create a client with an in-memory pubkey store.
    ///
    /// Restarting the process loses every stored key and re-exposes each
    /// peer to trust-on-first-use; production clients should supply a
    /// persistent [`PubkeyStore`] via [`Client::new`] instead.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPubkeyStore::new()))
    }

    /// Replace the HTTP client used for all requests
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Look up the profile descriptor for the given resource.
    ///
    /// Absolute `http`/`https` resources resolve through the URL form of
    /// WebFinger; anything else is treated as an acct ID.
    pub async fn lookup(&self, resource: &str) -> Result<Descriptor, LookupError> {
        let wf = self.resolve(resource).await?;
        self.lookup_webfinger(&wf).await
    }

    /// Look up the descriptor with the given ID for the given resource
    pub async fn lookup_id(&self, resource: &str, id: &str) -> Result<Descriptor, LookupError> {
        let wf = self.resolve(resource).await?;
        self.lookup_webfinger_id(&wf, id).await
    }

    /// Look up all profile descriptors for the given resource, keyed by ID
    pub async fn lookup_all(
        &self,
        resource: &str,
    ) -> Result<HashMap<String, Descriptor>, LookupError> {
        let wf = self.resolve(resource).await?;
        self.lookup_all_webfinger(&wf).await
    }

    /// Look up the profile descriptor behind an already-resolved JRD
    pub async fn lookup_webfinger(
        &self,
        wf: &WebFingerDescriptor,
    ) -> Result<Descriptor, LookupError> {
        let body = self.fetch_verified(wf, "", false).await?;
        decode_descriptor(&body)
    }

    /// Look up the descriptor with the given ID behind an already-resolved JRD
    pub async fn lookup_webfinger_id(
        &self,
        wf: &WebFingerDescriptor,
        id: &str,
    ) -> Result<Descriptor, LookupError> {
        let body = self.fetch_verified(wf, id, false).await?;
        decode_descriptor(&body)
    }

    /// Look up all descriptors behind an already-resolved JRD.
    ///
    /// Unlike the single-descriptor operations, roles inside the returned
    /// map are passed through as the server sent them, without empty-role
    /// normalization.
    pub async fn lookup_all_webfinger(
        &self,
        wf: &WebFingerDescriptor,
    ) -> Result<HashMap<String, Descriptor>, LookupError> {
        let body = self.fetch_verified(wf, "", true).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn resolve(&self, resource: &str) -> Result<WebFingerDescriptor, LookupError> {
        if resource.starts_with("http://") || resource.starts_with("https://") {
            webfinger::lookup_url(&self.http, resource).await
        } else {
            webfinger::lookup_acct(&self.http, resource).await
        }
    }

    /// Fetch the profile response behind `wf` and return its body once the
    /// signature has been verified against the stored (or newly trusted)
    /// key for the profile host.
    async fn fetch_verified(
        &self,
        wf: &WebFingerDescriptor,
        id: &str,
        all: bool,
    ) -> Result<Vec<u8>, LookupError> {
        let link = wf
            .link_by_type(PFD_MEDIA_TYPE)
            .ok_or(LookupError::UnsupportedProtocol)?;

        let url = Url::parse(&link.href)
            .map_err(|e| LookupError::InvalidResource(e.to_string()))?;
        let host = host_with_port(&url)?;

        let mut pubkey_just_saved = false;
        let pubkey = match self.store.get(&host).await {
            Ok(key) => key,
            Err(StoreError::NotFound) => {
                let key = self.first_contact(url.scheme(), &host).await?;
                pubkey_just_saved = true;
                key
            }
            Err(err) => return Err(err.into()),
        };

        let mut fetch_url = url.clone();
        if all {
            set_query_param(&mut fetch_url, "all", "1");
        } else if !id.is_empty() {
            set_query_param(&mut fetch_url, "id", id);
        }

        let res = self.http.get(fetch_url).send().await?;
        check_status(&res, "profile descriptor fetch")?;
        let sig = get_signature(res.headers())?;
        let body = read_limited(res, RESPONSE_SIZE_LIMIT).await?;

        if crypto::verify_detached(&pubkey, &body, &sig) {
            return Ok(body);
        }

        // The key we just installed during this lookup is as fresh as it
        // gets; a mismatch now is tampering, not stale state.
        if pubkey_just_saved {
            return Err(LookupError::SignatureMismatch);
        }

        self.rotate(url.scheme(), &host, &pubkey, &body, &sig)
            .await?;
        Ok(body)
    }

    /// Trust-on-first-use: fetch the server's info document, audit any
    /// claimed previous names against keys already in the store, and
    /// install the presented key.
    async fn first_contact(
        &self,
        scheme: &str,
        host: &str,
    ) -> Result<VerifyingKey, LookupError> {
        let fetched = self.fetch_server_info(scheme, host).await?;
        let new_pubkey = crypto::decode_verifying_key(&fetched.info.pubkey)
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        // Rename audit: a server claiming to have been `old.example` must
        // prove it, either by signing the info document with a key we
        // already trust for that name or by carrying a companion signature
        // from it. Names we have never seen are skipped.
        for prev_name in &fetched.info.previous_names {
            let old_key = match self.store.get(prev_name).await {
                Ok(key) => key,
                Err(StoreError::NotFound) => continue,
                Err(err) => return Err(err.into()),
            };

            let attested = crypto::verify_detached(&old_key, &fetched.body, &fetched.sig)
                || fetched
                    .previous_sigs
                    .iter()
                    .any(|ps| crypto::verify_detached(&old_key, &fetched.body, ps));

            if !attested {
                warn!(
                    server = host,
                    previous = %prev_name,
                    "Claimed previous name is not attested by its stored key"
                );
                return Err(LookupError::SignatureMismatch);
            }
        }

        self.store
            .save(host, &fetched.info.previous_names, &new_pubkey)
            .await?;
        info!(server = host, "Trusted server key on first contact");

        Ok(new_pubkey)
    }

    /// Rotation ceremony: the stored key no longer verifies the profile
    /// response, so the server-info document must prove a key change. The
    /// previously trusted key has to attest the new document (continuity),
    /// the new key has to have signed it (self-consistency), and the
    /// profile response has to verify under the new key before the store
    /// is updated.
    async fn rotate(
        &self,
        scheme: &str,
        host: &str,
        pubkey: &VerifyingKey,
        profile_body: &[u8],
        profile_sig: &[u8],
    ) -> Result<(), LookupError> {
        let fetched = self.fetch_server_info(scheme, host).await?;
        let new_pubkey = crypto::decode_verifying_key(&fetched.info.pubkey)
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        // The server is not rotating; the profile is forged or corrupted.
        if new_pubkey == *pubkey {
            return Err(LookupError::SignatureMismatch);
        }

        let continuity = fetched
            .previous_sigs
            .iter()
            .any(|ps| crypto::verify_detached(pubkey, &fetched.body, ps));
        if !continuity {
            warn!(
                server = host,
                "Rotation rejected: no continuity signature from the trusted key"
            );
            return Err(LookupError::SignatureMismatch);
        }

        if !crypto::verify_detached(&new_pubkey, &fetched.body, &fetched.sig) {
            return Err(LookupError::SignatureMismatch);
        }

        if !crypto::verify_detached(&new_pubkey, profile_body, profile_sig) {
            return Err(LookupError::SignatureMismatch);
        }

        self.store
            .save(host, &fetched.info.previous_names, &new_pubkey)
            .await?;
        info!(server = host, "Rotated stored server key");

        Ok(())
    }

    async fn fetch_server_info(
        &self,
        scheme: &str,
        host: &str,
    ) -> Result<FetchedServerInfo, LookupError> {
        let url = Url::parse(&format!("{scheme}://{host}{SERVER_INFO_PATH}"))
            .map_err(|e| LookupError::InvalidResource(e.to_string()))?;

        debug!(server = host, "Fetching server info");
        let res = self.http.get(url).send().await?;
        check_status(&res, "server info fetch")?;

        let sig = get_signature(res.headers())?;
        let previous_sigs = get_previous_signatures(res.headers());
        let body = read_limited(res, RESPONSE_SIZE_LIMIT).await?;
        let info: ServerInfo = serde_json::from_slice(&body)?;

        Ok(FetchedServerInfo {
            info,
            body,
            sig,
            previous_sigs,
        })
    }
}

/// Decode a single descriptor, normalizing an empty role to `user`
fn decode_descriptor(body: &[u8]) -> Result<Descriptor, LookupError> {
    let mut desc: Descriptor = serde_json::from_slice(body)?;
    if desc.role.is_empty() {
        desc.role = Role::user();
    }
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_role_normalized_to_user() {
        let body = br#"{"id":"a","namespaces":[],"display_name":"","username":"alice","bio":"","role":"","extra":[]}"#;
        let desc = decode_descriptor(body).unwrap();
        assert_eq!(desc.role, Role::user());
    }

    #[test]
    fn test_present_role_untouched() {
        let body = br#"{"id":"a","namespaces":[],"display_name":"","username":"alice","bio":"","role":"admin","extra":[]}"#;
        let desc = decode_descriptor(body).unwrap();
        assert_eq!(desc.role, Role::admin());
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        assert!(matches!(
            decode_descriptor(b"{not json"),
            Err(LookupError::Decode(_))
        ));
    }
}
