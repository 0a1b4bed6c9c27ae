//! Signing-key persistence
//!
//! Private keys are stored as PKCS#8 PEM, public keys as SPKI PEM at
//! `<path>.pub`. Previous private keys kept on disk feed the continuity
//! signatures served by the server-info endpoint.

use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, spki::der::pem::LineEnding};
use ed25519_dalek::SigningKey;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from key loading and generation
#[derive(Error, Debug)]
pub enum KeyError {
    /// Reading or writing a key file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key file did not contain a valid Ed25519 key
    #[error("invalid key data: {0}")]
    InvalidKey(String),
}

/// Load the signing key at `path`, or generate and persist a new one if the
/// file does not exist.
///
/// A freshly generated private key is written with mode 0600; the public
/// key lands at `<path>.pub` with mode 0644.
pub fn load_or_generate_keys(path: impl AsRef<Path>) -> Result<SigningKey, KeyError> {
    let path = path.as_ref();
    if path.exists() {
        load_private_key(path)
    } else {
        generate_keys(path)
    }
}

/// Load a private Ed25519 key from a PKCS#8 PEM file
pub fn load_private_key(path: impl AsRef<Path>) -> Result<SigningKey, KeyError> {
    let pem = fs::read_to_string(path.as_ref())?;
    SigningKey::from_pkcs8_pem(&pem).map_err(|e| KeyError::InvalidKey(e.to_string()))
}

/// Load the private keys at all the provided paths, skipping any that are
/// unreadable or invalid
pub fn load_private_keys<I, P>(paths: I) -> Vec<SigningKey>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .filter_map(|path| match load_private_key(path.as_ref()) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(path = %path.as_ref().display(), error = %err, "Skipping invalid key file");
                None
            }
        })
        .collect()
}

fn generate_keys(path: &Path) -> Result<SigningKey, KeyError> {
    let key = profilefed_core::crypto::generate_keypair();

    let private_pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
    fs::write(path, private_pem.as_bytes())?;
    set_mode(path, 0o600)?;

    let public_pem = key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
    let public_path = public_key_path(path);
    fs::write(&public_path, public_pem.as_bytes())?;
    set_mode(&public_path, 0o644)?;

    info!(path = %path.display(), "Generated new signing key");
    Ok(key)
}

/// Path of the public key file stored next to a private key
pub fn public_key_path(private_path: &Path) -> std::path::PathBuf {
    let mut os = private_path.as_os_str().to_os_string();
    os.push(".pub");
    os.into()
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
