//! HTTP response plumbing shared by the client paths

use crate::error::LookupError;
use profilefed_core::{crypto, PREVIOUS_SIGNATURE_HEADER, SIGNATURE_HEADER};
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use url::Url;

/// Read a response body up to `limit` bytes.
///
/// Excess bytes are silently discarded; the retained prefix must still be
/// a complete document or downstream decoding fails.
pub async fn read_limited(mut res: Response, limit: usize) -> Result<Vec<u8>, LookupError> {
    let mut body = Vec::new();
    while body.len() < limit {
        match res.chunk().await? {
            Some(chunk) => {
                let remaining = limit - body.len();
                body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
            }
            None => break,
        }
    }
    Ok(body)
}

/// Extract and decode the `X-ProfileFed-Sig` header
pub(crate) fn get_signature(headers: &HeaderMap) -> Result<Vec<u8>, LookupError> {
    let value = headers
        .get(SIGNATURE_HEADER)
        .ok_or(LookupError::NoSignature)?;
    let encoded = value
        .to_str()
        .map_err(|e| LookupError::Decode(e.to_string()))?;
    crypto::decode_signature(encoded).map_err(|e| LookupError::Decode(e.to_string()))
}

/// Collect every decodable `X-ProfileFed-Previous` signature, silently
/// skipping values that are not valid base64
pub(crate) fn get_previous_signatures(headers: &HeaderMap) -> Vec<Vec<u8>> {
    headers
        .get_all(PREVIOUS_SIGNATURE_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|encoded| crypto::decode_signature(encoded).ok())
        .collect()
}

/// Fail with the status line unless the response is 200 OK
pub(crate) fn check_status(res: &Response, operation: &'static str) -> Result<(), LookupError> {
    if res.status() != StatusCode::OK {
        return Err(LookupError::HttpStatus {
            operation,
            status: res.status().to_string(),
        });
    }
    Ok(())
}

/// The `host[:port]` form used as the pubkey-store key
pub(crate) fn host_with_port(url: &Url) -> Result<String, LookupError> {
    let host = url
        .host_str()
        .ok_or_else(|| LookupError::InvalidResource(format!("URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Replace or install a query parameter, leaving other parameters intact
pub(crate) fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let existing: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &existing {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(key, value);
}
