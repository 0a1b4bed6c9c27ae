//! WebFinger lookups (RFC 7033)

use crate::error::LookupError;
use crate::fetch::{check_status, host_with_port};
use profilefed_core::{WebFingerDescriptor, WEBFINGER_PATH};
use url::Url;

/// Look up the given resource string at the given server.
///
/// The server parameter is a bare `host[:port]` without a URL scheme.
pub async fn lookup(
    http: &reqwest::Client,
    resource: &str,
    server: &str,
) -> Result<WebFingerDescriptor, LookupError> {
    let mut url = Url::parse(&format!("http://{server}"))
        .map_err(|e| LookupError::InvalidResource(e.to_string()))?;
    url.set_path(WEBFINGER_PATH);
    url.query_pairs_mut().append_pair("resource", resource);

    let res = http.get(url).send().await?;
    check_status(&res, "webfinger lookup")?;

    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Look up the given account ID, using the server named in the ID.
///
/// `user@example.com` resolves against `example.com`; the `acct:` prefix is
/// added if missing. The server is taken from after the last `@`, so an ID
/// containing several cannot smuggle in an earlier host.
pub async fn lookup_acct(
    http: &reqwest::Client,
    id: &str,
) -> Result<WebFingerDescriptor, LookupError> {
    let (_, server) = id
        .rsplit_once('@')
        .ok_or_else(|| LookupError::InvalidResource("invalid acct id".into()))?;

    let resource = if id.starts_with("acct:") {
        id.to_string()
    } else {
        format!("acct:{id}")
    };

    lookup(http, &resource, server).await
}

/// Look up the given resource URL, using the URL host as the server
pub async fn lookup_url(
    http: &reqwest::Client,
    resource: &str,
) -> Result<WebFingerDescriptor, LookupError> {
    let url =
        Url::parse(resource).map_err(|e| LookupError::InvalidResource(e.to_string()))?;
    let server = host_with_port(&url)?;
    lookup(http, resource, &server).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acct_without_at_is_invalid() {
        let http = reqwest::Client::new();
        let err = lookup_acct(&http, "acct:alice").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidResource(_)));
    }

    #[tokio::test]
    async fn test_url_parse_failure_is_invalid_resource() {
        let http = reqwest::Client::new();
        let err = lookup_url(&http, "not a url").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidResource(_)));
    }
}
