//! WebFinger JSON Resource Descriptor types (RFC 7033)
//!
//! Only the subset consumed by the profile client is modeled; a JRD is
//! otherwise an opaque lookup result. The profile endpoint is discovered
//! as the first link whose type is `application/x-pfd+json`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Some JRD producers emit `null` for empty collections; treat that the
/// same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A WebFinger JSON Resource Descriptor (JRD)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebFingerDescriptor {
    /// The resource this descriptor describes
    pub subject: String,
    /// Alternative identifiers for the subject
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    /// Subject properties; absent and empty are equivalent
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub properties: HashMap<String, String>,
    /// Links related to the subject
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
}

/// A JRD link item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The link relation
    pub rel: String,
    /// The media type of the target, if declared
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// The link target
    pub href: String,
}

impl WebFingerDescriptor {
    /// Return the first link with the given media type
    pub fn link_by_type(&self, link_type: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.link_type.as_deref() == Some(link_type))
    }

    /// Return the first link with the given rel value
    pub fn link_by_rel(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.rel == rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> WebFingerDescriptor {
        WebFingerDescriptor {
            subject: "acct:user@example.com".into(),
            aliases: vec!["https://example.com/user".into()],
            properties: HashMap::new(),
            links: vec![
                Link {
                    rel: "http://webfinger.net/rel/profile-page".into(),
                    link_type: Some("text/html".into()),
                    href: "https://example.com/user".into(),
                },
                Link {
                    rel: "self".into(),
                    link_type: Some("application/x-pfd+json".into()),
                    href: "https://example.com/pfd?u=user".into(),
                },
                Link {
                    rel: "self".into(),
                    link_type: Some("application/x-pfd+json".into()),
                    href: "https://example.com/pfd-secondary".into(),
                },
            ],
        }
    }

    #[test]
    fn test_link_by_type_returns_first_match() {
        let desc = descriptor();
        let link = desc.link_by_type("application/x-pfd+json").unwrap();
        assert_eq!(link.href, "https://example.com/pfd?u=user");
        assert!(desc.link_by_type("application/activity+json").is_none());
    }

    #[test]
    fn test_link_by_rel() {
        let desc = descriptor();
        let link = desc.link_by_rel("http://webfinger.net/rel/profile-page").unwrap();
        assert_eq!(link.link_type.as_deref(), Some("text/html"));
        assert!(desc.link_by_rel("nonexistent").is_none());
    }

    #[test]
    fn test_empty_properties_are_omitted() {
        let desc = descriptor();
        let json = serde_json::to_value(&desc).unwrap();
        assert!(json.get("properties").is_none());

        // Consumers tolerate both absence and an empty object
        let with_empty: WebFingerDescriptor =
            serde_json::from_str(r#"{"subject":"s","aliases":[],"properties":{},"links":[]}"#)
                .unwrap();
        let without: WebFingerDescriptor =
            serde_json::from_str(r#"{"subject":"s","aliases":[],"links":[]}"#).unwrap();
        assert_eq!(with_empty, without);
    }

    #[test]
    fn test_link_without_type_decodes() {
        let link: Link = serde_json::from_str(r#"{"rel":"self","href":"http://x"}"#).unwrap();
        assert!(link.link_type.is_none());
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let desc: WebFingerDescriptor = serde_json::from_str(
            r#"{"subject":"s","aliases":null,"properties":null,"links":null}"#,
        )
        .unwrap();
        assert!(desc.aliases.is_empty());
        assert!(desc.properties.is_empty());
        assert!(desc.links.is_empty());
    }
}
