//! Profile descriptor model
//!
//! A [`Descriptor`] is what a ProfileFed server publishes about a user.
//! A resource may have several descriptors, each with its own opaque `id`.
//! Vocabularies for the `extra` entries are declared in `namespaces`.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A user's role on a server.
///
/// The wire value is one of the named roles below or a comma-joined subset
/// of them, so the type is a transparent string rather than a closed enum.
/// An empty role is normalized to [`Role::user`] when a single descriptor
/// is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// The server host role
    pub fn server_host() -> Self {
        Role("server_host".into())
    }

    /// The administrator role
    pub fn admin() -> Self {
        Role("admin".into())
    }

    /// The moderator role
    pub fn moderator() -> Self {
        Role("moderator".into())
    }

    /// The developer role
    pub fn developer() -> Self {
        Role("developer".into())
    }

    /// The default role, assumed when a descriptor carries no role
    pub fn user() -> Self {
        Role("user".into())
    }

    /// Build a role from a raw wire value
    pub fn new(value: impl Into<String>) -> Self {
        Role(value.into())
    }

    /// Whether the role value is empty (unset on the wire)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this role value includes the given named role.
    ///
    /// Handles comma-joined subsets such as `"admin,developer"`.
    pub fn contains(&self, role: &str) -> bool {
        self.0.split(',').any(|part| part.trim() == role)
    }

    /// The raw wire value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Role(String::new())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ProfileFed profile descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Arbitrary ID string for the profile
    pub id: String,
    /// Namespace URLs used by the `extra` entries
    pub namespaces: Vec<String>,
    /// The user's preferred display name
    pub display_name: String,
    /// The user's username
    pub username: String,
    /// The user's bio text
    pub bio: String,
    /// The user's role on the server; [`Role::user`] if unset
    #[serde(default)]
    pub role: Role,
    /// Additional user data defined by namespaces
    pub extra: Vec<Extra>,
}

/// Additional user data defined by a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    /// The namespace URL used by this object, possibly with a fragment
    pub namespace: String,
    /// Arbitrary string describing the type of `data`
    #[serde(rename = "type")]
    pub extra_type: String,
    /// The arbitrary additional user data
    pub data: serde_json::Value,
}

impl Descriptor {
    /// Add an extra data object to the descriptor.
    ///
    /// The namespace's fragment is ignored for the membership check against
    /// `namespaces`; the bare URL is registered there if absent, while the
    /// entry itself keeps the fragment-bearing namespace. Fails only if
    /// `data` cannot be serialized to JSON.
    pub fn add_extra(
        &mut self,
        namespace: impl Into<String>,
        extra_type: impl Into<String>,
        data: &impl Serialize,
    ) -> Result<()> {
        let namespace = namespace.into();
        let bare = namespace
            .split_once('#')
            .map_or(namespace.as_str(), |(url, _)| url);

        if !self.namespaces.iter().any(|ns| ns == bare) {
            self.namespaces.push(bare.to_string());
        }

        let value = serde_json::to_value(data)?;

        self.extra.push(Extra {
            namespace,
            extra_type: extra_type.into(),
            data: value,
        });

        Ok(())
    }
}
