//! Property-Based Tests for descriptor laws
//!
//! These tests verify the value-level laws of the descriptor model:
//! 1. Descriptors with a non-empty role survive a marshal/unmarshal
//!    round-trip unchanged (clients normalize the empty-role case on read,
//!    so that case is not reversible)
//! 2. `add_extra` strips URL fragments before namespace registration, so
//!    repeated adds with differing fragments register the bare URL once
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use proptest::prelude::*;
use profilefed_core::{Descriptor, Role};

proptest! {
    /// Round-trip law: decode(marshal(descriptor)) == descriptor for all
    /// descriptors whose role is non-empty.
    #[test]
    fn prop_descriptor_roundtrip_non_empty_role(
        id in "[a-z0-9]{1,12}",
        display_name in "[a-zA-Z ]{0,24}",
        username in "[a-z]{1,16}",
        bio in ".{0,64}",
        role in "(server_host|admin|moderator|developer|user)",
    ) {
        let desc = Descriptor {
            id,
            namespaces: vec![],
            display_name,
            username,
            bio,
            role: Role::new(role),
            extra: vec![],
        };

        let encoded = serde_json::to_vec(&desc).unwrap();
        let decoded: Descriptor = serde_json::from_slice(&encoded).unwrap();
        prop_assert_eq!(decoded, desc);
    }

    /// Fragment law: adding extras under the same bare namespace with any
    /// combination of fragments registers the bare URL exactly once, while
    /// each entry keeps its fragment-bearing namespace.
    #[test]
    fn prop_add_extra_fragment_stripping(
        fragments in proptest::collection::vec("[a-z0-9]{0,8}", 1..6),
    ) {
        let base = "http://example.com/ns";
        let mut desc = Descriptor::default();

        for (i, frag) in fragments.iter().enumerate() {
            let namespace = if frag.is_empty() {
                base.to_string()
            } else {
                format!("{base}#{frag}")
            };
            desc.add_extra(namespace.as_str(), "entry", &i).unwrap();
        }

        let registered: Vec<_> = desc
            .namespaces
            .iter()
            .filter(|ns| ns.as_str() == base)
            .collect();
        prop_assert_eq!(registered.len(), 1);
        prop_assert_eq!(desc.namespaces.len(), 1);
        prop_assert_eq!(desc.extra.len(), fragments.len());

        for (entry, frag) in desc.extra.iter().zip(&fragments) {
            if frag.is_empty() {
                prop_assert_eq!(&entry.namespace, base);
            } else {
                prop_assert_eq!(entry.namespace.clone(), format!("{base}#{frag}"));
            }
        }
    }

    /// Comma-joined role values report membership for each part.
    #[test]
    fn prop_role_subset_membership(
        parts in proptest::collection::vec(
            "(server_host|admin|moderator|developer|user)", 1..4
        ),
    ) {
        let role = Role::new(parts.join(","));
        for part in &parts {
            prop_assert!(role.contains(part));
        }
        prop_assert!(!role.contains("nonexistent"));
    }
}
