// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Resource Model
//!
//! Name splitting and lazy status allocation.

use org_controller::domain::{split_deployment_name, Deployment, ObservedResource, Organization};
use proptest::prelude::*;

/// Name segment without dots
fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9-]{0,12}"
}

proptest! {
    /// Property: `<org>.<dep>` splits back into its segments
    #[test]
    fn prop_split_recovers_segments(org in segment(), dep in segment()) {
        let name = format!("{}.{}", org, dep);
        prop_assert_eq!(split_deployment_name(&name), (org.as_str(), dep.as_str()));
    }

    /// Property: Any other dot count yields empty segments
    #[test]
    fn prop_split_rejects_other_dot_counts(segments in prop::collection::vec(segment(), 1..6)) {
        prop_assume!(segments.len() != 2);
        let name = segments.join(".");

        prop_assert_eq!(split_deployment_name(&name), ("", ""));
    }

    /// Property: Re-initializing never resets an observed status
    #[test]
    fn prop_initialize_never_resets(status in "[a-z]{1,10}", reason in "[a-z ]{0,20}") {
        let mut dep = Deployment::new("default", "acme.web");
        prop_assert!(dep.initialize_resource());
        dep.set_status(status.clone());
        dep.set_reason(reason.clone());

        prop_assert!(!dep.initialize_resource());
        prop_assert_eq!(dep.status(), status.as_str());
        prop_assert_eq!(dep.reason(), reason.as_str());
    }

    /// Property: Uninitialized status reads as unknown
    #[test]
    fn prop_uninitialized_status_is_unknown(name in "[a-z]{1,10}") {
        let org = Organization::new("default", name);
        prop_assert_eq!(org.status(), "unknown");
        prop_assert!(org.state_register().is_empty());
    }
}
