// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization resource
//!
//! The parent scope of the hierarchy. Its register bindings are inherited by
//! every deployment named `<organization>.<deployment>`.

use serde::{Deserialize, Serialize};

use super::condition::ConditionedStatus;
use super::meta::{ObjectMeta, TypeMeta};
use super::register::{register_set, AddressAllocationStrategy, Register, RegisterSet};
use super::resource::{ObservedResource, ObservedState, Resource};

/// Finalizer attached to live organizations
pub const ORGANIZATION_FINALIZER: &str = "organization.org.nddr.yndd.io";

/// Desired state of an organization
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub register: Vec<Register>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_allocation_strategy: Option<AddressAllocationStrategy>,
}

/// Observed state of an organization
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationStatus {
    #[serde(flatten)]
    pub conditioned: ConditionedStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<ObservedState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: OrganizationSpec,
    #[serde(default)]
    pub status: OrganizationStatus,
}

impl Organization {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::new(<Self as Resource>::KIND),
            metadata: ObjectMeta::new(namespace, name),
            spec: OrganizationSpec::default(),
            status: OrganizationStatus::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    pub fn with_register(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.spec.register.push(Register::new(kind, name));
        self
    }

    pub fn with_address_allocation_strategy(mut self, strategy: AddressAllocationStrategy) -> Self {
        self.spec.address_allocation_strategy = Some(strategy);
        self
    }

    pub fn organization_name(&self) -> &str {
        &self.metadata.name
    }

    pub fn description(&self) -> &str {
        self.spec.description.as_deref().unwrap_or("")
    }

    pub fn address_allocation_strategy(&self) -> Option<&AddressAllocationStrategy> {
        self.spec.address_allocation_strategy.as_ref()
    }
}

impl Resource for Organization {
    const KIND: &'static str = "Organization";
    const FINALIZER: &'static str = ORGANIZATION_FINALIZER;

    type Spec = OrganizationSpec;

    fn type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn spec(&self) -> &OrganizationSpec {
        &self.spec
    }

    fn conditioned(&self) -> &ConditionedStatus {
        &self.status.conditioned
    }

    fn conditioned_mut(&mut self) -> &mut ConditionedStatus {
        &mut self.status.conditioned
    }

    fn copy_status_from(&mut self, other: &Self) {
        self.status = other.status.clone();
    }
}

impl ObservedResource for Organization {
    fn observed(&self) -> Option<&ObservedState> {
        self.status.organization.as_ref()
    }

    fn observed_slot(&mut self) -> &mut Option<ObservedState> {
        &mut self.status.organization
    }

    fn register(&self) -> RegisterSet {
        register_set(&self.spec.register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::STATUS_UNKNOWN;

    #[test]
    fn test_status_is_unknown_until_initialized() {
        let mut org = Organization::new("default", "acme");
        assert_eq!(org.status(), STATUS_UNKNOWN);

        assert!(org.initialize_resource());
        assert_eq!(org.status(), "");
        assert_eq!(org.reason(), "");
        assert!(org.state_register().is_empty());
    }

    #[test]
    fn test_initialize_never_resets_status() {
        let mut org = Organization::new("default", "acme").with_register("ipam", "pool-a");
        org.initialize_resource();
        org.set_status("up");
        org.set_state_register(&org.register());

        assert!(!org.initialize_resource());
        assert_eq!(org.status(), "up");
        assert_eq!(org.state_register().get("ipam").map(String::as_str), Some("pool-a"));
    }

    #[test]
    fn test_manifest_shape() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "apiVersion": "org.nddr.yndd.io/v1alpha1",
            "kind": "Organization",
            "metadata": {"name": "acme", "namespace": "default"},
            "spec": {
                "description": "Acme Corp",
                "register": [
                    {"kind": "ipam", "name": "pool-1"},
                    {"kind": "as", "name": "as-pool-1"}
                ],
                "addressAllocationStrategy": {"policy": "first-available"}
            }
        }))
        .unwrap();

        assert_eq!(org.description(), "Acme Corp");
        assert_eq!(org.register().len(), 2);
        assert!(org.address_allocation_strategy().is_some());
        assert!(org.status.organization.is_none());
    }
}
