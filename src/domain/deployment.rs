// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment resource
//!
//! A deployment is named `<organization>.<deployment>`. The organization it
//! belongs to is derived from that name on every reconcile; nothing else
//! links the two objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::ConditionedStatus;
use super::meta::{ObjectMeta, TypeMeta};
use super::register::{register_set, AddressAllocationStrategy, Register, RegisterSet};
use super::resource::{ObservedResource, ObservedState, Resource};

/// Finalizer attached to live deployments
pub const DEPLOYMENT_FINALIZER: &str = "deployment.org.nddr.yndd.io";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Enable,
    Disable,
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Enable => f.write_str("enable"),
            AdminState::Disable => f.write_str("disable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentKind {
    Dc,
    Wan,
}

impl DeploymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentKind::Dc => "dc",
            DeploymentKind::Wan => "wan",
        }
    }
}

/// Desired state of a deployment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    #[serde(default)]
    pub admin_state: AdminState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeploymentKind>,

    /// Overrides for the organization's bindings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub register: Vec<Register>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_allocation_strategy: Option<AddressAllocationStrategy>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentStatus {
    #[serde(flatten)]
    pub conditioned: ConditionedStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<ObservedState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
    #[serde(default)]
    pub status: DeploymentStatus,
}

/// Split `<organization>.<deployment>`
///
/// Any name without exactly one `.` yields two empty segments.
pub fn split_deployment_name(name: &str) -> (&str, &str) {
    let mut segments = name.split('.');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(org), Some(dep), None) => (org, dep),
        _ => ("", ""),
    }
}

impl Deployment {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::new(<Self as Resource>::KIND),
            metadata: ObjectMeta::new(namespace, name),
            spec: DeploymentSpec::default(),
            status: DeploymentStatus::default(),
        }
    }

    pub fn with_admin_state(mut self, admin_state: AdminState) -> Self {
        self.spec.admin_state = admin_state;
        self
    }

    pub fn with_register(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.spec.register.push(Register::new(kind, name));
        self
    }

    pub fn with_kind(mut self, kind: DeploymentKind) -> Self {
        self.spec.kind = Some(kind);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.spec.region = Some(region.into());
        self
    }

    pub fn with_address_allocation_strategy(mut self, strategy: AddressAllocationStrategy) -> Self {
        self.spec.address_allocation_strategy = Some(strategy);
        self
    }

    pub fn organization_name(&self) -> &str {
        split_deployment_name(&self.metadata.name).0
    }

    pub fn deployment_name(&self) -> &str {
        split_deployment_name(&self.metadata.name).1
    }

    pub fn admin_state(&self) -> AdminState {
        self.spec.admin_state
    }

    pub fn description(&self) -> &str {
        self.spec.description.as_deref().unwrap_or("")
    }

    pub fn region(&self) -> &str {
        self.spec.region.as_deref().unwrap_or("")
    }

    /// Deployment kind as declared, empty when unset
    pub fn kind(&self) -> &str {
        self.spec.kind.map(|k| k.as_str()).unwrap_or("")
    }

    pub fn address_allocation_strategy(&self) -> Option<&AddressAllocationStrategy> {
        self.spec.address_allocation_strategy.as_ref()
    }
}

impl Resource for Deployment {
    const KIND: &'static str = "Deployment";
    const FINALIZER: &'static str = DEPLOYMENT_FINALIZER;

    type Spec = DeploymentSpec;

    fn type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn spec(&self) -> &DeploymentSpec {
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

impl ObservedResource for Deployment {
    fn observed(&self) -> Option<&ObservedState> {
        self.status.deployment.as_ref()
    }

    fn observed_slot(&mut self) -> &mut Option<ObservedState> {
        &mut self.status.deployment
    }

    fn register(&self) -> RegisterSet {
        register_set(&self.spec.register)
    }
}
