// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Domain Models
//!
//! Typed representations of the two-level hierarchy managed by this crate:
//!
//! - [`Organization`] - parent scope declaring register bindings
//! - [`Deployment`] - child named `<organization>.<deployment>` that inherits them
//!
//! # Value Objects
//!
//! - [`ObjectKey`] / [`ObjectMeta`] - identity, finalizers, deletion mark
//! - [`Register`] / [`RegisterSet`] - register bindings and the merge rule
//! - [`Condition`] - `Ready` and `Synced` conditions written on every reconcile

pub mod condition;
pub mod deployment;
pub mod meta;
pub mod organization;
pub mod register;
pub mod resource;

pub use condition::{Condition, ConditionKind, ConditionStatus, ConditionedStatus};
pub use deployment::{
    split_deployment_name, AdminState, Deployment, DeploymentKind, DeploymentSpec,
    DeploymentStatus, DEPLOYMENT_FINALIZER,
};
pub use meta::{ObjectKey, ObjectMeta, TypeMeta, API_VERSION, DEFAULT_NAMESPACE};
pub use organization::{
    Organization, OrganizationSpec, OrganizationStatus, ORGANIZATION_FINALIZER,
};
pub use register::{
    inherit_strategy, merge_registers, register_list, register_set, AddressAllocationStrategy,
    Register, RegisterKind, RegisterSet, UnknownRegisterKind,
};
pub use resource::{ObservedResource, ObservedState, Resource, STATUS_UNKNOWN};
