// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Traits
//!
//! Two traits split the surface of a stored object:
//!
//! - [`Resource`] is what the store and the generic reconciler need:
//!   identity, metadata, spec equality and the condition list.
//! - [`ObservedResource`] is the observed-state surface shared by
//!   organizations and deployments: status, reason and effective registers.
//!
//! # Lazy Status
//!
//! The observed state is an `Option` that is allocated once by
//! [`ObservedResource::initialize_resource`] and never replaced by it
//! afterwards, so re-running initialization after a crash cannot erase
//! previously observed state.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::condition::{Condition, ConditionKind, ConditionedStatus};
use super::meta::{ObjectKey, ObjectMeta, TypeMeta};
use super::register::{register_list, register_set, AddressAllocationStrategy, Register, RegisterSet};

/// Status reported before the first reconcile allocated any state
pub const STATUS_UNKNOWN: &str = "unknown";

/// A typed object living in the resource store
pub trait Resource:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Kind name, e.g. `Organization`
    const KIND: &'static str;

    /// Finalizer token blocking deletion until cleanup completes
    const FINALIZER: &'static str;

    type Spec: PartialEq;

    fn type_meta(&self) -> &TypeMeta;
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;
    fn spec(&self) -> &Self::Spec;
    fn conditioned(&self) -> &ConditionedStatus;
    fn conditioned_mut(&mut self) -> &mut ConditionedStatus;

    /// Replace this object's whole status with `other`'s
    fn copy_status_from(&mut self, other: &Self);

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn namespace(&self) -> &str {
        &self.meta().namespace
    }

    fn key(&self) -> ObjectKey {
        self.meta().key()
    }

    fn get_condition(&self, kind: ConditionKind) -> Condition {
        self.conditioned().get_condition(kind)
    }

    fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        self.conditioned_mut().set_conditions(conditions);
    }
}

/// Observed state sub-document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub register: Vec<Register>,
    #[serde(default)]
    pub address_allocation_strategy: Option<AddressAllocationStrategy>,
}

/// Status accessors shared by organizations and deployments
pub trait ObservedResource: Resource {
    fn observed(&self) -> Option<&ObservedState>;
    fn observed_slot(&mut self) -> &mut Option<ObservedState>;

    /// Register bindings declared in the spec
    fn register(&self) -> RegisterSet;

    /// Allocate the observed state if absent; returns whether it allocated
    fn initialize_resource(&mut self) -> bool {
        let slot = self.observed_slot();
        if slot.is_some() {
            return false;
        }
        *slot = Some(ObservedState::default());
        true
    }

    fn status(&self) -> &str {
        self.observed()
            .map(|s| s.status.as_str())
            .unwrap_or(STATUS_UNKNOWN)
    }

    fn reason(&self) -> &str {
        self.observed().map(|s| s.reason.as_str()).unwrap_or("")
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.observed_slot()
            .get_or_insert_with(ObservedState::default)
            .status = status.into();
    }

    fn set_reason(&mut self, reason: impl Into<String>) {
        self.observed_slot()
            .get_or_insert_with(ObservedState::default)
            .reason = reason.into();
    }

    /// Effective register set
    fn state_register(&self) -> RegisterSet {
        self.observed()
            .map(|s| register_set(&s.register))
            .unwrap_or_default()
    }

    fn set_state_register(&mut self, registers: &RegisterSet) {
        self.observed_slot()
            .get_or_insert_with(ObservedState::default)
            .register = register_list(registers);
    }

    fn state_address_allocation_strategy(&self) -> Option<&AddressAllocationStrategy> {
        self.observed()
            .and_then(|s| s.address_allocation_strategy.as_ref())
    }

    fn set_state_address_allocation_strategy(
        &mut self,
        strategy: Option<AddressAllocationStrategy>,
    ) {
        self.observed_slot()
            .get_or_insert_with(ObservedState::default)
            .address_allocation_strategy = strategy;
    }
}
