// Copyright (c) 2025 - Cowboy AI, Inc.
//! Register lookup
//!
//! Consumers outside the controllers resolve effective registers by register
//! name: `acme` addresses the organization, `acme.web` the deployment.
//! Served sets must contain every critical register kind.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    AddressAllocationStrategy, Deployment, ObjectKey, ObservedResource, Organization,
    RegisterKind, RegisterSet,
};
use crate::errors::{ControllerError, ControllerResult};
use crate::store::ResourceStore;

#[async_trait]
pub trait Registry: Send + Sync {
    /// `org` alone, or `org.dep` when a deployment is named
    fn register_name(&self, organization: &str, deployment: &str) -> String {
        if deployment.is_empty() {
            return organization.to_string();
        }
        format!("{organization}.{deployment}")
    }

    async fn get_register(&self, namespace: &str, register_name: &str)
        -> ControllerResult<RegisterSet>;

    async fn get_address_allocation_strategy(
        &self,
        namespace: &str,
        register_name: &str,
    ) -> ControllerResult<Option<AddressAllocationStrategy>>;
}

/// Registry reading observed state straight from the stores
pub struct StoreRegistry {
    organizations: Arc<dyn ResourceStore<Organization>>,
    deployments: Arc<dyn ResourceStore<Deployment>>,
}

enum Target {
    Organization(ObjectKey),
    Deployment(ObjectKey),
}

fn target(namespace: &str, register_name: &str) -> ControllerResult<Target> {
    let key = ObjectKey::new(namespace, register_name);
    match register_name.split('.').count() {
        1 => Ok(Target::Organization(key)),
        2 => Ok(Target::Deployment(key)),
        _ => Err(ControllerError::InvalidRegisterName(register_name.to_string())),
    }
}

impl StoreRegistry {
    pub fn new(
        organizations: Arc<dyn ResourceStore<Organization>>,
        deployments: Arc<dyn ResourceStore<Deployment>>,
    ) -> Self {
        Self {
            organizations,
            deployments,
        }
    }
}

#[async_trait]
impl Registry for StoreRegistry {
    async fn get_register(
        &self,
        namespace: &str,
        register_name: &str,
    ) -> ControllerResult<RegisterSet> {
        let registers = match target(namespace, register_name)? {
            Target::Organization(key) => self.organizations.get(&key).await?.state_register(),
            Target::Deployment(key) => self.deployments.get(&key).await?.state_register(),
        };

        for kind in RegisterKind::CRITICAL {
            if !registers.contains_key(kind.as_str()) {
                return Err(ControllerError::MissingRegister(kind.to_string()));
            }
        }
        Ok(registers)
    }

    async fn get_address_allocation_strategy(
        &self,
        namespace: &str,
        register_name: &str,
    ) -> ControllerResult<Option<AddressAllocationStrategy>> {
        let strategy = match target(namespace, register_name)? {
            Target::Organization(key) => self
                .organizations
                .get(&key)
                .await?
                .state_address_allocation_strategy()
                .cloned(),
            Target::Deployment(key) => self
                .deployments
                .get(&key)
                .await?
                .state_address_allocation_strategy()
                .cloned(),
        };
        Ok(strategy)
    }
}
