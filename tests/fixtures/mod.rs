// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for org-controller
//!
//! Deterministic resources and a harness wiring both reconcilers against
//! in-memory stores.
//!
//! # Design Principles
//! - Fixtures are the only place that constructs seed resources
//! - Names, registers and strategies are fixed constants
//! - Each test gets fresh stores; nothing is shared between tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use org_controller::controller::{
    ApiFinalizer, DeploymentApplication, OrganizationApplication, OrganizationFanout, Reconciler,
    SpeedyScheduler,
};
use org_controller::domain::{AddressAllocationStrategy, AdminState, Deployment, Organization};
use org_controller::{ControllerConfig, MemoryStore};

pub const NAMESPACE: &str = "default";
pub const ORG_ACME: &str = "acme";
pub const ORG_ACME2: &str = "acme2";
pub const DEP_WEB: &str = "acme.web";

pub const SHORT_WAIT: Duration = Duration::from_secs(1);
pub const STEADY_WAIT: Duration = Duration::from_secs(60);

/// `acme` with `{ipam: pool-a, as: as-a}`
pub fn acme() -> Organization {
    Organization::new(NAMESPACE, ORG_ACME)
        .with_description("Acme Corp")
        .with_register("ipam", "pool-a")
        .with_register("as", "as-a")
}

pub fn organization(name: &str) -> Organization {
    Organization::new(NAMESPACE, name)
        .with_register("ipam", "pool-a")
        .with_register("as", "as-a")
}

/// Enabled deployment without overrides
pub fn deployment(name: &str) -> Deployment {
    Deployment::new(NAMESPACE, name)
}

pub fn disabled_deployment(name: &str) -> Deployment {
    Deployment::new(NAMESPACE, name).with_admin_state(AdminState::Disable)
}

pub fn per_site_strategy() -> AddressAllocationStrategy {
    AddressAllocationStrategy(json!({"allocation": "per-site", "prefixLength": 24}))
}

pub fn per_rack_strategy() -> AddressAllocationStrategy {
    AddressAllocationStrategy(json!({"allocation": "per-rack"}))
}

/// Config with a small worker pool and short intervals
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        reconcile_timeout: Duration::from_secs(5),
        short_wait: SHORT_WAIT,
        steady_wait: STEADY_WAIT,
        speedy_threshold: 5,
        error_backoff: Duration::from_millis(50),
        workers: 2,
        nats: None,
    }
}

/// Both reconcilers over fresh stores
pub struct Harness {
    pub organizations: Arc<MemoryStore<Organization>>,
    pub deployments: Arc<MemoryStore<Deployment>>,
    pub org_reconciler: Reconciler<Organization>,
    pub dep_reconciler: Reconciler<Deployment>,
    pub dep_speedy: SpeedyScheduler,
    pub fanout: OrganizationFanout,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(60))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let organizations = Arc::new(MemoryStore::<Organization>::new());
        let deployments = Arc::new(MemoryStore::<Deployment>::new());

        let org_reconciler = Reconciler::new(
            organizations.clone(),
            Arc::new(ApiFinalizer::<Organization>::new(organizations.clone())),
            Arc::new(OrganizationApplication::new(SpeedyScheduler::spawn(
                5,
                SHORT_WAIT,
                STEADY_WAIT,
            ))),
            timeout,
            SHORT_WAIT,
        );

        let dep_speedy = SpeedyScheduler::spawn(5, SHORT_WAIT, STEADY_WAIT);
        let dep_reconciler = Reconciler::new(
            deployments.clone(),
            Arc::new(ApiFinalizer::<Deployment>::new(deployments.clone())),
            Arc::new(DeploymentApplication::new(
                organizations.clone(),
                dep_speedy.clone(),
            )),
            timeout,
            SHORT_WAIT,
        );

        let fanout = OrganizationFanout::new(deployments.clone());

        Self {
            organizations,
            deployments,
            org_reconciler,
            dep_reconciler,
            dep_speedy,
            fanout,
        }
    }
}
