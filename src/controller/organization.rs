// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization controller
//!
//! An organization is its own root: its effective registers and allocation
//! strategy are exactly what it declares.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::finalizer::ApiFinalizer;
use super::reconciler::{Application, Reconciler};
use super::speedy::SpeedyScheduler;
use crate::config::ControllerConfig;
use crate::domain::{ObservedResource, Organization, Resource};
use crate::errors::{ControllerError, ControllerResult};
use crate::runtime::Controller;
use crate::store::ResourceStore;
use crate::watch::WatchSource;

pub const CONTROLLER_NAME: &str = "nddo/organization";

pub struct OrganizationApplication {
    speedy: SpeedyScheduler,
}

impl OrganizationApplication {
    pub fn new(speedy: SpeedyScheduler) -> Self {
        Self { speedy }
    }
}

#[async_trait]
impl Application<Organization> for OrganizationApplication {
    async fn initialize(&self, object: &mut Organization) -> ControllerResult<()> {
        if object.initialize_resource() {
            debug!(name = object.name(), "observed state allocated");
        }
        Ok(())
    }

    async fn update(&self, object: &mut Organization) -> ControllerResult<()> {
        debug!(name = object.name(), "handle app logic");
        let registers = object.register();
        let strategy = object.address_allocation_strategy().cloned();

        object.set_status("up");
        object.set_reason("");
        object.set_state_register(&registers);
        object.set_state_address_allocation_strategy(strategy);
        Ok(())
    }

    async fn final_delete(&self, object: &Organization) {
        self.speedy.forget(&object.key().identity()).await;
    }

    async fn timeout(&self, object: &Organization) -> Duration {
        self.speedy.next_delay(&object.key().identity()).await
    }
}

/// Wire the organization controller
pub async fn setup(
    store: Arc<dyn ResourceStore<Organization>>,
    events: &dyn WatchSource<Organization>,
    config: &ControllerConfig,
) -> ControllerResult<Controller<Organization>> {
    if config.workers == 0 {
        return Err(ControllerError::Configuration(
            "organization controller needs at least one worker".to_string(),
        ));
    }

    let speedy = SpeedyScheduler::spawn(
        config.speedy_threshold,
        config.short_wait,
        config.steady_wait,
    );
    let reconciler = Reconciler::new(
        store.clone(),
        Arc::new(ApiFinalizer::new(store.clone())),
        Arc::new(OrganizationApplication::new(speedy)),
        config.reconcile_timeout,
        config.short_wait,
    );

    let mut controller = Controller::new(CONTROLLER_NAME, store, reconciler, config);
    controller.watch_own(events).await?;
    Ok(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressAllocationStrategy, Register};
    use serde_json::json;

    #[tokio::test]
    async fn test_effective_state_is_own_declaration() {
        let app = OrganizationApplication::new(SpeedyScheduler::spawn(
            5,
            Duration::from_secs(1),
            Duration::from_secs(60),
        ));
        let strategy = AddressAllocationStrategy(json!({"allocation": "per-site"}));
        let mut org = Organization::new("default", "acme")
            .with_register("ipam", "pool-a")
            .with_register("as", "as-a")
            .with_address_allocation_strategy(strategy.clone());

        app.initialize(&mut org).await.unwrap();
        app.update(&mut org).await.unwrap();

        assert_eq!(org.status(), "up");
        assert_eq!(org.reason(), "");
        assert_eq!(
            org.observed().unwrap().register,
            vec![Register::new("as", "as-a"), Register::new("ipam", "pool-a")]
        );
        assert_eq!(org.state_address_allocation_strategy(), Some(&strategy));
    }
}
