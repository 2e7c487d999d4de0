// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment controller
//!
//! Resolves the parent organization by name on every pass and derives the
//! deployment's effective registers and allocation strategy from it.
//!
//! | Parent | Admin state | Status | Reason | Registers |
//! |---|---|---|---|---|
//! | missing | any | `down` | `organization not found` | cleared, error |
//! | found | `disable` | `down` | `admin state disabled` | cleared |
//! | found | `enable` | `up` | empty | parent merged under own |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::finalizer::ApiFinalizer;
use super::reconciler::{Application, Reconciler};
use super::speedy::SpeedyScheduler;
use super::watch_org::OrganizationFanout;
use crate::config::ControllerConfig;
use crate::domain::{
    inherit_strategy, merge_registers, AdminState, Deployment, ObservedResource, Organization,
    RegisterSet, Resource,
};
use crate::errors::{ControllerError, ControllerResult};
use crate::runtime::Controller;
use crate::store::ResourceStore;
use crate::watch::WatchSource;

pub const CONTROLLER_NAME: &str = "nddo/deployment";

pub const REASON_ORGANIZATION_NOT_FOUND: &str = "organization not found";
pub const REASON_ADMIN_STATE_DISABLED: &str = "admin state disabled";

pub struct DeploymentApplication {
    organizations: Arc<dyn ResourceStore<Organization>>,
    speedy: SpeedyScheduler,
}

impl DeploymentApplication {
    pub fn new(organizations: Arc<dyn ResourceStore<Organization>>, speedy: SpeedyScheduler) -> Self {
        Self {
            organizations,
            speedy,
        }
    }

    fn set_down(object: &mut Deployment, reason: &str) {
        object.set_status("down");
        object.set_reason(reason);
        object.set_state_register(&RegisterSet::new());
        object.set_state_address_allocation_strategy(None);
    }
}

#[async_trait]
impl Application<Deployment> for DeploymentApplication {
    async fn initialize(&self, object: &mut Deployment) -> ControllerResult<()> {
        if object.initialize_resource() {
            debug!(name = object.name(), "observed state allocated");
        }
        Ok(())
    }

    async fn update(&self, object: &mut Deployment) -> ControllerResult<()> {
        debug!(name = object.name(), organization = object.organization_name(), "handle app logic");

        let organizations = self.organizations.list().await?;
        let Some(organization) = organizations
            .iter()
            .find(|org| org.organization_name() == object.organization_name())
        else {
            Self::set_down(object, REASON_ORGANIZATION_NOT_FOUND);
            return Err(ControllerError::OrganizationNotFound(
                object.organization_name().to_string(),
            ));
        };

        if object.admin_state() == AdminState::Disable {
            Self::set_down(object, REASON_ADMIN_STATE_DISABLED);
            return Ok(());
        }

        let registers = merge_registers(&organization.register(), &object.register());
        let strategy = inherit_strategy(
            organization.address_allocation_strategy(),
            object.address_allocation_strategy(),
        );
        object.set_status("up");
        object.set_reason("");
        object.set_state_register(&registers);
        object.set_state_address_allocation_strategy(strategy);
        Ok(())
    }

    async fn final_delete(&self, object: &Deployment) {
        self.speedy.forget(&object.key().identity()).await;
    }

    async fn timeout(&self, object: &Deployment) -> Duration {
        self.speedy.next_delay(&object.key().identity()).await
    }
}

/// Wire the deployment controller, including the organization fan-out
pub async fn setup(
    deployments: Arc<dyn ResourceStore<Deployment>>,
    organizations: Arc<dyn ResourceStore<Organization>>,
    deployment_events: &dyn WatchSource<Deployment>,
    organization_events: &dyn WatchSource<Organization>,
    config: &ControllerConfig,
) -> ControllerResult<Controller<Deployment>> {
    if config.workers == 0 {
        return Err(ControllerError::Configuration(
            "deployment controller needs at least one worker".to_string(),
        ));
    }

    let speedy = SpeedyScheduler::spawn(
        config.speedy_threshold,
        config.short_wait,
        config.steady_wait,
    );
    let reconciler = Reconciler::new(
        deployments.clone(),
        Arc::new(ApiFinalizer::new(deployments.clone())),
        Arc::new(DeploymentApplication::new(organizations, speedy)),
        config.reconcile_timeout,
        config.short_wait,
    );

    let fanout = Arc::new(OrganizationFanout::new(deployments.clone()));
    let mut controller = Controller::new(CONTROLLER_NAME, deployments, reconciler, config);
    controller.watch_own(deployment_events).await?;
    controller
        .watch_related(organization_events, fanout)
        .await?;
    Ok(controller)
}
