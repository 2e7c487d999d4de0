// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generic reconcile loop
//!
//! [`Reconciler`] drives one object through a reconcile pass and delegates
//! the kind-specific work to an [`Application`]. Every step is fed into the
//! [`ReconcilePhase`] machine, which decides whether the status must be
//! written before the pass returns.
//!
//! # Outcomes
//!
//! | Situation | Status written | Result |
//! |---|---|---|
//! | object not found | no | `Ok`, no requeue |
//! | cleanup pending | no | `Ok`, requeue after short wait |
//! | deletion finished | no | `Ok`, no requeue |
//! | step failed | `ReconcileError` + `NotReady` | `Err` |
//! | converged | `ReconcileSuccess` + `Ready` | `Ok`, requeue after `Application::timeout` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::finalizer::Finalizer;
use crate::domain::{Condition, ObjectKey, Resource};
use crate::errors::{ControllerError, ControllerResult};
use crate::state_machine::{ReconcileInput, ReconcilePhase, StateMachine, TransitionOutput};
use crate::store::ResourceStore;

/// Event reasons attached to reconcile log lines
pub mod reason {
    pub const CANNOT_DELETE_RESOURCE: &str = "CannotDeleteResource";
    pub const CANNOT_ADD_FINALIZER: &str = "CannotAddFinalizer";
    pub const CANNOT_DELETE_FINALIZER: &str = "CannotDeleteFinalizer";
    pub const CANNOT_INITIALIZE_RESOURCE: &str = "CannotInitializeResource";
    pub const APPLOGIC_FAILED: &str = "ApplogicFailed";
    pub const CANNOT_UPDATE_STATUS: &str = "CannotUpdateStatus";
    pub const UNEXPECTED_RESOURCE: &str = "UnexpectedResource";
    pub const RECONCILE_SUCCESS: &str = "ReconcileSuccess";
}

/// Kind-specific hooks called by the reconcile loop
#[async_trait]
pub trait Application<R: Resource>: Send + Sync {
    /// Prepare the in-memory object, e.g. allocate its observed state
    async fn initialize(&self, object: &mut R) -> ControllerResult<()>;

    /// Domain logic; mutates status, which the loop persists
    async fn update(&self, object: &mut R) -> ControllerResult<()>;

    /// Cleanup before the finalizer is removed; `false` means not done yet
    async fn delete(&self, _object: &R) -> ControllerResult<bool> {
        Ok(true)
    }

    /// Bookkeeping once the finalizer is gone
    async fn final_delete(&self, object: &R);

    /// Delay until the next reconcile of a converged object
    async fn timeout(&self, object: &R) -> Duration;
}

/// What the runtime should do with the key after a successful pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    pub requeue_after: Option<Duration>,
}

impl Action {
    pub fn await_change() -> Self {
        Self::default()
    }

    pub fn requeue(after: Duration) -> Self {
        Self {
            requeue_after: Some(after),
        }
    }
}

/// Reconcile loop for one resource kind
pub struct Reconciler<R: Resource> {
    store: Arc<dyn ResourceStore<R>>,
    finalizer: Arc<dyn Finalizer<R>>,
    app: Arc<dyn Application<R>>,
    timeout: Duration,
    short_wait: Duration,
}

impl<R: Resource> Reconciler<R> {
    pub fn new(
        store: Arc<dyn ResourceStore<R>>,
        finalizer: Arc<dyn Finalizer<R>>,
        app: Arc<dyn Application<R>>,
        timeout: Duration,
        short_wait: Duration,
    ) -> Self {
        Self {
            store,
            finalizer,
            app,
            timeout,
            short_wait,
        }
    }

    /// Run one pass for `key` under the per-reconcile deadline
    pub async fn reconcile(&self, key: &ObjectKey) -> ControllerResult<Action> {
        debug!(kind = R::KIND, namespace = %key.namespace, name = %key.name, "reconcile");
        match tokio::time::timeout(self.timeout, self.run(key)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(kind = R::KIND, namespace = %key.namespace, name = %key.name, timeout = ?self.timeout, "reconcile timed out");
                Err(ControllerError::Timeout(self.timeout))
            }
        }
    }

    async fn run(&self, key: &ObjectKey) -> ControllerResult<Action> {
        let phase = ReconcilePhase::Fetching;

        let mut object = match self.store.get(key).await {
            Ok(object) => object,
            Err(err) if err.is_not_found() => {
                phase.transition(&ReconcileInput::Vanished)?;
                debug!(kind = R::KIND, namespace = %key.namespace, name = %key.name, "object not found, nothing to do");
                return Ok(Action::await_change());
            }
            Err(err) => {
                phase.transition(&ReconcileInput::Failed)?;
                return Err(err.into());
            }
        };

        let actual = &object.type_meta().kind;
        if !actual.is_empty() && actual != R::KIND {
            phase.transition(&ReconcileInput::Failed)?;
            let err = ControllerError::UnexpectedResource {
                expected: R::KIND.to_string(),
                actual: actual.clone(),
            };
            warn!(kind = R::KIND, name = object.name(), reason = reason::UNEXPECTED_RESOURCE, error = %err, "unexpected resource");
            return Err(err);
        }

        let deleted = object.meta().was_deleted();
        let (phase, _) = phase.transition(&ReconcileInput::Fetched { deleted })?;

        if deleted {
            return self.finalize(phase, object).await;
        }

        let (phase, _) = match self.finalizer.add_finalizer(&mut object).await {
            Ok(()) => phase.transition(&ReconcileInput::FinalizerAdded)?,
            Err(err) => {
                let err = ControllerError::Finalizer {
                    action: "add",
                    source: Box::new(err),
                };
                return self.fail(phase, object, reason::CANNOT_ADD_FINALIZER, err).await;
            }
        };

        let (phase, _) = match self.app.initialize(&mut object).await {
            Ok(()) => phase.transition(&ReconcileInput::ResourceInitialized)?,
            Err(err) => {
                return self
                    .fail(phase, object, reason::CANNOT_INITIALIZE_RESOURCE, err)
                    .await;
            }
        };

        let (phase, output) = match self.app.update(&mut object).await {
            Ok(()) => phase.transition(&ReconcileInput::LogicApplied)?,
            Err(err) => return self.fail(phase, object, reason::APPLOGIC_FAILED, err).await,
        };

        if output.persist_status {
            object.set_conditions([Condition::reconcile_success(), Condition::ready()]);
            if let Err(err) = self.persist_status(&object).await {
                let (_, output) = phase.transition(&ReconcileInput::Failed)?;
                debug_assert!(!output.persist_status);
                warn!(kind = R::KIND, name = object.name(), reason = reason::CANNOT_UPDATE_STATUS, error = %err, "status not written");
                return Err(err);
            }
        }
        phase.transition(&ReconcileInput::StatusWritten)?;

        let requeue_after = self.app.timeout(&object).await;
        info!(
            kind = R::KIND,
            namespace = object.namespace(),
            name = object.name(),
            reason = reason::RECONCILE_SUCCESS,
            requeue_after = ?requeue_after,
            "reconcile success"
        );
        Ok(Action::requeue(requeue_after))
    }

    async fn finalize(&self, phase: ReconcilePhase, mut object: R) -> ControllerResult<Action> {
        match self.app.delete(&object).await {
            Ok(true) => {}
            Ok(false) => {
                phase.transition(&ReconcileInput::CleanupPending)?;
                debug!(kind = R::KIND, name = object.name(), requeue_after = ?self.short_wait, "cleanup pending");
                return Ok(Action::requeue(self.short_wait));
            }
            Err(err) => {
                return self
                    .fail(phase, object, reason::CANNOT_DELETE_RESOURCE, err)
                    .await;
            }
        }

        if let Err(err) = self.finalizer.remove_finalizer(&mut object).await {
            let err = ControllerError::Finalizer {
                action: "remove",
                source: Box::new(err),
            };
            return self
                .fail(phase, object, reason::CANNOT_DELETE_FINALIZER, err)
                .await;
        }
        phase.transition(&ReconcileInput::FinalizerRemoved)?;

        self.app.final_delete(&object).await;
        info!(kind = R::KIND, namespace = object.namespace(), name = object.name(), "deletion finished");
        Ok(Action::await_change())
    }

    /// Record `err` on the object and return it
    async fn fail(
        &self,
        phase: ReconcilePhase,
        mut object: R,
        reason: &'static str,
        err: ControllerError,
    ) -> ControllerResult<Action> {
        let (_, TransitionOutput { persist_status }) = phase.transition(&ReconcileInput::Failed)?;
        warn!(
            kind = R::KIND,
            namespace = object.namespace(),
            name = object.name(),
            reason,
            error = %err,
            "reconcile failed"
        );

        // a conflict means our copy is stale; the next pass rewrites status
        if persist_status && !err.is_conflict() {
            object.set_conditions([Condition::reconcile_error(&err), Condition::not_ready()]);
            self.persist_status(&object).await?;
        }
        Err(err)
    }

    async fn persist_status(&self, object: &R) -> ControllerResult<()> {
        match self.store.update_status(object).await {
            Ok(_) => Ok(()),
            Err(err) => Err(ControllerError::StatusUpdate {
                kind: R::KIND,
                source: Box::new(err.into()),
            }),
        }
    }
}
