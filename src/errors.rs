// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for controller operations

use std::time::Duration;

use thiserror::Error;

use crate::state_machine::TransitionError;
use crate::store::StoreError;

/// Errors that can occur while reconciling organizations and deployments
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The resource vanished from the store
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A deployment references an organization that does not exist
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    /// Optimistic write collided with a concurrent writer
    #[error("conflict writing {0}: object was modified concurrently")]
    Conflict(String),

    /// The per-reconcile deadline expired
    #[error("reconcile timed out after {0:?}")]
    Timeout(Duration),

    /// The object delivered is not of the kind this controller manages
    #[error("unexpected {expected} object: got kind {actual:?}")]
    UnexpectedResource { expected: String, actual: String },

    /// Generic store failure
    #[error("store error: {0}")]
    Store(String),

    /// Writing the status sub-document failed
    #[error("cannot update status of {kind} resource: {source}")]
    StatusUpdate {
        kind: &'static str,
        #[source]
        source: Box<ControllerError>,
    },

    /// Adding or removing the finalizer failed
    #[error("cannot {action} finalizer: {source}")]
    Finalizer {
        action: &'static str,
        #[source]
        source: Box<ControllerError>,
    },

    /// A critical register kind is missing from an effective register set
    #[error("critical register {0} not found in registry")]
    MissingRegister(String),

    /// Register name does not have one or two segments
    #[error("wrong input in get register {0}")]
    InvalidRegisterName(String),

    /// Reconcile phase machine rejected a step
    #[error("invalid reconcile step: {0}")]
    InvalidTransition(#[from] TransitionError),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ControllerError {
    /// True when the resource itself is gone
    pub fn is_not_found(&self) -> bool {
        match self {
            ControllerError::NotFound(_) => true,
            ControllerError::StatusUpdate { source, .. }
            | ControllerError::Finalizer { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True for optimistic-concurrency collisions
    pub fn is_conflict(&self) -> bool {
        match self {
            ControllerError::Conflict(_) => true,
            ControllerError::StatusUpdate { source, .. }
            | ControllerError::Finalizer { source, .. } => source.is_conflict(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ControllerError::Timeout(_))
    }
}

/// Result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;

impl From<StoreError> for ControllerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ControllerError::NotFound(err.to_string()),
            StoreError::Conflict { kind, key, .. } | StoreError::AlreadyExists { kind, key } => {
                ControllerError::Conflict(format!("{kind} {key}"))
            }
            StoreError::Backend(msg) => ControllerError::Store(msg),
        }
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(err: serde_json::Error) -> Self {
        ControllerError::Serialization(err.to_string())
    }
}
