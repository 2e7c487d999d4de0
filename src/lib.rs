// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization and Deployment controllers
//!
//! This crate reconciles a two-level resource hierarchy: organizations
//! declare register bindings, deployments named `<organization>.<deployment>`
//! inherit them. It provides the reconcile loop, register propagation, the
//! organization → deployment fan-out, an adaptive requeue scheduler, and a
//! small runtime to host them against any store exposing change events.

pub mod config;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod nats;
pub mod registry;
pub mod runtime;
pub mod state_machine;
pub mod store;
pub mod watch;

// Re-export commonly used types
pub use config::ControllerConfig;
pub use domain::{Deployment, ObjectKey, Organization, Resource};
pub use errors::{ControllerError, ControllerResult};
pub use nats::{NatsClient, NatsConfig};
pub use registry::{Registry, StoreRegistry};
pub use runtime::{Controller, WorkQueue};
pub use store::{MemoryStore, ResourceStore, StoreError};
pub use watch::{ChangeEvent, WatchSource};
