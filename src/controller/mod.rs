// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconcile Controllers
//!
//! ```text
//! WorkQueue ──key──> Reconciler<R> ──hooks──> Application<R>
//!                        │    │                 ├─ OrganizationApplication
//!                        │    │                 └─ DeploymentApplication
//!                        │    └──> Finalizer<R>
//!                        └──> SpeedyScheduler (next requeue delay)
//! ```
//!
//! Deployments additionally watch organizations through
//! [`watch_org::OrganizationFanout`].

pub mod deployment;
pub mod finalizer;
pub mod organization;
pub mod reconciler;
pub mod speedy;
pub mod watch_org;

pub use deployment::DeploymentApplication;
pub use finalizer::{ApiFinalizer, Finalizer};
pub use organization::OrganizationApplication;
pub use reconciler::{Action, Application, Reconciler};
pub use speedy::SpeedyScheduler;
pub use watch_org::OrganizationFanout;
