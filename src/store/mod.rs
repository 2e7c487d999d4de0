// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Store Abstraction
//!
//! The persistent object store is an external collaborator. Controllers only
//! see it through the narrow [`ResourceStore`] interface defined here.
//!
//! # Architecture
//!
//! ```text
//! Client ──declares──> ResourceStore ──change events──> WatchSource
//!                          ▲    │                          │
//!                 status   │    │ get / list               │ keys
//!                          │    ▼                          ▼
//!                        Reconciler <──────────────── WorkQueue
//! ```
//!
//! # Store Requirements
//!
//! 1. **Conditional Writes**: `update` and `update_status` fail with
//!    [`StoreError::Conflict`] when the caller's resource version is stale
//! 2. **Split Writes**: `update` never touches status, `update_status` never
//!    touches spec or metadata
//! 3. **Guarded Deletion**: an object with finalizers is only marked deleted;
//!    it vanishes once the last finalizer is removed

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ObjectKey, Resource};

pub mod memory;

pub use memory::MemoryStore;

/// Errors reported by a store implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: String, key: String },

    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: String, key: String },

    #[error("conflict updating {kind} {key}: resource version {expected} is stale (current {actual})")]
    Conflict {
        kind: String,
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found<R: Resource>(key: &ObjectKey) -> Self {
        StoreError::NotFound {
            kind: R::KIND.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. } | StoreError::AlreadyExists { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Typed access to one kind of resource in the store
#[async_trait]
pub trait ResourceStore<R: Resource>: Send + Sync {
    /// Fetch the current version of an object
    ///
    /// # Errors
    ///
    /// - `NotFound` if the object does not exist (or was fully deleted)
    async fn get(&self, key: &ObjectKey) -> StoreResult<R>;

    /// List every object of this kind, across namespaces
    async fn list(&self) -> StoreResult<Vec<R>>;

    /// Write spec and metadata, conditional on `resource_version`
    ///
    /// Returns the stored object with its new resource version. Removing
    /// the last finalizer from a deleted object completes its deletion.
    async fn update(&self, object: &R) -> StoreResult<R>;

    /// Write the status sub-document, conditional on `resource_version`
    async fn update_status(&self, object: &R) -> StoreResult<R>;
}
