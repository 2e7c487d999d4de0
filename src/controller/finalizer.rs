// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finalization protocol
//!
//! A live object carries its kind's finalizer so the store cannot complete a
//! deletion before cleanup ran. Both operations are idempotent and only write
//! when the finalizer list actually changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::Resource;
use crate::errors::ControllerResult;
use crate::store::ResourceStore;

#[async_trait]
pub trait Finalizer<R: Resource>: Send + Sync {
    /// Ensure the finalizer is present; `object` is refreshed from the store
    async fn add_finalizer(&self, object: &mut R) -> ControllerResult<()>;

    /// Remove the finalizer; an object that already vanished counts as done
    async fn remove_finalizer(&self, object: &mut R) -> ControllerResult<()>;
}

/// Finalizer backed by the resource store's spec/metadata write
pub struct ApiFinalizer<R: Resource> {
    store: Arc<dyn ResourceStore<R>>,
    finalizer: &'static str,
}

impl<R: Resource> ApiFinalizer<R> {
    pub fn new(store: Arc<dyn ResourceStore<R>>) -> Self {
        Self {
            store,
            finalizer: R::FINALIZER,
        }
    }
}

#[async_trait]
impl<R: Resource> Finalizer<R> for ApiFinalizer<R> {
    async fn add_finalizer(&self, object: &mut R) -> ControllerResult<()> {
        if !object.meta_mut().add_finalizer(self.finalizer) {
            return Ok(());
        }
        *object = self.store.update(object).await?;
        debug!(kind = R::KIND, name = object.name(), finalizer = self.finalizer, "finalizer added");
        Ok(())
    }

    async fn remove_finalizer(&self, object: &mut R) -> ControllerResult<()> {
        if !object.meta_mut().remove_finalizer(self.finalizer) {
            return Ok(());
        }
        match self.store.update(object).await {
            Ok(stored) => {
                *object = stored;
                debug!(kind = R::KIND, name = object.name(), finalizer = self.finalizer, "finalizer removed");
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
