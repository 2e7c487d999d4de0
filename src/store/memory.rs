// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory resource store
//!
//! Keeps objects of one kind in a `BTreeMap` behind a `RwLock` and
//! broadcasts a [`ChangeEvent`] after every successful write. Used by the
//! binary as its local object store and by tests as a deterministic fake.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ResourceStore, StoreError, StoreResult};
use crate::domain::{ObjectKey, Resource};
use crate::errors::ControllerResult;
use crate::watch::{ChangeEvent, ChangeStream, WatchSource};

const EVENT_CAPACITY: usize = 1024;

struct State<R> {
    objects: BTreeMap<ObjectKey, R>,
    version: u64,
}

impl<R> State<R> {
    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}

/// Broadcast-backed store for a single resource kind
pub struct MemoryStore<R: Resource> {
    state: Arc<RwLock<State<R>>>,
    events: broadcast::Sender<ChangeEvent<R>>,
}

impl<R: Resource> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }
}

impl<R: Resource> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> MemoryStore<R> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(State {
                objects: BTreeMap::new(),
                version: 0,
            })),
            events,
        }
    }

    fn emit(&self, event: ChangeEvent<R>) {
        // no receivers is fine, nobody is watching yet
        let _ = self.events.send(event);
    }

    /// Insert a new object; the store assigns uid, generation and version
    pub async fn create(&self, object: R) -> StoreResult<R> {
        let key = object.key();
        let mut state = self.state.write().await;
        if state.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: R::KIND.to_string(),
                key: key.to_string(),
            });
        }

        let mut object = object;
        let version = state.next_version();
        let meta = object.meta_mut();
        meta.uid = Some(Uuid::now_v7());
        meta.generation = 1;
        meta.resource_version = version;
        meta.deletion_timestamp = None;

        state.objects.insert(key.clone(), object.clone());
        drop(state);

        debug!(kind = R::KIND, key = %key, "created");
        self.emit(ChangeEvent::Created {
            object: object.clone(),
        });
        Ok(object)
    }

    /// Request deletion
    ///
    /// Objects without finalizers vanish immediately. Otherwise the deletion
    /// mark is set and the object stays until its last finalizer is removed.
    pub async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let current = state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<R>(key))?;

        if current.meta().finalizers.is_empty() {
            state.objects.remove(key);
            drop(state);
            debug!(kind = R::KIND, key = %key, "deleted");
            self.emit(ChangeEvent::Deleted { object: current });
            return Ok(());
        }

        if current.meta().was_deleted() {
            return Ok(());
        }

        let version = state.next_version();
        let mut marked = current.clone();
        let meta = marked.meta_mut();
        meta.deletion_timestamp = Some(Utc::now());
        meta.generation += 1;
        meta.resource_version = version;
        state.objects.insert(key.clone(), marked.clone());
        drop(state);

        debug!(kind = R::KIND, key = %key, finalizers = ?marked.meta().finalizers, "marked for deletion");
        self.emit(ChangeEvent::Updated {
            old: current,
            new: marked,
        });
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.objects.is_empty()
    }

    fn check_version(current: &R, object: &R) -> StoreResult<()> {
        let expected = object.meta().resource_version;
        let actual = current.meta().resource_version;
        if expected != actual {
            return Err(StoreError::Conflict {
                kind: R::KIND.to_string(),
                key: current.key().to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> ResourceStore<R> for MemoryStore<R> {
    async fn get(&self, key: &ObjectKey) -> StoreResult<R> {
        self.state
            .read()
            .await
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<R>(key))
    }

    async fn list(&self) -> StoreResult<Vec<R>> {
        Ok(self.state.read().await.objects.values().cloned().collect())
    }

    async fn update(&self, object: &R) -> StoreResult<R> {
        let key = object.key();
        let mut state = self.state.write().await;
        let current = state
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<R>(&key))?;
        Self::check_version(&current, object)?;

        let mut next = object.clone();
        next.copy_status_from(&current);
        let spec_changed = current.spec() != next.spec();
        {
            let stored = current.meta();
            let meta = next.meta_mut();
            meta.uid = stored.uid;
            meta.deletion_timestamp = stored.deletion_timestamp;
            meta.generation = if spec_changed {
                stored.generation + 1
            } else {
                stored.generation
            };
        }

        if next.meta().was_deleted() && next.meta().finalizers.is_empty() {
            state.objects.remove(&key);
            drop(state);
            debug!(kind = R::KIND, key = %key, "last finalizer removed, deleted");
            self.emit(ChangeEvent::Deleted {
                object: next.clone(),
            });
            return Ok(next);
        }

        next.meta_mut().resource_version = state.next_version();
        state.objects.insert(key, next.clone());
        drop(state);

        self.emit(ChangeEvent::Updated {
            old: current,
            new: next.clone(),
        });
        Ok(next)
    }

    async fn update_status(&self, object: &R) -> StoreResult<R> {
        let key = object.key();
        let mut state = self.state.write().await;
        let current = state
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<R>(&key))?;
        Self::check_version(&current, object)?;

        let mut next = current.clone();
        next.copy_status_from(object);
        next.meta_mut().resource_version = state.next_version();
        state.objects.insert(key, next.clone());
        drop(state);

        self.emit(ChangeEvent::Updated {
            old: current,
            new: next.clone(),
        });
        Ok(next)
    }
}

#[async_trait]
impl<R: Resource> WatchSource<R> for MemoryStore<R> {
    async fn subscribe(&self) -> ControllerResult<ChangeStream<R>> {
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(|item| async move {
            match item {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(kind = R::KIND, skipped, "watch lagged, events dropped");
                    None
                }
            }
        });
        Ok(stream.boxed())
    }
}
