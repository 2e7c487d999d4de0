// Copyright (c) 2025 - Cowboy AI, Inc.
//! Control-Loop Runtime
//!
//! Hosts reconcilers: a de-duplicating [`WorkQueue`] feeds a pool of worker
//! tasks, event pumps turn change streams into queue keys.
//!
//! # Queue Guarantees
//!
//! 1. **Dedup**: a key waiting in the queue is never queued twice
//! 2. **Per-key serialization**: a key handed to a worker is not handed out
//!    again until the worker calls [`WorkQueue::done`]; re-adds in between
//!    are parked and re-queued at that point
//! 3. **Fairness across keys**: distinct keys are processed concurrently
//!
//! ```text
//! WatchSource ──pump──┐
//! EventMapper ──pump──┼──> WorkQueue ──pop──> worker ──> Reconciler
//! requeue_after ──────┘        ▲                           │
//!                              └──────── add_after ────────┘
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ControllerConfig;
use crate::controller::Reconciler;
use crate::domain::{ObjectKey, Resource};
use crate::errors::ControllerResult;
use crate::store::ResourceStore;
use crate::watch::{ChangeStream, EventMapper, WatchSource};

#[derive(Default)]
struct QueueState {
    queue: VecDeque<ObjectKey>,
    dirty: HashSet<ObjectKey>,
    processing: HashSet<ObjectKey>,
    shutting_down: bool,
}

/// De-duplicating work queue of object keys
#[derive(Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl WorkQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn add(&self, key: ObjectKey) {
        let mut state = self.state.lock().await;
        if state.shutting_down || state.dirty.contains(&key) {
            return;
        }
        state.dirty.insert(key.clone());
        if state.processing.contains(&key) {
            return;
        }
        state.queue.push_back(key);
        self.notify.notify_one();
    }

    /// Add `key` once `delay` has passed
    pub fn add_after(self: &Arc<Self>, key: ObjectKey, delay: Duration) {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(key).await;
        });
    }

    /// Next key to process, `None` once shut down
    pub async fn pop(&self) -> Option<ObjectKey> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if state.shutting_down {
                    return None;
                }
                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    if !state.queue.is_empty() {
                        self.notify.notify_one();
                    }
                    return Some(key);
                }
            }

            notified.await;
        }
    }

    /// Release `key`; a re-add received while it was processing is queued now
    pub async fn done(&self, key: &ObjectKey) {
        let mut state = self.state.lock().await;
        state.processing.remove(key);
        if state.dirty.contains(key) && !state.shutting_down {
            state.queue.push_back(key.clone());
            self.notify.notify_one();
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn shut_down(&self) {
        let mut state = self.state.lock().await;
        state.shutting_down = true;
        state.queue.clear();
        state.dirty.clear();
        self.notify.notify_waiters();
    }
}

/// A reconciler plus the workers and event pumps that drive it
pub struct Controller<R: Resource> {
    name: String,
    store: Arc<dyn ResourceStore<R>>,
    reconciler: Arc<Reconciler<R>>,
    queue: Arc<WorkQueue>,
    workers: usize,
    error_backoff: Duration,
    pumps: Vec<BoxFuture<'static, ()>>,
}

impl<R: Resource> Controller<R> {
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn ResourceStore<R>>,
        reconciler: Reconciler<R>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            reconciler: Arc::new(reconciler),
            queue: WorkQueue::new(),
            workers: config.workers.max(1),
            error_backoff: config.error_backoff,
            pumps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> Arc<WorkQueue> {
        self.queue.clone()
    }

    /// Enqueue changes of the controller's own kind
    ///
    /// Updates that changed neither generation nor name are dropped.
    pub async fn watch_own(&mut self, source: &dyn WatchSource<R>) -> ControllerResult<()> {
        let stream: ChangeStream<R> = source.subscribe().await?;
        let queue = self.queue.clone();
        let name = self.name.clone();

        self.pumps.push(
            async move {
                let mut stream = stream;
                while let Some(event) = stream.next().await {
                    if !event.generation_changed() {
                        trace!(controller = %name, key = %event.key(), "update without generation change ignored");
                        continue;
                    }
                    for object in event.objects() {
                        queue.add(object.key()).await;
                    }
                }
                debug!(controller = %name, kind = R::KIND, "own watch closed");
            }
            .boxed(),
        );
        Ok(())
    }

    /// Enqueue the keys `mapper` derives from changes of a related kind
    pub async fn watch_related<O: Resource>(
        &mut self,
        source: &dyn WatchSource<O>,
        mapper: Arc<dyn EventMapper<O>>,
    ) -> ControllerResult<()> {
        let stream: ChangeStream<O> = source.subscribe().await?;
        let queue = self.queue.clone();
        let name = self.name.clone();

        self.pumps.push(
            async move {
                let mut stream = stream;
                while let Some(event) = stream.next().await {
                    if !event.generation_changed() {
                        continue;
                    }
                    match mapper.map(&event).await {
                        Ok(keys) => {
                            for key in keys {
                                queue.add(key).await;
                            }
                        }
                        Err(err) => {
                            warn!(controller = %name, kind = O::KIND, key = %event.key(), error = %err, "cannot map related event");
                        }
                    }
                }
                debug!(controller = %name, kind = O::KIND, "related watch closed");
            }
            .boxed(),
        );
        Ok(())
    }

    /// Run until `shutdown` flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> ControllerResult<()> {
        info!(controller = %self.name, workers = self.workers, "starting controller");

        let pumps: Vec<JoinHandle<()>> = self.pumps.into_iter().map(tokio::spawn).collect();

        for object in self.store.list().await? {
            self.queue.add(object.key()).await;
        }

        let mut workers = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let queue = self.queue.clone();
            let reconciler = self.reconciler.clone();
            let error_backoff = self.error_backoff;
            let name = self.name.clone();
            workers.push(tokio::spawn(async move {
                while let Some(key) = queue.pop().await {
                    match reconciler.reconcile(&key).await {
                        Ok(action) => {
                            if let Some(after) = action.requeue_after {
                                queue.add_after(key.clone(), after);
                            }
                        }
                        Err(err) => {
                            debug!(controller = %name, key = %key, error = %err, requeue_after = ?error_backoff, "requeue after error");
                            queue.add_after(key.clone(), error_backoff);
                        }
                    }
                    queue.done(&key).await;
                }
            }));
        }

        loop {
            let stop = *shutdown.borrow();
            if stop || shutdown.changed().await.is_err() {
                break;
            }
        }

        info!(controller = %self.name, "stopping controller");
        self.queue.shut_down().await;
        for pump in &pumps {
            pump.abort();
        }
        for worker in workers {
            if let Err(err) = worker.await {
                warn!(controller = %self.name, error = %err, "worker ended abnormally");
            }
        }
        Ok(())
    }
}
