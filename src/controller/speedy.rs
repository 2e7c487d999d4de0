// Copyright (c) 2025 - Cowboy AI, Inc.
//! Adaptive retry scheduler
//!
//! Counts reconcile completions per object identity. While the count is at
//! or below the threshold the next reconcile comes after the short wait;
//! after that it settles to the steady interval. The counter map is owned by
//! a single task and only reached through its request channel.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Request {
    NextDelay {
        identity: String,
        reply: oneshot::Sender<Duration>,
    },
    Count {
        identity: String,
        reply: oneshot::Sender<Option<u32>>,
    },
    Forget {
        identity: String,
    },
}

struct SpeedyActor {
    counters: HashMap<String, u32>,
    threshold: u32,
    short_wait: Duration,
    steady_wait: Duration,
}

impl SpeedyActor {
    async fn run(mut self, mut requests: mpsc::Receiver<Request>) {
        while let Some(request) = requests.recv().await {
            match request {
                Request::NextDelay { identity, reply } => {
                    let _ = reply.send(self.next_delay(identity));
                }
                Request::Count { identity, reply } => {
                    let _ = reply.send(self.counters.get(&identity).copied());
                }
                Request::Forget { identity } => {
                    self.counters.remove(&identity);
                }
            }
        }
        debug!("speedy scheduler stopped");
    }

    fn next_delay(&mut self, identity: String) -> Duration {
        let count = self.counters.entry(identity).or_insert(0);
        if *count <= self.threshold {
            debug!(number = *count, "speedy");
            *count += 1;
            return self.short_wait;
        }
        self.steady_wait
    }
}

/// Handle to the scheduler task; cheap to clone
#[derive(Clone)]
pub struct SpeedyScheduler {
    requests: mpsc::Sender<Request>,
    steady_wait: Duration,
}

impl SpeedyScheduler {
    /// Spawn the owning task on the current runtime
    pub fn spawn(threshold: u32, short_wait: Duration, steady_wait: Duration) -> Self {
        let (requests, receiver) = mpsc::channel(256);
        let actor = SpeedyActor {
            counters: HashMap::new(),
            threshold,
            short_wait,
            steady_wait,
        };
        tokio::spawn(actor.run(receiver));
        Self {
            requests,
            steady_wait,
        }
    }

    /// Delay before the next reconcile of `identity`, counting this call
    pub async fn next_delay(&self, identity: &str) -> Duration {
        let (reply, response) = oneshot::channel();
        let request = Request::NextDelay {
            identity: identity.to_string(),
            reply,
        };
        if self.requests.send(request).await.is_err() {
            warn!(identity, "speedy scheduler gone, using steady interval");
            return self.steady_wait;
        }
        response.await.unwrap_or(self.steady_wait)
    }

    /// Current counter, `None` when absent
    pub async fn count(&self, identity: &str) -> Option<u32> {
        let (reply, response) = oneshot::channel();
        let request = Request::Count {
            identity: identity.to_string(),
            reply,
        };
        self.requests.send(request).await.ok()?;
        response.await.ok().flatten()
    }

    /// Drop the counter once the object is gone
    pub async fn forget(&self, identity: &str) {
        let request = Request::Forget {
            identity: identity.to_string(),
        };
        if self.requests.send(request).await.is_err() {
            warn!(identity, "speedy scheduler gone, counter not removed");
        }
    }
}
