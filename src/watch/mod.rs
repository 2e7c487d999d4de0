// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change Event Streams
//!
//! A [`WatchSource`] yields a stream of [`ChangeEvent`]s for one resource
//! kind. Controllers never depend on the shape of the underlying event bus:
//! the in-memory store, a NATS subject, or any other transport only has to
//! hand out such a stream.
//!
//! # Event Flow
//!
//! ```text
//! Store write ──> ChangeEvent ──> WatchSource::subscribe()
//!                                      │
//!                    ┌─────────────────┴──────────────────┐
//!                    ▼                                    ▼
//!          own kind: enqueue key               related kind: EventMapper
//!          (generation filter)                 (e.g. organization fan-out)
//! ```

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::domain::{ObjectKey, Resource};
use crate::errors::ControllerResult;

/// A change observed on one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeEvent<R> {
    Created { object: R },
    Updated { old: R, new: R },
    Deleted { object: R },
    Generic { object: R },
}

impl<R: Resource> ChangeEvent<R> {
    /// Operation name used in logs and bus subjects
    pub fn operation(&self) -> &'static str {
        match self {
            ChangeEvent::Created { .. } => "created",
            ChangeEvent::Updated { .. } => "updated",
            ChangeEvent::Deleted { .. } => "deleted",
            ChangeEvent::Generic { .. } => "generic",
        }
    }

    /// Every object version carried by the event, old before new
    pub fn objects(&self) -> Vec<&R> {
        match self {
            ChangeEvent::Created { object }
            | ChangeEvent::Deleted { object }
            | ChangeEvent::Generic { object } => vec![object],
            ChangeEvent::Updated { old, new } => vec![old, new],
        }
    }

    /// The most recent version carried by the event
    pub fn latest(&self) -> &R {
        match self {
            ChangeEvent::Created { object }
            | ChangeEvent::Deleted { object }
            | ChangeEvent::Generic { object } => object,
            ChangeEvent::Updated { new, .. } => new,
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.latest().key()
    }

    /// False only for updates that left name and generation untouched,
    /// i.e. status or metadata-only writes
    pub fn generation_changed(&self) -> bool {
        match self {
            ChangeEvent::Updated { old, new } => {
                old.key() != new.key() || old.meta().generation != new.meta().generation
            }
            _ => true,
        }
    }
}

/// Boxed stream of change events
pub type ChangeStream<R> = BoxStream<'static, ChangeEvent<R>>;

/// Source of change events for one resource kind
#[async_trait]
pub trait WatchSource<R: Resource>: Send + Sync {
    /// Open a new subscription; events before this call are not replayed
    async fn subscribe(&self) -> ControllerResult<ChangeStream<R>>;
}

/// Maps events on a related kind to keys of the watching controller's kind
#[async_trait]
pub trait EventMapper<O: Resource>: Send + Sync {
    async fn map(&self, event: &ChangeEvent<O>) -> ControllerResult<Vec<ObjectKey>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Organization;

    #[test]
    fn test_status_only_update_is_filtered() {
        let old = Organization::new("default", "acme");
        let mut new = old.clone();
        new.metadata.resource_version += 1;

        let event = ChangeEvent::Updated { old: old.clone(), new: new.clone() };
        assert!(!event.generation_changed());

        new.metadata.generation += 1;
        let event = ChangeEvent::Updated { old, new };
        assert!(event.generation_changed());
    }

    #[test]
    fn test_rename_counts_as_change() {
        let old = Organization::new("default", "acme");
        let new = Organization::new("default", "acme2");
        let event = ChangeEvent::Updated { old, new };

        assert!(event.generation_changed());
        let names: Vec<_> = event.objects().iter().map(|o| o.name().to_string()).collect();
        assert_eq!(names, vec!["acme", "acme2"]);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = ChangeEvent::Deleted {
            object: Organization::new("default", "acme"),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "deleted");
        assert_eq!(value["object"]["metadata"]["name"], "acme");

        let back: ChangeEvent<Organization> = serde_json::from_value(value).unwrap();
        assert_eq!(back.operation(), "deleted");
    }
}
