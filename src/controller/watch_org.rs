// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization → Deployment fan-out
//!
//! Any change to an organization re-enqueues every deployment whose name
//! carries that organization as its first segment. Updates evaluate the old
//! and the new object independently, so a rename enqueues the children of
//! both names.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Deployment, ObjectKey, Organization, Resource};
use crate::errors::ControllerResult;
use crate::store::ResourceStore;
use crate::watch::{ChangeEvent, EventMapper};

pub struct OrganizationFanout {
    deployments: Arc<dyn ResourceStore<Deployment>>,
}

impl OrganizationFanout {
    pub fn new(deployments: Arc<dyn ResourceStore<Deployment>>) -> Self {
        Self { deployments }
    }
}

#[async_trait]
impl EventMapper<Organization> for OrganizationFanout {
    async fn map(&self, event: &ChangeEvent<Organization>) -> ControllerResult<Vec<ObjectKey>> {
        let deployments = self.deployments.list().await?;

        let mut keys: Vec<ObjectKey> = Vec::new();
        for organization in event.objects() {
            debug!(
                name = organization.name(),
                operation = event.operation(),
                "watch organization"
            );
            for deployment in &deployments {
                if deployment.organization_name() != organization.name() {
                    continue;
                }
                let key = deployment.key();
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    async fn seeded() -> OrganizationFanout {
        let store = Arc::new(MemoryStore::new());
        for name in ["acme.web", "acme.db", "globex.web", "acme"] {
            store.create(Deployment::new("default", name)).await.unwrap();
        }
        store.create(Deployment::new("team-a", "acme.edge")).await.unwrap();
        OrganizationFanout::new(store)
    }

    #[tokio::test]
    async fn test_only_children_are_enqueued() {
        let fanout = seeded().await;
        let event = ChangeEvent::Created {
            object: Organization::new("default", "acme"),
        };

        let keys = fanout.map(&event).await.unwrap();
        assert_eq!(
            keys,
            vec![
                ObjectKey::new("default", "acme.db"),
                ObjectKey::new("default", "acme.web"),
                ObjectKey::new("team-a", "acme.edge"),
            ]
        );
    }

    #[tokio::test]
    async fn test_rename_fans_out_on_both_names() {
        let fanout = seeded().await;
        let event = ChangeEvent::Updated {
            old: Organization::new("default", "globex"),
            new: Organization::new("default", "acme"),
        };

        let keys = fanout.map(&event).await.unwrap();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0], ObjectKey::new("default", "globex.web"));
    }

    #[tokio::test]
    async fn test_update_without_rename_is_deduplicated() {
        let fanout = seeded().await;
        let org = Organization::new("default", "globex");
        let event = ChangeEvent::Updated {
            old: org.clone(),
            new: org,
        };

        let keys = fanout.map(&event).await.unwrap();
        assert_eq!(keys, vec![ObjectKey::new("default", "globex.web")]);
    }

    #[tokio::test]
    async fn test_deleted_organization_enqueues_children() {
        let fanout = seeded().await;
        let event = ChangeEvent::Deleted {
            object: Organization::new("default", "globex"),
        };

        let keys = fanout.map(&event).await.unwrap();
        assert_eq!(keys, vec![ObjectKey::new("default", "globex.web")]);
    }

    #[tokio::test]
    async fn test_generic_event_enqueues_children() {
        let fanout = seeded().await;
        let event = ChangeEvent::Generic {
            object: Organization::new("default", "acme"),
        };

        let keys = fanout.map(&event).await.unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&ObjectKey::new("default", "acme.web")));
        assert!(!keys.contains(&ObjectKey::new("default", "acme")));
    }

    #[tokio::test]
    async fn test_unknown_organization_enqueues_nothing() {
        let fanout = seeded().await;
        let event = ChangeEvent::Deleted {
            object: Organization::new("default", "initech"),
        };

        assert!(fanout.map(&event).await.unwrap().is_empty());
    }
}
