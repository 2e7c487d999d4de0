// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS change-event bus
//!
//! Store change events are published as JSON on
//! `<prefix>.<kind>.<operation>`, e.g. `org.organization.updated`.
//! [`NatsWatchSource`] is the consuming side: it subscribes to
//! `<prefix>.<kind>.>` and hands the decoded events to a controller like
//! any other [`WatchSource`].

use std::marker::PhantomData;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::Resource;
use crate::errors::{ControllerError, ControllerResult};
use crate::watch::{ChangeEvent, ChangeStream, WatchSource};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// First subject token of every change event
    pub subject_prefix: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "org-controller".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            subject_prefix: "org".to_string(),
        }
    }
}

/// Subject a change event is published on
pub fn event_subject(prefix: &str, kind: &str, operation: &str) -> String {
    format!("{}.{}.{}", prefix, kind.to_lowercase(), operation)
}

/// Wildcard subject covering every event of one kind
pub fn kind_subject(prefix: &str, kind: &str) -> String {
    format!("{}.{}.>", prefix, kind.to_lowercase())
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: &NatsConfig) -> ControllerResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| ControllerError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Publish a message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> ControllerResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| ControllerError::NatsPublish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> ControllerResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| ControllerError::NatsSubscribe(e.to_string()))?;

        info!("Subscribed to subject: {}", subject);
        Ok(subscriber)
    }
}

/// Publishes store change events onto the bus
#[derive(Clone)]
pub struct NatsPublisher {
    client: NatsClient,
    prefix: String,
}

impl NatsPublisher {
    pub fn new(client: NatsClient, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub async fn publish_event<R: Resource>(&self, event: &ChangeEvent<R>) -> ControllerResult<()> {
        let subject = event_subject(&self.prefix, R::KIND, event.operation());
        self.client.publish(&subject, event).await
    }

    /// Relay every event of `source` until its stream ends
    pub async fn forward<R: Resource>(
        &self,
        source: &dyn WatchSource<R>,
    ) -> ControllerResult<JoinHandle<()>> {
        let mut events = source.subscribe().await?;
        let publisher = self.clone();

        Ok(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = publisher.publish_event(&event).await {
                    error!("Failed to forward {} event for {}: {}", R::KIND, event.key(), e);
                }
            }
        }))
    }
}

/// [`WatchSource`] fed by a NATS subscription
pub struct NatsWatchSource<R> {
    client: NatsClient,
    prefix: String,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Resource> NatsWatchSource<R> {
    pub fn new(client: NatsClient, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            _kind: PhantomData,
        }
    }

    pub fn subject(&self) -> String {
        kind_subject(&self.prefix, R::KIND)
    }
}

/// Decode one bus payload into a change event
pub fn decode_event<R: Resource>(payload: &[u8]) -> ControllerResult<ChangeEvent<R>> {
    serde_json::from_slice(payload).map_err(|e| ControllerError::Deserialization(e.to_string()))
}

/// Decoded event, or `None` after logging an undecodable payload
fn decode_or_skip<R: Resource>(subject: &str, payload: &[u8]) -> Option<ChangeEvent<R>> {
    match decode_event(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Skipping change event on {}: {}", subject, e);
            None
        }
    }
}

#[async_trait]
impl<R: Resource> WatchSource<R> for NatsWatchSource<R> {
    async fn subscribe(&self) -> ControllerResult<ChangeStream<R>> {
        let subject = self.subject();
        let subscriber = self.client.subscribe(&subject).await?;

        let stream = subscriber.filter_map(|msg| {
            futures::future::ready(decode_or_skip::<R>(&msg.subject, &msg.payload))
        });
        Ok(stream.boxed())
    }
}
