// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization Controller Service
//!
//! Hosts the organization and deployment controllers against in-memory
//! stores, optionally seeded from a JSON manifest and mirrored onto NATS.
//!
//! Run with: cargo run --bin org-controller
//!
//! Environment:
//! 1. `ORG_CONTROLLER_MANIFESTS` - JSON file `{"organizations": [...], "deployments": [...]}`
//! 2. `NATS_URL` / `NATS_SUBJECT_PREFIX` - route store change events through NATS
//! 3. `ORG_CONTROLLER_*` - timing and worker settings, see `ControllerConfig`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use org_controller::controller::{deployment, organization};
use org_controller::nats::{NatsPublisher, NatsWatchSource};
use org_controller::{
    ControllerConfig, Deployment, MemoryStore, NatsClient, Organization, WatchSource,
};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{error, info};

const ENV_MANIFESTS: &str = "ORG_CONTROLLER_MANIFESTS";

/// Seed objects loaded at startup
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    deployments: Vec<Deployment>,
}

impl Manifest {
    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting organization controller");

    let config = ControllerConfig::from_env().context("Invalid controller configuration")?;
    info!(
        workers = config.workers,
        reconcile_timeout = ?config.reconcile_timeout,
        short_wait = ?config.short_wait,
        steady_wait = ?config.steady_wait,
        "Configuration loaded"
    );

    let organizations = Arc::new(MemoryStore::<Organization>::new());
    let deployments = Arc::new(MemoryStore::<Deployment>::new());

    if let Ok(path) = std::env::var(ENV_MANIFESTS) {
        let manifest = Manifest::load(Path::new(&path))?;
        info!(
            organizations = manifest.organizations.len(),
            deployments = manifest.deployments.len(),
            "Seeding stores from {}",
            path
        );
        for org in manifest.organizations {
            organizations
                .create(org)
                .await
                .context("Failed to seed organization")?;
        }
        for dep in manifest.deployments {
            deployments
                .create(dep)
                .await
                .context("Failed to seed deployment")?;
        }
    }

    let mut bridges = Vec::new();
    let org_events: Box<dyn WatchSource<Organization>>;
    let dep_events: Box<dyn WatchSource<Deployment>>;
    match &config.nats {
        Some(nats) => {
            let client = NatsClient::new(nats)
                .await
                .context("Failed to connect to NATS")?;
            let publisher = NatsPublisher::new(client.clone(), nats.subject_prefix.clone());
            bridges.push(publisher.forward::<Organization>(&*organizations).await?);
            bridges.push(publisher.forward::<Deployment>(&*deployments).await?);
            info!(prefix = %nats.subject_prefix, "Controllers watching change events on NATS");

            org_events = Box::new(NatsWatchSource::<Organization>::new(
                client.clone(),
                nats.subject_prefix.clone(),
            ));
            dep_events = Box::new(NatsWatchSource::<Deployment>::new(
                client,
                nats.subject_prefix.clone(),
            ));
        }
        None => {
            org_events = Box::new(MemoryStore::clone(&organizations));
            dep_events = Box::new(MemoryStore::clone(&deployments));
        }
    }

    let org_controller = organization::setup(organizations.clone(), &*org_events, &config)
        .await
        .context("Failed to set up organization controller")?;
    let dep_controller = deployment::setup(
        deployments.clone(),
        organizations.clone(),
        &*dep_events,
        &*org_events,
        &config,
    )
    .await
    .context("Failed to set up deployment controller")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let org_task = tokio::spawn(org_controller.run(shutdown_rx.clone()));
    let dep_task = tokio::spawn(dep_controller.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(true);

    for (name, task) in [("organization", org_task), ("deployment", dep_task)] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("{} controller failed: {}", name, e),
            Err(e) => error!("{} controller task panicked: {}", name, e),
        }
    }
    for bridge in bridges {
        bridge.abort();
    }

    info!("Organization controller stopped");
    Ok(())
}
