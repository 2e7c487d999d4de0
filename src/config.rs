// Copyright (c) 2025 - Cowboy AI, Inc.
//! Controller configuration
//!
//! All settings come from environment variables; absent variables fall back
//! to the defaults below, unparseable ones are a configuration error.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{ControllerError, ControllerResult};
use crate::nats::NatsConfig;

pub const ENV_RECONCILE_TIMEOUT: &str = "ORG_CONTROLLER_RECONCILE_TIMEOUT_SECS";
pub const ENV_SHORT_WAIT: &str = "ORG_CONTROLLER_SHORT_WAIT_SECS";
pub const ENV_STEADY_WAIT: &str = "ORG_CONTROLLER_STEADY_WAIT_SECS";
pub const ENV_SPEEDY_THRESHOLD: &str = "ORG_CONTROLLER_SPEEDY_THRESHOLD";
pub const ENV_ERROR_BACKOFF: &str = "ORG_CONTROLLER_ERROR_BACKOFF_SECS";
pub const ENV_WORKERS: &str = "ORG_CONTROLLER_WORKERS";
pub const ENV_NATS_URL: &str = "NATS_URL";
pub const ENV_NATS_SUBJECT_PREFIX: &str = "NATS_SUBJECT_PREFIX";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Deadline for one reconcile pass
    pub reconcile_timeout: Duration,
    /// Requeue interval while an object is still settling
    pub short_wait: Duration,
    /// Requeue interval once settled
    pub steady_wait: Duration,
    pub speedy_threshold: u32,
    /// Requeue delay after a failed pass
    pub error_backoff: Duration,
    /// Worker tasks per controller
    pub workers: usize,
    /// Change-event bus, disabled when `None`
    pub nats: Option<NatsConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconcile_timeout: Duration::from_secs(60),
            short_wait: Duration::from_secs(1),
            steady_wait: Duration::from_secs(60),
            speedy_threshold: 5,
            error_backoff: Duration::from_secs(5),
            workers: 4,
            nats: None,
        }
    }
}

impl ControllerConfig {
    /// Load from the process environment
    pub fn from_env() -> ControllerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ControllerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let nats = lookup(ENV_NATS_URL).map(|url| {
            let mut nats = NatsConfig {
                servers: url.split(',').map(|s| s.trim().to_string()).collect(),
                ..NatsConfig::default()
            };
            if let Some(prefix) = lookup(ENV_NATS_SUBJECT_PREFIX) {
                nats.subject_prefix = prefix;
            }
            nats
        });

        Ok(Self {
            reconcile_timeout: secs(&lookup, ENV_RECONCILE_TIMEOUT, defaults.reconcile_timeout)?,
            short_wait: secs(&lookup, ENV_SHORT_WAIT, defaults.short_wait)?,
            steady_wait: secs(&lookup, ENV_STEADY_WAIT, defaults.steady_wait)?,
            speedy_threshold: parsed(&lookup, ENV_SPEEDY_THRESHOLD, defaults.speedy_threshold)?,
            error_backoff: secs(&lookup, ENV_ERROR_BACKOFF, defaults.error_backoff)?,
            workers: parsed(&lookup, ENV_WORKERS, defaults.workers)?,
            nats,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &str, default: T) -> ControllerResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::Configuration(format!("{name}={raw:?}: {e}"))
        }),
    }
}

fn secs<F>(lookup: &F, name: &str, default: Duration) -> ControllerResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parsed(lookup, name, default.as_secs()).map(Duration::from_secs)
}
