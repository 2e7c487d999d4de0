// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource conditions
//!
//! Every reconcile leaves two conditions behind: `Ready` (is the resource
//! usable) and `Synced` (did the last reconcile succeed, and if not, why).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Ready,
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Observed condition of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub kind: ConditionKind,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn new(kind: ConditionKind, status: ConditionStatus, reason: &str, message: String) -> Self {
        Self {
            kind,
            status,
            reason: reason.to_string(),
            message,
            last_transition_time: Utc::now(),
        }
    }

    pub fn ready() -> Self {
        Self::new(ConditionKind::Ready, ConditionStatus::True, "Ready", String::new())
    }

    pub fn not_ready() -> Self {
        Self::new(ConditionKind::Ready, ConditionStatus::False, "NotReady", String::new())
    }

    pub fn reconcile_success() -> Self {
        Self::new(
            ConditionKind::Synced,
            ConditionStatus::True,
            "ReconcileSuccess",
            String::new(),
        )
    }

    /// Records the triggering error as the condition message
    pub fn reconcile_error(err: &dyn fmt::Display) -> Self {
        Self::new(
            ConditionKind::Synced,
            ConditionStatus::False,
            "ReconcileError",
            err.to_string(),
        )
    }

    fn unknown(kind: ConditionKind) -> Self {
        Self {
            kind,
            status: ConditionStatus::Unknown,
            reason: String::new(),
            message: String::new(),
            last_transition_time: DateTime::<Utc>::default(),
        }
    }

    /// Equality that ignores the transition timestamp
    pub fn equal(&self, other: &Condition) -> bool {
        self.kind == other.kind
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Condition list embedded in every status
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionedStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl ConditionedStatus {
    /// Condition of the given kind, `Unknown` when never set
    pub fn get_condition(&self, kind: ConditionKind) -> Condition {
        self.conditions
            .iter()
            .find(|c| c.kind == kind)
            .cloned()
            .unwrap_or_else(|| Condition::unknown(kind))
    }

    /// Replace conditions by kind, keeping the old entry (and its timestamp)
    /// when nothing but the timestamp would change
    pub fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        for new in conditions {
            match self.conditions.iter_mut().find(|c| c.kind == new.kind) {
                Some(existing) if existing.equal(&new) => {}
                Some(existing) => *existing = new,
                None => self.conditions.push(new),
            }
        }
    }
}
