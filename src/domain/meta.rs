// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object identity and metadata shared by every stored resource

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API group/version for all resources in this crate
pub const API_VERSION: &str = "org.nddr.yndd.io/v1alpha1";

/// Namespace used when a manifest does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Address of a single object in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Process-local identity `namespace.name`, used to key retry counters
    pub fn identity(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// `apiVersion` / `kind` pair carried by every object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(kind: &str) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Store-managed metadata
///
/// `resource_version`, `generation`, `uid` and `deletion_timestamp` are owned
/// by the store; clients only edit `finalizers` and `annotations`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,

    /// Bumped on every write, used for conditional updates
    #[serde(default)]
    pub resource_version: u64,

    /// Bumped only when the spec changes
    #[serde(default)]
    pub generation: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }

    /// True once deletion was requested; the object lingers while finalizers remain
    pub fn was_deleted(&self) -> bool {
        self.deletion_timestamp.is_some()
    }

    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers.iter().any(|f| f == finalizer)
    }

    /// Returns false when the finalizer was already present
    pub fn add_finalizer(&mut self, finalizer: &str) -> bool {
        if self.has_finalizer(finalizer) {
            return false;
        }
        self.finalizers.push(finalizer.to_string());
        true
    }

    /// Returns false when there was nothing to remove
    pub fn remove_finalizer(&mut self, finalizer: &str) -> bool {
        let before = self.finalizers.len();
        self.finalizers.retain(|f| f != finalizer);
        self.finalizers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_joins_namespace_and_name() {
        let key = ObjectKey::new("default", "acme.web");
        assert_eq!(key.identity(), "default.acme.web");
        assert_eq!(key.to_string(), "default/acme.web");
    }

    #[test]
    fn test_finalizers_are_not_duplicated() {
        let mut meta = ObjectMeta::new("default", "acme");
        assert!(meta.add_finalizer("organization.org.nddr.yndd.io"));
        assert!(!meta.add_finalizer("organization.org.nddr.yndd.io"));
        assert_eq!(meta.finalizers.len(), 1);

        assert!(meta.remove_finalizer("organization.org.nddr.yndd.io"));
        assert!(!meta.remove_finalizer("organization.org.nddr.yndd.io"));
        assert!(meta.finalizers.is_empty());
    }

    #[test]
    fn test_namespace_defaults_when_missing() {
        let meta: ObjectMeta = serde_json::from_str(r#"{"name":"acme"}"#).unwrap();
        assert_eq!(meta.namespace, DEFAULT_NAMESPACE);
        assert!(!meta.was_deleted());
    }
}
