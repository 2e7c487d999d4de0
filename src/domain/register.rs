// Copyright (c) 2025 - Cowboy AI, Inc.
//! Register Bindings and Propagation
//!
//! A register binding associates a kind of shared infrastructure identifier
//! (an IPAM pool, an AS pool, a VLAN database, ...) with the name of the
//! concrete instance to use. Organizations declare bindings, deployments
//! inherit them.
//!
//! # Merge Rule
//!
//! ```text
//! parent {ipam: pool-a, as: as-a}
//! child  {ipam: pool-custom}
//!        ─────────────────────────────
//! result {ipam: pool-custom, as: as-a}
//! ```
//!
//! Kinds declared by the child are never overwritten; kinds only the parent
//! declares are inherited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effective register bindings, kind → name
pub type RegisterSet = BTreeMap<String, String>;

/// Conventional register kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegisterKind {
    Ipam,
    As,
    NetworkInstance,
    Vlan,
    EndpointGroup,
}

impl RegisterKind {
    /// Kinds that must be present in any set served by the registry
    pub const CRITICAL: [RegisterKind; 2] = [RegisterKind::Ipam, RegisterKind::As];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegisterKind::Ipam => "ipam",
            RegisterKind::As => "as",
            RegisterKind::NetworkInstance => "network-instance",
            RegisterKind::Vlan => "vlan",
            RegisterKind::EndpointGroup => "endpoint-group",
        }
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown register kind: {0}")]
pub struct UnknownRegisterKind(pub String);

impl FromStr for RegisterKind {
    type Err = UnknownRegisterKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipam" => Ok(RegisterKind::Ipam),
            "as" => Ok(RegisterKind::As),
            "network-instance" => Ok(RegisterKind::NetworkInstance),
            "vlan" => Ok(RegisterKind::Vlan),
            "endpoint-group" => Ok(RegisterKind::EndpointGroup),
            other => Err(UnknownRegisterKind(other.to_string())),
        }
    }
}

/// A single (kind, name) binding as persisted in spec and status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub kind: String,
    pub name: String,
}

impl Register {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Collapse a binding list into a set; the first binding for a kind wins
pub fn register_set(registers: &[Register]) -> RegisterSet {
    let mut set = RegisterSet::new();
    for register in registers {
        set.entry(register.kind.clone())
            .or_insert_with(|| register.name.clone());
    }
    set
}

/// Expand a set into a binding list ordered by kind
pub fn register_list(set: &RegisterSet) -> Vec<Register> {
    set.iter()
        .map(|(kind, name)| Register::new(kind.clone(), name.clone()))
        .collect()
}

/// Compute a child's effective register set
///
/// Pure and order-independent: a kind is never written twice, so iteration
/// order over `parent` cannot affect the result.
pub fn merge_registers(parent: &RegisterSet, own: &RegisterSet) -> RegisterSet {
    let mut merged = own.clone();
    for (kind, name) in parent {
        merged.entry(kind.clone()).or_insert_with(|| name.clone());
    }
    merged
}

/// Opaque address-allocation policy, passed through uninterpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressAllocationStrategy(pub serde_json::Value);

impl AddressAllocationStrategy {
    /// Null, `{}` and `[]` count as "not declared"
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Child strategy if it declares a non-empty one, otherwise the parent's
pub fn inherit_strategy(
    parent: Option<&AddressAllocationStrategy>,
    own: Option<&AddressAllocationStrategy>,
) -> Option<AddressAllocationStrategy> {
    match own {
        Some(strategy) if !strategy.is_empty() => Some(strategy.clone()),
        _ => parent.cloned(),
    }
}
