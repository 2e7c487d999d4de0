// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Register Propagation
//!
//! The merge of a parent's register set into a child's own declarations
//! must be idempotent, never overwrite a child binding, and be independent
//! of the order in which parent bindings are visited.

use org_controller::domain::{
    inherit_strategy, merge_registers, register_list, register_set, AddressAllocationStrategy,
    Register, RegisterSet,
};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Register kinds, mostly conventional with the occasional custom kind
fn register_kind() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ipam".to_string()),
        Just("as".to_string()),
        Just("network-instance".to_string()),
        Just("vlan".to_string()),
        Just("endpoint-group".to_string()),
        "[a-z]{1,8}",
    ]
}

fn register_set_strategy() -> impl Strategy<Value = RegisterSet> {
    prop::collection::btree_map(register_kind(), "[a-z0-9-]{1,12}", 0..6)
}

/// A parent set together with its bindings in a random order
fn shuffled_parent() -> impl Strategy<Value = (RegisterSet, Vec<Register>)> {
    register_set_strategy().prop_flat_map(|parent| {
        let bindings = register_list(&parent);
        (Just(parent), Just(bindings).prop_shuffle())
    })
}

fn register_bindings() -> impl Strategy<Value = Vec<Register>> {
    prop::collection::vec(
        (register_kind(), "[a-z0-9-]{1,12}").prop_map(|(kind, name)| Register::new(kind, name)),
        0..10,
    )
}

fn strategy() -> impl Strategy<Value = Option<AddressAllocationStrategy>> {
    prop_oneof![
        Just(None),
        Just(Some(AddressAllocationStrategy(json!({})))),
        "[a-z]{1,8}".prop_map(|v| Some(AddressAllocationStrategy(json!({ "allocation": v })))),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Merge is idempotent
    ///
    /// Merging the parent into an already-merged set changes nothing.
    #[test]
    fn prop_merge_is_idempotent(parent in register_set_strategy(), own in register_set_strategy()) {
        let once = merge_registers(&parent, &own);
        let twice = merge_registers(&parent, &once);

        prop_assert_eq!(once, twice, "Re-merging must be a no-op");
    }

    /// Property: Child bindings are never overwritten
    #[test]
    fn prop_merge_preserves_own_bindings(parent in register_set_strategy(), own in register_set_strategy()) {
        let merged = merge_registers(&parent, &own);

        for (kind, name) in &own {
            prop_assert_eq!(merged.get(kind), Some(name), "Own binding for {} was overwritten", kind);
        }
    }

    /// Property: Every parent kind ends up in the result
    #[test]
    fn prop_merge_inherits_missing_kinds(parent in register_set_strategy(), own in register_set_strategy()) {
        let merged = merge_registers(&parent, &own);

        for (kind, name) in &parent {
            if !own.contains_key(kind) {
                prop_assert_eq!(merged.get(kind), Some(name));
            }
        }
        prop_assert!(merged.keys().all(|k| parent.contains_key(k) || own.contains_key(k)));
    }

    /// Property: Parent visiting order does not matter
    ///
    /// Folding the parent bindings into the child one at a time, in any
    /// order, yields the same set as merging the whole parent at once.
    #[test]
    fn prop_merge_is_order_independent(
        (parent, shuffled) in shuffled_parent(),
        own in register_set_strategy()
    ) {
        let folded = shuffled.iter().fold(own.clone(), |acc, binding| {
            let single = register_set(std::slice::from_ref(binding));
            merge_registers(&single, &acc)
        });

        prop_assert_eq!(folded, merge_registers(&parent, &own));
    }

    /// Property: Collapsing bindings keeps the first name per kind
    #[test]
    fn prop_first_binding_wins(bindings in register_bindings()) {
        let set = register_set(&bindings);

        for (kind, name) in &set {
            let first = bindings.iter().find(|r| &r.kind == kind).map(|r| &r.name);
            prop_assert_eq!(first, Some(name));
        }
        prop_assert!(set.len() <= bindings.len());
    }

    /// Property: A non-empty child strategy always wins
    #[test]
    fn prop_strategy_inheritance(parent in strategy(), own in strategy()) {
        let effective = inherit_strategy(parent.as_ref(), own.as_ref());

        match &own {
            Some(s) if !s.is_empty() => prop_assert_eq!(effective.as_ref(), Some(s)),
            _ => prop_assert_eq!(effective, parent),
        }
    }
}
