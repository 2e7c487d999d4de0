// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! the algebraic properties of register propagation and resource status.

mod register_merge;
mod resource_status;
