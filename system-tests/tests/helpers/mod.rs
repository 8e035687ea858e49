// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for firefly-smoke system-tests.
// Purpose: Provide stub-backed harnesses, fixtures, and artifact utilities.
// Dependencies: system-tests, firefly-smoke-core, firefly-smoke-config
// ============================================================================

//! ## Overview
//! Shared helpers for firefly-smoke system-tests.
//! Invariants:
//! - Stub tools make every suite runnable without the SDK toolchain.
//! - Each test writes its artifacts under its own run root.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod stubs;
pub mod tool_probe;
