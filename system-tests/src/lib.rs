// system-tests/src/lib.rs
// ============================================================================
// Module: Firefly Smoke System Tests Library
// Description: Shared configuration and stub tool behaviour for system tests.
// Purpose: Provide common utilities for the firefly-smoke system-test binaries.
// Dependencies: firefly-smoke-core
// ============================================================================

//! ## Overview
//! This crate hosts the environment configuration used by the suites in
//! `system-tests/tests` and the stub build and runtime tools under `src/bin`
//! that stand in for the SDK toolchain.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod stub;
