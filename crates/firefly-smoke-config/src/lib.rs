// crates/firefly-smoke-config/src/lib.rs
// ============================================================================
// Module: Firefly Smoke Config Library
// Description: Canonical config model, environment overrides, and examples.
// Purpose: Single source of truth for firefly-smoke.toml semantics.
// Dependencies: firefly-smoke-core, serde, toml
// ============================================================================

//! ## Overview
//! `firefly-smoke-config` loads `firefly-smoke.toml`, layers environment
//! overrides on top, validates the result, and turns it into the harness
//! options and process backend the core crate consumes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod examples;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::EnvOverrides;
pub use env::SmokeEnv;
pub use env::read_env_strict;
pub use examples::config_toml_example;
