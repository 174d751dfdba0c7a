//! Engine Configuration Module
//!
//! Per-study configuration loaded from TOML: base fluid densities, circulation
//! and pressure management, surge/swab sweep and solver limits.
//!
//! ## Loading Order
//!
//! 1. `WELLBORE_CONFIG` environment variable (path to TOML file)
//! 2. `wellbore.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The numerical core never reads configuration implicitly: callers load an
//! `EngineConfig` once and pass the relevant section to each calculation.

mod engine_config;
pub mod defaults;
pub mod validation;

pub use engine_config::*;
