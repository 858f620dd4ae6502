//! Configuration system for the par-annotate annotation engine.
//!
//! This crate provides configuration loading, saving, and default values
//! for the engine and its built-in matchers. It includes:
//!
//! - Per-matcher settings (enable/disable, command aliases, scheduling overrides)
//! - Region metadata limits (tooltip length, menu size)
//! - Invocation tracker scheduling settings
//! - Log level selection for the debug log bridge

pub mod config;
pub mod defaults;
pub mod error;
mod persistence;
mod types;

// Re-export main types for convenience
pub use config::{Config, MakeSettings, MatcherSettings, MetadataLimits, TrackerSettings};
pub use error::ConfigError;
pub use types::LogLevel;
