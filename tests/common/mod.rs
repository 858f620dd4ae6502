//! Shared integration test helpers for par-annotate.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{builtin_tracker, invocation, replay};
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#![allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use par_annotate::{
    CommandInvocation, InvocationTracker, MatcherRegistry, Region, register_builtin_matchers,
};
use par_annotate_config::Config;

/// Invocation with the attributes every scenario uses.
pub fn invocation(command: &str, cwd: &str) -> CommandInvocation {
    CommandInvocation::new(command)
        .with_working_dir(cwd)
        .with_server("srv-1")
        .with_terminal("term-1")
        .with_host("devbox")
}

/// Tracker holding every built-in matcher enabled by `config`.
pub fn builtin_tracker(config: &Config) -> InvocationTracker {
    let mut registry = MatcherRegistry::new();
    register_builtin_matchers(&mut registry, config).expect("built-ins register");
    InvocationTracker::from_config(registry, config)
}

/// Run one complete invocation through the built-in matchers.
pub fn replay(invocation: CommandInvocation, exit_code: i32, lines: &[&str]) -> Vec<Region> {
    let mut tracker = builtin_tracker(&Config::default());
    let id = tracker.begin(invocation);
    for line in lines {
        tracker.push_line(id, line).expect("invocation is running");
    }
    tracker
        .finish(id, exit_code, lines.len())
        .expect("invocation is running");
    tracker.regions().regions_for_invocation(id).cloned().collect()
}

/// Labels of a region's action menu entries.
pub fn menu_labels(region: &Region) -> Vec<&str> {
    region.metadata.menu_labels().collect()
}

/// Wire form of a region's primary action.
pub fn primary_wire(region: &Region) -> String {
    region
        .metadata
        .primary_action
        .as_ref()
        .expect("region has a primary action")
        .to_wire()
        .expect("action is wire-safe")
}
