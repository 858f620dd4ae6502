//! Command-output annotation engine.
//!
//! A host reports each shell command it runs as a [`CommandInvocation`] and
//! streams the output rows to an [`InvocationTracker`]. The tracker runs every
//! matcher whose factory claimed the command; matchers tag spans of output as
//! regions carrying icons, tooltips, menus and actions. Regions are kept in a
//! [`RegionIndex`] that the host queries when the user interacts with them.
//!
//! ```ignore
//! let config = Config::default();
//! let mut registry = MatcherRegistry::new();
//! register_builtin_matchers(&mut registry, &config)?;
//! let mut tracker = InvocationTracker::from_config(registry, &config);
//!
//! let id = tracker.begin(CommandInvocation::new("docker ps"));
//! tracker.push_line(id, "CONTAINER ID   IMAGE   NAMES")?;
//! tracker.push_line(id, "4f3c2a1b9e8d   nginx   web1")?;
//! tracker.finish(id, 0, 2)?;
//! ```

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod action;
pub mod cli;
pub mod invocation;
pub mod line;
pub mod matcher;
pub mod matchers;
pub mod region;
pub mod registry;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionArg, ActionDescriptor, ActionError};
pub use invocation::{CommandInvocation, InvocationId, MatcherContext};
pub use line::{LineAssembler, OutputLine, Position};
pub use matcher::{FinishPolicy, Flow, FnMatcherFactory, LineMatcher, MatcherError, MatcherFactory};
pub use matchers::{FactoryOptions, register_builtin_matchers};
pub use region::{
    MenuEntry, Region, RegionContext, RegionError, RegionId, RegionIndex, RegionMetadata,
};
pub use registry::{MatcherRegistry, RegistrationError, ResolvedMatcher};
pub use tracker::{InvocationTracker, Phase, TrackerError};
