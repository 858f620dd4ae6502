//! Core traits for line matchers and their factories.
//!
//! A [`MatcherFactory`] is registered once at start-up. For every invocation
//! whose command line satisfies its predicate it builds a fresh
//! [`LineMatcher`], which then consumes the invocation's output one logical
//! line at a time and creates regions through a [`RegionContext`].

mod fn_factory;

pub use fn_factory::FnMatcherFactory;

use crate::invocation::{CommandInvocation, MatcherContext};
use crate::line::OutputLine;
use crate::region::{RegionContext, RegionError};
use std::any::Any;

/// What a matcher wants after consuming a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// No further lines will be delivered to this matcher.
    Stop,
}

/// Whether `on_finish` still runs for a matcher that returned [`Flow::Stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishPolicy {
    /// Only matchers still consuming lines at completion are finished.
    #[default]
    ActiveOnly,
    /// Matchers that stopped mid-stream are finished too.
    Always,
}

impl FinishPolicy {
    pub fn from_flag(finish_after_stop: bool) -> Self {
        if finish_after_stop {
            FinishPolicy::Always
        } else {
            FinishPolicy::ActiveOnly
        }
    }
}

/// Errors reported by matcher hooks and predicates.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    /// The matcher reported a failure of its own.
    #[error("matcher fault: {0}")]
    Fault(String),
    /// A region the matcher tried to create was rejected.
    #[error(transparent)]
    Region(#[from] RegionError),
    /// The hook panicked.
    #[error("matcher panicked: {0}")]
    Panicked(String),
}

/// Stateful per-invocation consumer of output lines.
pub trait LineMatcher: Send {
    /// Called once before any line. Returning `false` drops the matcher.
    ///
    /// `exit_code` on the invocation is `None` unless the matcher was
    /// deferred until completion.
    fn on_start(&mut self, _invocation: &CommandInvocation) -> Result<bool, MatcherError> {
        Ok(true)
    }

    /// Consume one logical line.
    fn on_line(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<Flow, MatcherError>;

    /// Called exactly once after the last line of a completed invocation.
    fn on_finish(
        &mut self,
        _ctx: &mut RegionContext<'_>,
        _total_rows: usize,
    ) -> Result<(), MatcherError> {
        Ok(())
    }
}

/// Registered (predicate, constructor) pair.
///
/// Implementations must be `Send + Sync`; predicates must be pure.
pub trait MatcherFactory: Send + Sync {
    /// Unique display name.
    fn name(&self) -> &str;

    /// Fast matchers receive lines synchronously as they arrive.
    fn fast(&self) -> bool {
        false
    }

    fn finish_policy(&self) -> FinishPolicy {
        FinishPolicy::ActiveOnly
    }

    /// Whether this factory attaches to a command run in `working_dir`.
    fn matches(&self, command: &str, working_dir: &str) -> Result<bool, MatcherError>;

    /// Build a matcher bound to one invocation.
    fn create(&self, ctx: &MatcherContext) -> Box<dyn LineMatcher>;
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning a panic into [`MatcherError::Panicked`].
pub(crate) fn guarded<T>(
    f: impl FnOnce() -> Result<T, MatcherError>,
) -> Result<T, MatcherError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(MatcherError::Panicked(panic_message(payload.as_ref()))))
}
