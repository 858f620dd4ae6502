//! Shared test helpers for engine unit tests.
//!
//! This module is gated with `#[cfg(test)]` and provides factory functions
//! and an instrumented matcher. Import with:
//!
//! ```ignore
//! use crate::testing::{RecordingMatcher, make_invocation};
//! ```

use crate::invocation::CommandInvocation;
use crate::line::OutputLine;
use crate::matcher::{Flow, LineMatcher, MatcherError, MatcherFactory};
use crate::region::{Region, RegionContext, RegionMetadata};
use crate::registry::MatcherRegistry;
use crate::tracker::InvocationTracker;
use par_annotate_config::Config;
use parking_lot::Mutex;
use std::sync::Arc;

/// Creates a `CommandInvocation` with fixed server/terminal/host attributes.
#[cfg(test)]
#[allow(dead_code)]
pub fn make_invocation(command: &str) -> CommandInvocation {
    CommandInvocation::new(command)
        .with_server("srv-1")
        .with_terminal("term-1")
        .with_host("devbox")
}

/// Runs `lines` through a tracker holding only `factory` and returns the
/// regions created, in id order.
#[cfg(test)]
#[allow(dead_code)]
pub fn run_factory(
    factory: Box<dyn MatcherFactory>,
    invocation: CommandInvocation,
    exit_code: i32,
    lines: &[&str],
) -> Vec<Region> {
    let mut registry = MatcherRegistry::new();
    registry.register(factory).unwrap();
    let mut tracker = InvocationTracker::from_config(registry, &Config::default());
    let id = tracker.begin(invocation);
    for line in lines {
        tracker.push_line(id, line).unwrap();
    }
    tracker.finish(id, exit_code, lines.len()).unwrap();
    tracker.regions().iter().cloned().collect()
}

/// One hook call observed by a [`RecordingMatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(Option<i32>),
    Line(String),
    Finish(usize),
}

/// Shared, cloneable event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

#[allow(dead_code)]
impl EventLog {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Line(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> bool {
        self.events().iter().any(|e| matches!(e, Event::Finish(_)))
    }

    fn push(&self, event: Event) {
        self.0.lock().push(event);
    }
}

/// Matcher that records every hook call and can be scripted to misbehave.
#[derive(Debug)]
#[allow(dead_code)]
pub struct RecordingMatcher {
    pub log: EventLog,
    /// Value returned from `on_start`.
    pub accept: bool,
    /// Return `Flow::Stop` after this many lines.
    pub stop_after: Option<usize>,
    /// Panic on this (1-based) line.
    pub panic_on: Option<usize>,
    /// Tag every line with a full-width region.
    pub tag_lines: bool,
    seen: usize,
}

impl Default for RecordingMatcher {
    fn default() -> Self {
        Self::new(EventLog::default())
    }
}

#[allow(dead_code)]
impl RecordingMatcher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            accept: true,
            stop_after: None,
            panic_on: None,
            tag_lines: false,
            seen: 0,
        }
    }
}

impl LineMatcher for RecordingMatcher {
    fn on_start(&mut self, invocation: &CommandInvocation) -> Result<bool, MatcherError> {
        self.log.push(Event::Start(invocation.exit_code));
        Ok(self.accept)
    }

    fn on_line(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<Flow, MatcherError> {
        self.seen += 1;
        self.log.push(Event::Line(line.text.clone()));
        if self.panic_on == Some(self.seen) {
            panic!("scripted panic on line {}", self.seen);
        }
        if self.tag_lines {
            ctx.create_region(0, line.len(), RegionMetadata::new().with_icon("tag"))?;
        }
        if self.stop_after == Some(self.seen) {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn on_finish(
        &mut self,
        _ctx: &mut RegionContext<'_>,
        total_rows: usize,
    ) -> Result<(), MatcherError> {
        self.log.push(Event::Finish(total_rows));
        Ok(())
    }
}
