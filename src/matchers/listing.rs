//! Header-keyword listing matchers.
//!
//! Tabular tool output (`docker ps`, `kubectl get pods`, ...) starts with a
//! header row whose first word is a known keyword. Every row after it names
//! one object; the matcher tags the whole row and attaches actions for that
//! object.
//!
//! Phase transitions:
//!
//! | Phase | Input | Next |
//! |-------|-------|------|
//! | `AwaitingHeader` | first word == header | `Rows` |
//! | `AwaitingHeader` | anything else | `AwaitingHeader` (no region) |
//! | `Rows` | first word == header | `Rows` (no region) |
//! | `Rows` | row with a usable name | `Rows` (region over the row) |
//! | `Rows` | malformed row | `Rows` (no region) |
//! | any | blank line, when `stop_on_blank` | stop |

use super::{FactoryOptions, succeeded};
use crate::action::has_reserved_delimiter;
use crate::invocation::{CommandInvocation, MatcherContext};
use crate::line::OutputLine;
use crate::matcher::{FinishPolicy, Flow, LineMatcher, MatcherError, MatcherFactory};
use crate::region::{RegionContext, RegionMetadata};

/// Which whitespace-separated word of a row names the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Index(usize),
    Last,
    /// The first word, only when the row does not start with whitespace.
    Leading,
}

impl Column {
    fn pick<'t>(&self, text: &'t str, words: &[&'t str]) -> Option<&'t str> {
        match self {
            Column::Index(i) => words.get(*i).copied(),
            Column::Last => words.last().copied(),
            Column::Leading => {
                if text.starts_with(char::is_whitespace) {
                    None
                } else {
                    words.first().copied()
                }
            }
        }
    }
}

/// Static description of one listing format.
pub struct ListingSpec {
    /// Matcher display name.
    pub name: &'static str,
    /// First word of the header row.
    pub header: &'static str,
    pub column: Column,
    pub stop_on_blank: bool,
    /// Recognizes the tool's own command line.
    pub command: fn(&str) -> bool,
    /// Builds region metadata for the named object.
    pub params: fn(&MatcherContext, &str) -> RegionMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPhase {
    AwaitingHeader,
    Rows,
}

pub struct ListingMatcher {
    spec: &'static ListingSpec,
    ctx: MatcherContext,
    phase: ListingPhase,
}

impl ListingMatcher {
    pub fn new(spec: &'static ListingSpec, ctx: MatcherContext) -> Self {
        Self {
            spec,
            ctx,
            phase: ListingPhase::AwaitingHeader,
        }
    }

    pub fn phase(&self) -> ListingPhase {
        self.phase
    }
}

impl LineMatcher for ListingMatcher {
    fn on_start(&mut self, invocation: &CommandInvocation) -> Result<bool, MatcherError> {
        Ok(succeeded(invocation.exit_code))
    }

    fn on_line(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<Flow, MatcherError> {
        let text = line.text.as_str();
        if self.spec.stop_on_blank && text.is_empty() {
            return Ok(Flow::Stop);
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let first = match self.spec.column {
            Column::Leading if text.starts_with(char::is_whitespace) => None,
            _ => words.first().copied(),
        };
        let Some(first) = first else {
            return Ok(Flow::Continue);
        };

        if first == self.spec.header {
            self.phase = ListingPhase::Rows;
            return Ok(Flow::Continue);
        }
        if self.phase != ListingPhase::Rows {
            return Ok(Flow::Continue);
        }

        match self.spec.column.pick(text, &words) {
            Some(name) if !has_reserved_delimiter(name) => {
                ctx.create_region(0, text.len(), (self.spec.params)(&self.ctx, name))?;
            }
            Some(name) => {
                crate::debug_log!(
                    "MATCHER",
                    "{} skipped row naming {:?} (reserved delimiter)",
                    self.spec.name,
                    name
                );
            }
            None => {}
        }
        Ok(Flow::Continue)
    }
}

/// Factory for a [`ListingSpec`].
pub struct ListingFactory {
    spec: &'static ListingSpec,
    options: FactoryOptions,
}

impl ListingFactory {
    pub fn new(spec: &'static ListingSpec, options: FactoryOptions) -> Self {
        Self { spec, options }
    }
}

impl MatcherFactory for ListingFactory {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn fast(&self) -> bool {
        self.options.fast_or(false)
    }

    fn finish_policy(&self) -> FinishPolicy {
        self.options.finish_policy_or(FinishPolicy::ActiveOnly)
    }

    fn matches(&self, command: &str, _working_dir: &str) -> Result<bool, MatcherError> {
        Ok((self.spec.command)(command) || self.options.is_alias(command))
    }

    fn create(&self, ctx: &MatcherContext) -> Box<dyn LineMatcher> {
        Box::new(ListingMatcher::new(self.spec, ctx.clone()))
    }
}
