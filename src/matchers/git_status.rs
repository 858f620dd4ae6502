//! `git status` long-format output.
//!
//! The output is split into sections by fixed headings. Each file line inside
//! a section becomes a region over the file name, with a menu suited to the
//! section (unstage for staged files, add/discard for working-tree files).
//!
//! | Heading | Phase |
//! |---------|-------|
//! | `Changes to be committed:` | `Staged` |
//! | `Changes not staged for commit:` | `Modified` |
//! | `Unmerged paths:` | `Conflicted` |
//! | `Untracked files:` | `Untracked` |
//! | `Ignored files:` | `Ignored` |
//!
//! A heading matches as a prefix of the line, ignoring leading whitespace,
//! so trailing text after the colon is allowed. File lines before the first
//! heading are ignored.

use super::{FactoryOptions, run_command, succeeded};
use crate::action::{ActionDescriptor, has_reserved_delimiter};
use crate::invocation::{CommandInvocation, MatcherContext};
use crate::line::OutputLine;
use crate::matcher::{FinishPolicy, Flow, LineMatcher, MatcherError, MatcherFactory};
use crate::region::{MenuEntry, RegionContext, RegionMetadata};
use regex::Regex;
use std::sync::OnceLock;

pub const NAME: &str = "git-status";

static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();
static FILE_REGEX: OnceLock<Regex> = OnceLock::new();

fn command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r"^git status\b").expect("regex pattern is valid and should always compile")
    })
}

/// Eight-space indented entry, optionally prefixed by a status word
/// (`modified:`, `renamed: a -> `). Captures the file name.
fn file_regex() -> &'static Regex {
    FILE_REGEX.get_or_init(|| {
        Regex::new(r"^        (?:[\w ]+:   +(?:\S+ -> )?)?(\S+)$")
            .expect("regex pattern is valid and should always compile")
    })
}

/// Option fragments that switch git status away from the long format.
const INCOMPATIBLE_FLAGS: &[&str] = &["s", "porcelain", "v", "z", "--column"];

/// Section of the status output currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitPhase {
    Initial,
    Staged,
    Modified,
    Conflicted,
    Untracked,
    Ignored,
}

/// Section headings, matched as line prefixes.
const HEADINGS: &[(&str, GitPhase)] = &[
    ("Changes to be committed:", GitPhase::Staged),
    ("Changes not staged for commit:", GitPhase::Modified),
    ("Unmerged paths:", GitPhase::Conflicted),
    ("Untracked files:", GitPhase::Untracked),
    ("Ignored files:", GitPhase::Ignored),
];

impl GitPhase {
    fn from_heading(line: &str) -> Option<Self> {
        let line = line.trim_start();
        HEADINGS
            .iter()
            .find(|(heading, _)| line.starts_with(heading))
            .map(|(_, phase)| *phase)
    }
}

/// True when the command line asks for the default long format.
fn long_format(command: &str) -> bool {
    let words = shell_words::split(command)
        .unwrap_or_else(|_| command.split_whitespace().map(str::to_string).collect());
    !words
        .iter()
        .filter(|w| w.starts_with('-'))
        .any(|w| INCOMPATIBLE_FLAGS.iter().any(|flag| w.contains(flag)))
}

pub struct GitStatusMatcher {
    ctx: MatcherContext,
    phase: GitPhase,
}

impl GitStatusMatcher {
    pub fn new(ctx: MatcherContext) -> Self {
        Self {
            ctx,
            phase: GitPhase::Initial,
        }
    }

    pub fn phase(&self) -> GitPhase {
        self.phase
    }

    fn git(&self, args: &[&str]) -> ActionDescriptor {
        run_command(&self.ctx.server_id, "git", args).arg(self.ctx.base_dir.as_str())
    }

    fn file_params(&self, file: &str) -> RegionMetadata {
        let dir = self.ctx.base_dir.as_str();
        let path = format!("{dir}{file}");
        let uri = self.ctx.file_uri(&path);
        let icon = if self.phase == GitPhase::Ignored {
            "file"
        } else {
            "git"
        };

        let mut meta = RegionMetadata::new()
            .with_icon(icon)
            .with_tooltip(uri.as_str())
            .with_action(
                ActionDescriptor::new("OpenFile")
                    .arg("")
                    .arg(self.ctx.server_id.as_str())
                    .arg(path.as_str()),
            )
            .with_drag("text/uri-list", uri.as_str())
            .with_drag("text/plain", uri.as_str());

        meta.push_menu(MenuEntry::merge(uri, "Git"));

        match self.phase {
            GitPhase::Staged => {
                meta.push_menu(MenuEntry::action(
                    self.git(&["reset", "--", file]),
                    "Reset File",
                    "remove-item",
                    "Remove this file from the index in git",
                ));
                meta.push_menu(MenuEntry::Separator);
            }
            GitPhase::Modified | GitPhase::Conflicted | GitPhase::Untracked => {
                meta.push_menu(MenuEntry::action(
                    self.git(&["add", "--", file]),
                    "Add File",
                    "insert-item",
                    "Add this file to the index",
                ));
                meta.push_menu(MenuEntry::action(
                    self.git(&["checkout", "--", file]),
                    "Checkout File",
                    "clean",
                    "Discard unstaged changes to this file",
                ));
                meta.push_menu(MenuEntry::confirm(format!(
                    "This will permanently discard unstaged changes to {file}. Proceed?"
                )));
                meta.push_menu(MenuEntry::Separator);
            }
            GitPhase::Ignored | GitPhase::Initial => {}
        }

        meta.push_menu(MenuEntry::action(
            self.git(&["add", "--", "."]),
            "Add Directory",
            "insert-item",
            "Add all changes in this directory to the index",
        ));
        meta.push_menu(MenuEntry::action(
            self.git(&["reset", "--", "."]),
            "Reset Directory",
            "remove-item",
            "Remove all changes in this directory from the index",
        ));
        meta.push_menu(MenuEntry::Separator);
        meta.push_menu(MenuEntry::action(
            self.git(&["checkout", "--", "."]),
            "Checkout Directory",
            "clean",
            "Discard all unstaged changes in this directory",
        ));
        meta.push_menu(MenuEntry::confirm(format!(
            "This will permanently discard all unstaged changes in {dir}. Proceed?"
        )));
        meta.push_menu(MenuEntry::action(
            self.git(&["reset", "--hard"]),
            "Reset Hard",
            "destroy",
            "Discard all staged and unstaged changes",
        ));
        meta.push_menu(MenuEntry::confirm(
            "This will permanently discard ALL uncommitted changes. Proceed?",
        ));
        meta
    }
}

impl LineMatcher for GitStatusMatcher {
    fn on_start(&mut self, invocation: &CommandInvocation) -> Result<bool, MatcherError> {
        Ok(succeeded(invocation.exit_code))
    }

    fn on_line(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<Flow, MatcherError> {
        let text = line.text.as_str();
        if let Some(phase) = GitPhase::from_heading(text) {
            self.phase = phase;
            return Ok(Flow::Continue);
        }
        if self.phase == GitPhase::Initial {
            return Ok(Flow::Continue);
        }

        let Some(file) = file_regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        else {
            return Ok(Flow::Continue);
        };
        if has_reserved_delimiter(file) {
            crate::debug_log!("MATCHER", "git-status skipped file {:?}", file);
            return Ok(Flow::Continue);
        }

        let meta = self.file_params(file);
        ctx.create_region(text.len() - file.len(), text.len(), meta)?;
        Ok(Flow::Continue)
    }
}

pub struct GitStatusFactory {
    options: FactoryOptions,
}

impl GitStatusFactory {
    pub fn new(options: FactoryOptions) -> Self {
        Self { options }
    }
}

impl MatcherFactory for GitStatusFactory {
    fn name(&self) -> &str {
        NAME
    }

    fn fast(&self) -> bool {
        self.options.fast_or(false)
    }

    fn finish_policy(&self) -> FinishPolicy {
        self.options.finish_policy_or(FinishPolicy::ActiveOnly)
    }

    fn matches(&self, command: &str, working_dir: &str) -> Result<bool, MatcherError> {
        if !command_regex().is_match(command) && !self.options.is_alias(command) {
            return Ok(false);
        }
        if has_reserved_delimiter(working_dir) {
            return Ok(false);
        }
        Ok(long_format(command))
    }

    fn create(&self, ctx: &MatcherContext) -> Box<dyn LineMatcher> {
        Box::new(GitStatusMatcher::new(ctx.clone()))
    }
}
