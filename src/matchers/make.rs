//! Compiler diagnostics in `make` output.
//!
//! Recognizes gcc/clang-style `file:line:col: error: ...` lines and bare
//! `error:`/`warning:` messages. When errors scrolled out of view, a jump
//! region is added so the user can get back to the first one: on the
//! "Waiting for unfinished jobs" line, and on the last output row.
//!
//! This matcher is fast: it annotates while the build is still running.

use super::FactoryOptions;
use crate::action::{ActionDescriptor, has_reserved_delimiter};
use crate::invocation::MatcherContext;
use crate::line::OutputLine;
use crate::matcher::{FinishPolicy, Flow, LineMatcher, MatcherError, MatcherFactory};
use crate::region::{MenuEntry, RegionContext, RegionId, RegionMetadata};
use par_annotate_config::MakeSettings;
use regex::Regex;
use std::sync::OnceLock;

pub const NAME: &str = "make";

/// Rows scrolled above the first error when jumping to it.
const JUMP_CONTEXT_ROWS: &str = "-10";

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Note,
}

impl DiagnosticKind {
    pub fn icon(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }

    fn word(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Note => "Note",
        }
    }
}

struct Patterns {
    located: [(DiagnosticKind, Regex); 3],
    bare: [(DiagnosticKind, Regex); 2],
    waiting: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("regex pattern is valid and should always compile")
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        located: [
            (
                DiagnosticKind::Error,
                compile(
                    r"^(\S+?):(\d+):(\d+:)? (?:error:|fatal error:|undefined reference to|sorry, unimplemented:) ",
                ),
            ),
            (
                DiagnosticKind::Warning,
                compile(r"^(\S+?):(\d+):(\d+:)? warning: "),
            ),
            (
                DiagnosticKind::Note,
                compile(r"^(\S+?):(\d+):(\d+:)? (?:note: | *required from here)"),
            ),
        ],
        bare: [
            (
                DiagnosticKind::Error,
                compile(r"(?:error:|undefined reference to|sorry, unimplemented:) "),
            ),
            (DiagnosticKind::Warning, compile(r"warning: ")),
        ],
        waiting: compile(r"\sWaiting for unfinished jobs\.*$"),
    })
}

pub struct MakeMatcher {
    ctx: MatcherContext,
    launcher: String,
    /// Region of the first error seen.
    first_error: Option<RegionId>,
    /// Last row of the most recent diagnostic.
    last_error_row: usize,
}

impl MakeMatcher {
    pub fn new(ctx: MatcherContext, launcher: impl Into<String>) -> Self {
        Self {
            ctx,
            launcher: launcher.into(),
            first_error: None,
            last_error_row: 0,
        }
    }

    pub fn first_error(&self) -> Option<RegionId> {
        self.first_error
    }

    fn copy_entry(&self, id: RegionId) -> MenuEntry {
        MenuEntry::action(
            ActionDescriptor::new("CopySemantic")
                .arg(id.to_string())
                .arg(self.ctx.terminal_id.as_str()),
            "&Copy Message",
            "copy",
            "Copy this diagnostic message to the clipboard",
        )
    }

    fn file_params(
        &self,
        id: RegionId,
        kind: DiagnosticKind,
        path: &str,
        line: &str,
        column: &str,
    ) -> RegionMetadata {
        let uri = self.ctx.file_uri(path);
        let launcher = self.launcher.as_str();
        let open = ActionDescriptor::new("OpenFile")
            .arg(launcher)
            .arg(self.ctx.server_id.as_str())
            .arg(path)
            .list_arg([format!("l={line}"), format!("c={column}")]);

        let mut meta = RegionMetadata::new()
            .with_icon(kind.icon())
            .with_tooltip(format!(
                "Double-click to open the file using launcher \"{launcher}\""
            ))
            .with_action(open.clone())
            .with_drag("text/uri-list", uri.as_str())
            .with_drag("text/plain", uri.as_str());

        meta.push_menu(MenuEntry::merge(uri, format!("Build {}", kind.word())));
        meta.push_menu(MenuEntry::action(
            open,
            "Launch &Editor",
            "edit-item",
            format!("Open the file at this location using launcher \"{launcher}\""),
        ));
        meta.push_menu(self.copy_entry(id));
        meta
    }

    fn error_params(&self, id: RegionId, kind: DiagnosticKind) -> RegionMetadata {
        let mut meta = RegionMetadata::new().with_icon(kind.icon());
        meta.push_menu(self.copy_entry(id));
        meta
    }

    fn jump_params(&self, first_error: RegionId) -> RegionMetadata {
        RegionMetadata::new()
            .with_icon("go-up")
            .with_tooltip("Double-click to scroll up to first error")
            .with_action(
                ActionDescriptor::new("ScrollSemanticRelative")
                    .arg(first_error.to_string())
                    .arg(JUMP_CONTEXT_ROWS),
            )
    }

    fn record(&mut self, id: RegionId, kind: DiagnosticKind, line: &OutputLine) {
        if kind == DiagnosticKind::Error && self.first_error.is_none() {
            self.first_error = Some(id);
        }
        self.last_error_row = line.end_row;
    }

    /// `file:line[:col]:` prefixed diagnostic. Returns whether the line matched.
    fn located(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<bool, MatcherError> {
        let text = line.text.as_str();
        let Some((kind, caps)) = patterns()
            .located
            .iter()
            .find_map(|(kind, re)| re.captures(text).map(|caps| (*kind, caps)))
        else {
            return Ok(false);
        };

        let path = self.ctx.resolve_path(&caps[1]);
        if has_reserved_delimiter(&path) {
            crate::debug_log!("MATCHER", "make skipped diagnostic in {:?}", path);
            return Ok(true);
        }
        let row = &caps[2];
        let column = caps
            .get(3)
            .map_or("1", |m| m.as_str().trim_end_matches(':'));

        let id = ctx.next_region_id();
        let meta = self.file_params(id, kind, &path, row, column);
        ctx.create_region(0, text.len(), meta)?;
        self.record(id, kind, line);
        Ok(true)
    }

    /// Diagnostic without a location. Returns whether the line matched.
    fn bare(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<bool, MatcherError> {
        let text = line.text.as_str();
        let Some((kind, start)) = patterns()
            .bare
            .iter()
            .find_map(|(kind, re)| re.find(text).map(|m| (*kind, m.start())))
        else {
            return Ok(false);
        };

        let id = ctx.next_region_id();
        let meta = self.error_params(id, kind);
        ctx.create_region(start, text.len(), meta)?;
        self.record(id, kind, line);
        Ok(true)
    }
}

impl LineMatcher for MakeMatcher {
    fn on_line(
        &mut self,
        ctx: &mut RegionContext<'_>,
        line: &OutputLine,
    ) -> Result<Flow, MatcherError> {
        if self.located(ctx, line)? {
            return Ok(Flow::Continue);
        }
        self.bare(ctx, line)?;

        if let Some(first_error) = self.first_error
            && patterns().waiting.is_match(&line.text)
        {
            ctx.create_region(0, line.len(), self.jump_params(first_error))?;
        }
        Ok(Flow::Continue)
    }

    fn on_finish(
        &mut self,
        ctx: &mut RegionContext<'_>,
        total_rows: usize,
    ) -> Result<(), MatcherError> {
        let Some(first_error) = self.first_error else {
            return Ok(());
        };
        let Some(last) = total_rows.min(ctx.row_count()).checked_sub(1) else {
            return Ok(());
        };
        if self.last_error_row < last {
            ctx.create_region_at(last, 0, last + 1, 0, self.jump_params(first_error))?;
        }
        Ok(())
    }
}

pub struct MakeFactory {
    options: FactoryOptions,
    launcher: String,
    commands: Vec<String>,
}

impl MakeFactory {
    pub fn new(options: FactoryOptions, settings: &MakeSettings) -> Self {
        Self {
            options,
            launcher: settings.editor_launcher.clone(),
            commands: settings.commands.clone(),
        }
    }
}

impl MatcherFactory for MakeFactory {
    fn name(&self) -> &str {
        NAME
    }

    fn fast(&self) -> bool {
        self.options.fast_or(true)
    }

    fn finish_policy(&self) -> FinishPolicy {
        self.options.finish_policy_or(FinishPolicy::ActiveOnly)
    }

    fn matches(&self, command: &str, _working_dir: &str) -> Result<bool, MatcherError> {
        let first = command.split_whitespace().next().unwrap_or_default();
        Ok(self.commands.iter().any(|c| c == first) || self.options.is_alias(command))
    }

    fn create(&self, ctx: &MatcherContext) -> Box<dyn LineMatcher> {
        Box::new(MakeMatcher::new(ctx.clone(), self.launcher.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Position;
    use crate::region::Region;
    use crate::testing::{make_invocation, run_factory};

    fn run(lines: &[&str], exit_code: i32) -> Vec<Region> {
        let factory = MakeFactory::new(FactoryOptions::default(), &MakeSettings::default());
        let invocation = make_invocation("make -j8").with_working_dir("/src/proj");
        run_factory(Box::new(factory), invocation, exit_code, lines)
    }

    #[test]
    fn test_located_error_single_region() {
        let line = "src/main.c:12:5: error: expected ';' before '}' token";
        let regions = run(&[line], 2);
        assert_eq!(regions.len(), 1);

        let region = &regions[0];
        assert_eq!(region.metadata.icon.as_deref(), Some("error"));
        assert_eq!(region.start, Position::new(0, 0));
        assert_eq!(region.end, Position::new(0, line.len()));
        assert_eq!(
            region.metadata.primary_action.as_ref().unwrap().to_wire().unwrap(),
            "OpenFile|Default|srv-1|/src/proj/src/main.c|l=12\x1fc=5"
        );
        let copy = region
            .metadata
            .menu
            .iter()
            .find(|e| e.label() == Some("&Copy Message"))
            .unwrap();
        let MenuEntry::Action { action, .. } = copy else {
            panic!("expected action entry");
        };
        assert_eq!(
            action.to_wire().unwrap(),
            format!("CopySemantic|{}|term-1", region.id)
        );
        assert_eq!(
            region.metadata.menu[0],
            MenuEntry::merge("file://devbox/src/proj/src/main.c", "Build Error")
        );
    }

    #[test]
    fn test_missing_column_defaults_to_one() {
        let regions = run(&["/usr/include/x.h:40: warning: unused macro"], 0);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].metadata.icon.as_deref(), Some("warning"));
        assert_eq!(
            regions[0].metadata.primary_action.as_ref().unwrap().value(2),
            Some("/usr/include/x.h")
        );
        assert!(
            regions[0]
                .metadata
                .primary_action
                .as_ref()
                .unwrap()
                .to_wire()
                .unwrap()
                .ends_with("l=40\x1fc=1")
        );
    }

    #[test]
    fn test_bare_diagnostic_starts_at_keyword() {
        let line = "ld: error: undefined symbol: main";
        let regions = run(&[line], 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start, Position::new(0, 4));
        assert!(regions[0].metadata.primary_action.is_none());
        let labels: Vec<&str> = regions[0].metadata.menu_labels().collect();
        assert_eq!(labels, vec!["&Copy Message"]);
    }

    #[test]
    fn test_jump_regions_after_errors() {
        let lines = [
            "cc -c a.c",
            "a.c:3:1: error: unknown type name 'foo'",
            "make: *** Waiting for unfinished jobs....",
            "cc -c b.c",
            "make: *** [Makefile:4: all] Error 2",
        ];
        let regions = run(&lines, 2);
        assert_eq!(regions.len(), 3);

        let first = regions[0].id;
        let wait = &regions[1];
        assert_eq!(wait.metadata.icon.as_deref(), Some("go-up"));
        assert_eq!(wait.start.row, 2);
        let last = &regions[2];
        assert_eq!(last.start, Position::new(4, 0));
        assert_eq!(last.end, Position::new(5, 0));
        assert_eq!(
            last.metadata.primary_action.as_ref().unwrap().to_wire().unwrap(),
            format!("ScrollSemanticRelative|{first}|-10")
        );
    }

    #[test]
    fn test_waiting_line_with_bare_diagnostic_gets_both_regions() {
        let lines = [
            "a.c:3:1: error: unknown type name 'foo'",
            "make[1]: warning: jobserver unavailable Waiting for unfinished jobs....",
        ];
        let regions = run(&lines, 2);
        let on_wait: Vec<_> = regions.iter().filter(|r| r.start.row == 1).collect();
        assert_eq!(on_wait.len(), 2);
        assert_eq!(on_wait[0].metadata.icon.as_deref(), Some("warning"));
        assert_eq!(on_wait[1].metadata.icon.as_deref(), Some("go-up"));
        assert_eq!(on_wait[1].start, Position::new(1, 0));
        assert_eq!(
            on_wait[1].metadata.primary_action.as_ref().unwrap().to_wire().unwrap(),
            format!("ScrollSemanticRelative|{}|-10", regions[0].id)
        );
    }

    #[test]
    fn test_waiting_without_errors_is_plain() {
        let lines = [
            "a.c:3:1: warning: unused variable 'x'",
            "make: *** Waiting for unfinished jobs....",
            "done",
        ];
        let regions = run(&lines, 0);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_command_words_and_aliases() {
        let settings = MakeSettings {
            commands: vec!["make".into(), "gmake".into()],
            ..Default::default()
        };
        let factory = MakeFactory::new(
            FactoryOptions {
                aliases: vec!["./build.sh release".into()],
                ..Default::default()
            },
            &settings,
        );
        assert!(factory.fast());
        assert!(factory.matches("make", "").unwrap());
        assert!(factory.matches("gmake -j4 all", "").unwrap());
        assert!(factory.matches("./build.sh release", "").unwrap());
        assert!(!factory.matches("cmake ..", "").unwrap());
        assert!(!factory.matches("", "").unwrap());
    }
}
