//! The `Config` struct and its sub-sections.
//!
//! Every field carries a serde default so partial YAML files load cleanly.

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Characters that may never appear inside an action argument.
///
/// Mirrors `par_annotate::action::{FIELD_SEPARATOR, LIST_SEPARATOR}`.
const RESERVED_DELIMITERS: [char; 2] = ['|', '\x1f'];

/// Top-level configuration for the annotation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level for the debug log file
    #[serde(default)]
    pub log_level: LogLevel,

    /// Invocation tracker scheduling
    #[serde(default)]
    pub tracker: TrackerSettings,

    /// Caps applied to region metadata at creation time
    #[serde(default)]
    pub limits: MetadataLimits,

    /// Per-matcher overrides keyed by matcher name
    #[serde(default)]
    pub matchers: HashMap<String, MatcherSettings>,

    /// Settings specific to the make diagnostics matcher
    #[serde(default)]
    pub make: MakeSettings,
}

/// Scheduling options for the invocation tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Start non-fast matchers only once the invocation completes, so that
    /// `on_start` sees the real exit code.
    #[serde(default = "defaults::bool_true")]
    pub defer_buffered_matchers: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            defer_buffered_matchers: defaults::bool_true(),
        }
    }
}

/// Caps applied to region metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataLimits {
    #[serde(default = "defaults::tooltip_max_chars")]
    pub tooltip_max_chars: usize,
    #[serde(default = "defaults::menu_max_entries")]
    pub menu_max_entries: usize,
}

impl Default for MetadataLimits {
    fn default() -> Self {
        Self {
            tooltip_max_chars: defaults::tooltip_max_chars(),
            menu_max_entries: defaults::menu_max_entries(),
        }
    }
}

/// Overrides for a single registered matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// When false the matcher is never registered.
    #[serde(default = "defaults::bool_true")]
    pub enabled: bool,

    /// Additional full command lines that activate the matcher.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Override of the matcher's built-in fast flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast: Option<bool>,

    /// Override of whether the matcher still gets `on_finish` after it
    /// stopped consuming lines mid-stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_after_stop: Option<bool>,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            enabled: defaults::bool_true(),
            aliases: Vec::new(),
            fast: None,
            finish_after_stop: None,
        }
    }
}

/// Settings for the make diagnostics matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeSettings {
    /// Launch configuration name embedded in "open in editor" actions.
    #[serde(default = "defaults::editor_launcher")]
    pub editor_launcher: String,

    /// First command words that activate the matcher.
    #[serde(default = "defaults::make_commands")]
    pub commands: Vec<String>,
}

impl Default for MakeSettings {
    fn default() -> Self {
        Self {
            editor_launcher: defaults::editor_launcher(),
            commands: defaults::make_commands(),
        }
    }
}

impl Config {
    /// Settings for the named matcher, falling back to defaults.
    pub fn matcher(&self, name: &str) -> MatcherSettings {
        self.matchers.get(name).cloned().unwrap_or_default()
    }

    /// Whether the named matcher should be registered.
    pub fn matcher_enabled(&self, name: &str) -> bool {
        self.matchers.get(name).is_none_or(|m| m.enabled)
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.tooltip_max_chars == 0 {
            return Err(ConfigError::Validation(
                "limits.tooltip_max_chars must be > 0".to_string(),
            ));
        }
        if self.limits.menu_max_entries == 0 {
            return Err(ConfigError::Validation(
                "limits.menu_max_entries must be > 0".to_string(),
            ));
        }

        for (name, settings) in &self.matchers {
            if let Some(alias) = settings
                .aliases
                .iter()
                .find(|a| a.trim().is_empty() || a.contains(RESERVED_DELIMITERS))
            {
                return Err(ConfigError::Validation(format!(
                    "matchers.{name}.aliases: invalid alias {alias:?}"
                )));
            }
        }

        if self.make.editor_launcher.contains(RESERVED_DELIMITERS) {
            return Err(ConfigError::Validation(format!(
                "make.editor_launcher contains a reserved delimiter: {:?}",
                self.make.editor_launcher
            )));
        }
        if self.make.commands.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "make.commands must not contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}
