//! Tracked command invocations and the read-only context handed to matchers.

use serde::Serialize;
use std::fmt;

/// Identifies one tracked invocation. Allocated by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InvocationId(pub u64);

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inv#{}", self.0)
    }
}

/// One execution of a shell command as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    /// The command line as typed.
    pub command: String,
    /// Working directory, empty when unknown.
    pub working_dir: String,
    /// Originating server/session id.
    pub server_id: String,
    pub terminal_id: String,
    pub host: String,
    /// Known only once the command completed.
    pub exit_code: Option<i32>,
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_server(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = server_id.into();
        self
    }

    pub fn with_terminal(mut self, terminal_id: impl Into<String>) -> Self {
        self.terminal_id = terminal_id.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// Snapshot of invocation attributes captured when a matcher is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherContext {
    pub command: String,
    pub server_id: String,
    pub terminal_id: String,
    pub host: String,
    /// Working directory with trailing separators replaced by exactly one.
    pub base_dir: String,
}

impl MatcherContext {
    pub fn from_invocation(invocation: &CommandInvocation) -> Self {
        Self {
            command: invocation.command.clone(),
            server_id: invocation.server_id.clone(),
            terminal_id: invocation.terminal_id.clone(),
            host: invocation.host.clone(),
            base_dir: normalize_base_dir(&invocation.working_dir),
        }
    }

    /// Resolve `path` against the base directory unless it is absolute.
    pub fn resolve_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{}{}", self.base_dir, path)
        }
    }

    /// `file://host/path` URI for a resolved path.
    pub fn file_uri(&self, path: &str) -> String {
        format!("file://{}{}", self.host, path)
    }
}

/// Strip trailing `/` and append exactly one.
pub fn normalize_base_dir(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}
