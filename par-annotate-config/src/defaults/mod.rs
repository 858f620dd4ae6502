//! Default value functions for configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on a `Config` field, and by the matching `Default` impls.

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_true() -> bool {
    true
}

// ── Metadata limits ────────────────────────────────────────────────────────

/// Longest tooltip (in characters) stored on a region.
pub fn tooltip_max_chars() -> usize {
    100
}

/// Largest number of menu entries stored on a region.
pub fn menu_max_entries() -> usize {
    25
}

// ── Built-in matchers ──────────────────────────────────────────────────────

/// Launch configuration used by the make matcher's "open in editor" action.
pub fn editor_launcher() -> String {
    "Default".to_string()
}

/// Command words that activate the make matcher.
pub fn make_commands() -> Vec<String> {
    vec!["make".to_string()]
}
