//! Opaque UI payload attached to a region.

use crate::action::{ActionDescriptor, ActionError};
use par_annotate_config::MetadataLimits;
use serde::Serialize;
use std::collections::BTreeMap;

/// One context-menu entry.
///
/// The numeric kind codes (see [`MenuEntry::kind`]) are what hosts dispatch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuEntry {
    /// Kind 1: runs `action` when chosen.
    Action {
        action: ActionDescriptor,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_tip: Option<String>,
    },
    /// Kind 0.
    Separator,
    /// Kind 2: confirmation prompt guarding the preceding action.
    Confirm { prompt: String },
    /// Kind 5: merge the host's stock menu for `uri` under `label`.
    MergeSubmenu { uri: String, label: String },
}

impl MenuEntry {
    pub fn action(
        action: ActionDescriptor,
        label: impl Into<String>,
        icon: &str,
        status_tip: impl Into<String>,
    ) -> Self {
        let status_tip = status_tip.into();
        MenuEntry::Action {
            action,
            label: label.into(),
            icon: (!icon.is_empty()).then(|| icon.to_string()),
            status_tip: (!status_tip.is_empty()).then_some(status_tip),
        }
    }

    pub fn confirm(prompt: impl Into<String>) -> Self {
        MenuEntry::Confirm {
            prompt: prompt.into(),
        }
    }

    pub fn merge(uri: impl Into<String>, label: impl Into<String>) -> Self {
        MenuEntry::MergeSubmenu {
            uri: uri.into(),
            label: label.into(),
        }
    }

    pub fn kind(&self) -> u8 {
        match self {
            MenuEntry::Separator => 0,
            MenuEntry::Action { .. } => 1,
            MenuEntry::Confirm { .. } => 2,
            MenuEntry::MergeSubmenu { .. } => 5,
        }
    }

    /// Label of an action entry.
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuEntry::Action { label, .. } | MenuEntry::MergeSubmenu { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }
}

/// Icon, tooltip, actions and drag payloads for one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Action run on activation (double-click).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_action: Option<ActionDescriptor>,
    /// MIME type → payload.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub drag: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub menu: Vec<MenuEntry>,
}

impl RegionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.primary_action = Some(action);
        self
    }

    pub fn with_drag(mut self, mime: impl Into<String>, payload: impl Into<String>) -> Self {
        self.drag.insert(mime.into(), payload.into());
        self
    }

    pub fn push_menu(&mut self, entry: MenuEntry) {
        self.menu.push(entry);
    }

    /// Labels of all action entries, in menu order.
    pub fn menu_labels(&self) -> impl Iterator<Item = &str> {
        self.menu.iter().filter_map(|e| match e {
            MenuEntry::Action { label, .. } => Some(label.as_str()),
            _ => None,
        })
    }

    /// Every action carried by this payload must be wire-safe.
    pub fn validate(&self) -> Result<(), ActionError> {
        if let Some(action) = &self.primary_action {
            action.validate()?;
        }
        for entry in &self.menu {
            if let MenuEntry::Action { action, .. } = entry {
                action.validate()?;
            }
        }
        Ok(())
    }

    /// Truncate the tooltip and menu to the configured caps.
    pub fn apply_limits(&mut self, limits: &MetadataLimits) {
        if let Some(tooltip) = self.tooltip.as_mut()
            && let Some((cut, _)) = tooltip.char_indices().nth(limits.tooltip_max_chars)
        {
            tooltip.truncate(cut);
        }
        self.menu.truncate(limits.menu_max_entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_kinds() {
        let entries = [
            MenuEntry::Separator,
            MenuEntry::action(ActionDescriptor::new("Copy"), "&Copy", "copy", ""),
            MenuEntry::confirm("Sure?"),
            MenuEntry::merge("file:///x", "Git"),
        ];
        let kinds: Vec<u8> = entries.iter().map(MenuEntry::kind).collect();
        assert_eq!(kinds, vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_empty_icon_and_tip_are_none() {
        let entry = MenuEntry::action(ActionDescriptor::new("X"), "Label", "", "");
        assert_eq!(
            entry,
            MenuEntry::Action {
                action: ActionDescriptor::new("X"),
                label: "Label".into(),
                icon: None,
                status_tip: None,
            }
        );
    }

    #[test]
    fn test_apply_limits() {
        let mut meta = RegionMetadata::new().with_tooltip("é".repeat(150));
        for _ in 0..30 {
            meta.push_menu(MenuEntry::Separator);
        }
        meta.apply_limits(&MetadataLimits::default());
        assert_eq!(meta.tooltip.as_deref().map(|t| t.chars().count()), Some(100));
        assert_eq!(meta.menu.len(), 25);
    }

    #[test]
    fn test_validate_checks_menu_actions() {
        let mut meta = RegionMetadata::new().with_action(ActionDescriptor::new("Ok").arg("a"));
        assert!(meta.validate().is_ok());
        meta.push_menu(MenuEntry::action(
            ActionDescriptor::new("Bad").arg("x|y"),
            "Bad",
            "",
            "",
        ));
        assert!(meta.validate().is_err());
    }
}
