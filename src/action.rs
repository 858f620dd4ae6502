//! Structured action descriptors and their delimiter-joined wire form.
//!
//! An action is a name followed by ordered arguments. On the wire it is
//! written as `name|arg1|arg2...`; list arguments are joined with the
//! `\x1f` unit separator. Argument values may contain neither character,
//! so [`ActionDescriptor::to_wire`] and [`ActionDescriptor::parse_wire`] are
//! exact inverses for every descriptor that passes [`ActionDescriptor::validate`].
//!
//! A one-element list argument has no separator and reads back as a plain
//! [`ActionArg::Value`].

use serde::Serialize;

/// Separates the action name and its arguments.
pub const FIELD_SEPARATOR: char = '|';

/// Separates the items of a list argument.
pub const LIST_SEPARATOR: char = '\x1f';

/// Returns true if `value` contains either reserved delimiter.
pub fn has_reserved_delimiter(value: &str) -> bool {
    value.contains([FIELD_SEPARATOR, LIST_SEPARATOR])
}

/// Errors produced while building or parsing actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A name or argument contains `|` or `\x1f`.
    #[error("action {action:?} has a value containing a reserved delimiter: {value:?}")]
    ReservedDelimiter { action: String, value: String },
    /// The wire string could not be parsed.
    #[error("malformed action string: {0:?}")]
    Malformed(String),
}

/// One positional argument of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionArg {
    Value(String),
    List(Vec<String>),
}

impl ActionArg {
    fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ActionArg::Value(v) => std::slice::from_ref(v),
            ActionArg::List(items) => items,
        };
        slice.iter().map(String::as_str)
    }
}

/// A host action: name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub args: Vec<ActionArg>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a plain argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(ActionArg::Value(value.into()));
        self
    }

    /// Append a list argument (joined with [`LIST_SEPARATOR`] on the wire).
    pub fn list_arg<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .push(ActionArg::List(items.into_iter().map(Into::into).collect()));
        self
    }

    /// Plain argument at `index`, if there is one.
    pub fn value(&self, index: usize) -> Option<&str> {
        match self.args.get(index)? {
            ActionArg::Value(v) => Some(v),
            ActionArg::List(_) => None,
        }
    }

    /// Check that the name is non-empty and no value carries a delimiter.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.name.is_empty() {
            return Err(ActionError::Malformed(String::new()));
        }
        std::iter::once(self.name.as_str())
            .chain(self.args.iter().flat_map(ActionArg::values))
            .find(|v| has_reserved_delimiter(v))
            .map_or(Ok(()), |bad| {
                Err(ActionError::ReservedDelimiter {
                    action: self.name.clone(),
                    value: bad.to_string(),
                })
            })
    }

    /// Serialize to the delimiter-joined wire form.
    pub fn to_wire(&self) -> Result<String, ActionError> {
        self.validate()?;
        let mut out = self.name.clone();
        let sep = LIST_SEPARATOR.to_string();
        for arg in &self.args {
            out.push(FIELD_SEPARATOR);
            match arg {
                ActionArg::Value(v) => out.push_str(v),
                ActionArg::List(items) => out.push_str(&items.join(&sep)),
            }
        }
        Ok(out)
    }

    /// Parse a wire string back into a descriptor.
    pub fn parse_wire(wire: &str) -> Result<Self, ActionError> {
        let mut fields = wire.split(FIELD_SEPARATOR);
        let name = match fields.next() {
            Some(n) if !n.is_empty() && !n.contains(LIST_SEPARATOR) => n.to_string(),
            _ => return Err(ActionError::Malformed(wire.to_string())),
        };
        let args = fields
            .map(|field| {
                if field.contains(LIST_SEPARATOR) {
                    ActionArg::List(field.split(LIST_SEPARATOR).map(str::to_string).collect())
                } else {
                    ActionArg::Value(field.to_string())
                }
            })
            .collect();
        Ok(Self { name, args })
    }
}
