//! Logical output lines assembled from physical terminal rows.
//!
//! The host reports physical rows, each flagged when it soft-wraps into the
//! next. Wrapped rows are joined into one [`OutputLine`]; the byte offsets at
//! which continuation rows begin are kept so that offsets within the joined
//! text map back to physical row positions.

use serde::Serialize;

/// A (row, byte offset) position, rows relative to the invocation's first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub row: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(row: usize, offset: usize) -> Self {
        Self { row, offset }
    }
}

/// One logical line of command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub start_row: usize,
    pub end_row: usize,
    /// Offsets in `text` where each continuation row begins, ascending.
    breaks: Vec<usize>,
}

impl OutputLine {
    /// A line occupying exactly one row.
    pub fn single(text: impl Into<String>, row: usize) -> Self {
        Self {
            text: text.into(),
            start_row: row,
            end_row: row,
            breaks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn breaks(&self) -> &[usize] {
        &self.breaks
    }

    /// Map an offset in the joined text to its physical row position.
    ///
    /// An offset sitting exactly on a row break maps to the start of the
    /// following row.
    pub fn position(&self, offset: usize) -> Position {
        let idx = self.breaks.partition_point(|&b| b <= offset);
        let base = if idx == 0 { 0 } else { self.breaks[idx - 1] };
        Position::new(self.start_row + idx, offset - base)
    }

    fn append_row(&mut self, text: &str, row: usize) {
        self.breaks.push(self.text.len());
        self.text.push_str(text);
        self.end_row = row;
    }
}

/// Joins soft-wrapped rows into logical lines and numbers rows.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Option<OutputLine>,
    next_row: usize,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one physical row; returns a completed line unless the row wraps.
    pub fn push_row(&mut self, text: &str, wraps: bool) -> Option<OutputLine> {
        let row = self.next_row;
        self.next_row += 1;

        match self.pending.as_mut() {
            Some(line) => line.append_row(text, row),
            None => self.pending = Some(OutputLine::single(text, row)),
        }

        if wraps { None } else { self.pending.take() }
    }

    /// Emit a partially assembled line (output ended mid-wrap).
    pub fn flush(&mut self) -> Option<OutputLine> {
        self.pending.take()
    }

    /// Number of physical rows seen so far.
    pub fn rows_seen(&self) -> usize {
        self.next_row
    }
}
