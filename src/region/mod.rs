//! Region Index: identified spans of command output with attached metadata.
//!
//! `RegionIndex` owns identifier allocation (a single monotonic counter
//! starting at 1) and the table of created regions. Regions are immutable
//! once inserted and leave the index only through explicit eviction.
//!
//! Sub-modules:
//! - [`metadata`]: `RegionMetadata` and `MenuEntry`
//! - [`context`]: `RegionContext`, the creation handle given to matchers

mod context;
pub mod metadata;

#[cfg(test)]
mod tests;

use crate::action::{ActionDescriptor, ActionError};
use crate::invocation::InvocationId;
use crate::line::Position;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use context::RegionContext;
pub use metadata::{MenuEntry, RegionMetadata};

/// Region identifier. Strictly increasing, never reused; 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors rejecting a region at creation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// Offsets violate `start <= end <= len` or split a UTF-8 character.
    #[error("invalid span {start}..{end} for line of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },
    /// A row-addressed position lies outside the invocation's output.
    #[error("invalid position row {row} offset {offset} ({rows} rows of output)")]
    InvalidRow {
        row: usize,
        offset: usize,
        rows: usize,
    },
    /// Line-relative creation attempted outside of `on_line`.
    #[error("no current line to attach a region to")]
    NoCurrentLine,
    /// Metadata carries an action value with `|` or `\x1f`.
    #[error(transparent)]
    ReservedDelimiter(#[from] ActionError),
}

/// A tagged span of command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: RegionId,
    pub invocation: InvocationId,
    /// Name of the matcher that created it.
    pub matcher: String,
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
    pub metadata: RegionMetadata,
}

impl Region {
    /// True if any cell of `row` lies inside the region.
    pub fn covers_row(&self, row: usize) -> bool {
        if row < self.start.row || row > self.end.row {
            return false;
        }
        row < self.end.row || self.end.offset > 0 || self.start.row == self.end.row
    }
}

/// Append-only table of regions keyed by id.
#[derive(Debug)]
pub struct RegionIndex {
    next_id: u64,
    regions: BTreeMap<RegionId, Region>,
}

impl Default for RegionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionIndex {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            regions: BTreeMap::new(),
        }
    }

    /// Reserve the next identifier. Unused identifiers are never reissued.
    pub(crate) fn allocate_id(&mut self) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, region: Region) {
        self.regions.insert(region.id, region);
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Primary action for UI dispatch (double-click on the region).
    pub fn primary_action(&self, id: RegionId) -> Option<&ActionDescriptor> {
        self.get(id)?.metadata.primary_action.as_ref()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn regions_for_invocation(
        &self,
        invocation: InvocationId,
    ) -> impl Iterator<Item = &Region> {
        self.iter().filter(move |r| r.invocation == invocation)
    }

    pub fn regions_on_row(
        &self,
        invocation: InvocationId,
        row: usize,
    ) -> impl Iterator<Item = &Region> {
        self.regions_for_invocation(invocation)
            .filter(move |r| r.covers_row(row))
    }

    /// Remove one region (host scrollback eviction).
    pub fn evict(&mut self, id: RegionId) -> Option<Region> {
        self.regions.remove(&id)
    }

    /// Remove every region of an invocation. Returns how many were removed.
    pub fn evict_invocation(&mut self, invocation: InvocationId) -> usize {
        let before = self.regions.len();
        self.regions.retain(|_, r| r.invocation != invocation);
        let removed = before - self.regions.len();
        crate::debug_log!(
            "REGION",
            "evicted {} regions of {}",
            removed,
            invocation
        );
        removed
    }
}
