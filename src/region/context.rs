use super::{Region, RegionError, RegionId, RegionIndex, RegionMetadata};
use crate::invocation::InvocationId;
use crate::line::{OutputLine, Position};
use par_annotate_config::MetadataLimits;

/// Region creation handle passed to a matcher for one event.
///
/// An event is one `on_line` or `on_finish` call. A reservation made with
/// [`next_region_id`](Self::next_region_id) is consumed by the next
/// `create_region*` call of the same event; if none follows it is burnt.
pub struct RegionContext<'a> {
    index: &'a mut RegionIndex,
    invocation: InvocationId,
    matcher: &'a str,
    limits: MetadataLimits,
    rows: &'a [String],
    line: Option<&'a OutputLine>,
    reserved: Option<RegionId>,
}

impl<'a> RegionContext<'a> {
    pub fn new(
        index: &'a mut RegionIndex,
        invocation: InvocationId,
        matcher: &'a str,
        limits: MetadataLimits,
        rows: &'a [String],
        line: Option<&'a OutputLine>,
    ) -> Self {
        Self {
            index,
            invocation,
            matcher,
            limits,
            rows,
            line,
            reserved: None,
        }
    }

    pub fn invocation(&self) -> InvocationId {
        self.invocation
    }

    /// Physical rows of output received so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Pre-allocate the id of the next region created in this event.
    ///
    /// Repeated calls before a creation return the same id.
    pub fn next_region_id(&mut self) -> RegionId {
        *self
            .reserved
            .get_or_insert_with(|| self.index.allocate_id())
    }

    /// Create a region over `start..end` of the current line.
    pub fn create_region(
        &mut self,
        start: usize,
        end: usize,
        metadata: RegionMetadata,
    ) -> Result<RegionId, RegionError> {
        let line = self.line.ok_or(RegionError::NoCurrentLine)?;
        let text = line.text.as_str();
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(RegionError::InvalidSpan {
                start,
                end,
                len: text.len(),
            });
        }
        self.insert(line.position(start), line.position(end), metadata)
    }

    /// Create a region between two row-addressed positions.
    ///
    /// Rows are relative to the invocation's first row. The end may be the
    /// start of the row just past the output (`row_count()`, offset 0).
    pub fn create_region_at(
        &mut self,
        start_row: usize,
        start_offset: usize,
        end_row: usize,
        end_offset: usize,
        metadata: RegionMetadata,
    ) -> Result<RegionId, RegionError> {
        let start = Position::new(start_row, start_offset);
        let end = Position::new(end_row, end_offset);
        self.check_position(start, false)?;
        self.check_position(end, true)?;
        if start > end {
            return Err(RegionError::InvalidSpan {
                start: start_offset,
                end: end_offset,
                len: self.rows.get(end_row).map_or(0, String::len),
            });
        }
        self.insert(start, end, metadata)
    }

    fn check_position(&self, pos: Position, is_end: bool) -> Result<(), RegionError> {
        let valid = match self.rows.get(pos.row) {
            Some(text) => pos.offset <= text.len() && text.is_char_boundary(pos.offset),
            None => is_end && pos.row == self.rows.len() && pos.offset == 0,
        };
        if valid {
            Ok(())
        } else {
            Err(RegionError::InvalidRow {
                row: pos.row,
                offset: pos.offset,
                rows: self.rows.len(),
            })
        }
    }

    fn insert(
        &mut self,
        start: Position,
        end: Position,
        mut metadata: RegionMetadata,
    ) -> Result<RegionId, RegionError> {
        metadata.validate()?;
        metadata.apply_limits(&self.limits);

        let id = match self.reserved.take() {
            Some(id) => id,
            None => self.index.allocate_id(),
        };
        crate::debug_log!(
            "REGION",
            "{} created region {} at {:?}..{:?} for {}",
            self.matcher,
            id,
            start,
            end,
            self.invocation
        );
        self.index.insert(Region {
            id,
            invocation: self.invocation,
            matcher: self.matcher.to_string(),
            start,
            end,
            metadata,
        });
        Ok(id)
    }
}
