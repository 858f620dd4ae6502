use super::*;
use crate::action::ActionDescriptor;
use crate::line::{LineAssembler, OutputLine};
use par_annotate_config::MetadataLimits;

const INV: InvocationId = InvocationId(7);

fn rows(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_ids_start_at_one_and_increase() {
    let mut index = RegionIndex::new();
    let rows = rows(&["abc"]);
    let line = OutputLine::single("abc", 0);
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );
    let a = ctx.create_region(0, 1, RegionMetadata::new()).unwrap();
    let b = ctx.create_region(1, 3, RegionMetadata::new()).unwrap();
    assert_eq!(a, RegionId(1));
    assert!(b > a);
    assert_eq!(index.len(), 2);
}

#[test]
fn test_span_validation() {
    let mut index = RegionIndex::new();
    let rows = rows(&["héllo"]);
    let line = OutputLine::single("héllo", 0);
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );

    assert!(matches!(
        ctx.create_region(3, 2, RegionMetadata::new()),
        Err(RegionError::InvalidSpan { .. })
    ));
    assert!(matches!(
        ctx.create_region(0, 99, RegionMetadata::new()),
        Err(RegionError::InvalidSpan { .. })
    ));
    // splits the two-byte 'é'
    assert!(matches!(
        ctx.create_region(2, 4, RegionMetadata::new()),
        Err(RegionError::InvalidSpan { .. })
    ));
    // empty span at end of line is allowed
    assert!(ctx.create_region(6, 6, RegionMetadata::new()).is_ok());
    assert_eq!(index.len(), 1);
}

#[test]
fn test_reserved_id_is_consumed_by_next_create() {
    let mut index = RegionIndex::new();
    let rows = rows(&["line"]);
    let line = OutputLine::single("line", 0);
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );

    let reserved = ctx.next_region_id();
    assert_eq!(ctx.next_region_id(), reserved);
    let meta = RegionMetadata::new().with_action(
        ActionDescriptor::new("CopySemantic")
            .arg(reserved.to_string())
            .arg("term"),
    );
    let created = ctx.create_region(0, 4, meta).unwrap();
    assert_eq!(created, reserved);

    let next = ctx.create_region(0, 4, RegionMetadata::new()).unwrap();
    assert_eq!(next, RegionId(reserved.0 + 1));
}

#[test]
fn test_unused_reservation_is_burnt() {
    let mut index = RegionIndex::new();
    let rows = rows(&["line"]);
    let line = OutputLine::single("line", 0);
    let burnt = {
        let mut ctx = RegionContext::new(
            &mut index,
            INV,
            "test",
            MetadataLimits::default(),
            &rows,
            Some(&line),
        );
        ctx.next_region_id()
    };
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );
    let id = ctx.create_region(0, 1, RegionMetadata::new()).unwrap();
    assert!(id > burnt);
    assert!(index.get(burnt).is_none());
}

#[test]
fn test_reserved_delimiter_in_metadata_is_rejected() {
    let mut index = RegionIndex::new();
    let rows = rows(&["name"]);
    let line = OutputLine::single("name", 0);
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );
    let meta = RegionMetadata::new().with_action(ActionDescriptor::new("Open").arg("a\x1fb"));
    assert!(matches!(
        ctx.create_region(0, 4, meta),
        Err(RegionError::ReservedDelimiter(_))
    ));
    assert!(index.is_empty());
}

#[test]
fn test_wrapped_line_maps_to_rows() {
    let mut asm = LineAssembler::new();
    let raw = ["0123456789", "abcdef"];
    asm.push_row(raw[0], true);
    let line = asm.push_row(raw[1], false).unwrap();
    let rows = rows(&raw);

    let mut index = RegionIndex::new();
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        Some(&line),
    );
    let id = ctx.create_region(8, 13, RegionMetadata::new()).unwrap();
    let region = index.get(id).unwrap();
    assert_eq!(region.start, Position::new(0, 8));
    assert_eq!(region.end, Position::new(1, 3));
    assert!(region.covers_row(0));
    assert!(region.covers_row(1));
}

#[test]
fn test_create_region_at_spans_rows() {
    let rows = rows(&["a", "bb", "last line"]);
    let mut index = RegionIndex::new();
    let mut ctx = RegionContext::new(
        &mut index,
        INV,
        "test",
        MetadataLimits::default(),
        &rows,
        None,
    );

    assert!(matches!(
        ctx.create_region(0, 0, RegionMetadata::new()),
        Err(RegionError::NoCurrentLine)
    ));

    let id = ctx
        .create_region_at(2, 0, 3, 0, RegionMetadata::new().with_icon("go-up"))
        .unwrap();
    assert!(matches!(
        ctx.create_region_at(3, 0, 3, 0, RegionMetadata::new()),
        Err(RegionError::InvalidRow { .. })
    ));
    assert!(matches!(
        ctx.create_region_at(1, 0, 4, 0, RegionMetadata::new()),
        Err(RegionError::InvalidRow { .. })
    ));
    assert!(matches!(
        ctx.create_region_at(2, 3, 2, 1, RegionMetadata::new()),
        Err(RegionError::InvalidSpan { .. })
    ));

    let region = index.get(id).unwrap();
    assert!(region.covers_row(2));
    assert!(!region.covers_row(3));
    assert_eq!(index.regions_on_row(INV, 2).count(), 1);
    assert_eq!(index.regions_on_row(INV, 1).count(), 0);
}

#[test]
fn test_eviction_by_invocation() {
    let rows = rows(&["x"]);
    let line = OutputLine::single("x", 0);
    let mut index = RegionIndex::new();
    for inv in [InvocationId(1), InvocationId(2), InvocationId(1)] {
        let mut ctx = RegionContext::new(
            &mut index,
            inv,
            "test",
            MetadataLimits::default(),
            &rows,
            Some(&line),
        );
        ctx.create_region(0, 1, RegionMetadata::new()).unwrap();
    }

    assert_eq!(index.regions_for_invocation(InvocationId(1)).count(), 2);
    assert_eq!(index.evict_invocation(InvocationId(1)), 2);
    assert_eq!(index.len(), 1);
    assert!(index.evict(RegionId(2)).is_some());
    assert!(index.is_empty());
}

#[test]
fn test_primary_action_lookup() {
    let rows = rows(&["web1"]);
    let line = OutputLine::single("web1", 0);
    let mut index = RegionIndex::new();
    let action = ActionDescriptor::new("NewConnection")
        .arg("10")
        .arg("web1")
        .arg("srv");
    let id = {
        let mut ctx = RegionContext::new(
            &mut index,
            INV,
            "test",
            MetadataLimits::default(),
            &rows,
            Some(&line),
        );
        ctx.create_region(0, 4, RegionMetadata::new().with_action(action.clone()))
            .unwrap()
    };
    assert_eq!(index.primary_action(id), Some(&action));
    assert_eq!(index.primary_action(RegionId(999)), None);
}
