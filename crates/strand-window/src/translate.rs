//! Bidirectional mapping between flat buffer offsets and structured
//! `(band, field, char)` addresses.
//!
//! Forward (`to_structured`) walks the window layout area-by-area. Offsets
//! inside a field's span (both ends inclusive, so a caret sitting just
//! after the last character still belongs to the field) resolve directly.
//! Offsets in dead space (gaps, sentinels, terminators) snap to the nearest
//! field in the direction of travel, crossing line boundaries if needed;
//! that is what lets arrow-key navigation step out of a gap onto the
//! correct neighbor instead of stalling. Direction of travel is derived by
//! comparing the requested offset to the previous selection start.
//!
//! Reverse (`to_offset`) sums the widths of preceding areas and must be
//! exact: it drives native cursor placement. The two directions round-trip
//! for every field in the window and every valid char offset.
//!
//! These functions never fail. When the window holds no field at all, or a
//! structural desync left the session without a live layout, the translator
//! answers with a defensive fallback position; raising mid-keystroke would
//! strand the user.

use crate::project::{SpanKind, WindowLayout};
use strand_areas::Field;

/// Which window line (or absolute document end) a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Absolute document start, before the window.
    Top,
    /// The line above the cursor line.
    Up,
    /// The cursor line.
    Same,
    /// The line below the cursor line.
    Down,
    /// Absolute document end, after the window.
    Bottom,
}

/// Direction the caret travelled to reach a requested offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Derive travel direction by comparing the requested offset to the
    /// previous selection start; with no previous selection (fresh
    /// context), travel is forward.
    pub fn of_travel(requested: usize, previous_start: Option<usize>) -> Self {
        match previous_start {
            Some(p) if requested < p => Direction::Backward,
            _ => Direction::Forward,
        }
    }
}

/// A structured address in the three-line window.
#[derive(Debug, Clone)]
pub struct StructuredPosition {
    pub band: Band,
    pub field_index: usize,
    /// Character offset within the field (0 for `Top`/`Bottom`).
    pub offset: usize,
    pub field: Option<Field>,
}

impl StructuredPosition {
    pub fn top() -> Self {
        Self {
            band: Band::Top,
            field_index: 0,
            offset: 0,
            field: None,
        }
    }

    pub fn bottom() -> Self {
        Self {
            band: Band::Bottom,
            field_index: 0,
            offset: 0,
            field: None,
        }
    }

    /// Defensive fallback when no field can be resolved (fieldless window,
    /// or a stale layout after an unacknowledged line operation).
    pub fn fallback() -> Self {
        Self {
            band: Band::Same,
            field_index: 0,
            offset: 0,
            field: None,
        }
    }

    pub fn in_field(band: Band, field_index: usize, offset: usize, field: Field) -> Self {
        Self {
            band,
            field_index,
            offset,
            field: Some(field),
        }
    }
}

impl PartialEq for StructuredPosition {
    fn eq(&self, other: &Self) -> bool {
        let same_field = match (&self.field, &other.field) {
            (Some(a), Some(b)) => a.same_field(b),
            (None, None) => true,
            _ => false,
        };
        self.band == other.band
            && self.field_index == other.field_index
            && self.offset == other.offset
            && same_field
    }
}

impl WindowLayout {
    /// Map a flat char offset to a structured position.
    pub fn to_structured(&self, offset: usize, direction: Direction) -> StructuredPosition {
        if offset == 0 {
            return StructuredPosition::top();
        }
        if offset >= self.len() {
            return StructuredPosition::bottom();
        }

        // Containment first: any field span holding the offset, both ends
        // inclusive. Two spans can only share a boundary when fields sit
        // adjacent without a gap; direction disambiguates.
        let mut containing: Option<StructuredPosition> = None;
        for line in self.lines() {
            for (index, span) in line.field_spans() {
                if span.start <= offset && offset <= span.end {
                    let SpanKind::Field { field, .. } = &span.kind else {
                        continue;
                    };
                    let pos = StructuredPosition::in_field(
                        line.band,
                        index,
                        offset - span.start,
                        field.clone(),
                    );
                    match (&containing, direction) {
                        // Forward travel prefers the later span (offset 0
                        // of the next field); backward keeps the earlier.
                        (Some(_), Direction::Forward) => containing = Some(pos),
                        (Some(_), Direction::Backward) => {}
                        (None, _) => containing = Some(pos),
                    }
                }
            }
        }
        if let Some(pos) = containing {
            return pos;
        }

        // Dead space: snap to the nearest field in the travel direction,
        // then the opposite direction, then give up defensively.
        self.snap(offset, direction)
            .or_else(|| self.snap(offset, opposite(direction)))
            .unwrap_or_else(|| {
                tracing::debug!(target: "window.translate", offset, "no_field_to_snap_to");
                StructuredPosition::fallback()
            })
    }

    fn snap(&self, offset: usize, direction: Direction) -> Option<StructuredPosition> {
        let mut candidate: Option<StructuredPosition> = None;
        for line in self.lines() {
            for (index, span) in line.field_spans() {
                let SpanKind::Field { field, .. } = &span.kind else {
                    continue;
                };
                match direction {
                    Direction::Forward => {
                        if span.start >= offset && candidate.is_none() {
                            candidate = Some(StructuredPosition::in_field(
                                line.band,
                                index,
                                0,
                                field.clone(),
                            ));
                        }
                    }
                    Direction::Backward => {
                        if span.end <= offset {
                            candidate = Some(StructuredPosition::in_field(
                                line.band,
                                index,
                                span.width(),
                                field.clone(),
                            ));
                        }
                    }
                }
            }
        }
        candidate
    }

    /// Map a structured address back to its exact flat offset. `None` when
    /// the band has no layout or the field index does not exist; the char
    /// offset is clamped to the field's width.
    pub fn to_offset(&self, band: Band, field_index: usize, char_offset: usize) -> Option<usize> {
        let line = self.line(band)?;
        let span = line.field_span(field_index)?;
        Some(span.start + char_offset.min(span.width()))
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Forward => Direction::Backward,
        Direction::Backward => Direction::Forward,
    }
}
