//! Attributing a located change to a single area of the projected window.
//!
//! The serialized buffer interleaves editable field spans with dead space:
//! gaps, the two-character line sentinels, and line terminators. Exactly
//! two structural regions border the current line, and only those can
//! carry line operations:
//!
//! * the *leading* region, from the above line's terminator through the
//!   current line's first field, where an edit means "insert before /
//!   delete the current line" (`is_next_line = false`);
//! * the *trailing* region, from the current line's last field through
//!   the below line's first area, where an edit means "insert after /
//!   delete the next line" (`is_next_line = true`).
//!
//! Everything else either lands in a single field span (a content edit) or
//! cannot be attributed at all, in which case the session resyncs:
//! consistency over capturing the edit.

use crate::diff::TextChange;
use strand_areas::{Field, LINE_TERMINATOR};
use strand_window::{Band, SpanKind, WindowLayout};

/// Outcome of attributing one change to the window layout.
#[derive(Debug)]
pub enum Classified {
    /// The change is contained in one field's span.
    Field {
        band: Band,
        index: usize,
        field: Field,
        /// Start offset of the field's span in the old serialization.
        field_start: usize,
    },
    /// The change is a structural line request.
    Line { next_line: bool, insert: bool },
    /// The single-edit invariant appears violated; resync instead.
    Unattributable,
}

pub fn classify(layout: &WindowLayout, change: &TextChange) -> Classified {
    let start = change.start;
    let removed_len = change.removed.chars().count();
    let end = start + removed_len;

    let (Some(up), Some(same), Some(down)) = (
        layout.line(Band::Up),
        layout.line(Band::Same),
        layout.line(Band::Down),
    ) else {
        return Classified::Unattributable;
    };

    // Structural insertion: terminator-only text entering a region
    // adjacent to the current line. Checked before field containment so
    // enter at the very start or end of a field requests a line instead of
    // an (always rejected) embedded line break.
    let added_is_terminator =
        !change.added.is_empty() && change.added.chars().all(|c| c == LINE_TERMINATOR);
    if removed_len == 0 && added_is_terminator {
        if (up.terminator..=same.first_field_start()).contains(&start) {
            return Classified::Line {
                next_line: false,
                insert: true,
            };
        }
        // On a fieldless line the gap interior stays dead space; only the
        // terminator itself marks the trailing boundary.
        let trailing_start = same
            .field_spans()
            .last()
            .map(|(_, s)| s.end)
            .unwrap_or(same.terminator);
        if (trailing_start..=down.area_start).contains(&start) {
            return Classified::Line {
                next_line: true,
                insert: true,
            };
        }
    }

    // Structural deletion: a removed span lying entirely inside the purely
    // structural run between two lines (terminator plus sentinel; gaps are
    // areas and start only at `area_start`).
    if removed_len > 0 && change.added.is_empty() {
        if start >= up.terminator && end <= same.area_start {
            return Classified::Line {
                next_line: false,
                insert: false,
            };
        }
        if start >= same.terminator && end <= down.area_start {
            return Classified::Line {
                next_line: true,
                insert: false,
            };
        }
    }

    // Field containment: the whole removed span (or the insertion point,
    // both ends inclusive) inside a single field span.
    for line in layout.lines() {
        for (index, span) in line.field_spans() {
            let contained = if removed_len == 0 {
                span.start <= start && start <= span.end
            } else {
                span.start <= start && end <= span.end
            };
            if contained && let SpanKind::Field { field, .. } = &span.kind {
                return Classified::Field {
                    band: line.band,
                    index,
                    field: field.clone(),
                    field_start: span.start,
                };
            }
        }
    }

    tracing::debug!(
        target: "sync.diff",
        start,
        removed_chars = removed_len,
        added_chars = change.added.chars().count(),
        "unattributable_change"
    );
    Classified::Unattributable
}
