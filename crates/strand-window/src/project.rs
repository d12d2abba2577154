//! Context projection: one serialize walk producing text plus span layout.
//!
//! The layout records, for every line, where its sentinel, each area, and
//! its terminator landed in the serialized string. The diff synthesizer
//! walks these spans to attribute a changed region to a single area, and
//! the translator sums them for exact offset math. Building both from the
//! same walk keeps the invariant that layout offsets always describe the
//! string actually sitting in the native control.
//!
//! All offsets are character offsets into the serialized string.

use crate::translate::Band;
use crate::{LINE_TERMINATOR, SENTINEL_WIDTH};
use strand_areas::{Area, AreaSequence, Context, Field};

/// What a span of the serialized line represents.
#[derive(Debug, Clone)]
pub enum SpanKind {
    /// Editable field content; `index` is the field's stable index within
    /// its line.
    Field { index: usize, field: Field },
    /// Fixed-width immutable filler.
    Gap,
}

/// Half-open span `[start, end)` of one area in the serialized string.
#[derive(Debug, Clone)]
pub struct AreaSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl AreaSpan {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// Layout of one serialized line.
#[derive(Debug, Clone)]
pub struct LineLayout {
    pub band: Band,
    /// Offset of the first sentinel character.
    pub start: usize,
    /// First offset after the sentinel; start of the line's areas.
    pub area_start: usize,
    /// Offset of this line's terminator (equals the end of its areas).
    pub terminator: usize,
    pub spans: Vec<AreaSpan>,
}

impl LineLayout {
    /// Field spans of this line in order, paired with their stable indices.
    pub fn field_spans(&self) -> impl Iterator<Item = (usize, &AreaSpan)> {
        self.spans.iter().filter_map(|s| match &s.kind {
            SpanKind::Field { index, .. } => Some((*index, s)),
            SpanKind::Gap => None,
        })
    }

    pub fn field_span(&self, index: usize) -> Option<&AreaSpan> {
        self.field_spans()
            .find(|(i, _)| *i == index)
            .map(|(_, s)| s)
    }

    /// Start offset of the first field's span, or `area_start` for a line
    /// without fields. Offsets before this point are leading dead space as
    /// far as content edits are concerned.
    pub fn first_field_start(&self) -> usize {
        self.field_spans()
            .next()
            .map(|(_, s)| s.start)
            .unwrap_or(self.area_start)
    }

    /// End offset of the last field's span, or `area_start` for a line
    /// without fields. Offsets at or past this point are trailing dead
    /// space as far as content edits are concerned.
    pub fn last_field_end(&self) -> usize {
        self.field_spans()
            .last()
            .map(|(_, s)| s.end)
            .unwrap_or(self.area_start)
    }
}

/// Span layout of the whole three-line window.
#[derive(Debug, Clone)]
pub struct WindowLayout {
    lines: [LineLayout; 3],
    len: usize,
}

impl WindowLayout {
    /// Total serialized length in characters, including both bracketing
    /// terminators.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        // A window always carries its structural skeleton.
        false
    }

    /// The three window lines in above/current/below order.
    pub fn lines(&self) -> &[LineLayout; 3] {
        &self.lines
    }

    /// Layout of the given window line. `Top` and `Bottom` are positions,
    /// not lines, and have no layout.
    pub fn line(&self, band: Band) -> Option<&LineLayout> {
        match band {
            Band::Up => Some(&self.lines[0]),
            Band::Same => Some(&self.lines[1]),
            Band::Down => Some(&self.lines[2]),
            Band::Top | Band::Bottom => None,
        }
    }

    /// Locate a field handle anywhere in the window.
    pub fn find_field(&self, field: &Field) -> Option<(Band, usize)> {
        for line in &self.lines {
            for (index, span) in line.field_spans() {
                if let SpanKind::Field { field: f, .. } = &span.kind
                    && f.same_field(field)
                {
                    return Some((line.band, index));
                }
            }
        }
        None
    }
}

/// A serialized window: the exact string for the native control plus the
/// span layout describing it.
#[derive(Debug, Clone)]
pub struct Projection {
    pub text: String,
    pub layout: WindowLayout,
}

impl Projection {
    pub fn new(ctx: &Context, placeholder: char) -> Self {
        let mut text = String::new();
        text.push(LINE_TERMINATOR);
        let mut off = 1usize;

        let bands: [(Band, &AreaSequence); 3] = [
            (Band::Up, &ctx.above),
            (Band::Same, &ctx.current),
            (Band::Down, &ctx.below),
        ];
        let lines = bands.map(|(band, seq)| {
            let start = off;
            for _ in 0..SENTINEL_WIDTH {
                text.push(placeholder);
            }
            off += SENTINEL_WIDTH;
            let area_start = off;

            let mut spans = Vec::with_capacity(seq.areas().len());
            let mut field_index = 0usize;
            for area in seq.areas() {
                match area {
                    Area::Field(field) => {
                        let value = field.value();
                        let width = value.chars().count();
                        text.push_str(&value);
                        spans.push(AreaSpan {
                            start: off,
                            end: off + width,
                            kind: SpanKind::Field {
                                index: field_index,
                                field: field.clone(),
                            },
                        });
                        field_index += 1;
                        off += width;
                    }
                    Area::Gap(gap) => {
                        for _ in 0..gap.width {
                            text.push(placeholder);
                        }
                        spans.push(AreaSpan {
                            start: off,
                            end: off + gap.width,
                            kind: SpanKind::Gap,
                        });
                        off += gap.width;
                    }
                }
            }

            let terminator = off;
            text.push(LINE_TERMINATOR);
            off += 1;
            LineLayout {
                band,
                start,
                area_start,
                terminator,
                spans,
            }
        });

        debug_assert_eq!(off, text.chars().count(), "layout must describe text");
        tracing::trace!(target: "window.project", chars = off, "projected");
        Projection {
            text,
            layout: WindowLayout { lines, len: off },
        }
    }
}
