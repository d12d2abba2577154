//! Window projection and position translation for the shared native buffer.
//!
//! One native text control stands in for every editable field of the
//! three-line window around the cursor. This crate owns both halves of the
//! coordinate contract that makes that possible:
//!
//! * [`project`] serializes a [`strand_areas::Context`] into the single
//!   linear string written to the native control, producing the string and
//!   its span layout in one walk so they can never disagree. Every write to
//!   the native control funnels through this one serialize function.
//! * [`translate`] is the pure bidirectional mapping between a flat
//!   character offset in that string and a structured `(band, field,
//!   char)` address, including the direction-aware snapping that lets
//!   arrow keys step over dead space (gaps, sentinels, terminators) onto
//!   the correct field.
//!
//! Serialized shape (`TERMINATOR` is `'\n'`, sentinels are
//! [`SENTINEL_WIDTH`] placeholder characters):
//!
//! ```text
//! buffer := TERMINATOR line(above) line(current) line(below)
//! line   := SENTINEL areas TERMINATOR
//! ```
//!
//! The sentinel exists so a deletion landing exactly on it can be
//! distinguished from a content edit; the bracketing terminators give the
//! absolute document-start/end positions (`Top` / `Bottom`) a place to
//! live. Identical contexts always serialize byte-identically.

pub mod project;
pub mod translate;

pub use project::{AreaSpan, LineLayout, Projection, SpanKind, WindowLayout};
pub use translate::{Band, Direction, StructuredPosition};

pub use strand_areas::LINE_TERMINATOR;

/// Number of placeholder characters forming each line's structural sentinel.
pub const SENTINEL_WIDTH: usize = 2;

/// Placeholder character used for gaps and sentinels unless configured.
pub const DEFAULT_PLACEHOLDER: char = ' ';
