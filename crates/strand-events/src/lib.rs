//! Edit and line-operation events plus the capture session hook surface.
//!
//! Events describe a single logical change reconstructed from the shared
//! native buffer. They are write-once: the synthesizer fills them in, and
//! the only mutation a collaborator may perform is `reject()`, which flips
//! an interior flag the session reads back after dispatch. Rejection is
//! synchronous: by the time the notification handler returns, the buffer
//! has already been restored (the user sees a cursor snap-back, never an
//! error).
//!
//! Hooks follow the no-op-default trait pattern: collaborators implement
//! only what they need. The engine is single-threaded, so hooks take
//! `&mut self` and no `Send`/`Sync` bounds apply.

use std::cell::Cell;
use std::fmt;
use strand_areas::Field;
use strand_window::StructuredPosition;

/// A single field's reconstructed change.
pub struct EditEvent {
    field: Field,
    field_index: usize,
    added: String,
    removed: String,
    new_content: String,
    rejected: Cell<bool>,
}

impl EditEvent {
    pub fn new(
        field: Field,
        field_index: usize,
        added: String,
        removed: String,
        new_content: String,
    ) -> Self {
        Self {
            field,
            field_index,
            added,
            removed,
            new_content,
            rejected: Cell::new(false),
        }
    }

    /// The field the change applies to.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Stable index of the field within its line.
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// Text inserted by the edit (empty for a pure deletion).
    pub fn added(&self) -> &str {
        &self.added
    }

    /// Text removed by the edit (empty for a pure insertion).
    pub fn removed(&self) -> &str {
        &self.removed
    }

    /// The field's full value as it would read after the edit.
    pub fn new_content(&self) -> &str {
        &self.new_content
    }

    /// Veto this edit. The session rolls the buffer back to its last
    /// committed serialization before the notification handler returns.
    pub fn reject(&self) {
        tracing::trace!(
            target: "events.edit",
            field_index = self.field_index,
            added_chars = self.added.chars().count(),
            removed_chars = self.removed.chars().count(),
            "rejected"
        );
        self.rejected.set(true);
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.get()
    }
}

impl fmt::Debug for EditEvent {
    // Events carry user narrative text; log only sizes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditEvent")
            .field("field_index", &self.field_index)
            .field("added_chars", &self.added.chars().count())
            .field("removed_chars", &self.removed.chars().count())
            .field("rejected", &self.rejected.get())
            .finish()
    }
}

/// A structural request reconstructed from an edit landing on a line
/// sentinel or trailing boundary: insert a line before/after the current
/// one, or delete the current/next line.
#[derive(Debug)]
pub struct LineOperation {
    is_next_line: bool,
    is_insert: bool,
    rejected: Cell<bool>,
}

impl LineOperation {
    pub fn new(is_next_line: bool, is_insert: bool) -> Self {
        Self {
            is_next_line,
            is_insert,
            rejected: Cell::new(false),
        }
    }

    /// `true` when the operation targets the line after the current one
    /// (insert after / delete next) rather than the current line itself.
    pub fn is_next_line(&self) -> bool {
        self.is_next_line
    }

    /// `true` for an insertion request, `false` for a deletion.
    pub fn is_insert(&self) -> bool {
        self.is_insert
    }

    pub fn reject(&self) {
        tracing::trace!(
            target: "events.line",
            next_line = self.is_next_line,
            insert = self.is_insert,
            "rejected"
        );
        self.rejected.set(true);
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.get()
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// Normalized logical keys offered to the pre-diff interception hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }
}

/// Collaborator-facing hook surface of a capture session. All methods are
/// no-ops by default.
pub trait SessionHooks {
    /// Settled, de-duplicated selection change. `backward` is `true` when
    /// the selection head sits before its anchor.
    fn on_position_change(
        &mut self,
        _start: &StructuredPosition,
        _end: &StructuredPosition,
        _backward: bool,
    ) {
    }

    /// A field edit about to commit; call `event.reject()` to veto it.
    fn on_input(&mut self, _event: &EditEvent) {}

    /// The matching post-commit notification; fires exactly once per
    /// committed edit, never for a rejected one.
    fn on_after_input(&mut self, _event: &EditEvent) {}

    /// A structural line request. On acceptance the collaborator must call
    /// `set_context` again before the next edit; the window is stale.
    fn on_line_operation(&mut self, _event: &LineOperation) {}

    fn on_focus(&mut self) {}

    fn on_unfocus(&mut self) {}

    /// Raw key interception before diffing runs (shortcuts). Return `true`
    /// when the key was handled and must not reach the native control.
    fn on_key_intercept(&mut self, _key: &KeyEvent) -> bool {
        false
    }
}

/// Default no-op hooks implementation.
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}
