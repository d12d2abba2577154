//! Shared fixtures: an in-memory native control and recording hooks.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use strand_areas::{Area, AreaSequence, Context, Field, Gap};
use strand_events::{EditEvent, LineOperation, SessionHooks};
use strand_sync::NativeTextControl;
use strand_window::{Band, StructuredPosition};

#[derive(Default)]
pub struct FakeNative {
    pub content: String,
    pub selection: (usize, usize),
}

/// Cloneable handle over the fake control so tests can drive and inspect
/// it while the session owns a boxed copy.
#[derive(Clone, Default)]
pub struct SharedNative(Rc<RefCell<FakeNative>>);

impl SharedNative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> String {
        self.0.borrow().content.clone()
    }

    pub fn selection(&self) -> (usize, usize) {
        self.0.borrow().selection
    }

    /// Simulate the platform applying a user edit: splice `added` over
    /// `removed` chars at `at`, placing the caret after the insertion.
    pub fn type_chars(&self, at: usize, removed: usize, added: &str) {
        let mut inner = self.0.borrow_mut();
        let old: Vec<char> = inner.content.chars().collect();
        let mut next: String = old[..at].iter().collect();
        next.push_str(added);
        next.extend(&old[at + removed..]);
        inner.content = next;
        let caret = at + added.chars().count();
        inner.selection = (caret, caret);
    }

    /// Move the caret without touching content.
    pub fn move_caret(&self, offset: usize) {
        self.0.borrow_mut().selection = (offset, offset);
    }

    pub fn select(&self, anchor: usize, head: usize) {
        self.0.borrow_mut().selection = (anchor, head);
    }
}

impl NativeTextControl for SharedNative {
    fn content(&self) -> String {
        self.0.borrow().content.clone()
    }

    fn selection(&self) -> (usize, usize) {
        self.0.borrow().selection
    }

    fn set_content(&mut self, text: &str) {
        self.0.borrow_mut().content = text.to_string();
    }

    fn set_selection(&mut self, anchor: usize, head: usize) {
        self.0.borrow_mut().selection = (anchor, head);
    }
}

#[derive(Debug, PartialEq)]
pub enum HookCall {
    Position {
        band: Band,
        field_index: usize,
        offset: usize,
        end_offset: usize,
        backward: bool,
    },
    Input {
        added: String,
        removed: String,
        new_content: String,
    },
    AfterInput {
        new_content: String,
    },
    LineOp {
        next_line: bool,
        insert: bool,
    },
    Focus,
    Unfocus,
}

/// Hooks that log every callback and optionally veto edits.
#[derive(Default)]
pub struct RecordingHooks {
    pub calls: Rc<RefCell<Vec<HookCall>>>,
    pub reject_input: bool,
    pub reject_line_ops: bool,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Rc<RefCell<Vec<HookCall>>> {
        Rc::clone(&self.calls)
    }
}

impl SessionHooks for RecordingHooks {
    fn on_position_change(
        &mut self,
        start: &StructuredPosition,
        end: &StructuredPosition,
        backward: bool,
    ) {
        self.calls.borrow_mut().push(HookCall::Position {
            band: start.band,
            field_index: start.field_index,
            offset: start.offset,
            end_offset: end.offset,
            backward,
        });
    }

    fn on_input(&mut self, event: &EditEvent) {
        self.calls.borrow_mut().push(HookCall::Input {
            added: event.added().to_string(),
            removed: event.removed().to_string(),
            new_content: event.new_content().to_string(),
        });
        if self.reject_input {
            event.reject();
        }
    }

    fn on_after_input(&mut self, event: &EditEvent) {
        self.calls.borrow_mut().push(HookCall::AfterInput {
            new_content: event.new_content().to_string(),
        });
    }

    fn on_line_operation(&mut self, event: &LineOperation) {
        self.calls.borrow_mut().push(HookCall::LineOp {
            next_line: event.is_next_line(),
            insert: event.is_insert(),
        });
        if self.reject_line_ops {
            event.reject();
        }
    }

    fn on_focus(&mut self) {
        self.calls.borrow_mut().push(HookCall::Focus);
    }

    fn on_unfocus(&mut self) {
        self.calls.borrow_mut().push(HookCall::Unfocus);
    }
}

/// The window used throughout these tests: a one-gap line above and
/// below, the current line a 3-char gap followed by a field holding
/// "ab". Serializes to `"\n   \n     ab\n   \n"` with the field spanning
/// offsets 10..12.
pub fn canonical_context() -> (Context, Field) {
    let field = Field::new("text", "ab");
    let ctx = Context::new(
        AreaSequence::new([Area::Gap(Gap::new(1))]),
        AreaSequence::new([Area::Gap(Gap::new(3)), Area::Field(field.clone())]),
        AreaSequence::new([Area::Gap(Gap::new(1))]),
    );
    (ctx, field)
}

pub const CANONICAL_TEXT: &str = "\n   \n     ab\n   \n";
