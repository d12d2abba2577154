//! The Buffer Mirror: last-known content and selection of the native
//! control.
//!
//! Invariant: between notifications the mirror equals native content
//! exactly, enforced by resynchronizing after every processed or rejected
//! change. Installing a new context reseeds the content and invalidates
//! the cached selection, forcing the next position read to recompute
//! instead of trusting offsets from a dead window.

/// An (anchor, head) selection in char offsets. `head < anchor` means the
/// user selected backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub anchor: usize,
    pub head: usize,
}

impl SelectionSnapshot {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection at a single offset.
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn backward(&self) -> bool {
        self.head < self.anchor
    }
}

#[derive(Debug, Default)]
pub struct BufferMirror {
    content: String,
    selection: Option<SelectionSnapshot>,
}

impl BufferMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Replace the mirrored content and drop the cached selection (the
    /// offsets it held belong to the previous window).
    pub fn reseed(&mut self, text: &str) {
        self.content.clear();
        self.content.push_str(text);
        self.selection = None;
    }

    /// Replace the mirrored content, keeping the cached selection.
    pub fn set_content(&mut self, text: &str) {
        self.content.clear();
        self.content.push_str(text);
    }

    pub fn selection(&self) -> Option<SelectionSnapshot> {
        self.selection
    }

    /// Record a new selection, returning the one it replaces.
    pub fn record_selection(&mut self, sel: SelectionSnapshot) -> Option<SelectionSnapshot> {
        self.selection.replace(sel)
    }

    pub fn invalidate_selection(&mut self) {
        self.selection = None;
    }
}
