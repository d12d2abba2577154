//! Trait seam over the platform's single shared text-input control.
//!
//! The engine is the only writer of this control; collaborators mutate
//! fields and document structure but never the buffer directly. All
//! offsets are character offsets, matching what native text controls
//! report. The selection is an (anchor, head) pair; head before anchor
//! means the user selected backward.

/// The one native text buffer the capture session drives.
pub trait NativeTextControl {
    /// Current buffer content.
    fn content(&self) -> String;

    /// Current selection as (anchor, head) char offsets. A caret is an
    /// (n, n) pair.
    fn selection(&self) -> (usize, usize);

    /// Replace the whole buffer content. The platform may clamp or move
    /// the selection as a side effect; the session never trusts the
    /// post-write selection synchronously (it re-sets it on the next
    /// scheduling tick).
    fn set_content(&mut self, text: &str);

    /// Place the selection; a caret is set with `anchor == head`.
    fn set_selection(&mut self, anchor: usize, head: usize);
}
