//! The capture session: one native control, one context, one mirror.
//!
//! A session is bound to a position in the structured document. The
//! document collaborator installs a three-line [`Context`] on focus and
//! navigation; the session projects it into the native control and from
//! then on interprets every native notification against that projection
//! until the context is replaced or a structural request goes through.
//!
//! Processing is single-threaded and event-driven: each notification is
//! handled to completion before the next. The sole ordering exception is
//! the post-resync cursor correction. The platform applies its internal
//! edit asynchronously relative to the notification, so the session
//! records the corrected selection as a pending command and the host
//! flushes it on the next scheduling tick ([`CaptureSession::flush_deferred`]).
//! Reading the native selection synchronously inside the same notification
//! would observe a stale value.
//!
//! Rejection is transactional and invisible: when a field or the document
//! collaborator vetoes an edit, the buffer is rewritten verbatim from the
//! last committed serialization before the handler returns, and the only
//! user-visible effect is the cursor snapping back.

use crate::classify::{Classified, classify};
use crate::diff::{TextChange, locate_change, splice_chars};
use crate::mirror::{BufferMirror, SelectionSnapshot};
use crate::native::NativeTextControl;
use strand_areas::{Context, Field};
use strand_config::Config;
use strand_events::{EditEvent, KeyEvent, LineOperation, SessionHooks};
use strand_window::{Band, Direction, Projection, StructuredPosition};

/// How a collaborator names a field on the current line.
pub enum FieldTarget {
    Index(usize),
    Handle(Field),
}

impl From<usize> for FieldTarget {
    fn from(index: usize) -> Self {
        FieldTarget::Index(index)
    }
}

impl From<Field> for FieldTarget {
    fn from(field: Field) -> Self {
        FieldTarget::Handle(field)
    }
}

impl From<&Field> for FieldTarget {
    fn from(field: &Field) -> Self {
        FieldTarget::Handle(field.clone())
    }
}

struct Reported {
    start: StructuredPosition,
    end: StructuredPosition,
    backward: bool,
}

pub struct CaptureSession<H: SessionHooks> {
    native: Box<dyn NativeTextControl>,
    hooks: H,
    placeholder: char,
    coalesce: bool,
    context: Option<Context>,
    projection: Option<Projection>,
    mirror: BufferMirror,
    last_reported: Option<Reported>,
    pending_selection: Option<SelectionSnapshot>,
}

impl<H: SessionHooks> CaptureSession<H> {
    pub fn new(native: Box<dyn NativeTextControl>, hooks: H, config: &Config) -> Self {
        Self {
            native,
            hooks,
            placeholder: config.placeholder(),
            coalesce: config.coalesce_positions(),
            context: None,
            projection: None,
            mirror: BufferMirror::new(),
            last_reported: None,
            pending_selection: None,
        }
    }

    pub fn with_defaults(native: Box<dyn NativeTextControl>, hooks: H) -> Self {
        Self::new(native, hooks, &Config::default())
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Install the three-line window around the structured cursor,
    /// replacing any previous one. Projects it into the native control and
    /// reseeds the mirror; every previously computed offset is dead.
    pub fn set_context(&mut self, ctx: Context) {
        let projection = Projection::new(&ctx, self.placeholder);
        self.native.set_content(&projection.text);
        self.mirror.reseed(&projection.text);
        self.pending_selection = None;
        self.last_reported = None;
        tracing::trace!(
            target: "sync.session",
            chars = projection.layout.len(),
            "context_projected"
        );
        self.context = Some(ctx);
        self.projection = Some(projection);
    }

    /// Whether the session currently holds a live window. `false` after an
    /// accepted line operation until the collaborator calls
    /// [`set_context`](Self::set_context) again.
    pub fn has_context(&self) -> bool {
        self.projection.is_some()
    }

    /// Place the caret inside a field of the current line. Returns `false`
    /// when the target cannot be resolved (no live window, unknown index,
    /// or a handle not on the current line).
    pub fn set_position_on_current_line(
        &mut self,
        target: impl Into<FieldTarget>,
        char_offset: usize,
    ) -> bool {
        let Some(offset) = self.resolve_current_offset(target.into(), char_offset) else {
            tracing::debug!(target: "sync.session", "position_target_unresolved");
            return false;
        };
        self.native.set_selection(offset, offset);
        let prev = self.mirror.record_selection(SelectionSnapshot::caret(offset));
        self.report_position(prev.map(|s| s.start()));
        true
    }

    /// Range variant: select from one field position to another on the
    /// current line. The first pair is the anchor, the second the head.
    pub fn set_selection_on_current_line<A, B>(&mut self, from: (A, usize), to: (B, usize)) -> bool
    where
        A: Into<FieldTarget>,
        B: Into<FieldTarget>,
    {
        let (Some(anchor), Some(head)) = (
            self.resolve_current_offset(from.0.into(), from.1),
            self.resolve_current_offset(to.0.into(), to.1),
        ) else {
            tracing::debug!(target: "sync.session", "selection_target_unresolved");
            return false;
        };
        self.native.set_selection(anchor, head);
        let prev = self
            .mirror
            .record_selection(SelectionSnapshot::new(anchor, head));
        self.report_position(prev.map(|s| s.start()));
        true
    }

    /// Entry point for every native content/selection notification.
    pub fn handle_native_update(&mut self) {
        if self.projection.is_none() {
            // Structural desync: an accepted line operation without a
            // follow-up context. Nothing can be attributed; drop it.
            tracing::debug!(target: "sync.session", "notification_with_stale_window");
            return;
        }
        let content = self.native.content();
        let (anchor, head) = self.native.selection();
        let cur = SelectionSnapshot::new(anchor, head);

        if content == self.mirror.content() {
            // Selection-only notification.
            let prev = self.mirror.record_selection(cur);
            self.report_position(prev.map(|s| s.start()));
            return;
        }

        let prev = self.mirror.selection();
        let Some(change) = locate_change(self.mirror.content(), &content, prev, cur) else {
            // Content diverged but no change located inside the permitted
            // bounds; trust nothing and rewrite.
            self.resync_to_projection(prev);
            return;
        };
        let classified = match self.projection.as_ref() {
            Some(p) => classify(&p.layout, &change),
            None => return,
        };
        match classified {
            Classified::Field {
                band,
                index,
                field,
                field_start,
            } => self.apply_field_edit(band, index, field, field_start, &change, prev, cur),
            Classified::Line { next_line, insert } => {
                self.apply_line_operation(next_line, insert, prev)
            }
            Classified::Unattributable => self.resync_to_projection(prev),
        }
    }

    /// Apply the deferred cursor correction recorded by the last resync or
    /// commit. The host must call this one scheduling tick after the
    /// notification that produced it, once the platform has finished
    /// applying its own edit.
    pub fn flush_deferred(&mut self) {
        let Some(sel) = self.pending_selection.take() else {
            return;
        };
        self.native.set_selection(sel.anchor, sel.head);
        let prev = self.mirror.record_selection(sel);
        self.report_position(prev.map(|s| s.start()));
    }

    pub fn has_deferred(&self) -> bool {
        self.pending_selection.is_some()
    }

    /// Raw key interception before any diffing runs. Returns `true` when a
    /// hook consumed the key; the host must then not forward it to the
    /// native control.
    pub fn intercept_key(&mut self, key: &KeyEvent) -> bool {
        let handled = self.hooks.on_key_intercept(key);
        if handled {
            tracing::trace!(target: "sync.session", ?key, "key_intercepted");
        }
        handled
    }

    pub fn handle_focus(&mut self) {
        tracing::trace!(target: "sync.session", "focus");
        self.hooks.on_focus();
    }

    pub fn handle_unfocus(&mut self) {
        tracing::trace!(target: "sync.session", "unfocus");
        self.hooks.on_unfocus();
    }

    /// Current structured selection as (start, end, backward). Falls back
    /// to the defensive position when the window is stale.
    pub fn position(&self) -> (StructuredPosition, StructuredPosition, bool) {
        let Some(projection) = self.projection.as_ref() else {
            return (
                StructuredPosition::fallback(),
                StructuredPosition::fallback(),
                false,
            );
        };
        let Some(sel) = self.mirror.selection() else {
            return (StructuredPosition::top(), StructuredPosition::top(), false);
        };
        let start = projection
            .layout
            .to_structured(sel.start(), Direction::Forward);
        let end = projection.layout.to_structured(sel.end(), Direction::Forward);
        (start, end, sel.backward())
    }

    fn resolve_current_offset(&self, target: FieldTarget, char_offset: usize) -> Option<usize> {
        let projection = self.projection.as_ref()?;
        let index = match target {
            FieldTarget::Index(index) => index,
            FieldTarget::Handle(field) => {
                let (band, index) = projection.layout.find_field(&field)?;
                if band != Band::Same {
                    return None;
                }
                index
            }
        };
        projection.layout.to_offset(Band::Same, index, char_offset)
    }

    fn apply_field_edit(
        &mut self,
        band: Band,
        index: usize,
        field: Field,
        field_start: usize,
        change: &TextChange,
        prev: Option<SelectionSnapshot>,
        cur: SelectionSnapshot,
    ) {
        let old_value = field.value();
        let rel = change.start - field_start;
        let removed_chars = change.removed.chars().count();
        let added_chars = change.added.chars().count();
        let new_content = splice_chars(&old_value, rel, removed_chars, &change.added);

        let event = EditEvent::new(
            field.clone(),
            index,
            change.added.clone(),
            change.removed.clone(),
            new_content.clone(),
        );
        if !field.validate(&new_content) {
            tracing::debug!(
                target: "sync.session",
                ?band,
                field_index = index,
                "field_validation_rejected"
            );
            self.resync_to_projection(prev);
            return;
        }
        self.hooks.on_input(&event);
        if event.is_rejected() {
            tracing::debug!(
                target: "sync.session",
                ?band,
                field_index = index,
                "edit_rejected"
            );
            self.resync_to_projection(prev);
            return;
        }

        // Commit: the field changes, the projection is rebuilt from the
        // same context, and the corrected caret lands after the added
        // text. The native control already holds the typed content; only
        // the mirror and caret need refreshing.
        field.set_value(new_content);
        let Some(ctx) = self.context.as_ref() else {
            return;
        };
        let projection = Projection::new(ctx, self.placeholder);
        debug_assert_eq!(
            projection.text,
            self.native.content(),
            "reprojection after a single-field commit must match native content"
        );
        let caret = projection.layout.to_offset(band, index, rel + added_chars);
        self.mirror.set_content(&projection.text);
        self.mirror.record_selection(cur);
        self.projection = Some(projection);
        if let Some(offset) = caret {
            self.pending_selection = Some(SelectionSnapshot::caret(offset));
        }
        tracing::debug!(
            target: "sync.session",
            ?band,
            field_index = index,
            added_chars,
            removed_chars,
            "field_edit_committed"
        );
        self.hooks.on_after_input(&event);
        self.report_position(prev.map(|s| s.start()));
    }

    fn apply_line_operation(
        &mut self,
        next_line: bool,
        insert: bool,
        prev: Option<SelectionSnapshot>,
    ) {
        let event = LineOperation::new(next_line, insert);
        self.hooks.on_line_operation(&event);
        if event.is_rejected() {
            tracing::debug!(target: "sync.session", next_line, insert, "line_operation_rejected");
            self.resync_to_projection(prev);
            return;
        }
        // Accepted: the document is about to restructure. The window is
        // stale until the collaborator installs the next context; the
        // translator answers with fallback positions in the meantime.
        tracing::debug!(target: "sync.session", next_line, insert, "line_operation_accepted");
        self.projection = None;
        self.context = None;
        self.last_reported = None;
        self.pending_selection = None;
    }

    /// Full-resync fallback: rewrite the native buffer verbatim from the
    /// last committed serialization, discarding the pending edit, and
    /// schedule the selection restore for the next tick.
    fn resync_to_projection(&mut self, restore: Option<SelectionSnapshot>) {
        let Some(text) = self.projection.as_ref().map(|p| p.text.clone()) else {
            return;
        };
        self.native.set_content(&text);
        self.mirror.set_content(&text);
        if let Some(sel) = restore {
            self.mirror.record_selection(sel);
            self.pending_selection = Some(sel);
        }
        tracing::trace!(
            target: "sync.session",
            chars = self.mirror.char_len(),
            "resynced_to_projection"
        );
    }

    /// Emit a settled, de-duplicated position change. Native selection
    /// notifications fire more often than logical position changes;
    /// coalescing compares the newly computed structured positions with
    /// the previously reported pair.
    fn report_position(&mut self, prev_start: Option<usize>) {
        let Some(projection) = self.projection.as_ref() else {
            return;
        };
        let Some(sel) = self.mirror.selection() else {
            return;
        };
        let backward = sel.backward();
        let direction = Direction::of_travel(sel.start(), prev_start);
        let start = projection.layout.to_structured(sel.start(), direction);
        let end = projection.layout.to_structured(sel.end(), direction);

        if self.coalesce
            && self
                .last_reported
                .as_ref()
                .is_some_and(|r| r.start == start && r.end == end && r.backward == backward)
        {
            tracing::trace!(target: "sync.session", "position_coalesced");
            return;
        }
        self.last_reported = Some(Reported {
            start: start.clone(),
            end: end.clone(),
            backward,
        });
        self.hooks.on_position_change(&start, &end, backward);
    }
}
