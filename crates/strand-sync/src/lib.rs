//! Diff & event synthesis: the capture session keeping one shared native
//! text control consistent with the structured multi-field document.
//!
//! The native platform exposes keyboard, IME, and clipboard handling only
//! through a single linear text-input control, and it reports no edit
//! description, just "content changed" and "selection changed". This
//! crate reconstructs what happened from the before/after string pair,
//! classifies it as a field edit or a structural line request, routes it to
//! the owning collaborator, and keeps every coordinate system honest along
//! the way.
//!
//! Module map (leaves first):
//! * [`native`] is the trait seam abstracting the platform text control.
//! * [`mirror`] is the Buffer Mirror, the cached last-known content and
//!   selection of the native control. The native widget is treated as a
//!   write-through cache over the mirror; native content is never
//!   interpreted without first comparing it here.
//! * [`diff`] locates the single contiguous changed region between the
//!   mirrored and current buffer strings, bounded by the previous/current
//!   selections.
//! * [`classify`] attributes the changed region to a single field or a
//!   structural boundary by walking the projected span layout.
//! * [`session`] ties it together: context projection, event dispatch,
//!   transactional rejection, resync, and the deferred cursor correction.
//!
//! Failure philosophy: nothing here retries and nothing is fatal. Any
//! notification that cannot be attributed to exactly one area degrades to
//! "discard this notification and resynchronize from the last committed
//! serialization".

pub mod classify;
pub mod diff;
pub mod mirror;
pub mod native;
pub mod session;

pub use classify::Classified;
pub use diff::TextChange;
pub use mirror::{BufferMirror, SelectionSnapshot};
pub use native::NativeTextControl;
pub use session::{CaptureSession, FieldTarget};
