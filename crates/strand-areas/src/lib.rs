//! Structured line model: fields, gaps, area sequences, and the three-line
//! context window.
//!
//! A line of a flow program is a sequence of *areas*: editable [`Field`]s
//! interleaved with fixed-width immutable [`Gap`]s. The sync engine never
//! holds a reference into document structure beyond the three lines
//! currently surrounding the cursor; those arrive bundled as a [`Context`]
//! and are replaced wholesale whenever the structured cursor crosses a line
//! boundary.
//!
//! Core invariants:
//! * A field value never contains a line terminator (enforced by the
//!   default validation predicate at edit time, not by `set_value`; the
//!   document collaborator owns its own content and may install a custom
//!   predicate).
//! * A field's index is its position among the *fields* of its line, not
//!   among its areas; gaps do not shift field indices as long as the area
//!   sequence itself is unchanged.
//! * All widths are measured in characters, never bytes. Native text
//!   controls report character offsets, and every coordinate this engine
//!   exchanges with them must agree on the unit.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Terminator character separating serialized lines in the shared buffer.
pub const LINE_TERMINATOR: char = '\n';

type ValidateFn = dyn Fn(&str) -> bool;

struct FieldInner {
    name: String,
    value: String,
    validate: Option<Box<ValidateFn>>,
}

/// Cheaply cloneable handle over a named, mutable, single-line string slot.
///
/// The engine is single-threaded (one capture session, one native control),
/// so the handle is `Rc<RefCell<_>>`; identity is handle identity. Cloning
/// a `Field` clones the handle, never the slot.
#[derive(Clone)]
pub struct Field(Rc<RefCell<FieldInner>>);

impl Field {
    /// Create a field with the default validation predicate, which refuses
    /// any proposed value containing a line terminator.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(FieldInner {
            name: name.into(),
            value: value.into(),
            validate: None,
        })))
    }

    /// Create a field with a custom validation predicate. The predicate is
    /// consulted with the full proposed value before an edit commits; a
    /// `false` answer vetoes the edit.
    pub fn with_validator(
        name: impl Into<String>,
        value: impl Into<String>,
        validate: impl Fn(&str) -> bool + 'static,
    ) -> Self {
        Self(Rc::new(RefCell::new(FieldInner {
            name: name.into(),
            value: value.into(),
            validate: Some(Box::new(validate)),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    /// Width of the current value in characters.
    pub fn char_len(&self) -> usize {
        self.0.borrow().value.chars().count()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        tracing::trace!(
            target: "areas.field",
            name = %self.0.borrow().name,
            chars = value.chars().count(),
            "set_value"
        );
        self.0.borrow_mut().value = value;
    }

    /// Whether this field accepts `proposed` as its full new value. Falls
    /// back to the single-line rule when no custom predicate is installed.
    pub fn validate(&self, proposed: &str) -> bool {
        match &self.0.borrow().validate {
            Some(f) => f(proposed),
            None => !proposed.contains(LINE_TERMINATOR),
        }
    }

    /// Handle identity: two `Field`s are the same slot, not equal content.
    pub fn same_field(&self, other: &Field) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.same_field(other)
    }
}

impl fmt::Debug for Field {
    // Field values carry user narrative text; log only the name and length.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Field")
            .field("name", &inner.name)
            .field("chars", &inner.value.chars().count())
            .finish()
    }
}

/// Fixed-width immutable filler shown inline between fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub width: usize,
}

impl Gap {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

/// The atomic unit of a line's projection into the shared buffer.
#[derive(Debug, Clone)]
pub enum Area {
    Field(Field),
    Gap(Gap),
}

impl Area {
    /// Characters this area occupies in the serialized buffer.
    pub fn width_chars(&self) -> usize {
        match self {
            Area::Field(f) => f.char_len(),
            Area::Gap(g) => g.width,
        }
    }
}

/// One line's alternating areas. Lines hold a handful of areas, so storage
/// is a `SmallVec` to keep the common case allocation-free.
#[derive(Debug, Clone, Default)]
pub struct AreaSequence {
    areas: SmallVec<[Area; 8]>,
}

impl AreaSequence {
    pub fn new(areas: impl IntoIterator<Item = Area>) -> Self {
        Self {
            areas: areas.into_iter().collect(),
        }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Fields of this line with their stable indices (gaps skipped).
    pub fn fields(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.areas
            .iter()
            .filter_map(|a| match a {
                Area::Field(f) => Some(f),
                Area::Gap(_) => None,
            })
            .enumerate()
    }

    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields().nth(index).map(|(_, f)| f)
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Total serialized width of the line's areas in characters.
    pub fn width_chars(&self) -> usize {
        self.areas.iter().map(Area::width_chars).sum()
    }
}

/// The collaborator-supplied triple of area sequences surrounding the
/// structured cursor. At most one context is live per capture session;
/// installing a new one invalidates every previously computed offset.
#[derive(Debug, Clone)]
pub struct Context {
    pub above: AreaSequence,
    pub current: AreaSequence,
    pub below: AreaSequence,
}

impl Context {
    pub fn new(above: AreaSequence, current: AreaSequence, below: AreaSequence) -> Self {
        Self {
            above,
            current,
            below,
        }
    }
}
