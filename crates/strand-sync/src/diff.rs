//! Locating the single edited region between two buffer strings.
//!
//! The platform reports no edit description, so the change is
//! reconstructed from the before/after pair: longest common prefix, then
//! longest common suffix, both bounded by the previous and current
//! selections (known unedited boundary points) and bounded once more so
//! the matched regions never overlap. What remains in the middle is the
//! removed/added text.
//!
//! This relies on the single-edit invariant: at most one contiguous region
//! changed since the last resync. That holds because the session resyncs
//! after every processed change and native input delivers one logical
//! operation per notification. The selection bounds are a heuristic, not a
//! proof: under rapid programmatic content replacement (not keystrokes)
//! they can misattribute the edited region. Callers treat the result as an
//! approximation and fall back to a full resync whenever classification
//! cannot attribute it to a single area.

use crate::mirror::SelectionSnapshot;

/// One contiguous change, in char offsets of the *old* string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub start: usize,
    pub removed: String,
    pub added: String,
}

/// Compare the mirrored (`old`) and current (`new`) buffer strings.
/// Returns `None` when nothing differs inside the permitted bounds.
///
/// `prev` is the selection recorded before the edit (absent right after a
/// context switch); `cur` is the selection reported with the notification.
pub fn locate_change(
    old: &str,
    new: &str,
    prev: Option<SelectionSnapshot>,
    cur: SelectionSnapshot,
) -> Option<TextChange> {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();

    // Nothing before the earlier selection start changed. Clamp
    // defensively: native selections can momentarily exceed the mirrored
    // content during programmatic writes.
    let prefix_cap = prev
        .map_or(cur.start(), |p| p.start().min(cur.start()))
        .min(old.len())
        .min(new.len());
    let mut i = 0;
    while i < prefix_cap && old[i] == new[i] {
        i += 1;
    }

    // Nothing after the previous selection end (old side) or the current
    // selection end (new side) changed; never let the suffix overlap the
    // matched prefix.
    let old_tail = prev.map_or(old.len(), |p| old.len().saturating_sub(p.end()));
    let new_tail = new.len().saturating_sub(cur.end().min(new.len()));
    let suffix_cap = old_tail
        .min(new_tail)
        .min(old.len() - i)
        .min(new.len() - i);
    let mut j = 0;
    while j < suffix_cap && old[old.len() - 1 - j] == new[new.len() - 1 - j] {
        j += 1;
    }

    let removed: String = old[i..old.len() - j].iter().collect();
    let added: String = new[i..new.len() - j].iter().collect();
    if removed.is_empty() && added.is_empty() {
        return None;
    }
    tracing::trace!(
        target: "sync.diff",
        start = i,
        removed_chars = removed.chars().count(),
        added_chars = added.chars().count(),
        "change_located"
    );
    Some(TextChange {
        start: i,
        removed,
        added,
    })
}

/// Replace `removed` chars at char offset `at` of `value` with `added`.
pub(crate) fn splice_chars(value: &str, at: usize, removed: usize, added: &str) -> String {
    let mut out = String::with_capacity(value.len() + added.len());
    let mut rest = value.chars();
    out.extend(rest.by_ref().take(at));
    out.push_str(added);
    out.extend(rest.skip(removed));
    out
}
