//! End-to-end capture flow: project a window, simulate native edits and
//! selection moves, and check the synthesized events and positions.

mod common;

use common::{CANONICAL_TEXT, HookCall, RecordingHooks, SharedNative, canonical_context};
use pretty_assertions::assert_eq;
use strand_sync::CaptureSession;
use strand_window::Band;

fn session_with_log() -> (
    CaptureSession<RecordingHooks>,
    SharedNative,
    std::rc::Rc<std::cell::RefCell<Vec<HookCall>>>,
) {
    let native = SharedNative::new();
    let hooks = RecordingHooks::new();
    let log = hooks.log();
    let session = CaptureSession::with_defaults(Box::new(native.clone()), hooks);
    (session, native, log)
}

#[test]
fn context_projects_into_native_control() {
    let (mut session, native, _log) = session_with_log();
    let (ctx, _field) = canonical_context();
    session.set_context(ctx);
    assert_eq!(native.content(), CANONICAL_TEXT);
    assert!(session.has_context());
}

#[test]
fn single_char_insert_becomes_field_edit() {
    let (mut session, native, log) = session_with_log();
    let (ctx, field) = canonical_context();
    session.set_context(ctx);

    // User types 'x' between 'a' and 'b' (field spans 10..12).
    native.type_chars(11, 0, "x");
    session.handle_native_update();

    assert_eq!(field.value(), "axb");
    assert_eq!(native.content(), "\n   \n     axb\n   \n");
    assert_eq!(
        *log.borrow(),
        vec![
            HookCall::Input {
                added: "x".into(),
                removed: String::new(),
                new_content: "axb".into(),
            },
            HookCall::AfterInput {
                new_content: "axb".into(),
            },
            HookCall::Position {
                band: Band::Same,
                field_index: 0,
                offset: 2,
                end_offset: 2,
                backward: false,
            },
        ]
    );

    // The corrected caret is applied one tick later, after the inserted
    // character: field-relative 2, flat offset 12.
    assert!(session.has_deferred());
    session.flush_deferred();
    assert_eq!(native.selection(), (12, 12));
    // Same structured position as already reported; nothing new fires.
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn single_char_delete_becomes_field_edit() {
    let (mut session, native, log) = session_with_log();
    let (ctx, field) = canonical_context();
    session.set_context(ctx);

    // Backspace over 'b' at the end of the field.
    native.type_chars(11, 1, "");
    session.handle_native_update();

    assert_eq!(field.value(), "a");
    assert_eq!(native.content(), "\n   \n     a\n   \n");
    let calls = log.borrow();
    assert_eq!(
        calls[0],
        HookCall::Input {
            added: String::new(),
            removed: "b".into(),
            new_content: "a".into(),
        }
    );
    assert_eq!(
        calls[1],
        HookCall::AfterInput {
            new_content: "a".into(),
        }
    );
}

#[test]
fn selection_only_notification_reports_position() {
    let (mut session, native, log) = session_with_log();
    let (ctx, _field) = canonical_context();
    session.set_context(ctx);

    native.move_caret(10);
    session.handle_native_update();
    assert_eq!(
        *log.borrow(),
        vec![HookCall::Position {
            band: Band::Same,
            field_index: 0,
            offset: 0,
            end_offset: 0,
            backward: false,
        }]
    );

    // Same caret again: the native control re-notifies, the structured
    // position has not changed, nothing fires.
    native.move_caret(10);
    session.handle_native_update();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn backward_selection_reports_ordered_span() {
    let (mut session, native, log) = session_with_log();
    let (ctx, _field) = canonical_context();
    session.set_context(ctx);

    // Anchor after 'b', head before 'a': shift+left twice.
    native.select(12, 10);
    session.handle_native_update();
    assert_eq!(
        *log.borrow(),
        vec![HookCall::Position {
            band: Band::Same,
            field_index: 0,
            offset: 0,
            end_offset: 2,
            backward: true,
        }]
    );
}

#[test]
fn caret_in_dead_space_snaps_to_nearest_field() {
    let (mut session, native, log) = session_with_log();
    let (ctx, _field) = canonical_context();
    session.set_context(ctx);

    // Offset 8 sits inside the current line's leading gap; the only
    // field ahead starts at 10.
    native.move_caret(8);
    session.handle_native_update();
    assert_eq!(
        *log.borrow(),
        vec![HookCall::Position {
            band: Band::Same,
            field_index: 0,
            offset: 0,
            end_offset: 0,
            backward: false,
        }]
    );
}

#[test]
fn collaborator_positions_caret_by_index_and_handle() {
    let (mut session, native, log) = session_with_log();
    let (ctx, field) = canonical_context();
    session.set_context(ctx);

    assert!(session.set_position_on_current_line(0, 1));
    assert_eq!(native.selection(), (11, 11));
    assert_eq!(
        *log.borrow(),
        vec![HookCall::Position {
            band: Band::Same,
            field_index: 0,
            offset: 1,
            end_offset: 1,
            backward: false,
        }]
    );

    assert!(session.set_position_on_current_line(&field, 2));
    assert_eq!(native.selection(), (12, 12));

    // Unknown index resolves to nothing and reports nothing.
    let before = log.borrow().len();
    assert!(!session.set_position_on_current_line(7, 0));
    assert_eq!(log.borrow().len(), before);
}

#[test]
fn collaborator_selects_range_on_current_line() {
    let (mut session, native, _log) = session_with_log();
    let (ctx, _field) = canonical_context();
    session.set_context(ctx);

    assert!(session.set_selection_on_current_line((0, 0), (0, 2)));
    assert_eq!(native.selection(), (10, 12));
}

#[test]
fn focus_and_unfocus_reach_hooks() {
    let (mut session, _native, log) = session_with_log();
    session.handle_focus();
    session.handle_unfocus();
    assert_eq!(*log.borrow(), vec![HookCall::Focus, HookCall::Unfocus]);
}
