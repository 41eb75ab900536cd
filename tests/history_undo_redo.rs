use std::sync::Arc;

use rasterview::error::Error;
use rasterview::history::{DEFAULT_NAME, HistoryStack};
use rasterview::raster::RasterBuffer;

fn snapshot(tag: u8) -> Arc<RasterBuffer> {
    Arc::new(RasterBuffer::new(1, 1, vec![tag, tag, tag, 255]).unwrap())
}

fn tag_of(stack: &HistoryStack) -> u8 {
    stack.current().unwrap().pixels()[0]
}

#[test]
fn undo_then_edit_discards_the_redo_branch() {
    let mut stack = HistoryStack::new();
    stack.load(snapshot(b'A'), Some("a.png".to_owned()));
    stack.push(snapshot(b'B'));
    stack.push(snapshot(b'C'));
    assert_eq!((stack.len(), stack.cursor()), (3, 2));

    assert!(stack.backward());
    assert_eq!(stack.cursor(), 1);

    stack.push(snapshot(b'D'));
    // entries are now [A, B, D]; C is gone for good
    assert_eq!((stack.len(), stack.cursor()), (3, 2));
    assert_eq!(tag_of(&stack), b'D');

    assert!(stack.backward());
    assert_eq!(tag_of(&stack), b'B');
    assert!(stack.forward());
    assert_eq!(tag_of(&stack), b'D');
    assert!(!stack.forward());
}

#[test]
fn cursor_moves_are_noops_at_the_boundaries() {
    let mut stack = HistoryStack::new();

    // nothing loaded yet
    assert!(!stack.forward());
    assert!(!stack.backward());

    stack.load(snapshot(1), None);
    assert!(!stack.backward(), "backward at cursor 0 must not move");
    assert!(!stack.forward(), "forward at the tail must not move");
    assert_eq!(stack.cursor(), 0);

    stack.push(snapshot(2));
    assert!(stack.backward());
    assert!(!stack.backward());
    assert_eq!(stack.cursor(), 0);
    assert_eq!(tag_of(&stack), 1);
}

#[test]
fn current_fails_only_before_the_first_load() {
    let mut stack = HistoryStack::new();
    assert!(matches!(stack.current(), Err(Error::EmptyHistory)));

    stack.load(snapshot(9), None);
    assert!(stack.current().is_ok());

    stack.clear();
    assert!(matches!(stack.current(), Err(Error::EmptyHistory)));
}

#[test]
fn loading_resets_name_and_branch_state() {
    let mut stack = HistoryStack::new();
    stack.load(snapshot(1), Some("first.png".to_owned()));
    stack.push(snapshot(2));
    stack.push(snapshot(3));
    stack.backward();

    stack.load(snapshot(7), None);
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.cursor(), 0);
    assert_eq!(stack.name(), Some(DEFAULT_NAME));
    assert!(!stack.can_undo());
    assert!(!stack.can_redo());
}

#[test]
fn undo_redo_flags_track_the_cursor() {
    let mut stack = HistoryStack::new();
    stack.load(snapshot(1), None);
    stack.push(snapshot(2));

    assert!(stack.can_undo());
    assert!(!stack.can_redo());

    stack.backward();
    assert!(!stack.can_undo());
    assert!(stack.can_redo());
}
