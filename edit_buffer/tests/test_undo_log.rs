// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use r3bl_edit_buffer::{BufferConfig, BufferFlags, EditBuffer, LogOp, UndoOutcome,
                       adjust_offset, byte_index, byte_len};

fn logged_buffer(nb_logs_max: usize) -> EditBuffer {
    let config = BufferConfig {
        max_page_size: 3,
        nb_logs_max,
        ..Default::default()
    };
    EditBuffer::new_with_config("undo", BufferFlags::SAVE_LOG, config).unwrap()
}

#[test]
fn test_undo_walks_back_to_the_start() {
    let mut buffer = logged_buffer(50);
    buffer.append(b"hello world").unwrap();
    buffer.delete(byte_index(5), byte_len(6)).unwrap();
    buffer.write(byte_index(0), b"J").unwrap();
    assert_eq!(buffer.contents(), b"Jello");

    let outcome = buffer.undo().unwrap();
    assert_eq!(
        outcome,
        Some(UndoOutcome {
            op: LogOp::Write,
            caret: byte_index(1),
        })
    );
    assert_eq!(buffer.contents(), b"hello");

    let outcome = buffer.undo().unwrap();
    assert_eq!(outcome.map(|it| it.caret), Some(byte_index(11)));
    assert_eq!(buffer.contents(), b"hello world");

    let outcome = buffer.undo().unwrap();
    assert_eq!(outcome.map(|it| it.op), Some(LogOp::Insert));
    assert_eq!(buffer.contents(), b"");
    assert!(!buffer.is_modified());

    assert_eq!(buffer.undo().unwrap(), None);
}

#[test]
fn test_log_is_bounded_and_drops_the_oldest() {
    let mut buffer = logged_buffer(4);
    for byte in b'a'..=b'j' {
        buffer.append(&[byte]).unwrap();
        assert!(buffer.nb_logs() <= 4);
    }

    let entries = buffer.log_entries().unwrap();
    assert_eq!(buffer.nb_logs(), 4);
    let offsets: Vec<usize> = entries.iter().map(|it| it.offset.as_usize()).collect();
    assert_eq!(offsets, vec![6, 7, 8, 9]);
    assert!(entries.iter().all(|it| it.op == LogOp::Insert));

    // Every undo is logged too, and pushes one more of the old records out.
    assert!(buffer.undo().unwrap().is_some());
    assert!(buffer.undo().unwrap().is_some());
    assert_eq!(buffer.contents(), b"abcdefgh");
    assert_eq!(buffer.nb_logs(), 4);
    assert_eq!(buffer.undo().unwrap(), None);
}

#[test]
fn test_buffers_without_save_log_keep_no_log() {
    let mut buffer = EditBuffer::new("plain", BufferFlags::empty());
    buffer.append(b"text").unwrap();
    buffer.delete(byte_index(0), byte_len(2)).unwrap();
    assert_eq!(buffer.nb_logs(), 0);
    assert!(buffer.log_buffer().is_none());
    assert_eq!(buffer.undo().unwrap(), None);
    assert!(buffer.is_modified());
}

#[test]
fn test_log_buffer_is_a_system_buffer() {
    let mut buffer = logged_buffer(50);
    buffer.append(b"x").unwrap();
    let log = buffer.log_buffer().unwrap();
    assert!(log.flags().contains(BufferFlags::SYSTEM));
    assert!(!log.flags().contains(BufferFlags::SAVE_LOG));
    assert!(log.log_buffer().is_none());
}

#[test]
fn test_callbacks_keep_a_mark_in_place_through_undo() {
    let mut buffer = logged_buffer(50);
    buffer.append(b"0123456789").unwrap();

    let mark = Arc::new(Mutex::new(byte_index(7)));
    let mark_clone = Arc::clone(&mark);
    let id = buffer.add_callback(move |modification| {
        let mut mark = mark_clone.lock().unwrap();
        *mark = adjust_offset(*mark, modification);
    });

    buffer.insert(byte_index(2), b"abc").unwrap();
    assert_eq!(*mark.lock().unwrap(), byte_index(10));
    buffer.delete(byte_index(0), byte_len(4)).unwrap();
    assert_eq!(*mark.lock().unwrap(), byte_index(6));

    buffer.undo().unwrap();
    buffer.undo().unwrap();
    assert_eq!(buffer.contents(), b"0123456789");
    assert_eq!(*mark.lock().unwrap(), byte_index(7));

    assert!(buffer.remove_callback(id));
    buffer.insert(byte_index(0), b"zz").unwrap();
    assert_eq!(*mark.lock().unwrap(), byte_index(7));
}
