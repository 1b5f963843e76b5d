// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end scenarios through the public [`EditBuffer`] API.

use std::{io::Cursor, sync::Arc};

use pretty_assertions::assert_eq;
use r3bl_edit_buffer::{BufferConfig, BufferDataType, BufferFlags, EditBuffer, RawDataType,
                       byte_index, byte_len};
use test_case::test_case;

fn empty_buffer() -> EditBuffer { EditBuffer::new("scenario", BufferFlags::empty()) }

fn small_pages(max_page_size: usize) -> EditBuffer {
    let config = BufferConfig {
        max_page_size,
        ..Default::default()
    };
    EditBuffer::new_with_config("small pages", BufferFlags::SAVE_LOG, config).unwrap()
}

#[test]
fn test_insert_into_empty_buffer() {
    let mut buffer = empty_buffer();
    buffer.insert(byte_index(0), b"hello").unwrap();
    assert_eq!(buffer.total_size(), byte_len(5));
    assert_eq!(buffer.read(byte_index(0), byte_len(5)).unwrap(), b"hello");
}

#[test]
fn test_insert_at_end() {
    let mut buffer = empty_buffer();
    buffer.insert(byte_index(0), b"hello").unwrap();
    buffer.insert(byte_index(5), b" world").unwrap();
    assert_eq!(buffer.read(byte_index(0), byte_len(11)).unwrap(), b"hello world");
}

#[test]
fn test_delete_tail() {
    let mut buffer = empty_buffer();
    buffer.insert(byte_index(0), b"hello world").unwrap();
    buffer.delete(byte_index(5), byte_len(6)).unwrap();
    assert_eq!(buffer.read(byte_index(0), byte_len(5)).unwrap(), b"hello");
    assert_eq!(buffer.total_size(), byte_len(5));
}

#[test_case(4096; "one page")]
#[test_case(1; "one byte pages")]
#[test_case(2; "two byte pages")]
fn test_insert_inside_page(max_page_size: usize) {
    let mut buffer = small_pages(max_page_size);
    buffer.insert(byte_index(0), b"abc").unwrap();
    buffer.insert(byte_index(1), b"XY").unwrap();
    assert_eq!(buffer.read(byte_index(0), byte_len(5)).unwrap(), b"aXYbc");
}

#[test]
fn test_load_one_megabyte_stream() {
    let source: Vec<u8> = (0..1024 * 1024).map(|it: usize| (it * 31 % 251) as u8).collect();
    let mut buffer = empty_buffer();
    assert_eq!(buffer.config().io_chunk_size, 32 * 1024);

    RawDataType
        .load(&mut buffer, &mut Cursor::new(source.clone()))
        .unwrap();

    assert_eq!(buffer.total_size(), byte_len(1_048_576));
    assert_eq!(buffer.contents(), source);
    let max_page_size = buffer.config().max_page_size;
    assert!(buffer.page_table().pages().iter().all(|it| it.size() <= max_page_size));
}

#[test]
fn test_length_follows_every_mutation() {
    let mut buffer = small_pages(3);
    let mut expected_size = 0;
    for (offset, data) in [(0, &b"0123456789"[..]), (4, b"abc"), (13, b"!"), (0, b"")] {
        buffer.insert(byte_index(offset), data).unwrap();
        expected_size += data.len();
        assert_eq!(buffer.total_size(), byte_len(expected_size));
    }
    for (offset, size) in [(2, 5), (0, 1), (6, 2)] {
        buffer.delete(byte_index(offset), byte_len(size)).unwrap();
        expected_size -= size;
        assert_eq!(buffer.total_size(), byte_len(expected_size));
    }
}

#[test]
fn test_whole_page_deletes_keep_neighbors() {
    let mut buffer = small_pages(4);
    buffer.insert(byte_index(0), b"aaaabbbbccccdddd").unwrap();
    assert_eq!(buffer.page_table().nb_pages(), 4);

    buffer.delete(byte_index(4), byte_len(8)).unwrap();

    assert_eq!(buffer.contents(), b"aaaadddd");
    assert_eq!(buffer.page_table().nb_pages(), 2);
    assert_eq!(buffer.page_table().pages()[0].data(), b"aaaa");
    assert_eq!(buffer.page_table().pages()[1].data(), b"dddd");
}

#[test]
fn test_buffers_sharing_a_source_are_isolated() {
    let backing: Arc<[u8]> = Arc::from(&b"one two three"[..]);
    let mut left = small_pages(4);
    let mut right = small_pages(4);
    left.insert_shared(byte_index(0), Arc::clone(&backing)).unwrap();
    right.insert_buffer(byte_index(0), &left, byte_index(0), byte_len(13)).unwrap();
    assert!(right.page_table().pages().iter().all(|it| it.is_read_only()));

    left.write(byte_index(4), b"TWO").unwrap();
    right.delete(byte_index(0), byte_len(4)).unwrap();

    assert_eq!(left.contents(), b"one TWO three");
    assert_eq!(right.contents(), b"two three");
    assert_eq!(&backing[..], b"one two three");
}

#[test]
fn test_read_only_buffer_reports_errors() {
    let mut buffer = empty_buffer();
    buffer.append(b"frozen").unwrap();
    buffer.set_flag(BufferFlags::READ_ONLY, true);
    assert!(buffer.insert(byte_index(0), b"x").is_err());
    assert!(buffer.delete(byte_index(0), byte_len(1)).is_err());
    assert_eq!(buffer.contents(), b"frozen");
}
