// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_edit_buffer
//!
//! Storage core for a text editing engine. An [`EditBuffer`] is a mutable byte sequence
//! of unbounded length that supports random offset insertion, deletion, and in place
//! reads and writes, along with an undo log and pluggable [`BufferDataType`]s for
//! loading and saving content.
//!
//! ## Architecture
//!
//! ```text
//! BufferDataType::load ──► EditBuffer::insert ──► PageTable::insert_bytes ──► split / allocate
//!                              │
//!                              └──► add_log ──► log buffer (an EditBuffer of LogEntry records)
//! ```
//!
//! - [`Page`] is a contiguous run of bytes. Its storage is either uniquely owned, or a
//!   shared read only slice of a bigger backing store that is copied before its first
//!   mutation (copy-on-write).
//! - [`PageTable`] is the ordered sequence of pages that make up the logical byte array,
//!   plus a single entry position cache that makes local edits cheap.
//! - [`EditBuffer`] owns one [`PageTable`], the buffer flags, the modified indicator, and
//!   a lazily created log buffer holding serialized [`LogEntry`] records.
//! - [`DataTypeRegistry`] maps data type names to [`BufferDataType`] implementations.
//!   It is an explicit value owned by whoever composes buffers, not ambient global state.
//!
//! ## Example
//!
//! ```rust
//! use r3bl_edit_buffer::{BufferFlags, EditBuffer, byte_index, byte_len};
//!
//! let mut buffer = EditBuffer::new("scratch", BufferFlags::SAVE_LOG);
//! buffer.insert(byte_index(0), b"hello world")?;
//! buffer.delete(byte_index(5), byte_len(6))?;
//! assert_eq!(buffer.read(byte_index(0), byte_len(5))?, b"hello");
//!
//! // Bring back " world".
//! buffer.undo()?;
//! assert_eq!(buffer.contents(), b"hello world");
//! # Ok::<(), r3bl_edit_buffer::EditBufferError>(())
//! ```
//!
//! ## Threading
//!
//! Every operation is synchronous and assumes exclusive access to the buffer for the
//! duration of the call (`&mut self`). Independent buffers can be used from different
//! threads; shared page storage is reference counted and never written in place.

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod buffer;
pub mod core;
pub mod data_type;
pub mod pages;

// Re-export.
pub use buffer::*;
pub use core::*;
pub use data_type::*;
pub use pages::*;
