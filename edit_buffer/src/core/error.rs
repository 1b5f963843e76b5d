// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Errors returned by [`crate::PageTable`], [`crate::EditBuffer`] and the
//! [`crate::BufferDataType`] implementations.
//!
//! | Variant                | Cause                                                | Recoverable? |
//! | :--------------------- | :--------------------------------------------------- | :----------- |
//! | [`InvalidOffset`]      | Caller passed an offset outside the buffer           | Yes          |
//! | [`InvalidRange`]       | Caller passed a range that runs past the end         | Yes          |
//! | [`BufferReadOnly`]     | Mutation of a buffer flagged `READ_ONLY`             | Yes          |
//! | [`IoInProgress`]       | Load or save of a buffer that is `LOADING`/`SAVING`  | Yes          |
//! | [`InconsistentState`]  | Page sizes no longer add up to the total size        | No           |
//! | [`Io`]                 | Load or save failed, partial content stays in place  | Maybe        |
//!
//! [`InvalidOffset`]: EditBufferError::InvalidOffset
//! [`InvalidRange`]: EditBufferError::InvalidRange
//! [`BufferReadOnly`]: EditBufferError::BufferReadOnly
//! [`IoInProgress`]: EditBufferError::IoInProgress
//! [`InconsistentState`]: EditBufferError::InconsistentState
//! [`Io`]: EditBufferError::Io

use crate::{ByteIndex, ByteLength};

pub type EditBufferResult<T> = Result<T, EditBufferError>;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EditBufferError {
    #[error("Offset {offset} is outside of the buffer (total size {total_size})")]
    #[diagnostic(
        code(r3bl_edit_buffer::invalid_offset),
        help("Offsets must satisfy 0 <= offset <= total_size")
    )]
    InvalidOffset {
        offset: ByteIndex,
        total_size: ByteLength,
    },

    #[error(
        "Range of {size} bytes at offset {offset} runs past the end of the buffer \
         (total size {total_size})"
    )]
    #[diagnostic(
        code(r3bl_edit_buffer::invalid_range),
        help("Ranges must satisfy offset + size <= total_size")
    )]
    InvalidRange {
        offset: ByteIndex,
        size: ByteLength,
        total_size: ByteLength,
    },

    #[error("Buffer '{name}' is read only")]
    #[diagnostic(
        code(r3bl_edit_buffer::read_only),
        help("Clear the READ_ONLY flag before mutating this buffer")
    )]
    BufferReadOnly { name: String },

    /// The sum of the page sizes does not match the recorded total size. The buffer
    /// refuses any further mutation once this has been detected.
    #[error(
        "Buffer '{name}' is inconsistent: total size is {expected} but pages hold \
         {actual} bytes"
    )]
    #[diagnostic(
        code(r3bl_edit_buffer::inconsistent_state),
        help("This is a bookkeeping bug. Discard the buffer and reload its content")
    )]
    InconsistentState {
        name: String,
        expected: ByteLength,
        actual: ByteLength,
    },

    #[error("Buffer '{name}' is already being loaded or saved")]
    #[diagnostic(
        code(r3bl_edit_buffer::io_in_progress),
        help("Wait for the current load or save to finish")
    )]
    IoInProgress { name: String },

    #[error("Undo log record at log offset {index} can't be decoded")]
    #[diagnostic(code(r3bl_edit_buffer::corrupt_log))]
    CorruptLog { index: ByteIndex },

    #[error("No buffer data type named '{name}' is registered")]
    #[diagnostic(
        code(r3bl_edit_buffer::unknown_data_type),
        help("Register the data type with DataTypeRegistry::register first")
    )]
    UnknownDataType { name: String },

    #[error("Buffer '{name}' has no file name to save to")]
    #[diagnostic(code(r3bl_edit_buffer::no_file_name))]
    NoFileName { name: String },

    #[error("Invalid buffer config: {reason}")]
    #[diagnostic(code(r3bl_edit_buffer::invalid_config))]
    InvalidConfig { reason: String },

    #[error("I/O failure while trying to {context}")]
    #[diagnostic(code(r3bl_edit_buffer::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EditBufferError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
