// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Binary layout of the records stored in a log buffer.
//!
//! ```text
//! ┌──────────────────── header (18 bytes) ────────────────────┐
//! │ op: u8 │ was_modified: u8 │ offset: u64 LE │ size: u64 LE │ payload │ payload_len: u64 LE │
//! └───────────────────────────────────────────────────────────┘ (0 or size) └─── trailer ──────┘
//! ```
//!
//! The payload holds the bytes that a [`LogOp::Delete`] removed, or that a
//! [`LogOp::Write`] overwrote. The trailer repeats the payload length so the log can be
//! walked backwards, newest record first.

use strum_macros::{Display, EnumIter, FromRepr};

use crate::{ByteIndex, ByteLength, EditBufferError, EditBufferResult, byte_index,
            byte_len};

pub const LOG_HEADER_SIZE: usize = 18;
pub const LOG_TRAILER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum LogOp {
    /// Zeroed storage. Never written, so finding one means the log is corrupt.
    Free = 0,
    Write = 1,
    Insert = 2,
    Delete = 3,
}

/// Header of one undo log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub op: LogOp,
    /// The buffer's modified indicator right before this mutation.
    pub was_modified: bool,
    pub offset: ByteIndex,
    pub size: ByteLength,
}

impl LogEntry {
    /// Number of payload bytes that follow the header.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        match self.op {
            LogOp::Delete | LogOp::Write => self.size.as_usize(),
            LogOp::Insert | LogOp::Free => 0,
        }
    }

    /// Header, payload, and trailer.
    #[must_use]
    pub fn record_len(&self) -> usize {
        LOG_HEADER_SIZE + self.payload_len() + LOG_TRAILER_SIZE
    }

    #[must_use]
    pub fn encode_header(&self) -> [u8; LOG_HEADER_SIZE] {
        let mut acc = [0_u8; LOG_HEADER_SIZE];
        acc[0] = self.op as u8;
        acc[1] = u8::from(self.was_modified);
        acc[2..10].copy_from_slice(&(self.offset.as_usize() as u64).to_le_bytes());
        acc[10..18].copy_from_slice(&(self.size.as_usize() as u64).to_le_bytes());
        acc
    }

    /// `index` is the position of `bytes` inside the log buffer, used for errors.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::CorruptLog`] if `bytes` is not a valid header.
    pub fn decode_header(bytes: &[u8], index: ByteIndex) -> EditBufferResult<Self> {
        let corrupt = || EditBufferError::CorruptLog { index };
        if bytes.len() != LOG_HEADER_SIZE {
            return Err(corrupt());
        }

        let op = LogOp::from_repr(bytes[0])
            .filter(|op| *op != LogOp::Free)
            .ok_or_else(corrupt)?;
        let was_modified = match bytes[1] {
            0 => false,
            1 => true,
            _ => return Err(corrupt()),
        };
        let offset = decode_u64(&bytes[2..10], index)?;
        let size = decode_u64(&bytes[10..18], index)?;

        Ok(Self {
            op,
            was_modified,
            offset: byte_index(offset),
            size: byte_len(size),
        })
    }
}

#[must_use]
pub fn encode_trailer(payload_len: usize) -> [u8; LOG_TRAILER_SIZE] {
    (payload_len as u64).to_le_bytes()
}

/// # Errors
///
/// [`EditBufferError::CorruptLog`] if `bytes` is not a valid trailer.
pub fn decode_trailer(bytes: &[u8], index: ByteIndex) -> EditBufferResult<usize> {
    decode_u64(bytes, index)
}

fn decode_u64(bytes: &[u8], index: ByteIndex) -> EditBufferResult<usize> {
    let corrupt = || EditBufferError::CorruptLog { index };
    let array: [u8; 8] = bytes.try_into().map_err(|_| corrupt())?;
    usize::try_from(u64::from_le_bytes(array)).map_err(|_| corrupt())
}
