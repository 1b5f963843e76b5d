// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Public mutation and read API of [`EditBuffer`]. Every mutation validates its
//! arguments first, then records itself with [`EditBuffer::add_log`], and only then
//! changes the page table. A rejected call leaves the buffer, its log, and its modified
//! indicator untouched.

use std::sync::Arc;

use crate::{ByteIndex, ByteLength, EditBuffer, EditBufferResult, LineColumn, LogOp,
            byte_len};

impl EditBuffer {
    /// Insert `data` at `offset`.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    /// - [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn insert(&mut self, offset: impl Into<ByteIndex>, data: &[u8]) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_mutable()?;
        self.pages.check_offset(offset)?;
        if data.is_empty() {
            return Ok(());
        }
        self.add_log(LogOp::Insert, offset, byte_len(data.len()))?;
        self.pages.insert_bytes(offset, data)
    }

    /// Insert `data` at the end of the buffer.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn append(&mut self, data: &[u8]) -> EditBufferResult<()> {
        self.insert(self.total_size().end_index(), data)
    }

    /// Remove `[offset, offset + size)`. The removed bytes are kept in the undo log (if
    /// logging is on) so the deletion can be undone.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidRange`] unless `offset + size <= total_size`.
    /// - [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn delete(
        &mut self,
        offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<()> {
        let (offset, size) = (offset.into(), size.into());
        self.ensure_mutable()?;
        self.pages.check_range(offset, size)?;
        if size.is_zero() {
            return Ok(());
        }
        self.add_log(LogOp::Delete, offset, size)?;
        self.pages.delete_range(offset, size)
    }

    /// Overwrite `[offset, offset + data.len())` in place. The buffer never grows, see
    /// [`Self::write_extend`] for that.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    /// - [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn write(&mut self, offset: impl Into<ByteIndex>, data: &[u8]) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_mutable()?;
        self.pages.check_range(offset, byte_len(data.len()))?;
        if data.is_empty() {
            return Ok(());
        }
        self.add_log(LogOp::Write, offset, byte_len(data.len()))?;
        self.pages.write(offset, data)
    }

    /// Overwrite from `offset` onward, and insert whatever doesn't fit at the end of the
    /// buffer. Logged as a write followed by an insert.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    /// - [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn write_extend(
        &mut self,
        offset: impl Into<ByteIndex>,
        data: &[u8],
    ) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_mutable()?;
        self.pages.check_offset(offset)?;
        let overlap = (self.total_size().as_usize() - offset.as_usize()).min(data.len());
        let (head, tail) = data.split_at(overlap);
        self.write(offset, head)?;
        self.insert(offset + byte_len(overlap), tail)
    }

    /// Copy `[src_offset, src_offset + size)` of `src` into this buffer at
    /// `dest_offset`. Read only pages of `src` are shared rather than copied. Logged as
    /// an insert.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidOffset`] or
    ///   [`crate::EditBufferError::InvalidRange`] if either side is out of bounds.
    /// - [`crate::EditBufferError::BufferReadOnly`] if this buffer is read only.
    pub fn insert_buffer(
        &mut self,
        dest_offset: impl Into<ByteIndex>,
        src: &EditBuffer,
        src_offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<()> {
        let (dest_offset, src_offset, size) = (dest_offset.into(), src_offset.into(), size.into());
        self.ensure_mutable()?;
        self.pages.check_offset(dest_offset)?;
        src.pages.check_range(src_offset, size)?;
        if size.is_zero() {
            return Ok(());
        }
        self.add_log(LogOp::Insert, dest_offset, size)?;
        self.pages.insert_from(dest_offset, &src.pages, src_offset, size)
    }

    /// Insert `backing` at `offset` without copying it. The bytes stay shared (and read
    /// only) until a write or delete touches them. Logged as an insert.
    ///
    /// # Errors
    ///
    /// - [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    /// - [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn insert_shared(
        &mut self,
        offset: impl Into<ByteIndex>,
        backing: Arc<[u8]>,
    ) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_mutable()?;
        self.pages.check_offset(offset)?;
        if backing.is_empty() {
            return Ok(());
        }
        self.add_log(LogOp::Insert, offset, byte_len(backing.len()))?;
        self.pages.insert_shared(offset, backing)
    }

    /// Throw away the content and the undo log, eg: before a data type re-renders the
    /// buffer from its own model. Logging stays off afterwards.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn invalidate_raw_data(&mut self) -> EditBufferResult<()> {
        self.ensure_mutable()?;
        self.set_flag(crate::BufferFlags::SAVE_LOG, false);
        let total_size = self.total_size();
        self.delete(ByteIndex::default(), total_size)?;
        self.log_reset();
        Ok(())
    }

    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    pub fn read(
        &self,
        offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<Vec<u8>> {
        self.pages.read(offset, size)
    }

    /// Fill `out` with the bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    pub fn read_into(&self, offset: impl Into<ByteIndex>, out: &mut [u8]) -> EditBufferResult<()> {
        self.pages.read_into(offset, out)
    }

    #[must_use]
    pub fn contents(&self) -> Vec<u8> { self.pages.contents() }

    /// The whole buffer as text. Invalid UTF-8 is replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.pages.contents()).into_owned()
    }

    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn get_pos(&mut self, offset: impl Into<ByteIndex>) -> EditBufferResult<LineColumn> {
        self.pages.get_pos(offset)
    }

    pub fn goto_pos(&mut self, pos: LineColumn) -> ByteIndex { self.pages.goto_pos(pos) }

    /// Number of characters before `offset`, according to the buffer's charset.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn get_char_offset(&mut self, offset: impl Into<ByteIndex>) -> EditBufferResult<usize> {
        self.pages.get_char_offset(offset, self.charset.as_ref())
    }

    pub fn goto_char(&mut self, pos: usize) -> ByteIndex {
        self.pages.goto_char(pos, self.charset.as_ref())
    }
}

/// Lets `write!` append formatted text to the end of a buffer.
impl std::fmt::Write for EditBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.append(s.as_bytes()).map_err(|err| {
            tracing::warn!(
                message = "append of formatted text failed",
                buffer = %self.name,
                error = %err,
            );
            std::fmt::Error
        })
    }
}
