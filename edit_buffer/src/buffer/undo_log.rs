// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Undo log of an [`EditBuffer`].
//!
//! The log is itself an [`EditBuffer`] (flagged `SYSTEM`, never logged) holding a
//! sequence of records in the layout described in [`crate::log_entry`]. Using a buffer
//! gives the log the same paged storage as the content, and lets deleted bytes be
//! captured without a copy when they live in shared pages.
//!
//! The log is bounded to [`crate::BufferConfig::nb_logs_max`] records. Once full, the
//! oldest record is evicted from the front before a new one is appended.
//!
//! Undo walks the records from newest to oldest. Consecutive undos keep walking back;
//! any other mutation restarts the walk from the newest record. Because inverting a
//! record is itself a logged mutation, undoing past a break in the chain undoes the
//! undos.

use crate::{BufferConfig, BufferFlags, ByteIndex, ByteLength, EditBuffer,
            EditBufferError, EditBufferResult, LOG_HEADER_SIZE, LOG_TRAILER_SIZE,
            LogEntry, LogOp, Modification, byte_index, byte_len, decode_trailer,
            encode_trailer};

/// Result of a successful [`EditBuffer::undo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoOutcome {
    /// The op of the record that was inverted.
    pub op: LogOp,
    /// Where a caret should go after the undo: the start of a removed insertion, or the
    /// end of restored bytes.
    pub caret: ByteIndex,
}

impl EditBuffer {
    /// Record a mutation that is about to happen. Callbacks are notified and the
    /// modified indicator is set whether or not the record is kept. The record is kept
    /// only if `SAVE_LOG` is set and `LOADING` isn't. For [`LogOp::Delete`] and
    /// [`LogOp::Write`], the bytes in `[offset, offset + size)` are captured as the
    /// payload, so the range must be valid.
    pub(crate) fn add_log(
        &mut self,
        op: LogOp,
        offset: ByteIndex,
        size: ByteLength,
    ) -> EditBufferResult<()> {
        self.callbacks.notify(&Modification { op, offset, size });

        let was_modified = self.modified;
        self.modified = true;
        if !self.undo_in_progress {
            self.undo_cursor = None;
        }

        if !self.flags.contains(BufferFlags::SAVE_LOG)
            || self.flags.contains(BufferFlags::LOADING)
        {
            return Ok(());
        }

        let log = self.log_buffer.get_or_insert_with(|| {
            tracing::debug!(message = "create log buffer", buffer = %self.name);
            Box::new(EditBuffer::new_log_buffer(&self.name, &self.config))
        });

        while self.nb_logs >= self.config.nb_logs_max && self.nb_logs > 0 {
            evict_oldest(log, &mut self.undo_cursor)?;
            self.nb_logs -= 1;
        }

        let entry = LogEntry {
            op,
            was_modified,
            offset,
            size,
        };
        let payload_len = entry.payload_len();

        log.pages
            .insert_bytes(log.pages.total_size().end_index(), &entry.encode_header())?;
        if payload_len > 0 {
            let end = log.pages.total_size().end_index();
            log.pages.insert_from(end, &self.pages, offset, size)?;
        }
        log.pages
            .insert_bytes(log.pages.total_size().end_index(), &encode_trailer(payload_len))?;
        self.nb_logs += 1;

        tracing::trace!(
            message = "add log",
            buffer = %self.name,
            op = %op,
            offset = %offset,
            size = %size,
            nb_logs = self.nb_logs,
        );

        Ok(())
    }

    fn new_log_buffer(name: &str, config: &BufferConfig) -> EditBuffer {
        Self::with_valid_config(
            format!("*log <{name}>*"),
            BufferFlags::SYSTEM,
            config.clone(),
        )
    }

    /// Invert the next record of the undo log (see the module docs for the order).
    /// Returns [None] if there is nothing (more) to undo.
    ///
    /// # Errors
    ///
    /// - [`EditBufferError::BufferReadOnly`] if the buffer is read only.
    /// - [`EditBufferError::CorruptLog`] if a record can't be decoded.
    /// - Any error of the inverse mutation, eg: if unlogged changes made the record's
    ///   range invalid.
    pub fn undo(&mut self) -> EditBufferResult<Option<UndoOutcome>> {
        self.ensure_mutable()?;
        let Some(log) = self.log_buffer.as_deref() else {
            return Ok(None);
        };
        let end = self
            .undo_cursor
            .unwrap_or_else(|| log.pages.total_size().end_index());
        if end.as_usize() == 0 {
            return Ok(None);
        }

        let (start, entry, payload) = read_record_ending_at(log, end)?;
        // Evictions caused by logging the inverse shift the cursor, so it must already
        // point at this record while the inverse runs.
        let previous_cursor = self.undo_cursor.replace(start);

        tracing::debug!(
            message = "undo",
            buffer = %self.name,
            op = %entry.op,
            offset = %entry.offset,
            size = %entry.size,
        );

        self.undo_in_progress = true;
        let result = self.apply_inverse(&entry, &payload);
        self.undo_in_progress = false;
        let caret = match result {
            Ok(caret) => caret,
            Err(err) => {
                // The inverse is validated before it is logged, so the log is unchanged
                // and this record stays next in line.
                self.undo_cursor = previous_cursor;
                tracing::warn!(
                    message = "undo failed, record kept",
                    buffer = %self.name,
                    error = %err,
                );
                return Err(err);
            }
        };

        self.modified = entry.was_modified;
        Ok(Some(UndoOutcome {
            op: entry.op,
            caret,
        }))
    }

    fn apply_inverse(&mut self, entry: &LogEntry, payload: &[u8]) -> EditBufferResult<ByteIndex> {
        match entry.op {
            LogOp::Insert => {
                self.delete(entry.offset, entry.size)?;
                Ok(entry.offset)
            }
            LogOp::Delete => {
                self.insert(entry.offset, payload)?;
                Ok(entry.offset + entry.size)
            }
            LogOp::Write => {
                self.write(entry.offset, payload)?;
                Ok(entry.offset + entry.size)
            }
            LogOp::Free => Err(EditBufferError::CorruptLog {
                index: self.undo_cursor.unwrap_or_default(),
            }),
        }
    }

    /// Drop the undo log and clear the modified indicator, eg: after a save.
    pub fn log_reset(&mut self) {
        self.log_buffer = None;
        self.nb_logs = 0;
        self.undo_cursor = None;
        self.modified = false;
    }

    /// Number of records currently in the undo log.
    #[must_use]
    pub fn nb_logs(&self) -> usize { self.nb_logs }

    #[must_use]
    pub fn log_buffer(&self) -> Option<&EditBuffer> { self.log_buffer.as_deref() }

    /// Decode every record header in the undo log, oldest first.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::CorruptLog`] if a record can't be decoded.
    pub fn log_entries(&self) -> EditBufferResult<Vec<LogEntry>> {
        let Some(log) = self.log_buffer.as_deref() else {
            return Ok(vec![]);
        };
        let total = log.pages.total_size().as_usize();
        let mut acc = Vec::with_capacity(self.nb_logs);
        let mut index = 0;
        while index < total {
            let entry = read_header_at(log, byte_index(index))?;
            index += entry.record_len();
            acc.push(entry);
        }
        Ok(acc)
    }
}

fn read_header_at(log: &EditBuffer, index: ByteIndex) -> EditBufferResult<LogEntry> {
    let header = log
        .pages
        .read(index, byte_len(LOG_HEADER_SIZE))
        .map_err(|_| EditBufferError::CorruptLog { index })?;
    LogEntry::decode_header(&header, index)
}

/// Remove the first record of `log`. `undo_cursor` is shifted so it keeps pointing at
/// the same record.
fn evict_oldest(
    log: &mut EditBuffer,
    undo_cursor: &mut Option<ByteIndex>,
) -> EditBufferResult<LogEntry> {
    let entry = read_header_at(log, byte_index(0))?;
    let record_len = entry.record_len();
    log.pages.delete_range(byte_index(0), byte_len(record_len))?;
    if let Some(cursor) = undo_cursor {
        *cursor = byte_index(cursor.as_usize().saturating_sub(record_len));
    }

    tracing::debug!(
        message = "evict oldest log record",
        buffer = %log.name,
        op = %entry.op,
        record_len,
    );

    Ok(entry)
}

/// Returns the start, header, and payload of the record whose trailer ends at `end`.
fn read_record_ending_at(
    log: &EditBuffer,
    end: ByteIndex,
) -> EditBufferResult<(ByteIndex, LogEntry, Vec<u8>)> {
    let corrupt = || EditBufferError::CorruptLog { index: end };

    let trailer_start = end
        .as_usize()
        .checked_sub(LOG_TRAILER_SIZE)
        .ok_or_else(corrupt)?;
    let trailer = log
        .pages
        .read(byte_index(trailer_start), byte_len(LOG_TRAILER_SIZE))
        .map_err(|_| corrupt())?;
    let payload_len = decode_trailer(&trailer, byte_index(trailer_start))?;

    let start = trailer_start
        .checked_sub(payload_len)
        .and_then(|it| it.checked_sub(LOG_HEADER_SIZE))
        .ok_or_else(corrupt)?;
    let entry = read_header_at(log, byte_index(start))?;
    if entry.payload_len() != payload_len {
        return Err(EditBufferError::CorruptLog {
            index: byte_index(start),
        });
    }

    let payload = log
        .pages
        .read(byte_index(start + LOG_HEADER_SIZE), byte_len(payload_len))?;
    Ok((byte_index(start), entry, payload))
}
