// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Character and line navigation on top of the buffer's [`crate::CharsetDecoder`].
//!
//! Both ends of the buffer behave like a `'\n'`: reading past the end, or before the
//! start, yields [`NEWLINE`]. This keeps the line loops below free of bounds checks.

use crate::{ByteIndex, EditBuffer, EditBufferResult, byte_index, byte_len};

pub const NEWLINE: u32 = b'\n' as u32;

impl EditBuffer {
    /// Decode the character at `offset`. Returns the code point and the offset of the
    /// next character. At (or past) the end, returns `('\n', total_size)`.
    #[must_use]
    pub fn next_char(&self, offset: impl Into<ByteIndex>) -> (u32, ByteIndex) {
        let offset = offset.into();
        let total_size = self.total_size();
        if offset.as_usize() >= total_size.as_usize() {
            return (NEWLINE, total_size.end_index());
        }

        let len = self
            .charset
            .max_char_bytes()
            .min(total_size.as_usize() - offset.as_usize());
        match self.pages.read(offset, byte_len(len)) {
            Ok(bytes) if !bytes.is_empty() => {
                let (ch, ch_len) = self.charset.decode_next(&bytes);
                (ch, offset + byte_len(ch_len))
            }
            _ => (NEWLINE, total_size.end_index()),
        }
    }

    /// Decode the character that ends right before `offset`. Returns the code point and
    /// its start offset. At the start of the buffer, returns `('\n', 0)`.
    ///
    /// A malformed sequence is stepped over one byte at a time.
    #[must_use]
    pub fn prev_char(&self, offset: impl Into<ByteIndex>) -> (u32, ByteIndex) {
        let offset = offset.into().as_usize().min(self.total_size().as_usize());
        if offset == 0 {
            return (NEWLINE, byte_index(0));
        }

        let max_char_bytes = self.charset.max_char_bytes().max(1);
        let mut start = offset - 1;
        while start > 0
            && offset - start < max_char_bytes
            && !self.pages.byte_at(start).is_some_and(|it| self.charset.is_char_start(it))
        {
            start -= 1;
        }

        if let Ok(bytes) = self.pages.read(byte_index(start), byte_len(offset - start))
            && let Some(lead) = bytes.first()
            && self.charset.is_char_start(*lead)
        {
            let (ch, ch_len) = self.charset.decode_next(&bytes);
            if start + ch_len == offset {
                return (ch, byte_index(start));
            }
        }

        let last = self.pages.byte_at(offset - 1).unwrap_or(b'\n');
        (u32::from(last), byte_index(offset - 1))
    }

    /// Start of the line that contains `offset`.
    #[must_use]
    pub fn goto_bol(&self, offset: impl Into<ByteIndex>) -> ByteIndex {
        let mut offset = offset.into();
        loop {
            let (ch, prev) = self.prev_char(offset);
            if ch == NEWLINE {
                return offset;
            }
            offset = prev;
        }
    }

    /// Offset of the `'\n'` that ends the line containing `offset`, or `total_size` for
    /// the last line.
    #[must_use]
    pub fn goto_eol(&self, offset: impl Into<ByteIndex>) -> ByteIndex {
        let mut offset = offset.into();
        loop {
            let (ch, next) = self.next_char(offset);
            if ch == NEWLINE {
                return offset;
            }
            offset = next;
        }
    }

    /// Start of the line after the one containing `offset`, or `total_size` if there is
    /// none.
    #[must_use]
    pub fn next_line(&self, offset: impl Into<ByteIndex>) -> ByteIndex {
        let mut offset = offset.into();
        loop {
            let (ch, next) = self.next_char(offset);
            offset = next;
            if ch == NEWLINE {
                return offset;
            }
        }
    }

    /// `true` if the rest of the line starting at `offset` is only whitespace.
    #[must_use]
    pub fn is_empty_line(&self, offset: impl Into<ByteIndex>) -> bool {
        let mut offset = offset.into();
        loop {
            let (ch, next) = self.next_char(offset);
            if ch == NEWLINE {
                return true;
            }
            if !char::from_u32(ch).is_some_and(char::is_whitespace) {
                return false;
            }
            offset = next;
        }
    }

    /// The text from `offset` to the end of its line (without the `'\n'`), and the
    /// offset of the next line. Code points that aren't valid chars are replaced.
    #[must_use]
    pub fn get_line(&self, offset: impl Into<ByteIndex>) -> (String, ByteIndex) {
        let mut offset = offset.into();
        let mut acc = String::new();
        loop {
            let (ch, next) = self.next_char(offset);
            offset = next;
            if ch == NEWLINE {
                return (acc, offset);
            }
            acc.push(char::from_u32(ch).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
    }

    /// Append spaces until the last line of the buffer is `width` characters wide.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::BufferReadOnly`] if the buffer is read only.
    pub fn line_pad(&mut self, width: usize) -> EditBufferResult<()> {
        let mut offset = self.total_size().end_index();
        let mut nb_chars = 0;
        loop {
            let (ch, prev) = self.prev_char(offset);
            if ch == NEWLINE {
                break;
            }
            nb_chars += 1;
            offset = prev;
        }
        if nb_chars < width {
            self.append(" ".repeat(width - nb_chars).as_bytes())?;
        }
        Ok(())
    }
}
