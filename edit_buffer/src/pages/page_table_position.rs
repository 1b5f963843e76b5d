// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Line / column and character offset queries. Whole pages are summarized by their
//! cached metrics, so only the page that holds the target offset is scanned.

use crate::{ByteIndex, CharsetDecoder, EditBufferResult, LineColumn, PageTable,
            byte_index, count_lines_and_column, line_col};

impl PageTable {
    /// Line and byte column of `offset`.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn get_pos(&mut self, offset: impl Into<ByteIndex>) -> EditBufferResult<LineColumn> {
        let offset = offset.into();
        self.check_offset(offset)?;

        let mut remaining = offset.as_usize();
        let mut acc = line_col(0, 0);
        for page in &mut self.pages {
            if remaining < page.size() {
                let (nb_lines, col) = count_lines_and_column(&page.data()[..remaining]);
                return Ok(advance(acc, nb_lines, col));
            }
            let (nb_lines, col) = page.line_metrics();
            acc = advance(acc, nb_lines, col);
            remaining -= page.size();
        }
        Ok(acc)
    }

    /// Offset of `pos.col` bytes into line `pos.line`. The column is clamped to the end
    /// of the line, and a line past the last one resolves to `total_size`.
    pub fn goto_pos(&mut self, pos: LineColumn) -> ByteIndex {
        let Some(line_start) = self.line_start(pos.line) else {
            return self.total_size.end_index();
        };

        let mut offset = line_start;
        for _ in 0..pos.col {
            match self.byte_at(byte_index(offset)) {
                Some(b'\n') | None => break,
                Some(_) => offset += 1,
            }
        }
        byte_index(offset)
    }

    /// Number of characters in `[0, offset)`, as counted by `charset`.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn get_char_offset(
        &mut self,
        offset: impl Into<ByteIndex>,
        charset: &dyn CharsetDecoder,
    ) -> EditBufferResult<usize> {
        let offset = offset.into();
        self.check_offset(offset)?;

        let mut remaining = offset.as_usize();
        let mut nb_chars = 0;
        for page in &mut self.pages {
            if remaining < page.size() {
                return Ok(nb_chars + charset.count_chars(&page.data()[..remaining]));
            }
            nb_chars += page.nb_chars(charset);
            remaining -= page.size();
        }
        Ok(nb_chars)
    }

    /// Byte offset of the character with index `pos`, or `total_size` if the table holds
    /// `pos` characters or fewer.
    pub fn goto_char(&mut self, pos: usize, charset: &dyn CharsetDecoder) -> ByteIndex {
        let mut remaining = pos;
        let mut page_start = 0;
        for page in &mut self.pages {
            let nb_chars = page.nb_chars(charset);
            if remaining < nb_chars
                && let Some(offset_in_page) = charset.char_offset(page.data(), remaining)
            {
                return byte_index(page_start + offset_in_page);
            }
            remaining = remaining.saturating_sub(nb_chars);
            page_start += page.size();
        }
        self.total_size.end_index()
    }

    /// Offset of the first byte of line `line`, or [None] if there are fewer lines.
    fn line_start(&mut self, line: usize) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }

        let mut lines_before = 0;
        let mut page_start = 0;
        for page in &mut self.pages {
            let (nb_lines, _) = page.line_metrics();
            if lines_before + nb_lines >= line {
                let newline_pos = page
                    .data()
                    .iter()
                    .enumerate()
                    .filter(|(_, byte)| **byte == b'\n')
                    .nth(line - lines_before - 1)
                    .map(|(pos, _)| pos)?;
                return Some(page_start + newline_pos + 1);
            }
            lines_before += nb_lines;
            page_start += page.size();
        }
        None
    }
}

fn advance(acc: LineColumn, nb_lines: usize, col: usize) -> LineColumn {
    if nb_lines > 0 {
        line_col(acc.line + nb_lines, col)
    } else {
        line_col(acc.line, acc.col + col)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::{EightBit, Utf8Approx};

    const TEXT: &[u8] = b"first\nsecond line\n\nlast";

    fn table_with(max_page_size: usize, content: &[u8]) -> PageTable {
        let mut table = PageTable::new("test", max_page_size);
        table.insert_bytes(byte_index(0), content).unwrap();
        table
    }

    #[test_case(0, (0, 0))]
    #[test_case(3, (0, 3))]
    #[test_case(5, (0, 5))]
    #[test_case(6, (1, 0))]
    #[test_case(13, (1, 7))]
    #[test_case(18, (2, 0))]
    #[test_case(19, (3, 0))]
    #[test_case(23, (3, 4))]
    fn test_get_pos(offset: usize, (line, col): (usize, usize)) {
        // Tiny pages so most lines straddle a page boundary.
        for max_page_size in [3, 4, 7, 4096] {
            let mut table = table_with(max_page_size, TEXT);
            assert_eq!(table.get_pos(byte_index(offset)).unwrap(), line_col(line, col));
        }
    }

    #[test]
    fn test_get_pos_past_end() {
        let mut table = table_with(4, TEXT);
        assert!(table.get_pos(byte_index(TEXT.len() + 1)).is_err());
    }

    #[test_case((0, 0), 0)]
    #[test_case((0, 99), 5; "column clamped to end of line")]
    #[test_case((1, 7), 13)]
    #[test_case((2, 3), 18; "empty line")]
    #[test_case((3, 2), 21)]
    #[test_case((3, 99), 23; "last line has no newline")]
    #[test_case((9, 0), 23; "line past the end")]
    fn test_goto_pos(pos: (usize, usize), expected: usize) {
        for max_page_size in [3, 4, 4096] {
            let mut table = table_with(max_page_size, TEXT);
            assert_eq!(table.goto_pos(line_col(pos.0, pos.1)), byte_index(expected));
        }
    }

    #[test]
    fn test_get_pos_and_goto_pos_agree() {
        let mut table = table_with(5, TEXT);
        for offset in 0..=TEXT.len() {
            let pos = table.get_pos(byte_index(offset)).unwrap();
            assert_eq!(table.goto_pos(pos), byte_index(offset));
        }
    }

    #[test]
    fn test_char_offsets_utf8() {
        // 'é' is 2 bytes, '日' is 3 bytes.
        let text = "aé日b\né".as_bytes();
        for max_page_size in [2, 3, 4096] {
            let mut table = table_with(max_page_size, text);
            assert_eq!(table.get_char_offset(byte_index(0), &Utf8Approx).unwrap(), 0);
            assert_eq!(table.get_char_offset(byte_index(3), &Utf8Approx).unwrap(), 2);
            assert_eq!(table.get_char_offset(byte_index(6), &Utf8Approx).unwrap(), 3);
            assert_eq!(table.get_char_offset(byte_index(10), &Utf8Approx).unwrap(), 6);

            assert_eq!(table.goto_char(2, &Utf8Approx), byte_index(3));
            assert_eq!(table.goto_char(3, &Utf8Approx), byte_index(6));
            assert_eq!(table.goto_char(5, &Utf8Approx), byte_index(8));
            assert_eq!(table.goto_char(6, &Utf8Approx), byte_index(10));
            assert_eq!(table.goto_char(60, &Utf8Approx), byte_index(10));
        }
    }

    #[test]
    fn test_char_offsets_eight_bit() {
        let mut table = table_with(3, "aé日".as_bytes());
        assert_eq!(table.get_char_offset(byte_index(6), &EightBit).unwrap(), 6);
        assert_eq!(table.goto_char(4, &EightBit), byte_index(4));
    }
}
