// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// A zero-based line number and column, as returned by
/// [`crate::PageTable::get_pos`].
///
/// The column counts bytes after the last `'\n'`, not decoded characters. Multi-byte
/// characters therefore advance the column by more than one. This is a known
/// simplification until column accounting is routed through the
/// [`crate::CharsetDecoder`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub col: usize,
}

#[must_use]
pub fn line_col(line: usize, col: usize) -> LineColumn { LineColumn { line, col } }
