// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          ops::Range,
          sync::Arc};

use crate::CharsetDecoder;

bitflags::bitflags! {
    /// Validity of the metadata cached in a [`Page`]. Every flag is cleared whenever the
    /// bytes of the page change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PageFlags: u8 {
        /// `nb_lines` and `col` are up to date.
        const VALID_POS = 0b0000_0001;
        /// `nb_chars` is up to date.
        const VALID_CHAR = 0b0000_0010;
        /// Syntax coloring state (owned by the host) is up to date.
        const VALID_COLORS = 0b0000_0100;
    }
}

/// Storage behind a [`Page`].
#[derive(Clone)]
pub enum PageBytes {
    /// Uniquely owned, can be mutated in place.
    Owned(Vec<u8>),
    /// A slice of a reference counted backing store. Read only until copied.
    Shared {
        backing: Arc<[u8]>,
        range: Range<usize>,
    },
}

impl PageBytes {
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            PageBytes::Owned(vec) => vec,
            PageBytes::Shared { backing, range } => &backing[range.clone()],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PageBytes::Owned(vec) => vec.len(),
            PageBytes::Shared { range, .. } => range.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[must_use]
    pub fn is_shared(&self) -> bool { matches!(self, PageBytes::Shared { .. }) }

    fn to_mut(&mut self) -> &mut Vec<u8> {
        if let PageBytes::Shared { backing, range } = self {
            *self = PageBytes::Owned(backing[range.clone()].to_vec());
        }
        match self {
            PageBytes::Owned(vec) => vec,
            PageBytes::Shared { .. } => unreachable!("shared storage was just copied"),
        }
    }

    /// Keeps `[0, at)` and returns `[at, len)`. Shared storage stays shared on both
    /// sides, only the ranges change.
    fn split_off(&mut self, at: usize) -> PageBytes {
        match self {
            PageBytes::Owned(vec) => PageBytes::Owned(vec.split_off(at)),
            PageBytes::Shared { backing, range } => {
                let mid = range.start + at;
                let right = PageBytes::Shared {
                    backing: Arc::clone(backing),
                    range: mid..range.end,
                };
                range.end = mid;
                right
            }
        }
    }
}

impl Debug for PageBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PageBytes::Owned(vec) => write!(f, "Owned(len: {})", vec.len()),
            PageBytes::Shared { backing, range } => write!(
                f,
                "Shared(range: {range:?}, backing len: {}, refs: {})",
                backing.len(),
                Arc::strong_count(backing)
            ),
        }
    }
}

/// A contiguous run of bytes, the unit of storage of a [`crate::PageTable`].
///
/// A page is never empty once it is part of a page table. Derived metrics (line count,
/// trailing column, character count) are computed lazily and cached until the next
/// mutation.
#[derive(Debug, Clone)]
pub struct Page {
    bytes: PageBytes,
    flags: PageFlags,
    nb_lines: usize,
    col: usize,
    nb_chars: usize,
}

impl Page {
    #[must_use]
    pub fn new_owned(data: Vec<u8>) -> Self { Self::from_bytes(PageBytes::Owned(data)) }

    /// A read only page that views `backing[range]`.
    #[must_use]
    pub fn new_shared(backing: Arc<[u8]>, range: Range<usize>) -> Self {
        Self::from_bytes(PageBytes::Shared { backing, range })
    }

    fn from_bytes(bytes: PageBytes) -> Self {
        Self {
            bytes,
            flags: PageFlags::empty(),
            nb_lines: 0,
            col: 0,
            nb_chars: 0,
        }
    }

    #[must_use]
    pub fn data(&self) -> &[u8] { self.bytes.as_slice() }

    #[must_use]
    pub fn size(&self) -> usize { self.bytes.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// `true` if the bytes are shared with another owner and must be copied before they
    /// can be mutated.
    #[must_use]
    pub fn is_read_only(&self) -> bool { self.bytes.is_shared() }

    #[must_use]
    pub fn flags(&self) -> PageFlags { self.flags }

    #[must_use]
    pub fn bytes(&self) -> &PageBytes { &self.bytes }

    /// Copy-on-write entry point. Shared bytes are copied into owned storage, and all the
    /// cached metadata is invalidated, since the caller is about to change the bytes.
    /// Must be called before any in place mutation.
    pub fn make_mutable(&mut self) -> &mut Vec<u8> {
        self.invalidate(PageFlags::all());
        self.bytes.to_mut()
    }

    pub fn invalidate(&mut self, flags: PageFlags) { self.flags.remove(flags); }

    pub fn mark_colors_valid(&mut self) { self.flags.insert(PageFlags::VALID_COLORS); }

    /// Split this page at `at` (relative to the page start). This page keeps `[0, at)`,
    /// and the returned page holds the rest.
    pub fn split_off(&mut self, at: usize) -> Page {
        self.invalidate(PageFlags::all());
        Page::from_bytes(self.bytes.split_off(at))
    }

    /// Remove `range` (relative to the page start) from this page.
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.make_mutable().drain(range);
    }

    /// Returns `(nb_lines, col)` for the whole page, see [`count_lines_and_column`].
    pub fn line_metrics(&mut self) -> (usize, usize) {
        if !self.flags.contains(PageFlags::VALID_POS) {
            let (nb_lines, col) = count_lines_and_column(self.bytes.as_slice());
            self.nb_lines = nb_lines;
            self.col = col;
            self.flags.insert(PageFlags::VALID_POS);
        }
        (self.nb_lines, self.col)
    }

    pub fn nb_chars(&mut self, charset: &dyn CharsetDecoder) -> usize {
        if !self.flags.contains(PageFlags::VALID_CHAR) {
            self.nb_chars = charset.count_chars(self.bytes.as_slice());
            self.flags.insert(PageFlags::VALID_CHAR);
        }
        self.nb_chars
    }
}

/// Returns the number of `'\n'` bytes in `data`, and the number of bytes after the last
/// one (the whole length if there is none).
///
/// The column is a byte count. Multi-byte characters are not collapsed into a single
/// column, this is a known simplification.
#[must_use]
pub fn count_lines_and_column(data: &[u8]) -> (usize, usize) {
    let nb_lines = data.iter().filter(|byte| **byte == b'\n').count();
    let col = match data.iter().rposition(|byte| *byte == b'\n') {
        Some(last_newline) => data.len() - last_newline - 1,
        None => data.len(),
    };
    (nb_lines, col)
}
