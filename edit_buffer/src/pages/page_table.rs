// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::cell::Cell;

use crate::{ByteIndex, ByteLength, EditBufferError, EditBufferResult, MAX_PAGE_SIZE,
            Page, PageFlags, byte_index, byte_len};

/// Single entry position cache of a [`PageTable`]: the last page that
/// [`PageTable::find_page`] resolved, and the offset of its first byte.
///
/// It is only a hint. It is dropped by every structural change to the page sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCache {
    pub page_index: usize,
    pub page_start: ByteIndex,
}

/// Where a logical offset lives inside a [`PageTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLocation {
    pub page_index: usize,
    pub page_start: ByteIndex,
    pub offset_in_page: usize,
}

/// Ordered sequence of [`Page`]s that represents one logical byte array.
///
/// # Invariants
///
/// 1. `total_size` is the sum of the sizes of all the pages.
/// 2. No page is empty.
/// 3. If the cache is set, `page_start` is the sum of the sizes of the pages before
///    `page_index`.
///
/// Every mutation re-checks the first invariant. If it ever fails, the table is marked
/// inconsistent and refuses any further mutation with
/// [`EditBufferError::InconsistentState`], until [`PageTable::clear`] empties it.
///
/// The cache lives in a [`Cell`] so lookups only need `&self`. This makes the table
/// [`Send`] but not [`Sync`], matching the "one caller at a time" contract of the
/// buffer that owns it.
#[derive(Debug, Clone)]
pub struct PageTable {
    pub(crate) pages: Vec<Page>,
    pub(crate) total_size: ByteLength,
    pub(crate) max_page_size: usize,
    cache: Cell<Option<PageCache>>,
    name: String,
    pub(crate) inconsistent: bool,
}

impl Default for PageTable {
    fn default() -> Self { Self::new("", MAX_PAGE_SIZE) }
}

impl PageTable {
    /// `name` is only used to label log events and errors. `max_page_size` is clamped to
    /// at least one byte.
    #[must_use]
    pub fn new(name: impl Into<String>, max_page_size: usize) -> Self {
        Self {
            pages: vec![],
            total_size: byte_len(0),
            max_page_size: max_page_size.max(1),
            cache: Cell::new(None),
            name: name.into(),
            inconsistent: false,
        }
    }

    #[must_use]
    pub fn total_size(&self) -> ByteLength { self.total_size }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.total_size.is_zero() }

    #[must_use]
    pub fn pages(&self) -> &[Page] { &self.pages }

    #[must_use]
    pub fn nb_pages(&self) -> usize { self.pages.len() }

    #[must_use]
    pub fn max_page_size(&self) -> usize { self.max_page_size }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    pub fn set_name(&mut self, name: impl Into<String>) { self.name = name.into(); }

    #[must_use]
    pub fn cache(&self) -> Option<PageCache> { self.cache.get() }

    pub fn invalidate_cache(&self) { self.cache.set(None); }

    /// Drop the given cached metadata on every page, eg: after the charset changed.
    pub fn invalidate_metrics(&mut self, flags: PageFlags) {
        for page in &mut self.pages {
            page.invalidate(flags);
        }
    }

    /// Resolve `offset` to the page that contains it. The cached page is tried first,
    /// then the pages are scanned (from the cached page onward when `offset` lies past
    /// it). The cache is refreshed to point at the result.
    ///
    /// # Errors
    ///
    /// `offset == total_size` has no containing page, so anything `>= total_size`
    /// returns [`EditBufferError::InvalidOffset`]. Callers that append must special case
    /// the end of the buffer.
    pub fn find_page(&self, offset: impl Into<ByteIndex>) -> EditBufferResult<PageLocation> {
        let offset = offset.into();
        if offset.as_usize() >= self.total_size.as_usize() {
            return Err(EditBufferError::InvalidOffset {
                offset,
                total_size: self.total_size,
            });
        }

        let (mut page_index, mut page_start) = match self.cache.get() {
            Some(cache) if cache.page_start <= offset => {
                if let Some(page) = self.pages.get(cache.page_index)
                    && offset.as_usize() < cache.page_start.as_usize() + page.size()
                {
                    return Ok(PageLocation {
                        page_index: cache.page_index,
                        page_start: cache.page_start,
                        offset_in_page: offset.as_usize() - cache.page_start.as_usize(),
                    });
                }
                (cache.page_index, cache.page_start.as_usize())
            }
            _ => (0, 0),
        };

        while let Some(page) = self.pages.get(page_index) {
            if offset.as_usize() < page_start + page.size() {
                self.cache.set(Some(PageCache {
                    page_index,
                    page_start: byte_index(page_start),
                }));
                return Ok(PageLocation {
                    page_index,
                    page_start: byte_index(page_start),
                    offset_in_page: offset.as_usize() - page_start,
                });
            }
            page_start += page.size();
            page_index += 1;
        }

        // The recorded total size promised a page that isn't there.
        Err(self.inconsistent_state_error())
    }

    /// Same result as [`Self::find_page`] but always scans from the first page and
    /// neither reads nor writes the cache.
    #[must_use]
    pub fn find_page_linear(&self, offset: impl Into<ByteIndex>) -> Option<PageLocation> {
        let offset = offset.into().as_usize();
        let mut page_start = 0;
        for (page_index, page) in self.pages.iter().enumerate() {
            if offset < page_start + page.size() {
                return Some(PageLocation {
                    page_index,
                    page_start: byte_index(page_start),
                    offset_in_page: offset - page_start,
                });
            }
            page_start += page.size();
        }
        None
    }

    /// # Errors
    ///
    /// [`EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn check_offset(&self, offset: ByteIndex) -> EditBufferResult<()> {
        if offset.is_past_end(self.total_size) {
            return Err(EditBufferError::InvalidOffset {
                offset,
                total_size: self.total_size,
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`EditBufferError::InvalidOffset`] if the range starts past the end,
    /// [`EditBufferError::InvalidRange`] if it ends past the end.
    pub fn check_range(&self, offset: ByteIndex, size: ByteLength) -> EditBufferResult<()> {
        self.check_offset(offset)?;
        match offset.as_usize().checked_add(size.as_usize()) {
            Some(end) if end <= self.total_size.as_usize() => Ok(()),
            _ => Err(EditBufferError::InvalidRange {
                offset,
                size,
                total_size: self.total_size,
            }),
        }
    }

    #[must_use]
    pub fn is_inconsistent(&self) -> bool { self.inconsistent }

    /// # Errors
    ///
    /// [`EditBufferError::InconsistentState`] once an invariant check has failed.
    pub fn ensure_consistent(&self) -> EditBufferResult<()> {
        if self.inconsistent {
            return Err(self.inconsistent_state_error());
        }
        Ok(())
    }

    /// Sum of the sizes of all the pages, computed the slow way.
    #[must_use]
    pub fn actual_size(&self) -> ByteLength {
        byte_len(self.pages.iter().map(Page::size).sum::<usize>())
    }

    /// Compare `total_size` with the sum of the page sizes. On a mismatch the table is
    /// poisoned. Debug builds also panic, since this can only be a bookkeeping bug.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::InconsistentState`] on a mismatch.
    pub fn verify(&mut self) -> EditBufferResult<()> {
        let actual = self.actual_size();
        debug_assert!(
            self.pages.iter().all(|page| !page.is_empty()),
            "page table '{}' holds an empty page",
            self.name
        );
        if actual == self.total_size {
            return Ok(());
        }

        self.inconsistent = true;
        self.invalidate_cache();
        tracing::error!(
            message = "page table is inconsistent, refusing further mutation",
            buffer = %self.name,
            expected = %self.total_size,
            actual = %actual,
        );
        debug_assert_eq!(
            actual, self.total_size,
            "page table '{}' lost track of its size",
            self.name
        );
        Err(self.inconsistent_state_error())
    }

    pub(crate) fn inconsistent_state_error(&self) -> EditBufferError {
        EditBufferError::InconsistentState {
            name: self.name.clone(),
            expected: self.total_size,
            actual: self.actual_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::{BufferFlags, EditBuffer};

    /// Three pages: "abc" | "defg" | "hi".
    fn three_pages() -> PageTable {
        let mut table = PageTable::new("three", 4);
        table.insert_bytes(byte_index(0), b"hi").unwrap();
        table.insert_bytes(byte_index(0), b"defg").unwrap();
        table.insert_bytes(byte_index(0), b"abc").unwrap();
        table
    }

    #[test]
    fn test_layout_of_fixture() {
        let table = three_pages();
        let sizes: Vec<usize> = table.pages().iter().map(Page::size).collect();
        assert_eq!(sizes, vec![3, 4, 2]);
        assert_eq!(table.total_size(), byte_len(9));
    }

    #[test_case(0, 0, 0)]
    #[test_case(2, 0, 2)]
    #[test_case(3, 1, 0)]
    #[test_case(6, 1, 3)]
    #[test_case(7, 2, 0)]
    #[test_case(8, 2, 1)]
    fn test_find_page(offset: usize, page_index: usize, offset_in_page: usize) {
        let table = three_pages();
        let location = table.find_page(byte_index(offset)).unwrap();
        assert_eq!(location.page_index, page_index);
        assert_eq!(location.offset_in_page, offset_in_page);
        assert_eq!(Some(location), table.find_page_linear(byte_index(offset)));
        assert_eq!(
            table.cache(),
            Some(PageCache {
                page_index,
                page_start: location.page_start,
            })
        );
    }

    #[test]
    fn test_find_page_at_end_is_an_error() {
        let table = three_pages();
        let result = table.find_page(byte_index(9));
        assert!(matches!(result, Err(EditBufferError::InvalidOffset { .. })));
        assert!(table.find_page_linear(byte_index(9)).is_none());
    }

    #[test]
    fn test_find_page_on_empty_table() {
        let table = PageTable::default();
        assert!(table.find_page(byte_index(0)).is_err());
    }

    #[test]
    fn test_cache_is_used_then_refreshed() {
        let table = three_pages();
        table.find_page(byte_index(4)).unwrap();
        let cached = table.cache();

        // Same page, cache unchanged.
        table.find_page(byte_index(6)).unwrap();
        assert_eq!(table.cache(), cached);

        // Earlier page, scan restarts from the front.
        let location = table.find_page(byte_index(1)).unwrap();
        assert_eq!(location.page_index, 0);

        // Later page, scan resumes from the cached page.
        let location = table.find_page(byte_index(8)).unwrap();
        assert_eq!(location.page_index, 2);
        assert_eq!(location.page_start, byte_index(7));
    }

    #[test]
    fn test_check_range() {
        let table = three_pages();
        assert!(table.check_range(byte_index(9), byte_len(0)).is_ok());
        assert!(table.check_range(byte_index(2), byte_len(7)).is_ok());
        assert!(matches!(
            table.check_range(byte_index(2), byte_len(8)),
            Err(EditBufferError::InvalidRange { .. })
        ));
        assert!(matches!(
            table.check_range(byte_index(10), byte_len(0)),
            Err(EditBufferError::InvalidOffset { .. })
        ));
        assert!(table.check_range(byte_index(1), byte_len(usize::MAX)).is_err());
    }

    #[test]
    fn test_verify_accepts_consistent_table() {
        let mut table = three_pages();
        assert!(table.verify().is_ok());
        assert!(!table.is_inconsistent());
        assert_eq!(table.actual_size(), table.total_size());
    }

    fn assert_refuses_mutation(table: &mut PageTable) {
        let is_inconsistent =
            |result: EditBufferResult<()>| matches!(result, Err(EditBufferError::InconsistentState { .. }));
        let src = three_pages();
        assert!(is_inconsistent(table.insert_bytes(byte_index(0), b"x")));
        assert!(is_inconsistent(table.insert_shared(byte_index(0), Arc::from(&b"x"[..]))));
        assert!(is_inconsistent(table.insert_from(byte_index(0), &src, byte_index(0), byte_len(1))));
        assert!(is_inconsistent(table.delete_range(byte_index(0), byte_len(1))));
        assert!(is_inconsistent(table.write(byte_index(0), b"x")));
    }

    #[test]
    fn test_poisoned_table_refuses_mutation() {
        let mut table = three_pages();
        table.inconsistent = true;
        assert_refuses_mutation(&mut table);
        // Reads still work.
        assert_eq!(table.contents(), b"abcdefghi");
        assert!(table.is_inconsistent());
    }

    #[test]
    fn test_poisoned_buffer_refuses_mutation() {
        let mut buffer = EditBuffer::new("doc", BufferFlags::SAVE_LOG);
        buffer.append(b"hello").unwrap();
        buffer.pages.inconsistent = true;

        let is_inconsistent =
            |result: EditBufferResult<()>| matches!(result, Err(EditBufferError::InconsistentState { .. }));
        assert!(is_inconsistent(buffer.ensure_mutable()));
        assert!(is_inconsistent(buffer.insert(byte_index(0), b"x")));
        assert!(is_inconsistent(buffer.delete(byte_index(0), byte_len(1))));
        assert!(is_inconsistent(buffer.write(byte_index(0), b"x")));
        assert!(matches!(
            buffer.undo(),
            Err(EditBufferError::InconsistentState { .. })
        ));
        assert_eq!(buffer.contents(), b"hello");
        assert_eq!(buffer.nb_logs(), 1);
    }

    /// Claims one byte more than the pages hold.
    fn with_lost_byte() -> PageTable {
        let mut table = three_pages();
        table.total_size = byte_len(10);
        table
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_size_mismatch_poisons_the_table() {
        let mut table = with_lost_byte();
        let result = table.delete_range(byte_index(0), byte_len(1));
        assert!(matches!(
            result,
            Err(EditBufferError::InconsistentState { expected, actual, .. })
                if expected == byte_len(9) && actual == byte_len(8)
        ));
        assert!(table.is_inconsistent());
        assert_eq!(table.cache(), None);
        assert_refuses_mutation(&mut table);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "lost track of its size")]
    fn test_size_mismatch_panics_in_debug_builds() {
        let mut table = with_lost_byte();
        let _unused = table.delete_range(byte_index(0), byte_len(1));
    }
}
