// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Structural mutations of a [`PageTable`]: everything that adds, splits, or removes
//! pages. In place overwrites live in [`super::page_table_rw`].

use std::sync::Arc;

use smallvec::SmallVec;

use crate::{ByteIndex, ByteLength, EditBufferResult, Page, PageTable, byte_len};

/// Most inserts are typed text and fit in one or two pages.
type NewPages = SmallVec<[Page; 4]>;

impl PageTable {
    /// Insert `data` at `offset`, shifting everything at or after `offset` to the right.
    ///
    /// - At the end of the table, new pages are appended.
    /// - At the first byte of a page, new pages go right before it.
    /// - Anywhere else, the page is split in two and the new pages go in between.
    ///
    /// The head of `data` is packed into the free room of the owned page that ends right
    /// at `offset` (if any) before new pages are allocated. The rest is chunked into
    /// pages of at most `max_page_size` bytes.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn insert_bytes(
        &mut self,
        offset: impl Into<ByteIndex>,
        data: &[u8],
    ) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_consistent()?;
        self.check_offset(offset)?;
        if data.is_empty() {
            return Ok(());
        }

        let index = self.prepare_insert_index(offset)?;
        let max_page_size = self.max_page_size;
        let mut rest = data;

        if let Some(prev_index) = index.checked_sub(1)
            && let Some(prev) = self.pages.get_mut(prev_index)
            && !prev.is_read_only()
            && prev.size() < max_page_size
        {
            let room = max_page_size - prev.size();
            let (head, tail) = rest.split_at(room.min(rest.len()));
            prev.make_mutable().extend_from_slice(head);
            rest = tail;
        }

        let new_pages: NewPages = rest
            .chunks(max_page_size)
            .map(|chunk| Page::new_owned(chunk.to_vec()))
            .collect();

        tracing::trace!(
            message = "insert bytes",
            buffer = %self.name(),
            offset = %offset,
            size = data.len(),
            packed = data.len() - rest.len(),
            new_pages = new_pages.len(),
        );

        self.splice_pages(index, new_pages, byte_len(data.len()))
    }

    /// Insert `backing` at `offset` as read only pages that all point into the same
    /// reference counted store. Nothing is copied until one of the pages is mutated.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] unless `0 <= offset <= total_size`.
    pub fn insert_shared(
        &mut self,
        offset: impl Into<ByteIndex>,
        backing: Arc<[u8]>,
    ) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_consistent()?;
        self.check_offset(offset)?;
        let len = backing.len();
        if len == 0 {
            return Ok(());
        }

        let index = self.prepare_insert_index(offset)?;
        let max_page_size = self.max_page_size;
        let new_pages: Vec<Page> = (0..len)
            .step_by(max_page_size)
            .map(|start| {
                Page::new_shared(Arc::clone(&backing), start..(start + max_page_size).min(len))
            })
            .collect();

        tracing::trace!(
            message = "insert shared",
            buffer = %self.name(),
            offset = %offset,
            size = len,
            new_pages = new_pages.len(),
        );

        self.splice_pages(index, new_pages, byte_len(len))
    }

    /// Copy `[src_offset, src_offset + size)` of `src` into this table at `dest_offset`.
    ///
    /// Source pages that are read only and fully covered by the range are shared, not
    /// copied. Everything else is copied into new owned pages.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] or
    /// [`crate::EditBufferError::InvalidRange`] if either side is out of bounds.
    pub fn insert_from(
        &mut self,
        dest_offset: impl Into<ByteIndex>,
        src: &PageTable,
        src_offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<()> {
        let (dest_offset, src_offset, size) = (dest_offset.into(), src_offset.into(), size.into());
        self.ensure_consistent()?;
        self.check_offset(dest_offset)?;
        src.check_range(src_offset, size)?;
        if size.is_zero() {
            return Ok(());
        }

        let max_page_size = self.max_page_size;
        let mut new_pages: Vec<Page> = vec![];
        let mut shared_count = 0;
        src.for_each_run(src_offset, size, |page, run| {
            if page.is_read_only() && run.len() == page.size() {
                new_pages.push(page.clone());
                shared_count += 1;
            } else {
                new_pages.extend(
                    page.data()[run]
                        .chunks(max_page_size)
                        .map(|chunk| Page::new_owned(chunk.to_vec())),
                );
            }
        })?;

        let index = self.prepare_insert_index(dest_offset)?;

        tracing::trace!(
            message = "insert from page table",
            buffer = %self.name(),
            src = %src.name(),
            dest_offset = %dest_offset,
            src_offset = %src_offset,
            size = %size,
            shared_pages = shared_count,
        );

        self.splice_pages(index, new_pages, size)
    }

    /// Remove `[offset, offset + size)`. Pages that are fully covered are dropped (as one
    /// contiguous run), partially covered pages are made mutable and compacted. A `size`
    /// of zero is a no-op that leaves the cache alone.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidOffset`] or
    /// [`crate::EditBufferError::InvalidRange`] unless
    /// `offset + size <= total_size`.
    pub fn delete_range(
        &mut self,
        offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<()> {
        let (offset, size) = (offset.into(), size.into());
        self.ensure_consistent()?;
        self.check_range(offset, size)?;
        if size.is_zero() {
            return Ok(());
        }

        let location = self.find_page(offset)?;
        let mut page_index = location.page_index;
        let mut offset_in_page = location.offset_in_page;
        let mut remaining = size.as_usize();

        // Only the first and last pages can be partially covered, so the fully covered
        // ones are always a contiguous run.
        let mut whole_pages_start: Option<usize> = None;
        let mut whole_pages_count = 0;

        while remaining > 0 {
            let Some(page) = self.pages.get_mut(page_index) else {
                return Err(self.inconsistent_state_error());
            };
            let len = (page.size() - offset_in_page).min(remaining);
            if offset_in_page == 0 && len == page.size() {
                whole_pages_start.get_or_insert(page_index);
                whole_pages_count += 1;
            } else {
                page.remove_range(offset_in_page..offset_in_page + len);
            }
            remaining -= len;
            page_index += 1;
            offset_in_page = 0;
        }

        if let Some(start) = whole_pages_start {
            self.pages.drain(start..start + whole_pages_count);
        }

        tracing::trace!(
            message = "delete range",
            buffer = %self.name(),
            offset = %offset,
            size = %size,
            removed_pages = whole_pages_count,
        );

        self.total_size -= size;
        self.invalidate_cache();
        self.verify()
    }

    /// Remove every page. An empty table is consistent, so this also lifts the refusal
    /// left by a failed [`PageTable::verify`].
    pub fn clear(&mut self) {
        self.pages.clear();
        self.total_size = byte_len(0);
        self.inconsistent = false;
        self.invalidate_cache();
    }

    /// Returns the index at which pages for an insert at `offset` must go, splitting the
    /// page that contains `offset` if it falls strictly inside it.
    fn prepare_insert_index(&mut self, offset: ByteIndex) -> EditBufferResult<usize> {
        if offset == self.total_size.end_index() {
            return Ok(self.pages.len());
        }

        let location = self.find_page(offset)?;
        if location.offset_in_page == 0 {
            return Ok(location.page_index);
        }

        let Some(page) = self.pages.get_mut(location.page_index) else {
            return Err(self.inconsistent_state_error());
        };
        let right = page.split_off(location.offset_in_page);
        self.pages.insert(location.page_index + 1, right);
        self.invalidate_cache();

        tracing::trace!(
            message = "split page",
            buffer = %self.name(),
            page_index = location.page_index,
            at = location.offset_in_page,
        );

        Ok(location.page_index + 1)
    }

    fn splice_pages(
        &mut self,
        index: usize,
        new_pages: impl IntoIterator<Item = Page>,
        added: ByteLength,
    ) -> EditBufferResult<()> {
        let tail = self.pages.split_off(index);
        self.pages.extend(new_pages);
        self.pages.extend(tail);
        self.total_size += added;
        self.invalidate_cache();
        self.verify()
    }
}
