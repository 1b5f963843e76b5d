// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Range reads, and in place writes that never change the size of a [`PageTable`].

use std::ops::Range;

use crate::{ByteIndex, ByteLength, EditBufferResult, Page, PageTable, byte_len};

impl PageTable {
    /// Copy `out.len()` bytes starting at `offset` into `out`.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    pub fn read_into(&self, offset: impl Into<ByteIndex>, out: &mut [u8]) -> EditBufferResult<()> {
        let mut copied = 0;
        self.for_each_run(offset.into(), byte_len(out.len()), |page, run| {
            let len = run.len();
            out[copied..copied + len].copy_from_slice(&page.data()[run]);
            copied += len;
        })
    }

    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    pub fn read(
        &self,
        offset: impl Into<ByteIndex>,
        size: impl Into<ByteLength>,
    ) -> EditBufferResult<Vec<u8>> {
        let size = size.into();
        let mut acc = Vec::with_capacity(size.as_usize());
        self.for_each_run(offset.into(), size, |page, run| {
            acc.extend_from_slice(&page.data()[run]);
        })?;
        Ok(acc)
    }

    /// The whole logical byte array.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        let mut acc = Vec::with_capacity(self.total_size.as_usize());
        for page in &self.pages {
            acc.extend_from_slice(page.data());
        }
        acc
    }

    #[must_use]
    pub fn byte_at(&self, offset: impl Into<ByteIndex>) -> Option<u8> {
        let location = self.find_page(offset).ok()?;
        self.pages
            .get(location.page_index)?
            .data()
            .get(location.offset_in_page)
            .copied()
    }

    /// Overwrite `[offset, offset + data.len())` with `data`. Every touched page is made
    /// mutable first, so bytes shared with another owner are copied, never written.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end. Use an
    /// insert to grow the table.
    pub fn write(&mut self, offset: impl Into<ByteIndex>, data: &[u8]) -> EditBufferResult<()> {
        let offset = offset.into();
        self.ensure_consistent()?;
        self.check_range(offset, byte_len(data.len()))?;
        if data.is_empty() {
            return Ok(());
        }

        let location = self.find_page(offset)?;
        let mut page_index = location.page_index;
        let mut offset_in_page = location.offset_in_page;
        let mut written = 0;

        while written < data.len() {
            let Some(page) = self.pages.get_mut(page_index) else {
                return Err(self.inconsistent_state_error());
            };
            let len = (page.size() - offset_in_page).min(data.len() - written);
            page.make_mutable()[offset_in_page..offset_in_page + len]
                .copy_from_slice(&data[written..written + len]);
            written += len;
            page_index += 1;
            offset_in_page = 0;
        }

        tracing::trace!(
            message = "write bytes",
            buffer = %self.name(),
            offset = %offset,
            size = data.len(),
        );

        Ok(())
    }

    /// Visit the pages that cover `[offset, offset + size)` in order. `f` receives each
    /// page along with the part of it (relative to the page start) inside the range.
    ///
    /// # Errors
    ///
    /// [`crate::EditBufferError::InvalidRange`] if the range runs past the end.
    pub fn for_each_run(
        &self,
        offset: ByteIndex,
        size: ByteLength,
        mut f: impl FnMut(&Page, Range<usize>),
    ) -> EditBufferResult<()> {
        self.check_range(offset, size)?;
        if size.is_zero() {
            return Ok(());
        }

        let location = self.find_page(offset)?;
        let mut page_index = location.page_index;
        let mut offset_in_page = location.offset_in_page;
        let mut remaining = size.as_usize();

        while remaining > 0 {
            let Some(page) = self.pages.get(page_index) else {
                return Err(self.inconsistent_state_error());
            };
            let len = (page.size() - offset_in_page).min(remaining);
            f(page, offset_in_page..offset_in_page + len);
            remaining -= len;
            page_index += 1;
            offset_in_page = 0;
        }

        Ok(())
    }
}
