// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::{Path, PathBuf};

use crate::{BufferConfig, BufferFlags, ByteIndex, ByteLength, CallbackId,
            EditBufferError, EditBufferResult, Modification, ModificationCallbacks,
            PageFlags, PageTable, RAW_DATA_TYPE_NAME, SharedCharset, utf8_charset};

/// A mutable byte sequence of unbounded length, backed by a [`PageTable`].
///
/// On top of the page table, a buffer adds:
/// - [`BufferFlags`] (read only, logging, loading / saving state, etc).
/// - A modified indicator, set by the first mutation and cleared explicitly.
/// - An undo log. This is another (`SYSTEM` flagged) [`EditBuffer`] holding serialized
///   [`crate::LogEntry`] records. It is created on the first logged mutation, and is
///   owned by this buffer.
/// - Modification callbacks, a [`crate::CharsetDecoder`], and the file name and
///   [`crate::BufferDataType`] name used to load and save it.
///
/// Mutations go through the methods in `edit_buffer_ops.rs`, which validate their
/// arguments, then log, then touch the page table.
#[derive(Debug)]
pub struct EditBuffer {
    pub(crate) pages: PageTable,
    pub(crate) name: String,
    pub(crate) flags: BufferFlags,
    pub(crate) modified: bool,
    pub(crate) log_buffer: Option<Box<EditBuffer>>,
    pub(crate) nb_logs: usize,
    /// Start of the last undone record in the log buffer. [None] means the next undo
    /// starts from the newest record.
    pub(crate) undo_cursor: Option<ByteIndex>,
    pub(crate) undo_in_progress: bool,
    pub(crate) config: BufferConfig,
    pub(crate) charset: SharedCharset,
    pub(crate) callbacks: ModificationCallbacks,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) data_type_name: String,
}

impl EditBuffer {
    /// Create an empty buffer with the default [`BufferConfig`].
    #[must_use]
    pub fn new(name: impl Into<String>, flags: BufferFlags) -> Self {
        Self::with_valid_config(name.into(), flags, BufferConfig::default())
    }

    /// # Errors
    ///
    /// [`EditBufferError::InvalidConfig`] if `config` fails validation.
    pub fn new_with_config(
        name: impl Into<String>,
        flags: BufferFlags,
        config: BufferConfig,
    ) -> EditBufferResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(name.into(), flags, config))
    }

    pub(crate) fn with_valid_config(name: String, flags: BufferFlags, config: BufferConfig) -> Self {
        Self {
            pages: PageTable::new(name.clone(), config.max_page_size),
            name,
            flags,
            modified: false,
            log_buffer: None,
            nb_logs: 0,
            undo_cursor: None,
            undo_in_progress: false,
            config,
            charset: utf8_charset(),
            callbacks: ModificationCallbacks::default(),
            filename: None,
            data_type_name: RAW_DATA_TYPE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.pages.set_name(self.name.clone());
    }

    #[must_use]
    pub fn total_size(&self) -> ByteLength { self.pages.total_size() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.pages.is_empty() }

    #[must_use]
    pub fn flags(&self) -> BufferFlags { self.flags }

    pub fn set_flags(&mut self, flags: BufferFlags) { self.flags = flags; }

    pub fn set_flag(&mut self, flag: BufferFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool { self.flags.contains(BufferFlags::READ_ONLY) }

    #[must_use]
    pub fn is_modified(&self) -> bool { self.modified }

    pub fn set_modified(&mut self, modified: bool) { self.modified = modified; }

    #[must_use]
    pub fn config(&self) -> &BufferConfig { &self.config }

    #[must_use]
    pub fn page_table(&self) -> &PageTable { &self.pages }

    #[must_use]
    pub fn charset(&self) -> &SharedCharset { &self.charset }

    /// Swap the decoder used for character and line queries. Cached character and
    /// position metrics of every page are dropped.
    pub fn set_charset(&mut self, charset: SharedCharset) {
        tracing::debug!(
            message = "set charset",
            buffer = %self.name,
            charset = charset.name(),
        );
        self.charset = charset;
        self.pages
            .invalidate_metrics(PageFlags::VALID_CHAR | PageFlags::VALID_POS);
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> { self.filename.as_deref() }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    /// Name of the [`crate::BufferDataType`] that loads and saves this buffer.
    #[must_use]
    pub fn data_type_name(&self) -> &str { &self.data_type_name }

    pub fn set_data_type_name(&mut self, name: impl Into<String>) {
        self.data_type_name = name.into();
    }

    /// Register `callback`, which is invoked right before every insert, delete, and
    /// write (including the ones performed by [`Self::undo`]).
    pub fn add_callback(
        &mut self,
        callback: impl FnMut(&Modification) + Send + 'static,
    ) -> CallbackId {
        self.callbacks.add(Box::new(callback))
    }

    /// Returns `false` if no callback with this id is registered.
    pub fn remove_callback(&mut self, id: CallbackId) -> bool { self.callbacks.remove(id) }

    /// # Errors
    ///
    /// - [`EditBufferError::BufferReadOnly`] if the `READ_ONLY` flag is set.
    /// - [`EditBufferError::InconsistentState`] if the page table lost track of its size.
    pub fn ensure_mutable(&self) -> EditBufferResult<()> {
        if self.is_read_only() {
            return Err(EditBufferError::BufferReadOnly {
                name: self.name.clone(),
            });
        }
        self.pages.ensure_consistent()
    }
}
