// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tunables for page storage, the undo log, and buffer I/O. A [`BufferConfig`] is
//! passed explicitly to [`crate::EditBuffer::new_with_config`], there is no process
//! wide configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{EditBufferError, EditBufferResult};

/// Soft upper bound for the size of a single [`crate::Page`].
pub const MAX_PAGE_SIZE: usize = 4096;

/// Maximum number of [`crate::LogEntry`] records kept in a log buffer.
pub const NB_LOGS_MAX: usize = 50;

/// Chunk size used when streaming content in and out of a buffer.
pub const IOBUF_SIZE: usize = 32768;

/// Files at least this big are loaded as a single shared backing store.
pub const MIN_SHARED_LOAD_SIZE: usize = 1024 * 1024;

/// How the previous version of a file is preserved when a buffer is saved over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupMethod {
    /// Overwrite the file, keep nothing.
    #[default]
    None,
    /// Rename `name` to `name~` before writing (the standard emacs way).
    Tilde,
    /// Move the old file into the given directory, keeping its file name.
    Dir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub max_page_size: usize,
    pub nb_logs_max: usize,
    pub io_chunk_size: usize,
    pub shared_load_threshold: usize,
    pub backup_method: BackupMethod,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_page_size: MAX_PAGE_SIZE,
            nb_logs_max: NB_LOGS_MAX,
            io_chunk_size: IOBUF_SIZE,
            shared_load_threshold: MIN_SHARED_LOAD_SIZE,
            backup_method: BackupMethod::None,
        }
    }
}

impl BufferConfig {
    /// Parse a config from JSON. Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`EditBufferError::InvalidConfig`] if the JSON is malformed, or if any of
    /// the sizes is zero.
    pub fn try_from_json_str(json: &str) -> EditBufferResult<Self> {
        let it: Self =
            serde_json::from_str(json).map_err(|err| EditBufferError::InvalidConfig {
                reason: err.to_string(),
            })?;
        it.validate()?;
        Ok(it)
    }

    /// # Errors
    ///
    /// Returns [`EditBufferError::InvalidConfig`] if any of the sizes is zero.
    pub fn validate(&self) -> EditBufferResult<()> {
        let zero_field = [
            ("max_page_size", self.max_page_size),
            ("nb_logs_max", self.nb_logs_max),
            ("io_chunk_size", self.io_chunk_size),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        match zero_field {
            Some((field, _)) => Err(EditBufferError::InvalidConfig {
                reason: format!("{field} must be greater than zero"),
            }),
            None => Ok(()),
        }
    }
}
