// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, fs::File, io::Read, path::Path};

use crate::{EditBuffer, EditBufferError, EditBufferResult};

/// A content format that knows how to fill an [`EditBuffer`] from bytes, and how to
/// write it back out.
///
/// Implementations are stateless (`&self`) and shared between buffers, so any per
/// buffer state belongs in the buffer itself.
pub trait BufferDataType: Debug + Send + Sync {
    /// Unique name used for registry lookups, eg: `"raw"`.
    fn name(&self) -> &'static str;

    /// Append everything `reader` yields to the end of `buffer`.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::Io`] if reading fails. Content inserted before the failure
    /// stays in the buffer.
    fn load(&self, buffer: &mut EditBuffer, reader: &mut dyn Read) -> EditBufferResult<()>;

    /// Append the content of the file at `path` to the end of `buffer`. The default
    /// opens the file and calls [`Self::load`].
    ///
    /// # Errors
    ///
    /// [`EditBufferError::Io`] if the file can't be opened or read.
    fn load_file(&self, buffer: &mut EditBuffer, path: &Path) -> EditBufferResult<()> {
        let mut file = File::open(path)
            .map_err(|err| EditBufferError::io(format!("open {}", path.display()), err))?;
        self.load(buffer, &mut file)
    }

    /// Write the whole content of `buffer` to `path`, replacing the file.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::Io`] if the file can't be created or written.
    fn save(&self, buffer: &EditBuffer, path: &Path) -> EditBufferResult<()>;

    /// Release anything this data type holds for `buffer`. Page data is not touched.
    fn close(&self, _buffer: &mut EditBuffer) {}
}
