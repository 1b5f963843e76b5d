// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{path::Path, sync::Arc};

use crate::{BufferDataType, BufferFlags, EditBuffer, EditBufferError, EditBufferResult,
            RawDataType, make_backup};

pub type SharedDataType = Arc<dyn BufferDataType>;

/// Name → [`BufferDataType`] table, plus the load / save orchestration that wraps the
/// data type calls (buffer flags, backups, file permissions, undo log reset).
///
/// There is no process wide registry. Create one (usually with
/// [`DataTypeRegistry::with_defaults`]) and pass it to whatever loads and saves buffers.
#[derive(Debug, Default, Clone)]
pub struct DataTypeRegistry {
    data_types: Vec<SharedDataType>,
}

impl DataTypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A registry with [`RawDataType`] registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut it = Self::new();
        it.register(RawDataType);
        it
    }

    /// Add `data_type`, replacing any data type that has the same name.
    pub fn register(&mut self, data_type: impl BufferDataType + 'static) {
        let name = data_type.name();
        self.data_types.retain(|it| it.name() != name);
        self.data_types.push(Arc::new(data_type));
        tracing::debug!(message = "register data type", name);
    }

    /// # Errors
    ///
    /// [`EditBufferError::UnknownDataType`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> EditBufferResult<SharedDataType> {
        self.data_types
            .iter()
            .find(|it| it.name() == name)
            .cloned()
            .ok_or_else(|| EditBufferError::UnknownDataType {
                name: name.to_string(),
            })
    }

    /// Registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.data_types.iter().map(|it| it.name()).collect()
    }

    /// Load the file at `path` into `buffer` using the buffer's data type.
    ///
    /// The buffer is flagged `LOADING` for the duration, which keeps the bulk inserts
    /// out of the undo log. On success, `path` becomes the buffer's file name and the
    /// modified indicator is cleared. On failure, whatever was loaded stays in the
    /// buffer.
    ///
    /// # Errors
    ///
    /// - [`EditBufferError::BufferReadOnly`] or [`EditBufferError::IoInProgress`] if the
    ///   buffer can't be loaded into right now.
    /// - [`EditBufferError::UnknownDataType`] if the buffer's data type isn't registered.
    /// - [`EditBufferError::Io`] if the file can't be read.
    pub fn load_file(&self, buffer: &mut EditBuffer, path: &Path) -> EditBufferResult<()> {
        ensure_not_busy(buffer)?;
        buffer.ensure_mutable()?;
        let data_type = self.get(buffer.data_type_name())?;

        buffer.set_flag(BufferFlags::LOADING, true);
        let result = data_type.load_file(buffer, path);
        buffer.set_flag(BufferFlags::LOADING, false);

        match result {
            Ok(()) => {
                buffer.set_filename(path);
                buffer.set_modified(false);
                tracing::debug!(
                    message = "load file",
                    buffer = %buffer.name(),
                    path = %path.display(),
                    data_type = data_type.name(),
                    total_size = %buffer.total_size(),
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    message = "load file failed",
                    buffer = %buffer.name(),
                    path = %path.display(),
                    error = %err,
                );
                Err(err)
            }
        }
    }

    /// Save `buffer` to its file name using its data type. The previous file is backed
    /// up according to [`crate::BufferConfig::backup_method`] and its permissions are
    /// carried over to the new file. On success the undo log is reset and the buffer is
    /// no longer modified.
    ///
    /// # Errors
    ///
    /// - [`EditBufferError::NoFileName`] if the buffer has no file name.
    /// - [`EditBufferError::IoInProgress`] if the buffer is being loaded or saved.
    /// - [`EditBufferError::UnknownDataType`] if the buffer's data type isn't registered.
    /// - [`EditBufferError::Io`] if the backup or the write fails.
    pub fn save_buffer(&self, buffer: &mut EditBuffer) -> EditBufferResult<()> {
        let path = buffer
            .filename()
            .map(Path::to_path_buf)
            .ok_or_else(|| EditBufferError::NoFileName {
                name: buffer.name().to_string(),
            })?;
        ensure_not_busy(buffer)?;
        let data_type = self.get(buffer.data_type_name())?;

        let old_permissions = std::fs::metadata(&path).ok().map(|it| it.permissions());
        let backup = make_backup(&path, &buffer.config().backup_method)?;

        buffer.set_flag(BufferFlags::SAVING, true);
        let result = data_type.save(buffer, &path);
        buffer.set_flag(BufferFlags::SAVING, false);
        result?;

        if let Some(permissions) = old_permissions {
            std::fs::set_permissions(&path, permissions).map_err(|err| {
                EditBufferError::io(format!("restore permissions of {}", path.display()), err)
            })?;
        }

        buffer.log_reset();
        tracing::debug!(
            message = "save buffer",
            buffer = %buffer.name(),
            path = %path.display(),
            backup = ?backup,
        );
        Ok(())
    }

    /// Let the buffer's data type release whatever it holds for `buffer`.
    ///
    /// # Errors
    ///
    /// [`EditBufferError::UnknownDataType`] if the buffer's data type isn't registered.
    pub fn close(&self, buffer: &mut EditBuffer) -> EditBufferResult<()> {
        self.get(buffer.data_type_name())?.close(buffer);
        Ok(())
    }
}

fn ensure_not_busy(buffer: &EditBuffer) -> EditBufferResult<()> {
    if buffer
        .flags()
        .intersects(BufferFlags::LOADING | BufferFlags::SAVING)
    {
        return Err(EditBufferError::IoInProgress {
            name: buffer.name().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BackupMethod, BufferConfig, byte_index, byte_len};

    /// Upper cases on load, to tell it apart from raw.
    #[derive(Debug)]
    struct UpperCase;

    impl BufferDataType for UpperCase {
        fn name(&self) -> &'static str { "upper" }

        fn load(&self, buffer: &mut EditBuffer, reader: &mut dyn Read) -> EditBufferResult<()> {
            let mut acc = vec![];
            reader
                .read_to_end(&mut acc)
                .map_err(|err| EditBufferError::io("read", err))?;
            buffer.append(&acc.to_ascii_uppercase())
        }

        fn save(&self, buffer: &EditBuffer, path: &Path) -> EditBufferResult<()> {
            RawDataType.save(buffer, path)
        }
    }

    #[test]
    fn test_lookup() {
        let mut registry = DataTypeRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["raw"]);
        registry.register(UpperCase);
        registry.register(UpperCase);
        assert_eq!(registry.names(), vec!["raw", "upper"]);
        assert_eq!(registry.get("upper").unwrap().name(), "upper");
        assert!(matches!(
            registry.get("html"),
            Err(EditBufferError::UnknownDataType { .. })
        ));
        assert!(DataTypeRegistry::new().get("raw").is_err());
    }

    #[test]
    fn test_load_file_is_not_logged_and_not_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"loaded").unwrap();

        let registry = DataTypeRegistry::with_defaults();
        let mut buffer = EditBuffer::new("in.txt", BufferFlags::SAVE_LOG);
        registry.load_file(&mut buffer, &path).unwrap();

        assert_eq!(buffer.contents(), b"loaded");
        assert_eq!(buffer.nb_logs(), 0);
        assert!(!buffer.is_modified());
        assert_eq!(buffer.filename(), Some(path.as_path()));
        assert!(!buffer.flags().contains(BufferFlags::LOADING));
    }

    #[test]
    fn test_load_file_uses_buffer_data_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"shout").unwrap();

        let mut registry = DataTypeRegistry::with_defaults();
        registry.register(UpperCase);
        let mut buffer = EditBuffer::new("in.txt", BufferFlags::empty());
        buffer.set_data_type_name("upper");
        registry.load_file(&mut buffer, &path).unwrap();
        assert_eq!(buffer.contents(), b"SHOUT");
    }

    #[test]
    fn test_load_file_failure() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DataTypeRegistry::with_defaults();
        let mut buffer = EditBuffer::new("x", BufferFlags::empty());
        let result = registry.load_file(&mut buffer, &dir.path().join("missing"));
        assert!(matches!(result, Err(EditBufferError::Io { .. })));
        assert!(buffer.filename().is_none());
        assert!(!buffer.flags().contains(BufferFlags::LOADING));
    }

    #[test]
    fn test_load_into_busy_or_read_only_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"x").unwrap();
        let registry = DataTypeRegistry::with_defaults();

        let mut buffer = EditBuffer::new("busy", BufferFlags::SAVING);
        assert!(matches!(
            registry.load_file(&mut buffer, &path),
            Err(EditBufferError::IoInProgress { .. })
        ));

        let mut buffer = EditBuffer::new("ro", BufferFlags::READ_ONLY);
        assert!(matches!(
            registry.load_file(&mut buffer, &path),
            Err(EditBufferError::BufferReadOnly { .. })
        ));
    }

    #[test]
    fn test_save_without_file_name() {
        let registry = DataTypeRegistry::with_defaults();
        let mut buffer = EditBuffer::new("scratch", BufferFlags::empty());
        assert!(matches!(
            registry.save_buffer(&mut buffer),
            Err(EditBufferError::NoFileName { .. })
        ));
    }

    #[test]
    fn test_save_backs_up_and_resets_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"version 1").unwrap();

        let config = BufferConfig {
            backup_method: BackupMethod::Tilde,
            ..Default::default()
        };
        let registry = DataTypeRegistry::with_defaults();
        let mut buffer =
            EditBuffer::new_with_config("doc.txt", BufferFlags::SAVE_LOG, config).unwrap();
        registry.load_file(&mut buffer, &path).unwrap();
        buffer.write(byte_index(8), b"2").unwrap();
        assert_eq!(buffer.nb_logs(), 1);

        registry.save_buffer(&mut buffer).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"version 2");
        assert_eq!(std::fs::read(dir.path().join("doc.txt~")).unwrap(), b"version 1");
        assert_eq!(buffer.nb_logs(), 0);
        assert!(!buffer.is_modified());
        assert_eq!(buffer.undo().unwrap(), None);
        assert_eq!(buffer.total_size(), byte_len(9));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).unwrap();

        let config = BufferConfig {
            backup_method: BackupMethod::Tilde,
            ..Default::default()
        };
        let registry = DataTypeRegistry::with_defaults();
        let mut buffer =
            EditBuffer::new_with_config("script.sh", BufferFlags::empty(), config).unwrap();
        registry.load_file(&mut buffer, &path).unwrap();
        buffer.append(b"exit 0\n").unwrap();
        registry.save_buffer(&mut buffer).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
