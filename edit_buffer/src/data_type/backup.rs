// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fs,
          path::{Path, PathBuf}};

use crate::{BackupMethod, EditBufferError, EditBufferResult};

/// Where `method` would keep the previous version of `path`, or [None] for
/// [`BackupMethod::None`].
#[must_use]
pub fn backup_path(path: &Path, method: &BackupMethod) -> Option<PathBuf> {
    match method {
        BackupMethod::None => None,
        BackupMethod::Tilde => {
            let mut acc = path.as_os_str().to_owned();
            acc.push("~");
            Some(PathBuf::from(acc))
        }
        BackupMethod::Dir(dir) => path.file_name().map(|file_name| dir.join(file_name)),
    }
}

/// Move the existing file at `path` out of the way according to `method`. Returns the
/// backup location, or [None] if there was nothing to back up.
///
/// # Errors
///
/// [`EditBufferError::Io`] if the backup directory can't be created, or the file can't
/// be moved or copied.
pub fn make_backup(path: &Path, method: &BackupMethod) -> EditBufferResult<Option<PathBuf>> {
    let Some(backup) = backup_path(path, method) else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    if let BackupMethod::Dir(dir) = method {
        fs::create_dir_all(dir).map_err(|err| {
            EditBufferError::io(format!("create backup dir {}", dir.display()), err)
        })?;
    }

    // A rename can't cross file systems, fall back to a copy.
    if let Err(rename_err) = fs::rename(path, &backup) {
        tracing::debug!(
            message = "rename for backup failed, copying instead",
            path = %path.display(),
            error = %rename_err,
        );
        fs::copy(path, &backup).map_err(|err| {
            EditBufferError::io(
                format!("back up {} to {}", path.display(), backup.display()),
                err,
            )
        })?;
    }

    tracing::debug!(
        message = "backup",
        path = %path.display(),
        backup = %backup.display(),
    );
    Ok(Some(backup))
}
