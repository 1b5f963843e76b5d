// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

use miette::IntoDiagnostic;
use tracing_appender::rolling::{self, RollingFileAppender};

/// Open `log_file_path` for appending, creating its parent directory if needed. A bare
/// file name (eg: `edit_buffer.log`) goes in the current directory. The file is never
/// rotated.
///
/// Don't wrap the result in `tracing_appender::non_blocking`, the guard would have to
/// outlive the global subscriber.
///
/// # Errors
///
/// Returns an error if the path has no file name, or the parent directory can't be
/// created.
pub fn try_create(log_file_path: &Path) -> miette::Result<RollingFileAppender> {
    let file_name = log_file_path.file_name().ok_or_else(|| {
        miette::miette!(
            "Log file path {} doesn't end in a file name",
            log_file_path.display()
        )
    })?;

    let dir = match log_file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).into_diagnostic()?;

    Ok(rolling::never(dir, file_name))
}
