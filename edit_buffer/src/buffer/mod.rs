// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod buffer_flags;
pub mod edit_buffer_ops;
pub mod edit_buffer_struct;
pub mod line_ops;
pub mod log_entry;
pub mod modification_callbacks;
pub mod undo_log;

// Re-export.
pub use buffer_flags::*;
pub use edit_buffer_struct::*;
pub use log_entry::*;
pub use modification_callbacks::*;
pub use undo_log::*;
