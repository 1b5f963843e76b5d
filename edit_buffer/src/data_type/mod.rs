// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pluggable load / save of buffer content.
//!
//! A [`BufferDataType`] converts an external byte stream into inserts on an
//! [`crate::EditBuffer`], and streams the buffer back out on save. Implementations are
//! looked up by name in a [`DataTypeRegistry`], which is a plain value owned by whoever
//! creates buffers.

// Attach.
pub mod backup;
pub mod data_type_api;
pub mod data_type_registry;
pub mod raw_data_type;

// Re-export.
pub use backup::*;
pub use data_type_api::*;
pub use data_type_registry::*;
pub use raw_data_type::*;
