// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Optional helpers to route the `tracing` events that this crate emits to stdout,
//! stderr, or a log file. The library itself never installs a subscriber, that is up
//! to the host application (or a test).

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
