// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod charset;
pub mod config;
pub mod error;
pub mod log;
pub mod units;

// Re-export.
pub use charset::*;
pub use config::*;
pub use error::*;
pub use log::*;
pub use units::*;
