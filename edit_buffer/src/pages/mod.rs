// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Paged storage. A [`PageTable`] stitches an ordered run of [`Page`]s together into a
//! single logical byte array.
//!
//! ```text
//! offset:   0         4096      8192  9000            13096
//!           ├─────────┼─────────┼─────┼───────────────┤
//! pages:    │ page 0  │ page 1  │ p 2 │    page 3     │
//!           │ owned   │ shared  │ own │    shared     │
//!           └─────────┴─────────┴─────┴───────────────┘
//!                         ▲
//!                         └── cache: (page_index: 1, page_start: 4096)
//! ```
//!
//! Shared pages point into a reference counted backing store (eg: a file that was
//! loaded in one go) and are copied into owned storage right before their first
//! mutation.

// Attach.
pub mod page;
pub mod page_table;
pub mod page_table_edit;
pub mod page_table_position;
pub mod page_table_rw;

// Re-export.
pub use page::*;
pub use page_table::*;
