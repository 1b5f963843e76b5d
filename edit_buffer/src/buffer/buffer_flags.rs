// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use bitflags::bitflags;

bitflags! {
    /// Buffer level flags of an [`crate::EditBuffer`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferFlags: u16 {
        /// Record every mutation in the undo log.
        const SAVE_LOG  = 0b0000_0001;
        /// Internal buffer that is hidden from the user, eg: a log buffer.
        const SYSTEM    = 0b0000_0010;
        /// Reject every mutation with [`crate::EditBufferError::BufferReadOnly`].
        const READ_ONLY = 0b0000_0100;
        /// Presentation hint, no effect on storage.
        const PREVIEW   = 0b0000_1000;
        /// Set while a data type streams content in. Suppresses undo logging.
        const LOADING   = 0b0001_0000;
        /// Set while a data type streams content out.
        const SAVING    = 0b0010_0000;
        /// Presentation hint, no effect on storage.
        const DIRED     = 0b0100_0000;
    }
}
