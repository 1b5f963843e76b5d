// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::{ByteIndex, ByteLength, LogOp, byte_index};

/// Describes a mutation that is about to be applied to an [`crate::EditBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modification {
    pub op: LogOp,
    pub offset: ByteIndex,
    pub size: ByteLength,
}

pub type ModificationCallback = Box<dyn FnMut(&Modification) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

/// Callbacks that observe every insert, delete, and write of a buffer. Hosts use them to
/// keep marks, cursors, and selections in sync (see [`adjust_offset`]).
#[derive(Default)]
pub struct ModificationCallbacks {
    next_id: usize,
    entries: SmallVec<[(CallbackId, ModificationCallback); 2]>,
}

impl Debug for ModificationCallbacks {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<_> = self.entries.iter().map(|(id, _)| id.0).collect();
        f.debug_struct("ModificationCallbacks")
            .field("ids", &ids)
            .finish()
    }
}

impl ModificationCallbacks {
    pub fn add(&mut self, callback: ModificationCallback) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    /// Returns `false` if no callback with this id is registered.
    pub fn remove(&mut self, id: CallbackId) -> bool {
        let len_before = self.entries.len();
        self.entries.retain(|(it, _)| *it != id);
        self.entries.len() != len_before
    }

    pub fn notify(&mut self, modification: &Modification) {
        for (_, callback) in &mut self.entries {
            callback(modification);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Move an offset that the host tracks so it keeps pointing at the same byte after
/// `modification`. Offsets after an insertion point shift right. Offsets after a
/// deletion shift left, and offsets inside the deleted range collapse to its start.
/// Writes don't move anything.
#[must_use]
pub fn adjust_offset(tracked: ByteIndex, modification: &Modification) -> ByteIndex {
    let offset = modification.offset;
    match modification.op {
        LogOp::Insert if tracked > offset => tracked + modification.size,
        LogOp::Delete if tracked > offset => byte_index(
            tracked
                .as_usize()
                .saturating_sub(modification.size.as_usize())
                .max(offset.as_usize()),
        ),
        _ => tracked,
    }
}
