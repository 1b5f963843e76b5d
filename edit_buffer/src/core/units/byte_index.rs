// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::{Add, Deref, DerefMut, Sub};

use crate::ByteLength;

/// Represents a zero-based byte offset into the logical byte array of an
/// [`crate::EditBuffer`] or [`crate::PageTable`]. Offsets are independent of page
/// boundaries.
#[derive(Debug, Copy, Clone, Default, PartialEq, Ord, PartialOrd, Eq, Hash)]
pub struct ByteIndex(pub usize);

impl ByteIndex {
    #[must_use]
    pub fn as_usize(&self) -> usize { self.0 }

    /// Returns `true` if this offset is past the end of something that is `length`
    /// bytes long. An offset equal to the length is allowed, since it is the position
    /// "after the last byte".
    #[must_use]
    pub fn is_past_end(&self, length: ByteLength) -> bool { self.0 > length.as_usize() }
}

pub fn byte_index(arg_byte_index: impl Into<ByteIndex>) -> ByteIndex {
    arg_byte_index.into()
}

impl Deref for ByteIndex {
    type Target = usize;
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl DerefMut for ByteIndex {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl From<usize> for ByteIndex {
    fn from(it: usize) -> Self { Self(it) }
}

impl Add<ByteLength> for ByteIndex {
    type Output = ByteIndex;
    fn add(self, rhs: ByteLength) -> Self::Output { ByteIndex(self.0 + rhs.as_usize()) }
}

impl Sub<ByteIndex> for ByteIndex {
    type Output = ByteLength;
    fn sub(self, rhs: ByteIndex) -> Self::Output {
        ByteLength(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Display for ByteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
