// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::{Add, AddAssign, Deref, DerefMut, Sub, SubAssign};

use crate::ByteIndex;

/// Represents a byte length measurement (1-based).
///
/// A `ByteLength` is the number of bytes in a page, a range, or a whole buffer. Unlike
/// [`ByteIndex`] which is 0-based (representing positions), `ByteLength` is 1-based
/// (representing sizes/counts).
///
/// ```rust
/// use r3bl_edit_buffer::{ByteLength, byte_len};
///
/// let length = byte_len(42);
/// assert_eq!(length, ByteLength::from(42usize));
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Ord, PartialOrd, Eq, Hash)]
pub struct ByteLength(pub usize);

/// Creates a new [`ByteLength`] from any type that can be converted into it.
pub fn byte_len(arg_byte_length: impl Into<ByteLength>) -> ByteLength {
    arg_byte_length.into()
}

impl ByteLength {
    #[must_use]
    pub fn as_usize(&self) -> usize { self.0 }

    #[must_use]
    pub fn is_zero(&self) -> bool { self.0 == 0 }

    /// The position right after the last byte, ie: the only valid offset for an append.
    #[must_use]
    pub fn end_index(&self) -> ByteIndex { ByteIndex(self.0) }
}

impl Deref for ByteLength {
    type Target = usize;
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl DerefMut for ByteLength {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl From<usize> for ByteLength {
    fn from(it: usize) -> Self { Self(it) }
}

impl Add for ByteLength {
    type Output = ByteLength;
    fn add(self, rhs: Self) -> Self::Output { ByteLength(self.0 + rhs.0) }
}

impl AddAssign for ByteLength {
    fn add_assign(&mut self, rhs: Self) { self.0 += rhs.0; }
}

impl Sub for ByteLength {
    type Output = ByteLength;
    fn sub(self, rhs: Self) -> Self::Output { ByteLength(self.0.saturating_sub(rhs.0)) }
}

impl SubAssign for ByteLength {
    fn sub_assign(&mut self, rhs: Self) { self.0 = self.0.saturating_sub(rhs.0); }
}

impl std::fmt::Display for ByteLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
