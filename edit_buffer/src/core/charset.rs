// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pluggable character decoding used for char offset and line navigation queries.
//!
//! The storage core only ever deals in bytes. Whenever it needs to know where a
//! character starts, or how many characters a page holds, it asks the
//! [`CharsetDecoder`] attached to the buffer. Real charset conversion belongs to the
//! host application, which can plug its own decoder in via
//! [`crate::EditBuffer::set_charset`].

use std::{fmt::Debug, sync::Arc};

/// Shared handle to a decoder, cheap to clone into every buffer that uses it.
pub type SharedCharset = Arc<dyn CharsetDecoder>;

pub trait CharsetDecoder: Debug + Send + Sync {
    /// Name of the charset, eg: `"utf-8"`.
    fn name(&self) -> &'static str;

    /// Returns `true` if `byte` begins a new character.
    fn is_char_start(&self, byte: u8) -> bool;

    /// Decode the character at the start of `bytes` (which is never empty). Returns the
    /// code point and the number of bytes it occupies.
    fn decode_next(&self, bytes: &[u8]) -> (u32, usize);

    /// Upper bound of the number of bytes a single character can occupy.
    fn max_char_bytes(&self) -> usize;

    fn count_chars(&self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|byte| self.is_char_start(**byte)).count()
    }

    /// Byte offset of the character with index `pos` inside `bytes`, or [None] if
    /// `bytes` holds `pos` characters or fewer.
    fn char_offset(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, byte)| self.is_char_start(**byte))
            .nth(pos)
            .map(|(offset, _)| offset)
    }
}

/// UTF-8 approximation: a byte starts a character if it is `< 0x80` or `>= 0xC0`.
///
/// Continuation bytes (`0x80..=0xBF`) never start a character. Malformed sequences are
/// not detected when counting, they are only caught (and decoded byte by byte) by
/// [`CharsetDecoder::decode_next`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Approx;

/// One byte per character, eg: Latin-1 or raw binary content.
#[derive(Debug, Default, Clone, Copy)]
pub struct EightBit;

#[must_use]
pub fn is_utf8_char_start(byte: u8) -> bool { !(0x80..0xC0).contains(&byte) }

/// Count the characters in `data` using the UTF-8 lead byte rule of [`Utf8Approx`].
#[must_use]
pub fn count_chars_utf8_approx(data: &[u8]) -> usize {
    data.iter().filter(|byte| is_utf8_char_start(**byte)).count()
}

fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

impl CharsetDecoder for Utf8Approx {
    fn name(&self) -> &'static str { "utf-8" }

    fn is_char_start(&self, byte: u8) -> bool { is_utf8_char_start(byte) }

    fn decode_next(&self, bytes: &[u8]) -> (u32, usize) {
        let lead = bytes[0];
        let seq_len = utf8_sequence_len(lead);
        if seq_len > 1
            && let Some(seq) = bytes.get(..seq_len)
            && let Ok(decoded) = std::str::from_utf8(seq)
            && let Some(ch) = decoded.chars().next()
        {
            return (u32::from(ch), seq_len);
        }
        (u32::from(lead), 1)
    }

    fn max_char_bytes(&self) -> usize { 4 }

    fn count_chars(&self, bytes: &[u8]) -> usize { count_chars_utf8_approx(bytes) }
}

impl CharsetDecoder for EightBit {
    fn name(&self) -> &'static str { "8bit" }

    fn is_char_start(&self, _byte: u8) -> bool { true }

    fn decode_next(&self, bytes: &[u8]) -> (u32, usize) { (u32::from(bytes[0]), 1) }

    fn max_char_bytes(&self) -> usize { 1 }

    fn count_chars(&self, bytes: &[u8]) -> usize { bytes.len() }

    fn char_offset(&self, bytes: &[u8], pos: usize) -> Option<usize> {
        (pos < bytes.len()).then_some(pos)
    }
}

#[must_use]
pub fn utf8_charset() -> SharedCharset { Arc::new(Utf8Approx) }

#[must_use]
pub fn eight_bit_charset() -> SharedCharset { Arc::new(EightBit) }

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(b"hello", 5; "ascii")]
    #[test_case("héllo".as_bytes(), 5; "two byte sequence")]
    #[test_case("日本".as_bytes(), 2; "three byte sequences")]
    #[test_case("😀!".as_bytes(), 2; "four byte sequence")]
    #[test_case(&[0x80, 0x80, 0x41], 1; "stray continuation bytes")]
    fn test_count_chars_utf8(data: &[u8], expected: usize) {
        assert_eq!(count_chars_utf8_approx(data), expected);
        assert_eq!(Utf8Approx.count_chars(data), expected);
    }

    #[test]
    fn test_char_offset_utf8() {
        let data = "aé日b".as_bytes();
        assert_eq!(Utf8Approx.char_offset(data, 0), Some(0));
        assert_eq!(Utf8Approx.char_offset(data, 1), Some(1));
        assert_eq!(Utf8Approx.char_offset(data, 2), Some(3));
        assert_eq!(Utf8Approx.char_offset(data, 3), Some(6));
        assert_eq!(Utf8Approx.char_offset(data, 4), None);
    }

    #[test]
    fn test_decode_next_utf8() {
        assert_eq!(Utf8Approx.decode_next(b"abc"), (u32::from('a'), 1));
        assert_eq!(Utf8Approx.decode_next("é!".as_bytes()), (u32::from('é'), 2));
        assert_eq!(Utf8Approx.decode_next("😀".as_bytes()), (u32::from('😀'), 4));
        // Truncated sequence falls back to a single byte.
        assert_eq!(Utf8Approx.decode_next(&[0xE6, 0x97]), (0xE6, 1));
    }

    #[test]
    fn test_eight_bit() {
        let data = "é".as_bytes();
        assert_eq!(EightBit.count_chars(data), 2);
        assert_eq!(EightBit.char_offset(data, 1), Some(1));
        assert_eq!(EightBit.char_offset(data, 2), None);
        assert_eq!(EightBit.decode_next(data), (0xC3, 1));
    }
}
