//! Decoding primitives: range decode, ASCII purity scan, UTF-8 dump.

use std::io;

use codetable::{
    combine_surrogate_pair, decode_unicode, encode_utf8, is_ascii_escape, is_bytecode,
    is_lead_surrogate, is_trail_surrogate, is_unicode_escape, lead_surrogate, token_bytes,
    token_len, trail_surrogate, MAX_BMP_CODEPOINT, MAX_CODEPOINT, MAX_TOKEN_CHARS, MAX_UTF8_BYTES,
};

use crate::cursor::Cursor;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// Output element for [`decode`]: a raw ASCII byte or a UTF-16 code unit.
pub trait DecodeUnit: Copy + Default + sealed::Sealed {
    /// Widens an ASCII byte (a dictionary or escape character).
    fn from_ascii(byte: u8) -> Self;

    /// Writes the UTF-16 expansion of `codepoint`, capped to the space
    /// in `dest`; returns the full expansion length in code units.
    fn write_utf16(codepoint: u32, dest: &mut [Self]) -> usize;
}

impl DecodeUnit for u8 {
    fn from_ascii(byte: u8) -> Self {
        byte
    }

    fn write_utf16(_codepoint: u32, _dest: &mut [Self]) -> usize {
        // Byte destinations are only used after an ASCII purity check,
        // which rejects any range containing a Unicode escape.
        unreachable!("UTF-16 expansion requested into a byte destination")
    }
}

impl DecodeUnit for u16 {
    fn from_ascii(byte: u8) -> Self {
        u16::from(byte)
    }

    fn write_utf16(codepoint: u32, dest: &mut [Self]) -> usize {
        if codepoint <= MAX_BMP_CODEPOINT {
            if let Some(slot) = dest.first_mut() {
                *slot = codepoint as u16;
            }
            1
        } else {
            debug_assert!(codepoint <= MAX_CODEPOINT);
            if let Some(slot) = dest.first_mut() {
                *slot = lead_surrogate(codepoint);
            }
            if let Some(slot) = dest.get_mut(1) {
                *slot = trail_surrogate(codepoint);
            }
            2
        }
    }
}

/// Decodes characters starting at `cursor` until `dest` is full.
///
/// A nonzero sub-token offset decodes the current token into a local
/// buffer and copies the suffix; every following token decodes directly
/// into `dest`. No bytes beyond what `dest` requires are read.
pub fn decode<T: DecodeUnit>(data: &[u8], cursor: Cursor, dest: &mut [T]) {
    let mut offset = cursor.byte_offset() as usize;
    let mut written = 0usize;

    if cursor.sub_token_offset() > 0 {
        let sub = cursor.sub_token_offset() as usize;
        let mut token = [T::default(); MAX_TOKEN_CHARS];

        debug_assert!(offset < data.len());
        let code = data[offset];
        offset += 1;

        let decoded = if is_bytecode(code) {
            let bytes = token_bytes(code);
            for (slot, &byte) in token.iter_mut().zip(bytes) {
                *slot = T::from_ascii(byte);
            }
            bytes.len()
        } else if is_ascii_escape(code) {
            // An ASCII escape expands to one character, so a cursor can
            // never be parked inside one.
            unreachable!("sub-token offset on an ASCII escape")
        } else {
            debug_assert!(is_unicode_escape(code));
            debug_assert!(offset + 2 < data.len());
            let codepoint = decode_unicode(data[offset], data[offset + 1], data[offset + 2]);
            offset += 3;
            T::write_utf16(codepoint, &mut token)
        };

        debug_assert!(sub < decoded);
        let count = (decoded - sub).min(dest.len());
        dest[..count].copy_from_slice(&token[sub..sub + count]);
        written = count;
    }

    while written < dest.len() {
        debug_assert!(offset < data.len());
        let code = data[offset];
        offset += 1;

        if is_bytecode(code) {
            let bytes = token_bytes(code);
            let count = bytes.len().min(dest.len() - written);
            for (slot, &byte) in dest[written..written + count].iter_mut().zip(bytes) {
                *slot = T::from_ascii(byte);
            }
            written += count;
        } else if is_ascii_escape(code) {
            debug_assert!(offset < data.len());
            dest[written] = T::from_ascii(data[offset]);
            offset += 1;
            written += 1;
        } else {
            debug_assert!(is_unicode_escape(code));
            debug_assert!(offset + 2 < data.len());
            let codepoint = decode_unicode(data[offset], data[offset + 1], data[offset + 2]);
            offset += 3;
            let units = T::write_utf16(codepoint, &mut dest[written..]);
            written += units.min(dest.len() - written);
        }
    }
}

/// Returns `true` if no token in the `chars`-unit range starting at
/// `cursor` is a Unicode escape.
///
/// Dictionary entries are ASCII by construction, so bytecodes and ASCII
/// escapes both pass.
#[must_use]
pub fn is_ascii(data: &[u8], cursor: Cursor, chars: usize) -> bool {
    let mut offset = cursor.byte_offset() as usize;
    let mut remaining = chars as i64 + i64::from(cursor.sub_token_offset());

    while remaining > 0 {
        debug_assert!(offset < data.len());
        let code = data[offset];
        offset += 1;

        remaining -= token_len(code) as i64;
        if is_ascii_escape(code) {
            debug_assert!(offset < data.len());
            offset += 1;
        } else if is_unicode_escape(code) {
            return false;
        }
    }

    true
}

/// Writes `chars` UTF-16 code units' worth of content as UTF-8.
///
/// The stream stores codepoints, but the external count is in UTF-16
/// code units, so each token is expanded to UTF-16 first and a lead plus
/// trail surrogate inside one token recombine before UTF-8 encoding.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn dump<W: io::Write>(writer: &mut W, data: &[u8], cursor: Cursor, chars: usize) -> io::Result<()> {
    let mut offset = cursor.byte_offset() as usize;
    let mut ignore = cursor.sub_token_offset() as usize;
    let mut remaining = chars;

    while remaining > 0 {
        debug_assert!(offset < data.len());
        let code = data[offset];
        offset += 1;

        let mut token = [0u16; MAX_TOKEN_CHARS];
        let decoded = if is_bytecode(code) {
            let bytes = token_bytes(code);
            for (slot, &byte) in token.iter_mut().zip(bytes) {
                *slot = u16::from(byte);
            }
            bytes.len()
        } else if is_ascii_escape(code) {
            debug_assert!(offset < data.len());
            token[0] = u16::from(data[offset]);
            offset += 1;
            1
        } else {
            debug_assert!(is_unicode_escape(code));
            debug_assert!(offset + 2 < data.len());
            let codepoint = decode_unicode(data[offset], data[offset + 1], data[offset + 2]);
            offset += 3;
            <u16 as DecodeUnit>::write_utf16(codepoint, &mut token)
        };

        debug_assert!(ignore < decoded);
        let skip = ignore.min(decoded);
        ignore -= skip;

        let mut i = skip;
        while i < decoded && remaining > 0 {
            let mut codepoint = u32::from(token[i]);
            if is_lead_surrogate(token[i])
                && i + 1 < decoded
                && remaining > 1
                && is_trail_surrogate(token[i + 1])
            {
                i += 1;
                remaining -= 1;
                codepoint = combine_surrogate_pair(token[i - 1], token[i]);
            }

            let mut buf = [0u8; MAX_UTF8_BYTES];
            let len = encode_utf8(codepoint, &mut buf);
            writer.write_all(&buf[..len])?;
            i += 1;
            remaining -= 1;
        }
    }

    Ok(())
}
