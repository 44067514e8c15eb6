//! The compressed-source driver and the host string buffer model.

use std::io;

use codetable::{
    combine_surrogate_pair, encode_utf8, is_lead_surrogate, is_trail_surrogate, MAX_UTF8_BYTES,
};

use crate::cursor::{advance_cursor, get_cursor, index_size, Cursor};
use crate::decode::{decode, dump, is_ascii};
use crate::encode::{encode, SourceInput, Utf16Reader};
use crate::hash::{hash_units, SourceHasher, DEFAULT_HASH_SEED};
use crate::sink::ByteSink;

/// Code units fed to the hasher per decode chunk.
const HASH_CHUNK: usize = 32;

/// A decompressed string in host representation.
///
/// ASCII content is stored one byte per character; anything else is
/// stored as UTF-16 code units. Two buffers are equal when their code
/// unit sequences are equal, regardless of representation.
#[derive(Debug, Clone)]
pub enum SourceBuffer {
    /// One byte per character, all below 0x80.
    Ascii(Vec<u8>),
    /// UTF-16 code units, possibly including unpaired surrogates.
    TwoByte(Vec<u16>),
}

impl SourceBuffer {
    /// Builds a buffer from a string, choosing the narrow representation
    /// when the content allows it.
    #[must_use]
    pub fn from_str(text: &str) -> Self {
        if text.is_ascii() {
            Self::Ascii(text.as_bytes().to_vec())
        } else {
            Self::TwoByte(text.encode_utf16().collect())
        }
    }

    /// Length in UTF-16 code units.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ascii(bytes) => bytes.len(),
            Self::TwoByte(units) => units.len(),
        }
    }

    /// Returns `true` if the buffer holds no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the buffer uses the one-byte representation.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        matches!(self, Self::Ascii(_))
    }

    /// Returns the code unit at `index`.
    #[must_use]
    pub fn code_unit(&self, index: usize) -> u16 {
        match self {
            Self::Ascii(bytes) => u16::from(bytes[index]),
            Self::TwoByte(units) => units[index],
        }
    }

    /// Iterates the buffer as UTF-16 code units.
    pub fn units(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len()).map(move |i| self.code_unit(i))
    }

    /// Copies out a sub-range, narrowing the representation when the
    /// range is pure ASCII.
    #[must_use]
    pub fn substring(&self, start: usize, length: usize) -> Self {
        match self {
            Self::Ascii(bytes) => Self::Ascii(bytes[start..start + length].to_vec()),
            Self::TwoByte(units) => {
                let slice = &units[start..start + length];
                if slice.iter().all(|&unit| unit < 0x80) {
                    Self::Ascii(slice.iter().map(|&unit| unit as u8).collect())
                } else {
                    Self::TwoByte(slice.to_vec())
                }
            }
        }
    }

    /// Converts to a `String`, replacing unpaired surrogates.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        match self {
            Self::Ascii(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::TwoByte(units) => String::from_utf16_lossy(units),
        }
    }
}

impl PartialEq for SourceBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.units().eq(other.units())
    }
}

impl Eq for SourceBuffer {}

/// A source string held as a compressed byte stream plus index.
///
/// The byte array is immutable once built; cursors into it are plain
/// values and stay valid for the lifetime of this object. All positions
/// and lengths are in UTF-16 code units.
#[derive(Debug, Clone)]
pub struct CompressedSource {
    /// Token payload followed by the positional index.
    bytes: Vec<u8>,
    char_length: usize,
    hash: u32,
    cache: Option<SourceBuffer>,
}

impl CompressedSource {
    /// Compresses a string.
    #[must_use]
    pub fn from_str(text: &str) -> Self {
        let mut reader = Utf16Reader::new(text);
        let length = reader.len();
        let hash = hash_units(text.encode_utf16(), length as u32, DEFAULT_HASH_SEED);
        Self::compress(&mut reader, hash)
    }

    /// Compresses one-byte host content.
    ///
    /// # Panics
    ///
    /// Debug-asserts that every byte is 7-bit ASCII; the ASCII escape
    /// form carries no wider values.
    #[must_use]
    pub fn from_ascii(text: &[u8]) -> Self {
        debug_assert!(text.iter().all(u8::is_ascii));
        let hash = hash_units(
            text.iter().map(|&byte| u16::from(byte)),
            text.len() as u32,
            DEFAULT_HASH_SEED,
        );
        let mut input = text;
        Self::compress(&mut input, hash)
    }

    /// Compresses two-byte host content, unpaired surrogates included.
    #[must_use]
    pub fn from_utf16(units: &[u16]) -> Self {
        let hash = hash_units(units.iter().copied(), units.len() as u32, DEFAULT_HASH_SEED);
        let mut input = units;
        Self::compress(&mut input, hash)
    }

    fn compress<S: SourceInput>(input: &mut S, hash: u32) -> Self {
        let char_length = input.len();
        assert!(char_length <= u32::MAX as usize, "source too long");

        let mut payload = Vec::new();
        let mut index = vec![0u8; index_size(char_length)];
        encode(input, &mut payload, &mut index);

        #[cfg(debug_assertions)]
        {
            // Walking the full payload must land exactly on its end.
            let mut cursor = Cursor::start();
            advance_cursor(&payload, &mut cursor, char_length);
            debug_assert_eq!(cursor.byte_offset() as usize, payload.len());
            debug_assert_eq!(cursor.sub_token_offset(), 0);
        }

        let mut bytes = payload;
        bytes.extend_from_slice(&index);
        Self {
            bytes,
            char_length,
            hash,
            cache: None,
        }
    }

    /// Rebuilds a compressed source from its raw parts.
    ///
    /// `bytes` must be a payload-plus-index array previously produced by
    /// this codec for a source of `char_length` code units; the full
    /// hash is recomputed by decoding.
    #[must_use]
    pub fn from_parts(bytes: Vec<u8>, char_length: usize) -> Self {
        let mut source = Self {
            bytes,
            char_length,
            hash: 0,
            cache: None,
        };
        source.hash = source.hash_range(0, char_length);
        source
    }

    /// Length of the source in UTF-16 code units.
    #[must_use]
    pub fn char_length(&self) -> usize {
        self.char_length
    }

    /// The combined payload-plus-index byte array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the token payload, excluding the index.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.bytes.len() - index_size(self.char_length)
    }

    /// Hash of the whole source.
    #[must_use]
    pub fn full_hash(&self) -> u32 {
        self.hash
    }

    /// Computes the cursor for character position `pos`.
    #[must_use]
    pub fn cursor_at(&self, pos: usize) -> Cursor {
        debug_assert!(pos <= self.char_length);
        get_cursor(&self.bytes, pos, self.char_length)
    }

    /// Reads the single code unit at `cursor`.
    #[must_use]
    pub fn unit_at(&self, cursor: Cursor) -> u16 {
        let mut unit = [0u16; 1];
        decode(&self.bytes, cursor, &mut unit);
        unit[0]
    }

    /// Reads the single code unit at character position `pos`.
    ///
    /// Sequential readers should hold a cursor and use [`unit_at`] plus
    /// [`advance`] instead of seeking per character.
    ///
    /// [`unit_at`]: Self::unit_at
    /// [`advance`]: Self::advance
    #[must_use]
    pub fn char_at(&self, pos: usize) -> u16 {
        debug_assert!(pos < self.char_length);
        self.unit_at(self.cursor_at(pos))
    }

    /// Moves `cursor` forward by `chars` code units.
    pub fn advance(&self, cursor: &mut Cursor, chars: usize) {
        advance_cursor(&self.bytes, cursor, chars);
    }

    /// Returns `true` if the range contains no non-ASCII characters.
    #[must_use]
    pub fn is_ascii_range(&self, start: usize, length: usize) -> bool {
        debug_assert!(start + length <= self.char_length);
        is_ascii(&self.bytes, self.cursor_at(start), length)
    }

    /// Decompresses the whole source.
    #[must_use]
    pub fn decompress(&self) -> SourceBuffer {
        self.decompress_range(0, self.char_length)
    }

    /// Decompresses a sub-range, through the cache when one is present.
    #[must_use]
    pub fn decompress_range(&self, start: usize, length: usize) -> SourceBuffer {
        debug_assert!(start + length <= self.char_length);
        if let Some(cache) = &self.cache {
            return cache.substring(start, length);
        }
        self.decode_range(start, length)
    }

    fn decode_range(&self, start: usize, length: usize) -> SourceBuffer {
        let cursor = self.cursor_at(start);
        if is_ascii(&self.bytes, cursor, length) {
            let mut out = vec![0u8; length];
            decode(&self.bytes, cursor, &mut out);
            SourceBuffer::Ascii(out)
        } else {
            let mut out = vec![0u16; length];
            decode(&self.bytes, cursor, &mut out);
            SourceBuffer::TwoByte(out)
        }
    }

    /// Decompresses the whole source and keeps it as a cache for later
    /// range operations.
    pub fn hydrate(&mut self) -> &SourceBuffer {
        if self.cache.is_none() {
            self.cache = Some(self.decode_range(0, self.char_length));
        }
        self.cache.as_ref().unwrap()
    }

    /// Drops the hydrated cache, if any.
    pub fn evict(&mut self) {
        self.cache = None;
    }

    /// Returns `true` if a hydrated cache is present.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.cache.is_some()
    }

    /// Writes a range as UTF-8 into a sink that may refuse bytes.
    ///
    /// Returns the number of code units fully delivered. When the sink
    /// refuses a byte the count excludes the codepoint it belonged to,
    /// so callers never observe a half-written character in the tally.
    pub fn decompress_into<K: ByteSink>(&self, start: usize, length: usize, sink: &mut K) -> usize {
        debug_assert!(start + length <= self.char_length);
        let mut cursor = self.cursor_at(start);
        let mut chars_read = 0usize;

        while chars_read < length {
            let prev_chars_read = chars_read;
            let lead = self.unit_at(cursor);
            self.advance(&mut cursor, 1);
            chars_read += 1;

            let mut codepoint = u32::from(lead);
            if is_lead_surrogate(lead) && chars_read < length {
                let trail = self.unit_at(cursor);
                if is_trail_surrogate(trail) {
                    self.advance(&mut cursor, 1);
                    chars_read += 1;
                    codepoint = combine_surrogate_pair(lead, trail);
                }
            }

            let mut buf = [0u8; MAX_UTF8_BYTES];
            let len = encode_utf8(codepoint, &mut buf);
            for &byte in &buf[..len] {
                if !sink.put(byte) {
                    return prev_chars_read;
                }
            }
        }

        chars_read
    }

    /// Compares a range against `other`, one character at a time.
    ///
    /// Returns `false` when the range would run past the end of the
    /// source.
    #[must_use]
    pub fn substring_equals(&self, start: usize, other: &str) -> bool {
        let other_len = other.encode_utf16().count();
        if start + other_len > self.char_length {
            return false;
        }
        if let Some(cache) = &self.cache {
            return other
                .encode_utf16()
                .enumerate()
                .all(|(i, unit)| cache.code_unit(start + i) == unit);
        }

        let mut cursor = self.cursor_at(start);
        for unit in other.encode_utf16() {
            if self.unit_at(cursor) != unit {
                return false;
            }
            self.advance(&mut cursor, 1);
        }
        true
    }

    /// Streaming hash of a range, matching [`hash_units`] over the
    /// decompressed content.
    #[must_use]
    pub fn substring_hash(&self, start: usize, length: usize) -> u32 {
        debug_assert!(start + length <= self.char_length);
        if start == 0 && length == self.char_length {
            return self.hash;
        }
        if let Some(cache) = &self.cache {
            return hash_units(
                (start..start + length).map(|i| cache.code_unit(i)),
                length as u32,
                DEFAULT_HASH_SEED,
            );
        }
        self.hash_range(start, length)
    }

    fn hash_range(&self, start: usize, length: usize) -> u32 {
        let mut hasher = SourceHasher::new(length as u32, DEFAULT_HASH_SEED);
        if !hasher.has_trivial_hash() {
            let mut cursor = self.cursor_at(start);
            let mut buffer = [0u16; HASH_CHUNK];
            let mut remaining = length;

            while remaining > 0 {
                let count = remaining.min(HASH_CHUNK);
                decode(&self.bytes, cursor, &mut buffer[..count]);
                add_units(&mut hasher, &buffer[..count]);
                advance_cursor(&self.bytes, &mut cursor, count);
                remaining -= count;
            }
        }
        hasher.finish()
    }

    /// Counts newlines before `pos` by walking from the start.
    ///
    /// Deliberately linear; callers that need line numbers in bulk keep
    /// their own table.
    #[must_use]
    pub fn line_number_slow(&self, pos: usize) -> u32 {
        let mut remaining = pos.min(self.char_length);
        let mut line = 0u32;
        let mut cursor = Cursor::start();
        while remaining > 0 {
            let unit = self.unit_at(cursor);
            self.advance(&mut cursor, 1);
            if unit == u16::from(b'\n') {
                line += 1;
            }
            remaining -= 1;
        }
        line
    }

    /// Writes a range as UTF-8 to `writer`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `writer`.
    pub fn dump<W: io::Write>(&self, writer: &mut W, start: usize, length: usize) -> io::Result<()> {
        debug_assert!(start + length <= self.char_length);
        dump(writer, &self.bytes, self.cursor_at(start), length)
    }
}

fn add_units(hasher: &mut SourceHasher, units: &[u16]) {
    // The index path is checked per chunk; once tracking turns off the
    // cheaper add is used for the rest.
    if hasher.is_array_index() {
        for &unit in units {
            hasher.add_character(unit);
        }
    } else {
        for &unit in units {
            hasher.add_character_no_index(unit);
        }
    }
}
