//! Block-driven encoder from UTF-16 code units to the token stream.
//!
//! The encoder reads its input in blocks of exactly 1024 characters and
//! tokenizes within a block; the sentinel padding at a block's tail
//! guarantees that no token spans a block boundary, so every index entry
//! points at a token header. Before emitting the first token of each
//! block after the first, the current output size is recorded in the
//! positional index.

use codetable::{
    combine_surrogate_pair, is_lead_surrogate, is_trail_surrogate, match_longest, token_len,
    unicode_payload, ASCII_ESCAPE, MAX_TOKEN_CHARS, TOKEN_LENGTHS, UNICODE_ESCAPE,
};

use crate::cursor::{write_index, CHARS_PER_INDEX_ENTRY};

/// Marks window slots past the end of the input. Never equal to a code
/// unit, so greedy matching stops at it.
const SENTINEL: i32 = -1;

/// A source of UTF-16 code units with a known length.
///
/// `get` takes `&mut self` so that sequential adapters can advance an
/// underlying iterator; random-access implementations ignore the
/// mutability.
pub trait SourceInput {
    /// Length in UTF-16 code units.
    fn len(&self) -> usize;

    /// Returns `true` if the source has no characters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the code unit at `index`.
    fn get(&mut self, index: usize) -> u16;
}

impl SourceInput for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn get(&mut self, index: usize) -> u16 {
        u16::from(self[index])
    }
}

impl SourceInput for &[u16] {
    fn len(&self) -> usize {
        <[u16]>::len(self)
    }

    fn get(&mut self, index: usize) -> u16 {
        self[index]
    }
}

/// Sequential code-unit reader over a `&str`.
///
/// The encoder reads every position exactly once, in order, which lets
/// this adapter ride a forward iterator instead of re-scanning the
/// string for each indexed access. Out-of-order access is a bug and is
/// debug-asserted.
pub struct Utf16Reader<'a> {
    units: std::str::EncodeUtf16<'a>,
    next: usize,
    len: usize,
}

impl<'a> Utf16Reader<'a> {
    /// Creates a reader positioned at the start of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            units: text.encode_utf16(),
            next: 0,
            len: text.encode_utf16().count(),
        }
    }
}

impl SourceInput for Utf16Reader<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&mut self, index: usize) -> u16 {
        debug_assert_eq!(index, self.next, "reader access must be sequential");
        self.next += 1;
        self.units.next().expect("read past the end of the source")
    }
}

/// Encodes `input` into `output`, recording block offsets in `index`.
///
/// `index` must be exactly `index_size(input.len())` bytes; slot `k`
/// receives the output size at which character `(k + 1) * 1024` begins.
pub fn encode<S: SourceInput>(input: &mut S, output: &mut Vec<u8>, index: &mut [u8]) {
    // Table sanity is asserted once here; everything after encoding
    // operates on data this function produced.
    debug_assert_eq!(TOKEN_LENGTHS[ASCII_ESCAPE as usize], 1);
    debug_assert_eq!(TOKEN_LENGTHS[UNICODE_ESCAPE as usize], 1);
    debug_assert_eq!(TOKEN_LENGTHS[255] as usize, MAX_TOKEN_CHARS);

    let length = input.len();
    let mut window = [SENTINEL; CHARS_PER_INDEX_ENTRY];
    let mut pos = 0usize;

    while pos < length {
        if pos != 0 {
            write_index(index, pos, output.len() as u32);
        }
        let filled = fill_window(input, &mut window, pos);
        encode_block(&window, filled, output);
        pos += filled;
    }
}

/// Loads one block of code units into `window`, widening to `i32` and
/// padding an unfilled tail with the sentinel. Returns the fill count.
fn fill_window<S: SourceInput>(
    input: &mut S,
    window: &mut [i32; CHARS_PER_INDEX_ENTRY],
    pos: usize,
) -> usize {
    let length = input.len();
    if pos + CHARS_PER_INDEX_ENTRY <= length {
        for (i, slot) in window.iter_mut().enumerate() {
            *slot = i32::from(input.get(pos + i));
        }
        CHARS_PER_INDEX_ENTRY
    } else {
        let filled = length - pos;
        for (i, slot) in window.iter_mut().take(filled).enumerate() {
            *slot = i32::from(input.get(pos + i));
        }
        for slot in window.iter_mut().skip(filled) {
            *slot = SENTINEL;
        }
        filled
    }
}

fn encode_block(window: &[i32; CHARS_PER_INDEX_ENTRY], filled: usize, output: &mut Vec<u8>) {
    let mut i = 0;
    while i < filled {
        if let Some(code) = match_longest(&window[i..]) {
            output.push(code);
            i += token_len(code);
            continue;
        }

        let unit = window[i];
        debug_assert!((0..=0xFFFF).contains(&unit));
        if unit < 0x80 {
            output.push(ASCII_ESCAPE);
            output.push(unit as u8);
            i += 1;
            continue;
        }

        // Non-ASCII unit: emit a Unicode escape. A surrogate pair inside
        // the block collapses to one supplementary-codepoint escape; a
        // pair split across the block boundary becomes two escapes, which
        // the decoder accepts equally.
        let unit = unit as u16;
        let mut codepoint = u32::from(unit);
        let mut consumed = 1;
        if is_lead_surrogate(unit) && i + 1 < CHARS_PER_INDEX_ENTRY && window[i + 1] >= 0 {
            let next = window[i + 1] as u16;
            if is_trail_surrogate(next) {
                codepoint = combine_surrogate_pair(unit, next);
                consumed = 2;
            }
        }
        output.push(UNICODE_ESCAPE);
        output.extend_from_slice(&unicode_payload(codepoint));
        i += consumed;
    }
    debug_assert_eq!(i, filled);
}
