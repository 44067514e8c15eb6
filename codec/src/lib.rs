//! Random-access compressed source text.
//!
//! This crate compresses a UTF-16 source string into a byte-oriented
//! token stream plus a sparse positional index, and decodes arbitrary
//! character ranges back out without touching the rest of the stream.
//! Positions and lengths are everywhere in UTF-16 code units, so a
//! supplementary codepoint counts as two characters.
//!
//! # Features
//!
//! - Greedy dictionary compression with ASCII and codepoint escapes
//! - Two-word cursors that can address positions inside a token
//! - A positional index entry per 1024 characters for fast seeks
//! - Range decode to bytes or code units, UTF-8 dump, ASCII checks
//! - Substring equality, streaming substring hashes, slow line numbers
//!
//! # Design Principles
//!
//! - **Correctness first** - All invariants are documented and tested.
//! - **Well-formed by construction** - Decoders only ever see data the
//!   encoder produced; violations are bugs and fail by assertion, not
//!   by `Result`.
//! - **Deterministic** - Same inputs produce same outputs.

mod cursor;
mod decode;
mod encode;
mod hash;
mod sink;
mod source;

pub use cursor::{
    advance_cursor, get_cursor, index_size, read_index, Cursor, CHARS_PER_INDEX_ENTRY,
};
pub use decode::{decode, dump, is_ascii, DecodeUnit};
pub use encode::{encode, SourceInput, Utf16Reader};
pub use hash::{
    hash_units, SourceHasher, DEFAULT_HASH_SEED, MAX_ARRAY_INDEX_LENGTH, MAX_HASH_CALC_LENGTH,
};
pub use sink::ByteSink;
pub use source::{CompressedSource, SourceBuffer};
