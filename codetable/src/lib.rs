//! Static code table and token primitives for the srcz codec.
//!
//! This crate holds the bytecode dictionary shared by the encoder and
//! decoder, the per-code token lengths, the escape-token payload codec,
//! and the UTF-16/UTF-8 helpers the codec layers on top.
//!
//! # Design Principles
//!
//! - **No domain knowledge** - This crate knows nothing about cursors,
//!   indexes, or source buffers; it only knows tokens.
//! - **Static** - The dictionary is immutable and baked into the binary.
//!   Compressed data is only decodable against the same table; see
//!   [`table_digest`] for compatibility checking.
//! - **No unsafe code** - Safety is paramount.

mod escape;
mod table;
mod unicode;

pub use escape::{
    decode_unicode, is_ascii_escape, is_bytecode, is_unicode_escape, unicode_payload, utf16_len,
    ASCII_ESCAPE, FIRST_BYTECODE, LAST_BYTECODE, UNICODE_ESCAPE,
};
pub use table::{match_longest, table_digest, token_bytes, token_len, MAX_TOKEN_CHARS, TOKEN_LENGTHS};
pub use unicode::{
    combine_surrogate_pair, encode_utf8, is_lead_surrogate, is_trail_surrogate, lead_surrogate,
    trail_surrogate, MAX_BMP_CODEPOINT, MAX_CODEPOINT, MAX_UTF8_BYTES,
};
