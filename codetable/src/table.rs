//! The bytecode dictionary and longest-match lookup.
//!
//! Codes 2..=255 map to fixed ASCII fragments mined from program source:
//! single characters, operator digraphs, keywords, and indentation runs.
//! Entry lengths are monotonically non-decreasing in code order, which
//! lets the encoder scan codes downward to try longer tokens first.

use crate::escape::FIRST_BYTECODE;

/// Maximum expansion of any single token, in characters.
pub const MAX_TOKEN_CHARS: usize = 9;

const BYTECODE_COUNT: usize = 254;

/// The dictionary, indexed by `code - FIRST_BYTECODE`.
///
/// Every entry is pure ASCII; the ASCII-purity scan over compressed data
/// relies on that. Entries are grouped by length, shortest first.
const TOKENS: [&str; BYTECODE_COUNT] = [
    // Length 1: the characters common enough to deserve a code of their
    // own (an ASCII escape would spend two bytes on them).
    " ", "\n", "\t", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o",
    "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "0", "1", "2", "3", "4", "5", "6", "7",
    "8", "9", ".", ",", ";", ":", "(", ")", "{", "}", "[", "]", "=", "+", "-", "*", "/", "<", ">",
    "!", "?", "&", "|", "'", "\"", "_", "$",
    // Length 2: operator digraphs, frequent bigrams, trailing-space pairs.
    "  ", "e ", "t ", "s ", "d ", "n ", "r ", "; ", ", ", ". ", " (", "()", ");", "((", "))",
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "=>", "if", "in", "of", "do",
    "er", "re", "on", "at", "en", "es", "th", "he", "st", "ar", "le", "co", "un", "ti", "al",
    "or", "te", "is",
    // Length 3.
    "   ", " = ", " + ", "();", ");\n", " {\n", "}\n\n", "=> ", "===", "!==", "var", "let",
    "new", "for", "try", "not", "the", "ion", "ent", "ate", "est", "ter", "and", "ing", "tio",
    "res", "con", "ect", "all", "ons", "pro", "ver", "str", "int", "ret", "fun", "ess", "ble",
    "out", "ure",
    // Length 4.
    "    ", " == ", " != ", " && ", " || ", " => ", "();\n", ") {\n", "};\n\n", "this", "else",
    "true", "null", "case", "ment", "tion", "able", "each", "name", "type", "ring", "turn",
    "list", "item", "push", "call", "data", "self", "from", "prot", "leng", "ject",
    // Length 5.
    "     ", " === ", " !== ", "const", "while", "break", "catch", "throw", "class", "false",
    "super", "await", "async", "yield", "index", "value", "count", "state", "event", "error",
    "first", "total", "ength", "ction",
    // Length 6.
    "      ", "return", "typeof", "delete", "switch", "export", "import", "length", "number",
    "string", "object", "result", "buffer", "static", "public", "window",
    // Length 7.
    "return ", "default", "finally", "extends", "element", "options", "console", "require",
    "promise", "handler", "message", "package",
    // Length 8.
    "function", "continue", "debugger", "document", "instance", "property", "position",
    "callback", "children", "argument",
    // Length 9.
    "function ", "prototype", "undefined", "arguments", "interface", "protected", "namespace",
    "container",
];

const fn build_token_lengths() -> [u8; 256] {
    // Escape headers (codes 0 and 1) count as one character; the payload
    // expansion of a Unicode escape is computed separately.
    let mut lengths = [1u8; 256];
    let mut code = FIRST_BYTECODE as usize;
    while code < 256 {
        lengths[code] = TOKENS[code - FIRST_BYTECODE as usize].len() as u8;
        code += 1;
    }
    lengths
}

/// Characters contributed by each code: 1 for the escape headers and
/// the dictionary entry length for bytecodes.
pub static TOKEN_LENGTHS: [u8; 256] = build_token_lengths();

/// Returns the expansion of a bytecode as ASCII bytes.
///
/// # Panics
///
/// Debug-asserts that `code` is a bytecode, not an escape header.
#[must_use]
pub fn token_bytes(code: u8) -> &'static [u8] {
    debug_assert!(code >= FIRST_BYTECODE);
    TOKENS[(code - FIRST_BYTECODE) as usize].as_bytes()
}

/// Returns the character count contributed by `code`.
#[must_use]
pub fn token_len(code: u8) -> usize {
    TOKEN_LENGTHS[code as usize] as usize
}

/// Finds the longest dictionary token matching the start of `window`.
///
/// The window holds UTF-16 code units widened to `i32`, with `-1` past
/// the end of the current encoder block; the sentinel never equals an
/// ASCII byte, so matches cannot cross a block boundary.
#[must_use]
pub fn match_longest(window: &[i32]) -> Option<u8> {
    // Linear longest-first scan. Lengths are monotone in code order, so
    // walking codes downward tries longer tokens before shorter ones.
    // A first-byte index can be added later if encoding shows up in
    // profiles.
    let mut code = 255u8;
    loop {
        let bytes = token_bytes(code);
        if bytes.len() <= window.len() && matches_window(bytes, window) {
            return Some(code);
        }
        if code == FIRST_BYTECODE {
            return None;
        }
        code -= 1;
    }
}

fn matches_window(bytes: &[u8], window: &[i32]) -> bool {
    bytes.iter().zip(window).all(|(&b, &unit)| unit == i32::from(b))
}

/// Computes a deterministic digest of the dictionary.
///
/// Persisted containers carry this value so that data compressed against
/// a different table fails loudly instead of decoding to garbage.
#[must_use]
pub fn table_digest() -> u64 {
    let mut hasher = blake3::Hasher::new();
    for token in TOKENS {
        hasher.update(&[token.len() as u8]);
        hasher.update(token.as_bytes());
    }
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[0..8].try_into().unwrap())
}
