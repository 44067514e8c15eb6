//! Property tests over arbitrary sources and ranges.

use codec::{
    advance_cursor, hash_units, read_index, CompressedSource, Cursor, SourceBuffer,
    CHARS_PER_INDEX_ENTRY, DEFAULT_HASH_SEED,
};
use proptest::prelude::*;

fn source_text() -> impl Strategy<Value = String> {
    prop_oneof![
        // Arbitrary Unicode, the hostile case.
        any::<String>(),
        // Keyword-heavy ASCII, the realistic case, long enough to cross
        // index blocks.
        proptest::collection::vec(
            prop_oneof![
                Just("function "),
                Just("return x;\n"),
                Just("let value = 1;\n"),
                Just("if (a && b) { c(); }\n"),
                Just("% ^ @ ~ #"),
                Just("caf\u{e9} "),
                Just("\u{1D11E}"),
            ],
            0..400
        )
        .prop_map(|parts| parts.concat()),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip(text in source_text()) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let source = CompressedSource::from_str(&text);
        prop_assert_eq!(source.char_length(), units.len());
        prop_assert_eq!(source.decompress(), SourceBuffer::TwoByte(units));
    }

    #[test]
    fn prop_range_roundtrip(text in source_text(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let source = CompressedSource::from_str(&text);

        let mut start = a.index(units.len() + 1);
        let mut end = b.index(units.len() + 1);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        let expected = SourceBuffer::TwoByte(units[start..end].to_vec());
        prop_assert_eq!(source.decompress_range(start, end - start), expected);
    }

    #[test]
    fn prop_full_advance_is_length_consistent(text in source_text()) {
        let source = CompressedSource::from_str(&text);
        let mut cursor = Cursor::start();
        advance_cursor(source.as_bytes(), &mut cursor, source.char_length());
        prop_assert_eq!(cursor.byte_offset() as usize, source.payload_len());
        prop_assert_eq!(cursor.sub_token_offset(), 0);
    }

    #[test]
    fn prop_index_entries_point_at_block_starts(text in source_text()) {
        let source = CompressedSource::from_str(&text);
        let length = source.char_length();

        let mut cursor = Cursor::start();
        let mut pos = 0usize;
        while pos + CHARS_PER_INDEX_ENTRY <= length {
            advance_cursor(source.as_bytes(), &mut cursor, CHARS_PER_INDEX_ENTRY);
            pos += CHARS_PER_INDEX_ENTRY;
            prop_assert_eq!(cursor.sub_token_offset(), 0, "block starts on a token");
            prop_assert_eq!(
                read_index(source.as_bytes(), pos, length),
                cursor.byte_offset(),
                "index entry for position {}",
                pos
            );
        }
    }

    #[test]
    fn prop_ascii_purity(text in source_text(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let source = CompressedSource::from_str(&text);

        let mut start = a.index(units.len() + 1);
        let mut end = b.index(units.len() + 1);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        let expected = units[start..end].iter().all(|&unit| unit < 0x80);
        prop_assert_eq!(source.is_ascii_range(start, end - start), expected);
    }

    #[test]
    fn prop_substring_hash_matches_reference(text in source_text(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let source = CompressedSource::from_str(&text);

        let mut start = a.index(units.len() + 1);
        let mut end = b.index(units.len() + 1);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        let expected = hash_units(
            units[start..end].iter().copied(),
            (end - start) as u32,
            DEFAULT_HASH_SEED,
        );
        prop_assert_eq!(source.substring_hash(start, end - start), expected);
    }

    #[test]
    fn prop_decompress_into_matches_lossy_utf8(text in source_text()) {
        // Valid `str` input never produces unpaired surrogates, so the
        // sink output must be exactly the UTF-8 of the text.
        let source = CompressedSource::from_str(&text);
        let mut sink = Vec::new();
        let written = source.decompress_into(0, source.char_length(), &mut sink);
        prop_assert_eq!(written, source.char_length());
        prop_assert_eq!(sink, text.into_bytes());
    }

    #[test]
    fn prop_utf16_roundtrip_with_lone_surrogates(units in proptest::collection::vec(any::<u16>(), 0..2200)) {
        let source = CompressedSource::from_utf16(&units);
        prop_assert_eq!(source.char_length(), units.len());
        match source.decompress() {
            SourceBuffer::TwoByte(out) => prop_assert_eq!(out, units),
            SourceBuffer::Ascii(out) => {
                let widened: Vec<u16> = out.iter().map(|&b| u16::from(b)).collect();
                prop_assert_eq!(widened, units);
            }
        }
    }
}
