#![no_main]

use codec::{CompressedSource, SourceBuffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Pair input bytes into UTF-16 code units; lone surrogates and all
    // other hostile unit sequences are legal source content.
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let source = CompressedSource::from_utf16(&units);
    assert_eq!(source.char_length(), units.len());

    match source.decompress() {
        SourceBuffer::TwoByte(out) => assert_eq!(out, units),
        SourceBuffer::Ascii(out) => {
            assert!(units.iter().all(|&unit| unit < 0x80));
            assert!(out.iter().map(|&b| u16::from(b)).eq(units.iter().copied()));
        }
    }
});
