#![no_main]

use codec::CompressedSource;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let (head, tail) = data.split_at(8);
    let units: Vec<u16> = tail
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if units.is_empty() {
        return;
    }

    let source = CompressedSource::from_utf16(&units);

    // Probe input-derived positions: every seek must agree with the
    // original unit at that position.
    let mut state = u64::from_le_bytes(head.try_into().unwrap());
    for _ in 0..64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let pos = (state % units.len() as u64) as usize;
        let cursor = source.cursor_at(pos);
        assert_eq!(source.unit_at(cursor), units[pos]);

        // Ranges ending exactly at the end of the source are fine too.
        let remaining = units.len() - pos;
        let length = (state >> 32) as usize % (remaining + 1);
        let decoded = source.decompress_range(pos, length);
        assert_eq!(decoded.len(), length);
    }
});
