//! The host string hasher the substring-hash operation feeds.
//!
//! Hashes must match whatever the surrounding runtime computes for an
//! equivalent uncompressed string, so the algorithm is fixed here: a
//! seeded one-at-a-time running hash, an array-index fast path for
//! strings that spell a small decimal integer, and a length-only trivial
//! hash for strings too long to be worth hashing by content.

/// Seed mixed into every content hash.
pub const DEFAULT_HASH_SEED: u32 = 0x811C_9DC5;

/// Longest string that can spell an array index.
pub const MAX_ARRAY_INDEX_LENGTH: u32 = 10;

/// Strings longer than this hash by length alone.
pub const MAX_HASH_CALC_LENGTH: u32 = 16383;

/// Incremental hasher over UTF-16 code units.
#[derive(Debug, Clone)]
pub struct SourceHasher {
    running: u32,
    array_index: u32,
    length: u32,
    is_array_index: bool,
    is_first_char: bool,
}

impl SourceHasher {
    /// Creates a hasher for a string of `length` code units.
    #[must_use]
    pub fn new(length: u32, seed: u32) -> Self {
        Self {
            running: seed,
            array_index: 0,
            length,
            is_array_index: length > 0 && length <= MAX_ARRAY_INDEX_LENGTH,
            is_first_char: true,
        }
    }

    /// Returns `true` if the hash is derived from the length alone and
    /// no characters need to be fed.
    #[must_use]
    pub fn has_trivial_hash(&self) -> bool {
        self.length > MAX_HASH_CALC_LENGTH
    }

    /// Returns `true` while the fed prefix could still be an array index.
    #[must_use]
    pub fn is_array_index(&self) -> bool {
        self.is_array_index
    }

    /// Feeds one code unit, maintaining array-index tracking.
    pub fn add_character(&mut self, unit: u16) {
        self.mix(unit);
        if !self.is_array_index {
            return;
        }
        if !(0x30..=0x39).contains(&unit) {
            self.is_array_index = false;
            return;
        }
        let digit = u32::from(unit - 0x30);
        if self.is_first_char {
            self.is_first_char = false;
            // "0" alone is index zero, but a leading zero disqualifies
            // anything longer.
            if digit == 0 && self.length > 1 {
                self.is_array_index = false;
                return;
            }
        }
        match self
            .array_index
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit))
        {
            Some(value) => self.array_index = value,
            None => self.is_array_index = false,
        }
    }

    /// Feeds one code unit once array-index tracking is off.
    pub fn add_character_no_index(&mut self, unit: u16) {
        debug_assert!(!self.is_array_index);
        self.mix(unit);
    }

    fn mix(&mut self, unit: u16) {
        self.running = self.running.wrapping_add(u32::from(unit));
        self.running = self.running.wrapping_add(self.running << 10);
        self.running ^= self.running >> 6;
    }

    /// Finalizes the hash.
    #[must_use]
    pub fn finish(&self) -> u32 {
        if self.has_trivial_hash() {
            return (self.length << 1) | 1;
        }
        if self.is_array_index {
            return self.array_index;
        }
        let mut hash = self.running;
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 11;
        hash = hash.wrapping_add(hash << 15);
        if hash == 0 {
            27
        } else {
            hash
        }
    }
}

/// Hashes a full sequence of code units with known length.
///
/// This is the reference the codec's streaming substring hash must
/// agree with.
#[must_use]
pub fn hash_units<I>(units: I, length: u32, seed: u32) -> u32
where
    I: IntoIterator<Item = u16>,
{
    let mut hasher = SourceHasher::new(length, seed);
    if !hasher.has_trivial_hash() {
        for unit in units {
            if hasher.is_array_index() {
                hasher.add_character(unit);
            } else {
                hasher.add_character_no_index(unit);
            }
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_str(text: &str) -> u32 {
        hash_units(
            text.encode_utf16(),
            text.encode_utf16().count() as u32,
            DEFAULT_HASH_SEED,
        )
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_str("hello"), hash_str("hello"));
        assert_ne!(hash_str("hello"), hash_str("hellp"));
    }

    #[test]
    fn seed_changes_hash() {
        let units: Vec<u16> = "abc".encode_utf16().collect();
        let a = hash_units(units.iter().copied(), 3, 1);
        let b = hash_units(units.iter().copied(), 3, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn array_index_strings_hash_to_their_value() {
        assert_eq!(hash_str("0"), 0);
        assert_eq!(hash_str("7"), 7);
        assert_eq!(hash_str("42"), 42);
        assert_eq!(hash_str("1024"), 1024);
    }

    #[test]
    fn leading_zero_is_not_an_index() {
        assert_ne!(hash_str("07"), 7);
    }

    #[test]
    fn non_digit_disables_index_mode() {
        let mut hasher = SourceHasher::new(2, DEFAULT_HASH_SEED);
        hasher.add_character(u16::from(b'1'));
        assert!(hasher.is_array_index());
        hasher.add_character(u16::from(b'x'));
        assert!(!hasher.is_array_index());
    }

    #[test]
    fn overflowing_index_falls_back_to_content_hash() {
        // Ten digits can exceed u32.
        assert_ne!(hash_str("4294967296"), 0);
        let mut hasher = SourceHasher::new(10, DEFAULT_HASH_SEED);
        for unit in "4294967296".encode_utf16() {
            hasher.add_character(unit);
        }
        assert!(!hasher.is_array_index());
    }

    #[test]
    fn trivial_hash_ignores_content() {
        let length = MAX_HASH_CALC_LENGTH + 1;
        let hasher = SourceHasher::new(length, DEFAULT_HASH_SEED);
        assert!(hasher.has_trivial_hash());
        assert_eq!(hasher.finish(), (length << 1) | 1);
    }

    #[test]
    fn zero_guard() {
        // finish() never returns zero for content hashes.
        for text in ["", "a", "xyz", "\u{e9}"] {
            assert_ne!(hash_str(text), 0);
        }
    }
}
