//! The set of grammar productions a parsed fragment may still satisfy.

/// A set of target productions, one bit each.
///
/// An expression fragment is parsed once and classified against every
/// production simultaneously; a bit here marks a production the
/// fragment can no longer satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProductionSet(u8);

impl ProductionSet {
    /// No productions.
    pub const EMPTY: Self = Self(0);

    /// A plain expression.
    pub const EXPRESSION: Self = Self(1 << 0);

    /// A binding pattern, as in a declaration target.
    pub const BINDING_PATTERN: Self = Self(1 << 1);

    /// An assignment pattern, as in a destructuring assignment target.
    pub const ASSIGNMENT_PATTERN: Self = Self(1 << 2);

    /// A formal parameter list without duplicate names.
    pub const DISTINCT_FORMAL_PARAMETERS: Self = Self(1 << 3);

    /// A formal parameter list legal in strict mode.
    pub const STRICT_MODE_FORMAL_PARAMETERS: Self = Self(1 << 4);

    /// A formal parameter list legal in strong mode.
    pub const STRONG_MODE_FORMAL_PARAMETERS: Self = Self(1 << 5);

    /// An arrow-function formal parameter list.
    pub const ARROW_FORMAL_PARAMETERS: Self = Self(1 << 6);

    /// Both pattern productions.
    pub const PATTERNS: Self = Self(Self::BINDING_PATTERN.0 | Self::ASSIGNMENT_PATTERN.0);

    /// The three formal-parameter-list productions.
    pub const FORMAL_PARAMETERS: Self = Self(
        Self::DISTINCT_FORMAL_PARAMETERS.0
            | Self::STRICT_MODE_FORMAL_PARAMETERS.0
            | Self::STRONG_MODE_FORMAL_PARAMETERS.0,
    );

    /// Expression plus the pattern productions, the default accumulation
    /// mask.
    pub const STANDARD: Self = Self(Self::EXPRESSION.0 | Self::PATTERNS.0);

    /// Every production.
    pub const ALL: Self = Self(
        Self::STANDARD.0 | Self::FORMAL_PARAMETERS.0 | Self::ARROW_FORMAL_PARAMETERS.0,
    );

    /// Creates a set from raw bits.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if no production is in the set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this is exactly one production.
    #[must_use]
    pub const fn is_single(self) -> bool {
        self.0.count_ones() == 1
    }

    /// Returns `true` if the sets share any production.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// This set minus `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}
