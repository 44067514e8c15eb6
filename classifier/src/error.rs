//! The deferred error payload: location, message template, argument.

/// A half-open source range in UTF-16 code units, as the scanner
/// reports positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Offset of the first code unit.
    pub begin: u32,
    /// Offset one past the last code unit.
    pub end: u32,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub const fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }
}

/// Parser diagnostic templates.
///
/// The classifier stores these without interpreting them; rendering
/// belongs to whoever reports the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageTemplate {
    UnexpectedToken,
    UnexpectedTokenIdentifier,
    UnexpectedReserved,
    UnexpectedStrictReserved,
    StrictParamDupe,
    StrictEvalArguments,
    InvalidDestructuringTarget,
    InvalidLhsInAssignment,
    InvalidCoverInitializedName,
    UnexpectedTemplateString,
    ParamAfterRest,
}

/// One recorded error: where, what, and an optional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub location: Location,
    pub message: MessageTemplate,
    pub arg: Option<&'static str>,
}

impl ParseError {
    /// Creates an error record.
    #[must_use]
    pub const fn new(location: Location, message: MessageTemplate, arg: Option<&'static str>) -> Self {
        Self {
            location,
            message,
            arg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_a_value_type() {
        let a = Location::new(3, 9);
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.begin, 3);
        assert_eq!(a.end, 9);
    }

    #[test]
    fn error_stores_arg_uninterpreted() {
        let error = ParseError::new(
            Location::new(0, 1),
            MessageTemplate::UnexpectedTokenIdentifier,
            Some("yield"),
        );
        assert_eq!(error.arg, Some("yield"));
        assert_eq!(error.message, MessageTemplate::UnexpectedTokenIdentifier);
    }
}
