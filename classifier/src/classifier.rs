//! The classifier buffer, scope cursors, and accumulation rules.

use crate::error::{Location, MessageTemplate, ParseError};
use crate::productions::ProductionSet;

/// One entry in the classifier's scratch buffer.
///
/// A leaf is an error recorded directly; a skip summarises a completed
/// scope's range as a single jumpable node carrying that scope's
/// invalid-production mask.
#[derive(Debug, Clone)]
enum BufferElement {
    Leaf {
        productions: ProductionSet,
        error: ParseError,
    },
    Skip {
        productions: ProductionSet,
        skip: usize,
    },
}

impl BufferElement {
    fn productions(&self) -> ProductionSet {
        match self {
            Self::Leaf { productions, .. } | Self::Skip { productions, .. } => *productions,
        }
    }

    fn skip(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Skip { skip, .. } => *skip,
        }
    }
}

/// A parsing sub-scope's view of the classifier.
///
/// Obtained from [`ProductionClassifier::push`] and returned to
/// [`ProductionClassifier::pop`] in strict LIFO order. Dropping a scope
/// without popping it leaves the buffer dirty, so the handle is
/// `#[must_use]`; release on every exit path is the parser's job.
#[derive(Debug)]
#[must_use = "scopes must be returned to ProductionClassifier::pop"]
pub struct ScopeCursor {
    start: usize,
    invalid: ProductionSet,
    depth: usize,
}

impl ScopeCursor {
    /// Productions this scope has invalidated so far.
    #[must_use]
    pub fn invalid_productions(&self) -> ProductionSet {
        self.invalid
    }

    /// Buffer size at the time this scope was pushed.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns `true` if `production` has not been invalidated here.
    #[must_use]
    pub fn is_valid(&self, production: ProductionSet) -> bool {
        !self.invalid.intersects(production)
    }

    #[must_use]
    pub fn is_valid_expression(&self) -> bool {
        self.is_valid(ProductionSet::EXPRESSION)
    }

    #[must_use]
    pub fn is_valid_binding_pattern(&self) -> bool {
        self.is_valid(ProductionSet::BINDING_PATTERN)
    }

    #[must_use]
    pub fn is_valid_assignment_pattern(&self) -> bool {
        self.is_valid(ProductionSet::ASSIGNMENT_PATTERN)
    }

    #[must_use]
    pub fn is_valid_arrow_formal_parameters(&self) -> bool {
        self.is_valid(ProductionSet::ARROW_FORMAL_PARAMETERS)
    }

    #[must_use]
    pub fn is_valid_formal_parameter_list_without_duplicates(&self) -> bool {
        self.is_valid(ProductionSet::DISTINCT_FORMAL_PARAMETERS)
    }

    /// Callers should also check
    /// [`is_valid_formal_parameter_list_without_duplicates`](Self::is_valid_formal_parameter_list_without_duplicates).
    #[must_use]
    pub fn is_valid_strict_mode_formal_parameters(&self) -> bool {
        self.is_valid(ProductionSet::STRICT_MODE_FORMAL_PARAMETERS)
    }

    /// Callers should also check the strict-mode and duplicate checks.
    #[must_use]
    pub fn is_valid_strong_mode_formal_parameters(&self) -> bool {
        self.is_valid(ProductionSet::STRONG_MODE_FORMAL_PARAMETERS)
    }

    /// Merges a completed inner scope's verdicts into this scope.
    ///
    /// Only productions named in `productions` propagate, and the arrow
    /// production is special: the fragment stays a valid arrow formal
    /// parameter list exactly as long as the inner fragment is a valid
    /// binding pattern, regardless of the inner arrow bit.
    pub fn accumulate(&mut self, inner: &ScopeCursor, productions: ProductionSet) {
        if inner.invalid.is_empty() {
            return;
        }
        let arrow = ProductionSet::ARROW_FORMAL_PARAMETERS;
        let inherited = inner
            .invalid
            .without(arrow)
            .intersection(productions.without(arrow));
        self.invalid = self.invalid.union(inherited);

        if productions.intersects(arrow) && !inner.is_valid_binding_pattern() {
            self.invalid = self.invalid.union(arrow);
        }
    }
}

/// Deferred-error accumulator for a speculative expression parser.
///
/// While parsing a fragment that could still become several different
/// productions, errors cannot be reported eagerly; they are buffered
/// here per production and looked up only once the grammar choice is
/// committed. The buffer is append-only during a scope's lifetime and
/// collapses each finished scope to nothing or to one summary element.
#[derive(Debug, Default)]
pub struct ProductionClassifier {
    buffer: Vec<BufferElement>,
    depth: usize,
}

impl ProductionClassifier {
    /// Creates an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Typical functions stay well under this; one allocation
            // covers the whole parse.
            buffer: Vec::with_capacity(128),
            depth: 0,
        }
    }

    /// Number of elements currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Opens a scope.
    pub fn push(&mut self) -> ScopeCursor {
        self.depth += 1;
        ScopeCursor {
            start: self.buffer.len(),
            invalid: ProductionSet::EMPTY,
            depth: self.depth,
        }
    }

    /// Closes a scope.
    ///
    /// An error-free scope leaves the buffer exactly as it found it; a
    /// scope with verdicts collapses its range to one skip summary.
    pub fn pop(&mut self, scope: ScopeCursor) {
        debug_assert_eq!(scope.depth, self.depth, "scopes must pop in LIFO order");
        self.depth -= 1;
        debug_assert!(self.buffer.len() >= scope.start);

        if self.buffer.len() == scope.start {
            debug_assert!(scope.invalid.is_empty());
            return;
        }
        if scope.invalid.is_empty() {
            // Descendants recorded errors but nothing was accumulated
            // into this scope; their summaries are unreachable from any
            // surviving cursor.
            self.buffer.truncate(scope.start);
        } else {
            let skip = self.buffer.len() - scope.start;
            self.buffer.push(BufferElement::Skip {
                productions: scope.invalid,
                skip,
            });
        }
    }

    /// Records an error against one production.
    ///
    /// The first error per production wins; later calls for the same
    /// production on the same scope are ignored.
    pub fn record_error(
        &mut self,
        scope: &mut ScopeCursor,
        production: ProductionSet,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        debug_assert!(production.is_single());
        if !scope.is_valid(production) {
            return;
        }
        scope.invalid = scope.invalid.union(production);
        self.buffer.push(BufferElement::Leaf {
            productions: production,
            error: ParseError::new(location, message, arg),
        });
    }

    pub fn record_expression_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(scope, ProductionSet::EXPRESSION, location, message, arg);
    }

    pub fn record_binding_pattern_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(scope, ProductionSet::BINDING_PATTERN, location, message, arg);
    }

    pub fn record_assignment_pattern_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(scope, ProductionSet::ASSIGNMENT_PATTERN, location, message, arg);
    }

    pub fn record_arrow_formal_parameters_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(
            scope,
            ProductionSet::ARROW_FORMAL_PARAMETERS,
            location,
            message,
            arg,
        );
    }

    /// Records a duplicate parameter name at `location`.
    pub fn record_duplicate_formal_parameter_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
    ) {
        self.record_error(
            scope,
            ProductionSet::DISTINCT_FORMAL_PARAMETERS,
            location,
            MessageTemplate::StrictParamDupe,
            None,
        );
    }

    /// Records a binding that would be invalid in strict mode. This is
    /// not the duplicate check, which has its own production.
    pub fn record_strict_mode_formal_parameter_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(
            scope,
            ProductionSet::STRICT_MODE_FORMAL_PARAMETERS,
            location,
            message,
            arg,
        );
    }

    pub fn record_strong_mode_formal_parameter_error(
        &mut self,
        scope: &mut ScopeCursor,
        location: Location,
        message: MessageTemplate,
        arg: Option<&'static str>,
    ) {
        self.record_error(
            scope,
            ProductionSet::STRONG_MODE_FORMAL_PARAMETERS,
            location,
            message,
            arg,
        );
    }

    /// Finds the error that invalidated `production` for `scope`.
    ///
    /// Walks the buffer tail-first, jumping over summaries whose masks
    /// cannot contain the production and descending into those that
    /// must. The scope summary invariant guarantees a matching leaf
    /// exists inside any matching skip region.
    ///
    /// # Panics
    ///
    /// Panics if `production` is still valid on `scope`; querying an
    /// error that was never recorded is a caller bug.
    #[must_use]
    pub fn find_error(&self, scope: &ScopeCursor, production: ProductionSet) -> &ParseError {
        debug_assert!(production.is_single());
        assert!(
            !scope.is_valid(production),
            "no error recorded for {production:?}"
        );
        let mut end = self.buffer.len();
        loop {
            debug_assert!(end > 0);
            let idx = end - 1;
            let element = &self.buffer[idx];
            // Arrow validity propagates from binding-pattern validity,
            // so for the arrow lookup a binding-pattern element counts
            // as a hit even though its mask never names arrow.
            let matches = element.productions().intersects(production)
                || (production == ProductionSet::ARROW_FORMAL_PARAMETERS
                    && element.productions().intersects(ProductionSet::BINDING_PATTERN));
            if !matches {
                debug_assert!(element.skip() <= idx);
                end = idx - element.skip();
            } else if let BufferElement::Leaf { error, .. } = element {
                return error;
            } else {
                // A matching skip: the leaf is somewhere in its range.
                end = idx;
            }
        }
    }

    #[must_use]
    pub fn expression_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::EXPRESSION)
    }

    #[must_use]
    pub fn binding_pattern_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::BINDING_PATTERN)
    }

    #[must_use]
    pub fn assignment_pattern_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::ASSIGNMENT_PATTERN)
    }

    #[must_use]
    pub fn arrow_formal_parameters_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::ARROW_FORMAL_PARAMETERS)
    }

    #[must_use]
    pub fn duplicate_formal_parameter_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::DISTINCT_FORMAL_PARAMETERS)
    }

    #[must_use]
    pub fn strict_mode_formal_parameter_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::STRICT_MODE_FORMAL_PARAMETERS)
    }

    #[must_use]
    pub fn strong_mode_formal_parameter_error(&self, scope: &ScopeCursor) -> &ParseError {
        self.find_error(scope, ProductionSet::STRONG_MODE_FORMAL_PARAMETERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(begin: u32) -> Location {
        Location::new(begin, begin + 1)
    }

    #[test]
    fn fresh_scope_is_valid_everywhere() {
        let mut classifier = ProductionClassifier::new();
        let scope = classifier.push();
        assert!(scope.is_valid_expression());
        assert!(scope.is_valid_binding_pattern());
        assert!(scope.is_valid_arrow_formal_parameters());
        assert!(scope.invalid_productions().is_empty());
        classifier.pop(scope);
        assert_eq!(classifier.buffered(), 0);
    }

    #[test]
    fn record_marks_invalid_and_buffers_leaf() {
        let mut classifier = ProductionClassifier::new();
        let mut scope = classifier.push();
        classifier.record_expression_error(
            &mut scope,
            loc(4),
            MessageTemplate::UnexpectedToken,
            None,
        );
        assert!(!scope.is_valid_expression());
        assert!(scope.is_valid_binding_pattern());
        assert_eq!(classifier.buffered(), 1);

        let error = classifier.expression_error(&scope);
        assert_eq!(error.location, loc(4));
        classifier.pop(scope);
    }

    #[test]
    fn first_error_wins() {
        let mut classifier = ProductionClassifier::new();
        let mut scope = classifier.push();
        classifier.record_expression_error(
            &mut scope,
            loc(1),
            MessageTemplate::UnexpectedToken,
            None,
        );
        classifier.record_expression_error(
            &mut scope,
            loc(2),
            MessageTemplate::UnexpectedReserved,
            None,
        );
        assert_eq!(classifier.buffered(), 1, "second record is a no-op");
        let error = classifier.expression_error(&scope);
        assert_eq!(error.location, loc(1));
        assert_eq!(error.message, MessageTemplate::UnexpectedToken);
        classifier.pop(scope);
    }

    #[test]
    fn pop_without_errors_restores_buffer() {
        let mut classifier = ProductionClassifier::new();
        let mut outer = classifier.push();
        classifier.record_expression_error(
            &mut outer,
            loc(0),
            MessageTemplate::UnexpectedToken,
            None,
        );
        let before = classifier.buffered();

        let inner = classifier.push();
        classifier.pop(inner);
        assert_eq!(classifier.buffered(), before);
        classifier.pop(outer);
    }

    #[test]
    fn pop_with_unaccumulated_child_truncates() {
        let mut classifier = ProductionClassifier::new();
        let outer = classifier.push();

        let mut inner = classifier.push();
        classifier.record_binding_pattern_error(
            &mut inner,
            loc(7),
            MessageTemplate::InvalidDestructuringTarget,
            None,
        );
        classifier.pop(inner);
        assert!(classifier.buffered() > 0, "inner left a summary");

        // The outer scope never accumulated the inner verdicts, so its
        // pop discards the dead range.
        classifier.pop(outer);
        assert_eq!(classifier.buffered(), 0);
    }

    #[test]
    fn pop_with_errors_writes_one_skip() {
        let mut classifier = ProductionClassifier::new();
        let mut scope = classifier.push();
        classifier.record_expression_error(
            &mut scope,
            loc(0),
            MessageTemplate::UnexpectedToken,
            None,
        );
        classifier.record_binding_pattern_error(
            &mut scope,
            loc(1),
            MessageTemplate::InvalidDestructuringTarget,
            None,
        );
        classifier.pop(scope);
        // Two leaves plus one summary.
        assert_eq!(classifier.buffered(), 3);
    }

    #[test]
    fn accumulate_respects_mask() {
        let mut classifier = ProductionClassifier::new();
        let mut outer = classifier.push();
        let mut inner = classifier.push();
        classifier.record_expression_error(
            &mut inner,
            loc(0),
            MessageTemplate::UnexpectedToken,
            None,
        );
        classifier.record_binding_pattern_error(
            &mut inner,
            loc(1),
            MessageTemplate::InvalidDestructuringTarget,
            None,
        );

        outer.accumulate(&inner, ProductionSet::EXPRESSION);
        assert!(!outer.is_valid_expression());
        assert!(outer.is_valid_binding_pattern(), "not in the mask");

        classifier.pop(inner);
        classifier.pop(outer);
    }

    #[test]
    fn accumulate_arrow_follows_binding_pattern() {
        let mut classifier = ProductionClassifier::new();

        // Inner invalid as a binding pattern: arrow propagates.
        let mut outer = classifier.push();
        let mut inner = classifier.push();
        classifier.record_binding_pattern_error(
            &mut inner,
            loc(2),
            MessageTemplate::InvalidDestructuringTarget,
            None,
        );
        outer.accumulate(
            &inner,
            ProductionSet::STANDARD.union(ProductionSet::ARROW_FORMAL_PARAMETERS),
        );
        assert!(!outer.is_valid_arrow_formal_parameters());
        classifier.pop(inner);
        classifier.pop(outer);

        // Inner invalid only as an arrow list: the arrow bit does not
        // travel on its own.
        let mut outer = classifier.push();
        let mut inner = classifier.push();
        classifier.record_arrow_formal_parameters_error(
            &mut inner,
            loc(3),
            MessageTemplate::UnexpectedToken,
            None,
        );
        outer.accumulate(
            &inner,
            ProductionSet::STANDARD.union(ProductionSet::ARROW_FORMAL_PARAMETERS),
        );
        assert!(outer.is_valid_arrow_formal_parameters());
        classifier.pop(inner);
        classifier.pop(outer);
    }

    #[test]
    fn accumulate_from_clean_inner_is_a_no_op() {
        let mut classifier = ProductionClassifier::new();
        let mut outer = classifier.push();
        let inner = classifier.push();
        outer.accumulate(&inner, ProductionSet::ALL);
        assert!(outer.invalid_productions().is_empty());
        classifier.pop(inner);
        classifier.pop(outer);
    }

    #[test]
    #[should_panic(expected = "no error recorded")]
    fn find_error_on_valid_production_panics() {
        let mut classifier = ProductionClassifier::new();
        let scope = classifier.push();
        let _ = classifier.expression_error(&scope);
    }
}
