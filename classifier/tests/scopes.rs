//! Scope lifecycle scenarios across nested pushes, pops, and
//! accumulation.

use classifier::{Location, MessageTemplate, ProductionClassifier, ProductionSet};

#[test]
fn child_verdicts_survive_into_parent_lookups() {
    let mut classifier = ProductionClassifier::new();
    let mut parent = classifier.push();

    let location = Location::new(10, 15);
    let mut child = classifier.push();
    classifier.record_binding_pattern_error(
        &mut child,
        location,
        MessageTemplate::InvalidDestructuringTarget,
        Some("obj.prop"),
    );
    let child_view = *classifier.binding_pattern_error(&child);

    parent.accumulate(
        &child,
        ProductionSet::EXPRESSION
            .union(ProductionSet::BINDING_PATTERN)
            .union(ProductionSet::ARROW_FORMAL_PARAMETERS),
    );
    classifier.pop(child);

    assert!(parent.is_valid_expression());
    assert!(!parent.is_valid_binding_pattern());
    assert!(!parent.is_valid_arrow_formal_parameters());

    // The parent resolves the same error object the child saw, for both
    // the binding-pattern and the propagated arrow lookups.
    assert_eq!(*classifier.binding_pattern_error(&parent), child_view);
    let arrow = classifier.arrow_formal_parameters_error(&parent);
    assert_eq!(arrow.location, location);
    assert_eq!(arrow.message, MessageTemplate::InvalidDestructuringTarget);
    assert_eq!(arrow.arg, Some("obj.prop"));

    classifier.pop(parent);
}

#[test]
fn doubly_nested_summaries_resolve_to_the_original_leaf() {
    let mut classifier = ProductionClassifier::new();
    let mut outer = classifier.push();
    let mut middle = classifier.push();

    let location = Location::new(3, 4);
    let mut inner = classifier.push();
    classifier.record_expression_error(
        &mut inner,
        location,
        MessageTemplate::UnexpectedToken,
        None,
    );
    middle.accumulate(&inner, ProductionSet::EXPRESSION);
    classifier.pop(inner);

    outer.accumulate(&middle, ProductionSet::EXPRESSION);
    classifier.pop(middle);

    // The buffer now holds the leaf under at least one skip summary;
    // lookup must tunnel through to the original record.
    assert!(classifier.buffered() >= 2);
    let error = classifier.expression_error(&outer);
    assert_eq!(error.location, location);
    assert_eq!(error.message, MessageTemplate::UnexpectedToken);

    // Popping the outer scope adds its own summary on top.
    classifier.pop(outer);
    assert_eq!(classifier.buffered(), 4);
}

#[test]
fn sibling_scopes_do_not_leak_errors() {
    let mut classifier = ProductionClassifier::new();
    let mut parent = classifier.push();

    // First sibling errs and is accumulated.
    let mut first = classifier.push();
    classifier.record_expression_error(
        &mut first,
        Location::new(1, 2),
        MessageTemplate::UnexpectedToken,
        None,
    );
    parent.accumulate(&first, ProductionSet::EXPRESSION);
    classifier.pop(first);

    // Second sibling errs on a different production but is dropped
    // without accumulation.
    let mut second = classifier.push();
    classifier.record_assignment_pattern_error(
        &mut second,
        Location::new(5, 6),
        MessageTemplate::InvalidLhsInAssignment,
        None,
    );
    classifier.pop(second);

    assert!(!parent.is_valid_expression());
    assert!(parent.is_valid_assignment_pattern());
    let error = classifier.expression_error(&parent);
    assert_eq!(error.location, Location::new(1, 2));

    classifier.pop(parent);
}

#[test]
fn balanced_empty_scopes_leave_no_trace() {
    let mut classifier = ProductionClassifier::new();
    let a = classifier.push();
    let b = classifier.push();
    let c = classifier.push();
    classifier.pop(c);
    classifier.pop(b);
    classifier.pop(a);
    assert_eq!(classifier.buffered(), 0);
}

#[test]
fn formal_parameter_scenario() {
    // Parsing `(a, a, eval)` as a candidate parameter list: a duplicate
    // name and a strict-mode-illegal name, while the fragment stays a
    // fine plain expression.
    let mut classifier = ProductionClassifier::new();
    let mut scope = classifier.push();

    classifier.record_duplicate_formal_parameter_error(&mut scope, Location::new(4, 5));
    classifier.record_strict_mode_formal_parameter_error(
        &mut scope,
        Location::new(7, 11),
        MessageTemplate::StrictEvalArguments,
        None,
    );

    assert!(scope.is_valid_expression());
    assert!(!scope.is_valid_formal_parameter_list_without_duplicates());
    assert!(!scope.is_valid_strict_mode_formal_parameters());
    assert!(scope.is_valid_strong_mode_formal_parameters());

    let dupe = classifier.duplicate_formal_parameter_error(&scope);
    assert_eq!(dupe.message, MessageTemplate::StrictParamDupe);
    assert_eq!(dupe.location, Location::new(4, 5));

    let strict = classifier.strict_mode_formal_parameter_error(&scope);
    assert_eq!(strict.message, MessageTemplate::StrictEvalArguments);

    classifier.pop(scope);
}

#[test]
fn lookup_skips_unrelated_summaries() {
    let mut classifier = ProductionClassifier::new();
    let mut parent = classifier.push();

    // An early expression error on the parent itself.
    classifier.record_expression_error(
        &mut parent,
        Location::new(0, 1),
        MessageTemplate::UnexpectedToken,
        None,
    );

    // A later child invalid only as an assignment pattern, accumulated
    // and summarised after the leaf we want.
    let mut child = classifier.push();
    classifier.record_assignment_pattern_error(
        &mut child,
        Location::new(9, 10),
        MessageTemplate::InvalidLhsInAssignment,
        None,
    );
    parent.accumulate(&child, ProductionSet::STANDARD);
    classifier.pop(child);

    // The expression lookup must jump over the assignment-pattern
    // summary region and land on the first leaf.
    let error = classifier.expression_error(&parent);
    assert_eq!(error.location, Location::new(0, 1));

    classifier.pop(parent);
}
