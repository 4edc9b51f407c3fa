use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E1002)
        .with_message("unbound name `x`")
        .with_label(Span::line(3, 4, 5), "used here")
        .with_secondary_label(Span::line(1, 0, 1), "similar name here")
        .with_note("names must be bound before use");

    assert_eq!(diag.code, ErrorCode::E1002);
    assert_eq!(diag.kind(), "UnboundName");
    assert_eq!(diag.labels.len(), 2);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.primary_span(), Some(Span::line(3, 4, 5)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_location_defaults_to_dummy() {
    let diag = Diagnostic::error(ErrorCode::E9001).with_message("no label");
    assert_eq!(diag.location(), Span::DUMMY);
}

#[test]
fn test_record() {
    let diag = Diagnostic::error(ErrorCode::E1004)
        .with_message("duplicate argument `a`")
        .with_label(Span::new(2, 8, 2, 9), "second occurrence")
        .with_filename("mod.tpy");

    assert_eq!(
        diag.to_record(),
        DiagnosticRecord {
            kind: "DuplicateFormalArgument".to_string(),
            message: "duplicate argument `a`".to_string(),
            location: Span::new(2, 8, 2, 9),
            filename: Some("mod.tpy".to_string()),
        }
    );
}

#[test]
fn test_display() {
    let diag = Diagnostic::error(ErrorCode::E1003)
        .with_message("cannot assign to a call")
        .with_label(Span::new(4, 0, 4, 6), "here")
        .with_filename("a.tpy")
        .with_note("only names, attributes and items are assignable");

    assert_eq!(
        diag.to_string(),
        "<IllegalAssignTarget> cannot assign to a call in \"a.tpy\" [line 4-4, col 0-6]\n  \
         = note: only names, attributes and items are assignable"
    );
}
