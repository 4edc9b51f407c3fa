use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;
use tempy_ir::Span;

fn unbound(line: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("unbound name on line {line}"))
        .with_label(Span::line(line, 0, 1), "here")
}

#[test]
fn test_emit_returns_guarantee() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.has_errors().is_none());
    assert!(queue.emit_error(unbound(1)).is_ok());
    assert!(queue.has_errors().is_some());
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn test_flood_records_the_ceiling_error() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 3,
        filename: None,
    });
    assert!(queue.emit_error(unbound(1)).is_ok());
    assert!(queue.emit_error(unbound(2)).is_ok());
    assert_eq!(queue.emit_error(unbound(3)), Err(ErrorFlood { limit: 3 }));
    assert!(queue.is_flooded());
    assert_eq!(queue.error_count(), 3);

    // Once flooded, further errors are dropped.
    assert!(queue.emit_error(unbound(4)).is_err());
    assert_eq!(queue.error_count(), 3);
}

#[test]
fn test_unlimited_never_floods() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for line in 0..100 {
        assert!(queue.emit_error(unbound(line)).is_ok());
    }
    assert!(!queue.limit_reached());
}

#[test]
fn test_flush_preserves_emission_order() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for line in [5, 1, 3] {
        let _ = queue.emit_error(unbound(line));
    }
    let lines: Vec<u32> = queue
        .flush()
        .iter()
        .map(|d| d.location().start_line)
        .collect();
    assert_eq!(lines, vec![5, 1, 3]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn test_filename_stamped_when_missing() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 0,
        filename: Some("main.tpy".to_string()),
    });
    let _ = queue.emit_error(unbound(1));
    let _ = queue.emit_error(unbound(2).with_filename("other.tpy"));

    let names: Vec<_> = queue.peek().map(|d| d.filename.as_deref()).collect();
    assert_eq!(names, vec![Some("main.tpy"), Some("other.tpy")]);
}

#[test]
fn test_flood_display() {
    assert_eq!(ErrorFlood { limit: 20 }.to_string(), "aborting after 20 errors");
}
