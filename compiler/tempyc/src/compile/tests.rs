use pretty_assertions::assert_eq;
use tempy_diagnostic::ErrorCode;
use tempy_ir::syntax::build::{assign, block, integer, name};
use tempy_ir::Span;

use super::*;

/// Ignores the source and returns a fixed result.
struct FixedParser(Result<SyntaxNode, SyntaxError>);

impl SyntaxParser for FixedParser {
    fn parse(&self, _source: &str) -> Result<SyntaxNode, SyntaxError> {
        self.0.clone()
    }
}

fn config() -> Config {
    Config::new().with_line_info(false)
}

#[test]
fn test_compile_block() {
    let module = compile(&block(vec![assign("x", integer("1"))]), &config()).unwrap();
    assert_eq!(module.exports, vec!["x"]);
}

#[test]
fn test_root_must_be_a_block() {
    let err = compile(&name("x"), &config()).unwrap_err();
    assert_eq!(err, CompileError::NotASuite(NodeTag::Name));
    assert!(err.diagnostics().is_empty());
}

#[test]
fn test_syntax_error_passes_through() {
    let error = SyntaxError {
        message: "unexpected `)`".to_string(),
        span: Span::line(1, 4, 5),
    };
    let parser = FixedParser(Err(error.clone()));
    let err = compile_source(&parser, "f(x))", &config()).unwrap_err();
    assert_eq!(err, CompileError::Syntax(error));
}

#[test]
fn test_compile_source_uses_parser_output() {
    let parser = FixedParser(Ok(block(vec![assign("y", integer("2"))])));
    let module = compile_source(&parser, "y = 2", &config()).unwrap();
    assert_eq!(module.exports, vec!["y"]);
}

#[test]
fn test_failure_carries_diagnostics() {
    let config = config().with_filename("mod.tempy");
    let err = compile(&block(vec![assign("x", name("missing"))]), &config).unwrap_err();
    let CompileError::Failed { diagnostics, flooded } = &err else {
        panic!("expected a lowering failure, got {err:?}");
    };
    assert!(!flooded);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E1002);

    let records = err.records();
    assert_eq!(records[0].kind, "UnboundName");
    assert_eq!(records[0].filename.as_deref(), Some("mod.tempy"));
    assert!(err.to_string().ends_with("compilation failed with 1 error(s)"));
}

#[test]
fn test_flooded_failure_message() {
    let lines = (0..3).map(|i| name(format!("missing{i}"))).collect::<Vec<_>>();
    let err = compile(&block(lines), &config().with_max_errors(1)).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert!(err.to_string().ends_with("(too many errors, stopped early)"));
}
