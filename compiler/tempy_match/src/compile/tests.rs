use pretty_assertions::assert_eq;
use tempy_ir::syntax::build::{arrow, call_named, integer, line, name};

use super::*;

fn single(node: NodePattern) -> PosPattern {
    PosPattern::Single { node, label: None }
}

fn leaf(text: &str) -> NodePattern {
    NodePattern::Leaf(parse_leaf(text).unwrap())
}

fn xexpr(spec: impl Into<SyntaxNode>) -> XExprPattern {
    match compile(&spec.into()).unwrap().root() {
        NodePattern::XExpr(pattern) => (**pattern).clone(),
        NodePattern::Leaf(leaf) => panic!("expected an XExpr pattern, got {leaf:?}"),
    }
}

#[test]
fn test_leaf_sigils() {
    assert_eq!(parse_leaf("foo"), Ok(Leaf::ExactName("foo".into())));
    assert_eq!(parse_leaf("NAME$x"), Ok(Leaf::CapturedName("x".into())));
    assert_eq!(parse_leaf("$x"), Ok(Leaf::Wildcard("x".into())));
}

#[test]
fn test_empty_capture_rejected() {
    assert_eq!(parse_leaf("$"), Err(PatternError::EmptyCapture("$".into())));
    assert_eq!(
        parse_leaf("NAME$"),
        Err(PatternError::EmptyCapture("NAME$".into()))
    );
}

#[test]
fn test_non_pattern_nodes_rejected() {
    assert_eq!(
        compile(&integer("1")),
        Err(PatternError::UnsupportedNode(NodeTag::Literal))
    );
}

#[test]
fn test_xexpr_compiles_field_by_field() {
    let pattern = xexpr(call_named("f").label("def").arg(name("$a")).arg(name("NAME$b")));
    assert_eq!(pattern.head_label, Some(Leaf::ExactName("def".into())));
    assert_eq!(pattern.head, leaf("f"));
    assert_eq!(
        pattern.positional,
        PosPattern::Group {
            members: vec![single(leaf("$a")), single(leaf("NAME$b"))],
            name: None,
        }
    );
    assert_eq!(pattern.keywords, None);
    assert_eq!(pattern.vert, None);
}

#[test]
fn test_single_positional_is_not_wrapped() {
    let pattern = xexpr(call_named("f").arg(name("$a")));
    assert_eq!(pattern.positional, single(leaf("$a")));

    let pattern = xexpr(call_named("f"));
    assert_eq!(pattern.positional, PosPattern::Empty);
}

#[test]
fn test_combinators_take_operands_from_block() {
    let pattern = xexpr(
        call_named("f").line(
            call_named("__kleene_star__")
                .arg(name("params"))
                .line(name("NAME$p")),
        ),
    );
    assert_eq!(
        pattern.vert,
        Some(PosPattern::ZeroOrMore {
            inner: Box::new(single(leaf("NAME$p"))),
            name: Some("params".into()),
        })
    );
}

#[test]
fn test_labelled_head_is_not_a_combinator() {
    let pattern = xexpr(call_named("__optional__").label("x"));
    assert_eq!(pattern.head, leaf("__optional__"));
}

#[test]
fn test_labelled_combinator_line_rejected() {
    let spec = call_named("f").arrow("k", call_named("__group__").line(name("$x")));
    assert_eq!(
        compile(&spec.build()),
        Err(PatternError::LabelledCombinator(Combinator::Group))
    );
}

#[test]
fn test_combinator_arguments_validated() {
    let spec = call_named("f").line(call_named("__optional__").arg(name("a")).arg(name("b")));
    assert_eq!(
        compile(&spec.build()),
        Err(PatternError::CombinatorArguments("__optional__".into()))
    );

    let spec = call_named("f").line(call_named("__optional__").arg(integer("1")));
    assert_eq!(
        compile(&spec.build()),
        Err(PatternError::GroupNameNotName("__optional__".into()))
    );

    let spec = call_named("f").line(call_named("__or__").empty_block());
    assert_eq!(
        compile(&spec.build()),
        Err(PatternError::EmptyCombinator(Combinator::Alternation))
    );
}

#[test]
fn test_dict_keywords() {
    let dict = call_named("dict").arg(name("kw")).arrow("x", name("$a"));
    let pattern = xexpr(call_named("f").kwarg("keyword", dict));
    assert_eq!(
        pattern.keywords,
        Some(KwPattern::DictStyle {
            entries: vec![("x".into(), leaf("$a"))],
            name: Some("kw".into()),
        })
    );
}

#[test]
fn test_dict_keyword_errors() {
    let dict = call_named("dict").arrow("x", name("$a")).arrow("x", name("$b"));
    let spec = call_named("f").kwarg("keyword", dict);
    assert_eq!(
        compile(&spec.build()),
        Err(PatternError::DuplicateKey("x".into()))
    );

    let dict = call_named("dict").line(name("$a"));
    let spec = call_named("f").kwarg("keyword", dict);
    assert_eq!(compile(&spec.build()), Err(PatternError::DictEntry));

    let spec = call_named("f").kwarg("keyword", call_named("set"));
    assert_eq!(compile(&spec.build()), Err(PatternError::KeywordForm));

    let spec = call_named("f").kwarg("other", call_named("dict"));
    assert_eq!(compile(&spec.build()), Err(PatternError::KeywordArgument));
}

#[test]
fn test_seq_keywords() {
    let seq = call_named("seq").arrow("NAME$k", name("$v"));
    let pattern = xexpr(call_named("f").kwarg("keyword", seq));
    assert_eq!(
        pattern.keywords,
        Some(KwPattern::SeqStyle {
            inner: PosPattern::Single {
                node: leaf("$v"),
                label: Some(Leaf::CapturedName("k".into())),
            },
            name: None,
        })
    );
}

#[test]
fn test_slots_compile_to_single_matchers() {
    let pattern = xexpr(call_named("f").star(name("$s")).damp(name("$d")));
    assert_eq!(pattern.star, Some(single(leaf("$s"))));
    assert_eq!(pattern.damp, Some(single(leaf("$d"))));
    assert_eq!(pattern.dstar, None);
    assert_eq!(pattern.amp, None);
}

#[test]
fn test_compile_sequence() {
    let lines = vec![line(name("NAME$a")), arrow("to", name("$b"))];
    let sequence = compile_sequence(&lines).unwrap();
    assert_eq!(
        sequence.root(),
        &PosPattern::Group {
            members: vec![
                single(leaf("NAME$a")),
                PosPattern::Single {
                    node: leaf("$b"),
                    label: Some(Leaf::ExactName("to".into())),
                },
            ],
            name: None,
        }
    );

    let target = tempy_ir::syntax::Suite {
        entries: vec![line(name("x")), arrow("to", integer("1"))],
    };
    let bindings = sequence.match_suite(&target).unwrap();
    assert_eq!(bindings.text("a"), Some("x"));
}

#[test]
fn test_capture_names_in_declaration_order() {
    let spec = call_named("NAME$fn")
        .label("def")
        .arg(name("$x"))
        .line(call_named("__kleene_star__").arg(name("body")).line(name("$s")))
        .line(name("$x"));
    let pattern = compile(&spec.build()).unwrap();
    assert_eq!(pattern.capture_names(), ["fn", "x", "body"]);
}
