use pretty_assertions::assert_eq;
use tempy_ir::syntax::build::{call_named, integer, name, string};

use super::*;
use crate::{compile, Pattern};

fn pattern(spec: impl Into<SyntaxNode>) -> Pattern {
    compile(&spec.into()).unwrap()
}

fn names(texts: &[&str]) -> Vec<SyntaxNode> {
    texts.iter().map(|text| name(*text)).collect()
}

/// `f():` with the given plain lines as its block.
fn block_call(lines: Vec<SyntaxNode>) -> SyntaxNode {
    lines
        .into_iter()
        .fold(call_named("f").empty_block(), |call, line| call.line(line))
        .build()
}

// Leaves

#[test]
fn test_wildcard_binds_node() {
    let p = pattern(name("$x"));
    let node = integer("42");
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.node("x"), Some(&node));
}

#[test]
fn test_exact_name_requires_equal_text() {
    let p = pattern(name("foo"));
    assert!(p.match_node(&name("foo")).unwrap().is_empty());
    assert!(p.match_node(&name("bar")).is_none());
    assert!(p.match_node(&string("foo")).is_none());
}

#[test]
fn test_captured_name_binds_text_and_rejects_non_names() {
    let p = pattern(name("NAME$n"));
    assert_eq!(p.match_node(&name("spam")).unwrap().text("n"), Some("spam"));
    assert!(p.match_node(&integer("1")).is_none());
}

// XExpr parts

#[test]
fn test_positional_arguments_in_order() {
    let p = pattern(call_named("f").arg(name("$a")).arg(name("NAME$b")));
    let node = call_named("f").arg(integer("1")).arg(name("y")).build();
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.node("a"), Some(&integer("1")));
    assert_eq!(bindings.text("b"), Some("y"));
    assert_eq!(bindings.len(), 2);
}

#[test]
fn test_positional_count_must_match() {
    let one = pattern(call_named("f").arg(name("$a")));
    assert!(one.match_node(&call_named("f").build()).is_none());
    assert!(one
        .match_node(&call_named("f").arg(integer("1")).arg(integer("2")).build())
        .is_none());

    let none = pattern(call_named("f"));
    assert!(none.match_node(&call_named("f").arg(integer("1")).build()).is_none());
    assert!(none.match_node(&call_named("f").build()).is_some());
}

#[test]
fn test_head_must_match() {
    let p = pattern(call_named("f"));
    assert!(p.match_node(&call_named("g").build()).is_none());
    assert!(p.match_node(&name("f")).is_none());
}

#[test]
fn test_head_label_presence_must_agree() {
    let labelled = pattern(call_named("NAME$fn").label("def"));
    let def = call_named("spam").label("def").build();
    assert_eq!(labelled.match_node(&def).unwrap().text("fn"), Some("spam"));
    assert!(labelled.match_node(&call_named("spam").build()).is_none());
    assert!(labelled
        .match_node(&call_named("spam").label("import").build())
        .is_none());

    let unlabelled = pattern(call_named("spam"));
    assert!(unlabelled.match_node(&def).is_none());
}

#[test]
fn test_head_label_capture() {
    let p = pattern(call_named("f").label("NAME$kind"));
    let node = call_named("f").label("import").build();
    assert_eq!(p.match_node(&node).unwrap().text("kind"), Some("import"));
}

#[test]
fn test_missing_block_matcher_requires_empty_block() {
    let p = pattern(call_named("f"));
    assert!(p.match_node(&call_named("f").empty_block().build()).is_some());
    assert!(p.match_node(&block_call(names(&["x"]))).is_none());
}

#[test]
fn test_keywords_rejected_without_keyword_matcher() {
    let p = pattern(call_named("f"));
    let node = call_named("f").kwarg("x", integer("1")).build();
    assert!(p.match_node(&node).is_none());
}

#[test]
fn test_special_slots() {
    let p = pattern(call_named("f").star(name("$args")));
    let node = call_named("f").star(name("xs")).build();
    assert_eq!(p.match_node(&node).unwrap().node("args"), Some(&name("xs")));

    // A slot matcher needs the slot filled, and vice versa.
    assert!(p.match_node(&call_named("f").build()).is_none());
    assert!(pattern(call_named("f")).match_node(&node).is_none());
    assert!(p.match_node(&call_named("f").dstar(name("xs")).build()).is_none());
}

#[test]
fn test_block_arrow_lines_need_label_matchers() {
    let p = pattern(call_named("f").arrow("NAME$key", name("$value")));
    let node = call_named("f").arrow("x", integer("1")).build();
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.text("key"), Some("x"));
    assert_eq!(bindings.node("value"), Some(&integer("1")));

    // Plain line against a labelled matcher, and the reverse.
    assert!(p.match_node(&block_call(vec![integer("1")])).is_none());
    let plain = pattern(call_named("f").line(name("$value")));
    assert!(plain.match_node(&node).is_none());
}

// Combinators

#[test]
fn test_alternation_commits_to_first_local_success() {
    // __or__:
    //     a
    //     __group__:
    //         a
    //         b
    // b
    let alternation = call_named("__or__")
        .line(name("a"))
        .line(call_named("__group__").line(name("a")).line(name("b")));
    let p = pattern(call_named("f").line(alternation).line(name("b")));

    assert!(p.match_node(&block_call(names(&["a", "b"]))).is_some());
    // The second branch followed by `b` would fit, but the first branch
    // already matched locally and is never revisited.
    assert!(p.match_node(&block_call(names(&["a", "b", "b"]))).is_none());
}

#[test]
fn test_alternation_tries_next_branch_on_local_failure() {
    let alternation = call_named("__or__")
        .arg(name("which"))
        .line(name("stop"))
        .line(name("NAME$n"));
    let p = pattern(call_named("f").line(alternation));

    let node = block_call(names(&["go"]));

    let bindings = p.match_node(&node).unwrap();
    let which = bindings.group("which").unwrap();
    assert_eq!(which.text("n"), Some("go"));

    let node = block_call(names(&["stop"]));

    let bindings = p.match_node(&node).unwrap();
    assert!(bindings.group("which").unwrap().is_empty());
}

#[test]
fn test_unnamed_alternation_marks_untaken_names_absent() {
    let alternation = call_named("__or__")
        .line(call_named("lit").arg(name("$value")))
        .line(name("NAME$var"));
    let p = pattern(call_named("f").line(alternation));

    let node = block_call(names(&["x"]));

    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.text("var"), Some("x"));
    assert!(bindings.is_absent("value"));
}

#[test]
fn test_optional_falls_through_when_continuation_fails() {
    // __optional__(g):
    //     NAME$n
    // end
    let optional = call_named("__optional__").arg(name("g")).line(name("NAME$n"));
    let p = pattern(call_named("f").line(optional).line(name("end")));

    // The optional member would swallow `end` and starve the rest, so it
    // backs off.
    let node = block_call(names(&["end"]));
    let bindings = p.match_node(&node).unwrap();
    assert!(bindings.is_absent("g"));

    let node = block_call(names(&["x", "end"]));

    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.group("g").unwrap().text("n"), Some("x"));
}

#[test]
fn test_unnamed_optional_binds_absent_names() {
    let optional = call_named("__optional__").line(name("NAME$n"));
    let p = pattern(call_named("f").line(optional));

    let node = call_named("f").empty_block().build();

    let bindings = p.match_node(&node).unwrap();
    assert!(bindings.is_absent("n"));

    let node = block_call(names(&["x"]));

    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.text("n"), Some("x"));
}

#[test]
fn test_named_group_nests_captures() {
    let group = call_named("__group__")
        .arg(name("pair"))
        .line(name("NAME$a"))
        .line(name("NAME$b"));
    let p = pattern(call_named("f").line(group));

    let node = block_call(names(&["x", "y"]));

    let bindings = p.match_node(&node).unwrap();
    assert!(!bindings.contains("a"));
    let pair = bindings.group("pair").unwrap();
    assert_eq!(pair.text("a"), Some("x"));
    assert_eq!(pair.text("b"), Some("y"));
}

#[test]
fn test_named_zero_or_more_collects_groups_in_order() {
    let star = call_named("__kleene_star__").arg(name("params")).line(name("NAME$p"));
    let p = pattern(call_named("f").line(star));

    let node = block_call(names(&["a", "b", "c"]));

    let bindings = p.match_node(&node).unwrap();
    let params: Vec<_> = bindings
        .seq("params")
        .unwrap()
        .iter()
        .map(|pass| pass.as_group().unwrap().text("p").unwrap())
        .collect();
    assert_eq!(params, ["a", "b", "c"]);

    let node = call_named("f").empty_block().build();

    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.seq("params"), Some(&[][..]));
}

#[test]
fn test_unnamed_zero_or_more_collects_each_name() {
    let star = call_named("__kleene_star__").line(name("$stmt"));
    let p = pattern(call_named("f").line(star));

    let lines = vec![integer("1"), name("x")];
    let node = block_call(lines.clone());
    let bindings = p.match_node(&node).unwrap();
    let stmts: Vec<_> = bindings.nodes("stmt").into_iter().cloned().collect();
    assert_eq!(stmts, lines);
}

#[test]
fn test_repetition_is_possessive() {
    // __kleene_star__:
    //     NAME$p
    // NAME$last
    let star = call_named("__kleene_star__").line(name("NAME$p"));
    let p = pattern(call_named("f").line(star).line(name("NAME$last")));
    assert!(p.match_node(&block_call(names(&["a", "b"]))).is_none());
}

#[test]
fn test_one_or_more_needs_a_pass() {
    let plus = call_named("__kleene_plus__").arg(name("body")).line(name("$stmt"));
    let p = pattern(call_named("f").line(plus));

    assert!(p.match_node(&call_named("f").build()).is_none());
    let node = block_call(names(&["x", "y"]));
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.seq("body").unwrap().len(), 2);
}

#[test]
fn test_repetition_followed_by_required_item() {
    let star = call_named("__kleene_star__").line(name("NAME$p"));
    let p = pattern(call_named("f").line(star).arrow("end", name("$tail")));
    let node = call_named("f")
        .line(name("a"))
        .line(name("b"))
        .arrow("end", integer("1"))
        .build();
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.seq("p").unwrap().len(), 2);
    assert_eq!(bindings.node("tail"), Some(&integer("1")));
}

// Keywords

fn dict_spec(group: Option<&str>) -> SyntaxNode {
    let dict = match group {
        Some(group) => call_named("dict").arg(name(group)),
        None => call_named("dict"),
    };
    call_named("f")
        .kwarg("keyword", dict.arrow("x", name("$a")).arrow("y", name("$b")))
        .build()
}

#[test]
fn test_unnamed_dict_style_is_exact() {
    let p = pattern(dict_spec(None));
    let node = call_named("f").kwarg("y", integer("2")).kwarg("x", integer("1")).build();
    let bindings = p.match_node(&node).unwrap();
    assert_eq!(bindings.node("a"), Some(&integer("1")));
    assert_eq!(bindings.node("b"), Some(&integer("2")));

    let extra = call_named("f")
        .kwarg("x", integer("1"))
        .kwarg("y", integer("2"))
        .kwarg("z", integer("3"))
        .build();
    assert!(p.match_node(&extra).is_none());

    let missing = call_named("f").kwarg("x", integer("1")).build();
    assert!(p.match_node(&missing).is_none());
}

#[test]
fn test_named_dict_style_is_subset_with_rest() {
    let p = pattern(dict_spec(Some("kw")));
    let node = call_named("f")
        .kwarg("z", integer("3"))
        .kwarg("x", integer("1"))
        .kwarg("w", integer("4"))
        .kwarg("y", integer("2"))
        .build();
    let bindings = p.match_node(&node).unwrap();
    let kw = bindings.group("kw").unwrap();
    assert_eq!(kw.node("a"), Some(&integer("1")));
    let rest: Vec<_> = kw.rest().iter().map(|(key, _)| *key).collect();
    assert_eq!(rest, ["z", "w"]);
}

#[test]
fn test_dict_style_rejects_duplicate_keys() {
    let p = pattern(dict_spec(Some("kw")));
    let node = call_named("f")
        .kwarg("x", integer("1"))
        .kwarg("y", integer("2"))
        .kwarg("x", integer("3"))
        .build();
    assert!(p.match_node(&node).is_none());
}

#[test]
fn test_seq_style_matches_keywords_positionally() {
    let star = call_named("__kleene_star__")
        .arg(name("defs"))
        .arrow("NAME$key", name("$value"));
    let p = pattern(call_named("f").kwarg("keyword", call_named("seq").line(star)));

    let node = call_named("f").kwarg("a", integer("1")).kwarg("b", integer("2")).build();
    let bindings = p.match_node(&node).unwrap();
    let keys: Vec<_> = bindings
        .seq("defs")
        .unwrap()
        .iter()
        .map(|pass| pass.as_group().unwrap().text("key").unwrap())
        .collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn test_match_is_deterministic() {
    let star = call_named("__kleene_star__").arg(name("items")).line(name("$x"));
    let p = pattern(call_named("f").line(star));
    let node = block_call(names(&["a", "b"]));
    assert_eq!(p.match_node(&node), p.match_node(&node));
}
