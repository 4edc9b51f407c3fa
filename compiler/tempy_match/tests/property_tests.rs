//! Property-based tests for the pattern matcher.
//!
//! Generates random block bodies and checks that:
//! 1. Matching is deterministic: the same pattern and node give equal bindings
//! 2. A named repetition yields one group per matched line, in order
//! 3. Atomic alternation never accepts more than the first local branch allows

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tempy_ir::syntax::build::{call_named, integer, name, string};
use tempy_ir::SyntaxNode;
use tempy_match::{compile, Pattern};

// -- Strategies --

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,8}").expect("valid regex")
}

/// A block line: a name, a literal, or a small call.
fn line_strategy() -> impl Strategy<Value = SyntaxNode> {
    prop_oneof![
        identifier_strategy().prop_map(name),
        (0u32..1000).prop_map(|n| integer(n.to_string())),
        identifier_strategy().prop_map(string),
        (identifier_strategy(), identifier_strategy())
            .prop_map(|(head, arg)| call_named(head).arg(name(arg)).build()),
    ]
}

fn block_node(lines: &[SyntaxNode]) -> SyntaxNode {
    lines
        .iter()
        .cloned()
        .fold(call_named("f").empty_block(), |call, line| call.line(line))
        .build()
}

fn star_pattern(inner: SyntaxNode) -> Pattern {
    let star = call_named("__kleene_star__").arg(name("items")).line(inner);
    compile(&call_named("f").line(star).build()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn matching_is_deterministic(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let pattern = star_pattern(name("$x"));
        let node = block_node(&lines);
        prop_assert_eq!(pattern.match_node(&node), pattern.match_node(&node));
    }

    #[test]
    fn repetition_captures_every_line(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let pattern = star_pattern(name("$x"));
        let node = block_node(&lines);
        let bindings = pattern.match_node(&node).unwrap();
        let captured: Vec<&SyntaxNode> = bindings
            .seq("items")
            .unwrap()
            .iter()
            .map(|pass| pass.as_group().unwrap().node("x").unwrap())
            .collect();
        prop_assert_eq!(captured.len(), lines.len());
        for (got, want) in captured.into_iter().zip(&lines) {
            prop_assert_eq!(got, want);
        }
    }

    #[test]
    fn name_repetition_matches_only_all_name_blocks(
        lines in prop::collection::vec(line_strategy(), 0..12),
    ) {
        let pattern = star_pattern(name("NAME$x"));
        let node = block_node(&lines);
        let all_names = lines.iter().all(|line| line.as_name().is_some());
        prop_assert_eq!(pattern.match_node(&node).is_some(), all_names);
    }

    #[test]
    fn atomic_alternation_rejects_trailing_input(extra in 1usize..6) {
        // __or__: (a | a a) followed by nothing: only a single `a` fits.
        let alternation = call_named("__or__")
            .line(name("a"))
            .line(call_named("__group__").line(name("a")).line(name("a")));
        let pattern = compile(&call_named("f").line(alternation).build()).unwrap();
        let lines: Vec<SyntaxNode> = (0..extra).map(|_| name("a")).collect();
        let matched = pattern.match_node(&block_node(&lines)).is_some();
        prop_assert_eq!(matched, extra == 1);
    }
}
