//! Tree-pattern matching over tempy syntax nodes.
//!
//! Patterns are written in tempy's own surface syntax and compiled once:
//!
//! ```text
//! lambda(__kleene_star__(params): NAME$param):
//!     __kleene_plus__(body): $stmt
//! ```
//!
//! - bare names match themselves, `NAME$x` captures a name's text, `$x`
//!   captures any node
//! - `__optional__`, `__or__`, `__group__`, `__kleene_star__` and
//!   `__kleene_plus__` combine the lines of their block; a positional
//!   argument names the resulting group
//! - `keyword=dict(...)` and `keyword=seq(...)` match keyword arguments
//!
//! A compiled [`Pattern`] is immutable and can be matched any number of
//! times. [`CaseMatcher`] layers first-match-wins dispatch on top.

mod bindings;
mod case;
mod compile;
mod engine;
mod pattern;

use tempy_ir::syntax::Suite;
use tempy_ir::SyntaxNode;

pub use bindings::{Bindings, Capture};
pub use case::{pull_left, CaseMatcher, NoCaseMatched, Selected};
pub use compile::{compile, compile_sequence, PatternError};
pub use pattern::{Combinator, KwPattern, Leaf, NodePattern, PosPattern, XExprPattern};

use engine::Item;

/// A compiled single-node pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    root: NodePattern,
}

impl Pattern {
    pub(crate) fn new(root: NodePattern) -> Self {
        Pattern { root }
    }

    pub fn root(&self) -> &NodePattern {
        &self.root
    }

    /// Match `node`, returning its captures on success.
    ///
    /// Matching is deterministic and never mutates the pattern or the node.
    pub fn match_node<'n>(&self, node: &'n SyntaxNode) -> Option<Bindings<'n>> {
        engine::match_node(&self.root, node)
    }

    /// Every capture name the pattern can bind at top level.
    pub fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.root.collect_names(&mut names);
        pattern::dedup_in_order(&mut names);
        names
    }
}

/// A compiled pattern over a list of nodes, such as the lines of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencePattern {
    root: PosPattern,
}

impl SequencePattern {
    pub(crate) fn new(root: PosPattern) -> Self {
        SequencePattern { root }
    }

    pub fn root(&self) -> &PosPattern {
        &self.root
    }

    /// Match plain (unlabelled) nodes. The whole slice must be consumed.
    pub fn match_nodes<'n>(&self, nodes: &'n [SyntaxNode]) -> Option<Bindings<'n>> {
        let items: Vec<Item<'n>> = nodes.iter().map(Item::Plain).collect();
        engine::match_positional(&self.root, &items)
    }

    /// Match the lines of a block, arrow lines included.
    pub fn match_suite<'n>(&self, suite: &'n Suite) -> Option<Bindings<'n>> {
        let items: Vec<Item<'n>> = suite.entries.iter().map(Item::from_entry).collect();
        engine::match_positional(&self.root, &items)
    }
}
