//! Capture bindings produced by a successful match.

use rustc_hash::FxHashMap;
use tempy_ir::SyntaxNode;

/// A captured value. Borrows from the matched tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Capture<'n> {
    Node(&'n SyntaxNode),
    Str(&'n str),
    /// Captures of a named group.
    Group(Bindings<'n>),
    /// One entry per repetition, in match order.
    Seq(Vec<Capture<'n>>),
    /// Surplus keywords of a subset dict-style match, in source order.
    Rest(Vec<(&'n str, &'n SyntaxNode)>),
    /// An optional or alternation member that did not participate.
    Absent,
}

impl<'n> Capture<'n> {
    pub fn as_node(&self) -> Option<&'n SyntaxNode> {
        match self {
            Capture::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// Text of a string capture, or of a captured bare-name node.
    pub fn as_str(&self) -> Option<&'n str> {
        match self {
            Capture::Str(text) => Some(*text),
            Capture::Node(node) => node.as_name(),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Bindings<'n>> {
        match self {
            Capture::Group(bindings) => Some(bindings),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Capture<'n>]> {
        match self {
            Capture::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Capture::Absent)
    }
}

/// Capture name to captured value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings<'n> {
    map: FxHashMap<String, Capture<'n>>,
}

impl<'n> Bindings<'n> {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, capture: Capture<'n>) {
        self.map.insert(name.into(), capture);
    }

    /// Move every capture of `other` into `self`, overwriting on conflict.
    pub fn merge(&mut self, other: Bindings<'n>) {
        self.map.extend(other.map);
    }

    pub fn remove(&mut self, name: &str) -> Option<Capture<'n>> {
        self.map.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Capture<'n>> {
        self.map.get(name)
    }

    pub fn node(&self, name: &str) -> Option<&'n SyntaxNode> {
        self.get(name).and_then(Capture::as_node)
    }

    pub fn text(&self, name: &str) -> Option<&'n str> {
        self.get(name).and_then(Capture::as_str)
    }

    /// A named group; `None` when absent or not a group.
    pub fn group(&self, name: &str) -> Option<&Bindings<'n>> {
        self.get(name).and_then(Capture::as_group)
    }

    /// A repetition; `None` when not captured as a sequence.
    pub fn seq(&self, name: &str) -> Option<&[Capture<'n>]> {
        self.get(name).and_then(Capture::as_seq)
    }

    /// Nodes of a repetition of node captures, skipping anything else.
    pub fn nodes(&self, name: &str) -> Vec<&'n SyntaxNode> {
        self.seq(name)
            .unwrap_or_default()
            .iter()
            .filter_map(Capture::as_node)
            .collect()
    }

    pub fn rest(&self) -> &[(&'n str, &'n SyntaxNode)] {
        match self.get(crate::KwPattern::REST) {
            Some(Capture::Rest(pairs)) => pairs.as_slice(),
            _ => &[],
        }
    }

    pub fn is_absent(&self, name: &str) -> bool {
        self.get(name).is_some_and(Capture::is_absent)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}
