//! Compiled pattern trees.
//!
//! Everything here is produced by [`compile`](crate::compile) and never
//! mutated afterwards.

use std::fmt;

use tempy_ir::syntax::SpecialSlot;

/// Leaf string matcher, selected by the sigil on a pattern name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leaf {
    /// `foo`: matches the name `foo` exactly.
    ExactName(String),
    /// `NAME$x`: matches any name, binding its text to `x`.
    CapturedName(String),
    /// `$x`: matches any node, binding it to `x`.
    Wildcard(String),
}

impl Leaf {
    pub(crate) const NAME_SIGIL: &'static str = "NAME$";
    pub(crate) const CAPTURE_SIGIL: char = '$';

    /// The capture name this leaf binds, if any.
    pub fn capture(&self) -> Option<&str> {
        match self {
            Leaf::ExactName(_) => None,
            Leaf::CapturedName(name) | Leaf::Wildcard(name) => Some(name),
        }
    }
}

/// Reserved combinator heads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Combinator {
    Optional,
    Alternation,
    Group,
    ZeroOrMore,
    OneOrMore,
}

impl Combinator {
    pub fn from_head(head: &str) -> Option<Self> {
        match head {
            "__optional__" => Some(Combinator::Optional),
            "__or__" => Some(Combinator::Alternation),
            "__group__" => Some(Combinator::Group),
            "__kleene_star__" => Some(Combinator::ZeroOrMore),
            "__kleene_plus__" => Some(Combinator::OneOrMore),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Combinator::Optional => "__optional__",
            Combinator::Alternation => "__or__",
            Combinator::Group => "__group__",
            Combinator::ZeroOrMore => "__kleene_star__",
            Combinator::OneOrMore => "__kleene_plus__",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matcher for a single syntax node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodePattern {
    Leaf(Leaf),
    XExpr(Box<XExprPattern>),
}

/// Matcher over an ordered list of (optionally labelled) nodes.
///
/// A combinator with `name: None` splices its captures into the enclosing
/// scope; a named one binds them as a nested group under that name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PosPattern {
    /// Exactly one element; a labelled element needs a label matcher and
    /// a plain one must not have one.
    Single {
        node: NodePattern,
        label: Option<Leaf>,
    },
    Group {
        members: Vec<PosPattern>,
        name: Option<String>,
    },
    Alternation {
        branches: Vec<PosPattern>,
        name: Option<String>,
    },
    Optional {
        inner: Box<PosPattern>,
        name: Option<String>,
    },
    ZeroOrMore {
        inner: Box<PosPattern>,
        name: Option<String>,
    },
    OneOrMore {
        inner: Box<PosPattern>,
        name: Option<String>,
    },
    /// Matches only the empty list.
    Empty,
}

/// Matcher for keyword arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KwPattern {
    /// Key-set match. Unnamed means exact; named means subset, with
    /// surplus keys bound to `__rest__` inside the group.
    DictStyle {
        entries: Vec<(String, NodePattern)>,
        name: Option<String>,
    },
    /// Keyword pairs re-matched positionally as labelled elements.
    SeqStyle {
        inner: PosPattern,
        name: Option<String>,
    },
}

impl KwPattern {
    pub const REST: &'static str = "__rest__";
}

/// Matcher for an `XExpr`. Absent slot or block matchers require the
/// corresponding part of the candidate to be absent or empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XExprPattern {
    pub head_label: Option<Leaf>,
    pub head: NodePattern,
    pub positional: PosPattern,
    pub keywords: Option<KwPattern>,
    pub star: Option<PosPattern>,
    pub dstar: Option<PosPattern>,
    pub amp: Option<PosPattern>,
    pub damp: Option<PosPattern>,
    pub vert: Option<PosPattern>,
}

impl XExprPattern {
    pub fn slot(&self, slot: SpecialSlot) -> Option<&PosPattern> {
        match slot {
            SpecialSlot::Star => self.star.as_ref(),
            SpecialSlot::DoubleStar => self.dstar.as_ref(),
            SpecialSlot::Amp => self.amp.as_ref(),
            SpecialSlot::DoubleAmp => self.damp.as_ref(),
        }
    }
}

// Capture-name collection. Unnamed combinators need the names their
// operands declare so that repetitions and untaken branches can bind them.

impl NodePattern {
    pub(crate) fn collect_names<'p>(&'p self, out: &mut Vec<&'p str>) {
        match self {
            NodePattern::Leaf(leaf) => out.extend(leaf.capture()),
            NodePattern::XExpr(xexpr) => xexpr.collect_names(out),
        }
    }
}

impl XExprPattern {
    fn collect_names<'p>(&'p self, out: &mut Vec<&'p str>) {
        if let Some(label) = &self.head_label {
            out.extend(label.capture());
        }
        self.head.collect_names(out);
        self.positional.collect_names(out);
        match &self.keywords {
            Some(KwPattern::DictStyle { name: Some(name), .. } | KwPattern::SeqStyle { name: Some(name), .. }) => {
                out.push(name);
            }
            Some(KwPattern::DictStyle { entries, name: None }) => {
                for (_, pattern) in entries {
                    pattern.collect_names(out);
                }
            }
            Some(KwPattern::SeqStyle { inner, name: None }) => inner.collect_names(out),
            None => {}
        }
        for slot in SpecialSlot::ALL {
            if let Some(pattern) = self.slot(slot) {
                pattern.collect_names(out);
            }
        }
        if let Some(vert) = &self.vert {
            vert.collect_names(out);
        }
    }
}

impl PosPattern {
    pub(crate) fn collect_names<'p>(&'p self, out: &mut Vec<&'p str>) {
        match self {
            PosPattern::Single { node, label } => {
                if let Some(label) = label {
                    out.extend(label.capture());
                }
                node.collect_names(out);
            }
            PosPattern::Group { name: Some(name), .. }
            | PosPattern::Alternation { name: Some(name), .. }
            | PosPattern::Optional { name: Some(name), .. }
            | PosPattern::ZeroOrMore { name: Some(name), .. }
            | PosPattern::OneOrMore { name: Some(name), .. } => out.push(name),
            PosPattern::Group { members, name: None }
            | PosPattern::Alternation {
                branches: members,
                name: None,
            } => {
                for member in members {
                    member.collect_names(out);
                }
            }
            PosPattern::Optional { inner, name: None }
            | PosPattern::ZeroOrMore { inner, name: None }
            | PosPattern::OneOrMore { inner, name: None } => inner.collect_names(out),
            PosPattern::Empty => {}
        }
    }

    /// Capture names this pattern binds in its enclosing scope, deduplicated
    /// in first-declaration order.
    pub fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        dedup_in_order(&mut names);
        names
    }
}

pub(crate) fn dedup_in_order(names: &mut Vec<&str>) {
    let mut seen = rustc_hash::FxHashSet::default();
    names.retain(|name| seen.insert(*name));
}
