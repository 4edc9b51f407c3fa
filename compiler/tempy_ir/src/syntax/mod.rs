//! Syntax-node model.
//!
//! A [`SyntaxNode`] is what the external concrete-syntax parser hands to the
//! compiler. Every node carries a [`Span`] used only for diagnostics.
//!
//! [`XExpr`] is the single extensible construct: plain calls, macro
//! invocations and block-headed forms (`def`, `if`, `for`, ...) all share it
//! and are told apart by a head label or by environment lookup of the head
//! name.

pub mod build;

use std::fmt;

use crate::Span;

/// A syntax node with its source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
}

/// Node variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Name(String),
    Literal(Literal),
    Binop(Binop),
    Unop(Unop),
    Assign(Assign),
    Trailer(Trailer),
    Suite(Suite),
    XExpr(XExpr),
}

/// Discriminant of [`NodeKind`], used to key per-type handler tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Name,
    Literal,
    Binop,
    Unop,
    Assign,
    Trailer,
    Suite,
    XExpr,
}

impl NodeTag {
    pub const COUNT: usize = 8;

    pub const ALL: [NodeTag; Self::COUNT] = [
        NodeTag::Name,
        NodeTag::Literal,
        NodeTag::Binop,
        NodeTag::Unop,
        NodeTag::Assign,
        NodeTag::Trailer,
        NodeTag::Suite,
        NodeTag::XExpr,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NodeTag::Name => "name",
            NodeTag::Literal => "literal",
            NodeTag::Binop => "binop",
            NodeTag::Unop => "unop",
            NodeTag::Assign => "assign",
            NodeTag::Trailer => "trailer",
            NodeTag::Suite => "suite",
            NodeTag::XExpr => "xexpr",
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Integer,
    Float,
    Null,
    True,
    False,
}

/// A literal; `content` is the source text (unescaped for strings).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binop {
    pub op: String,
    pub lhs: Box<SyntaxNode>,
    pub rhs: Box<SyntaxNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unop {
    pub op: String,
    pub operand: Box<SyntaxNode>,
}

/// `=` rebinds, `:=` always introduces a fresh binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Normal,
    Define,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignTarget {
    Name(String),
    Attr {
        scope: Box<SyntaxNode>,
        attr: String,
    },
    Item {
        scope: Box<SyntaxNode>,
        index: Box<SyntaxNode>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assign {
    pub op: AssignOp,
    pub target: AssignTarget,
    pub value: Box<SyntaxNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrailerKind {
    Attr(String),
    Index(Box<SyntaxNode>),
    Slice {
        lower: Option<Box<SyntaxNode>>,
        upper: Option<Box<SyntaxNode>>,
    },
}

/// Attribute access, indexing or slicing applied to `scope`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trailer {
    pub scope: Box<SyntaxNode>,
    pub kind: TrailerKind,
}

/// One line of a block. An arrow line (`label -> value`) carries a string tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuiteEntry {
    pub label: Option<String>,
    pub value: SyntaxNode,
}

impl SuiteEntry {
    #[inline]
    pub fn is_arrow(&self) -> bool {
        self.label.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suite {
    pub entries: Vec<SuiteEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    pub value: SyntaxNode,
}

/// The four prefixed argument slots: `*x`, `**x`, `&x`, `&&x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialSlot {
    Star,
    DoubleStar,
    Amp,
    DoubleAmp,
}

impl SpecialSlot {
    pub const ALL: [SpecialSlot; 4] = [
        SpecialSlot::Star,
        SpecialSlot::DoubleStar,
        SpecialSlot::Amp,
        SpecialSlot::DoubleAmp,
    ];

    pub const fn sigil(self) -> &'static str {
        match self {
            SpecialSlot::Star => "*",
            SpecialSlot::DoubleStar => "**",
            SpecialSlot::Amp => "&",
            SpecialSlot::DoubleAmp => "&&",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arguments {
    pub positional: Vec<SyntaxNode>,
    pub keywords: Vec<Keyword>,
    pub star: Option<Box<SyntaxNode>>,
    pub dstar: Option<Box<SyntaxNode>>,
    pub amp: Option<Box<SyntaxNode>>,
    pub damp: Option<Box<SyntaxNode>>,
}

impl Arguments {
    pub fn slot(&self, slot: SpecialSlot) -> Option<&SyntaxNode> {
        match slot {
            SpecialSlot::Star => self.star.as_deref(),
            SpecialSlot::DoubleStar => self.dstar.as_deref(),
            SpecialSlot::Amp => self.amp.as_deref(),
            SpecialSlot::DoubleAmp => self.damp.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, slot: SpecialSlot) -> &mut Option<Box<SyntaxNode>> {
        match slot {
            SpecialSlot::Star => &mut self.star,
            SpecialSlot::DoubleStar => &mut self.dstar,
            SpecialSlot::Amp => &mut self.amp,
            SpecialSlot::DoubleAmp => &mut self.damp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
            && self.keywords.is_empty()
            && SpecialSlot::ALL.iter().all(|&s| self.slot(s).is_none())
    }
}

/// The extensible expression: `label> head(args...): vertical block`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XExpr {
    pub head_label: Option<String>,
    pub head: Box<SyntaxNode>,
    pub args: Arguments,
    pub vert: Option<Suite>,
}

impl XExpr {
    /// The head as a bare name, if it is one.
    pub fn head_name(&self) -> Option<&str> {
        self.head.as_name()
    }

    /// Entries of the vertical block; empty when there is none.
    pub fn vert_entries(&self) -> &[SuiteEntry] {
        self.vert.as_ref().map_or(&[], |suite| suite.entries.as_slice())
    }
}

impl SyntaxNode {
    #[inline]
    pub fn new(kind: NodeKind, span: Span) -> Self {
        SyntaxNode { kind, span }
    }

    /// Replace the span, keeping the kind.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            NodeKind::Name(_) => NodeTag::Name,
            NodeKind::Literal(_) => NodeTag::Literal,
            NodeKind::Binop(_) => NodeTag::Binop,
            NodeKind::Unop(_) => NodeTag::Unop,
            NodeKind::Assign(_) => NodeTag::Assign,
            NodeKind::Trailer(_) => NodeTag::Trailer,
            NodeKind::Suite(_) => NodeTag::Suite,
            NodeKind::XExpr(_) => NodeTag::XExpr,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Name(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_xexpr(&self) -> Option<&XExpr> {
        match &self.kind {
            NodeKind::XExpr(xexpr) => Some(xexpr),
            _ => None,
        }
    }

    pub fn as_suite(&self) -> Option<&Suite> {
        match &self.kind {
            NodeKind::Suite(suite) => Some(suite),
            _ => None,
        }
    }

    /// Split `a.b.c` into `["a", "b", "c"]`.
    ///
    /// Returns `None` unless the node is a name or a chain of attribute
    /// trailers rooted at a name.
    pub fn dotted_name(&self) -> Option<Vec<&str>> {
        match &self.kind {
            NodeKind::Name(text) => Some(vec![text.as_str()]),
            NodeKind::Trailer(Trailer {
                scope,
                kind: TrailerKind::Attr(attr),
            }) => {
                let mut parts = scope.dotted_name()?;
                parts.push(attr);
                Some(parts)
            }
            _ => None,
        }
    }
}

/// Failure reported by the concrete-syntax parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error: {} ({})", self.message, self.span)
    }
}

impl std::error::Error for SyntaxError {}

/// The external concrete-syntax parser.
///
/// Implementations turn source text into a root [`NodeKind::Suite`] with
/// every sub-node's span populated. The compiler only checks shape.
pub trait SyntaxParser {
    fn parse(&self, source: &str) -> Result<SyntaxNode, SyntaxError>;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
