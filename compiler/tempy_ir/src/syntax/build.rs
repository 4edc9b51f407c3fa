//! Syntax-node builders.
//!
//! Construct trees without a parser: the compiler's built-in case patterns
//! are written with these, and so are most tests. Every builder produces a
//! node at [`Span::DUMMY`]; use [`SyntaxNode::at`] to attach a location.

use super::{
    Arguments, Assign, AssignOp, AssignTarget, Binop, Keyword, Literal, LiteralKind, NodeKind,
    SpecialSlot, Suite, SuiteEntry, SyntaxNode, Trailer, TrailerKind, Unop, XExpr,
};
use crate::Span;

#[inline]
fn node(kind: NodeKind) -> SyntaxNode {
    SyntaxNode::new(kind, Span::DUMMY)
}

pub fn name(text: impl Into<String>) -> SyntaxNode {
    node(NodeKind::Name(text.into()))
}

fn literal(kind: LiteralKind, content: impl Into<String>) -> SyntaxNode {
    node(NodeKind::Literal(Literal {
        kind,
        content: content.into(),
    }))
}

pub fn string(content: impl Into<String>) -> SyntaxNode {
    literal(LiteralKind::String, content)
}

pub fn integer(digits: impl Into<String>) -> SyntaxNode {
    literal(LiteralKind::Integer, digits)
}

pub fn float(text: impl Into<String>) -> SyntaxNode {
    literal(LiteralKind::Float, text)
}

pub fn null() -> SyntaxNode {
    literal(LiteralKind::Null, "null")
}

pub fn boolean(value: bool) -> SyntaxNode {
    if value {
        literal(LiteralKind::True, "true")
    } else {
        literal(LiteralKind::False, "false")
    }
}

pub fn binop(op: impl Into<String>, lhs: SyntaxNode, rhs: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Binop(Binop {
        op: op.into(),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }))
}

pub fn unop(op: impl Into<String>, operand: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Unop(Unop {
        op: op.into(),
        operand: Box::new(operand),
    }))
}

fn assign_to(op: AssignOp, target: AssignTarget, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Assign(Assign {
        op,
        target,
        value: Box::new(value),
    }))
}

/// `target = value`
pub fn assign(target: impl Into<String>, value: SyntaxNode) -> SyntaxNode {
    assign_to(AssignOp::Normal, AssignTarget::Name(target.into()), value)
}

/// `target := value`
pub fn define(target: impl Into<String>, value: SyntaxNode) -> SyntaxNode {
    assign_to(AssignOp::Define, AssignTarget::Name(target.into()), value)
}

/// `scope.attr = value`
pub fn assign_attr(scope: SyntaxNode, attr: impl Into<String>, value: SyntaxNode) -> SyntaxNode {
    let target = AssignTarget::Attr {
        scope: Box::new(scope),
        attr: attr.into(),
    };
    assign_to(AssignOp::Normal, target, value)
}

/// `scope[index] = value`
pub fn assign_item(scope: SyntaxNode, index: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    let target = AssignTarget::Item {
        scope: Box::new(scope),
        index: Box::new(index),
    };
    assign_to(AssignOp::Normal, target, value)
}

fn trailer(scope: SyntaxNode, kind: TrailerKind) -> SyntaxNode {
    node(NodeKind::Trailer(Trailer {
        scope: Box::new(scope),
        kind,
    }))
}

pub fn attr(scope: SyntaxNode, attr: impl Into<String>) -> SyntaxNode {
    trailer(scope, TrailerKind::Attr(attr.into()))
}

pub fn index(scope: SyntaxNode, index: SyntaxNode) -> SyntaxNode {
    trailer(scope, TrailerKind::Index(Box::new(index)))
}

pub fn slice(scope: SyntaxNode, lower: Option<SyntaxNode>, upper: Option<SyntaxNode>) -> SyntaxNode {
    trailer(
        scope,
        TrailerKind::Slice {
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
        },
    )
}

/// Parse `a.b.c` into a name/attribute-trailer chain.
pub fn dotted(path: &str) -> SyntaxNode {
    let mut parts = path.split('.');
    let root = name(parts.next().unwrap_or_default());
    parts.fold(root, |scope, part| attr(scope, part))
}

/// A plain block line.
pub fn line(value: SyntaxNode) -> SuiteEntry {
    SuiteEntry { label: None, value }
}

/// An arrow line: `label -> value`.
pub fn arrow(label: impl Into<String>, value: SyntaxNode) -> SuiteEntry {
    SuiteEntry {
        label: Some(label.into()),
        value,
    }
}

pub fn suite(entries: impl IntoIterator<Item = SuiteEntry>) -> SyntaxNode {
    node(NodeKind::Suite(Suite {
        entries: entries.into_iter().collect(),
    }))
}

/// A block of plain lines.
pub fn block(lines: impl IntoIterator<Item = SyntaxNode>) -> SyntaxNode {
    suite(lines.into_iter().map(line))
}

/// Start an `XExpr` with the given head.
pub fn call(head: SyntaxNode) -> XExprBuilder {
    XExprBuilder {
        xexpr: XExpr {
            head_label: None,
            head: Box::new(head),
            args: Arguments::default(),
            vert: None,
        },
    }
}

/// Start an `XExpr` whose head is a bare name.
pub fn call_named(head: impl Into<String>) -> XExprBuilder {
    call(name(head))
}

/// Fluent builder for [`XExpr`] nodes.
#[derive(Clone, Debug)]
#[must_use]
pub struct XExprBuilder {
    xexpr: XExpr,
}

impl XExprBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.xexpr.head_label = Some(label.into());
        self
    }

    pub fn arg(mut self, value: impl Into<SyntaxNode>) -> Self {
        self.xexpr.args.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<SyntaxNode>) -> Self {
        self.xexpr.args.keywords.push(Keyword {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn slot(mut self, slot: SpecialSlot, value: impl Into<SyntaxNode>) -> Self {
        *self.xexpr.args.slot_mut(slot) = Some(Box::new(value.into()));
        self
    }

    pub fn star(self, value: impl Into<SyntaxNode>) -> Self {
        self.slot(SpecialSlot::Star, value)
    }

    pub fn dstar(self, value: impl Into<SyntaxNode>) -> Self {
        self.slot(SpecialSlot::DoubleStar, value)
    }

    pub fn amp(self, value: impl Into<SyntaxNode>) -> Self {
        self.slot(SpecialSlot::Amp, value)
    }

    pub fn damp(self, value: impl Into<SyntaxNode>) -> Self {
        self.slot(SpecialSlot::DoubleAmp, value)
    }

    /// Append a plain line to the vertical block, creating it if needed.
    pub fn line(mut self, value: impl Into<SyntaxNode>) -> Self {
        self.vert_mut().entries.push(line(value.into()));
        self
    }

    /// Append an arrow line to the vertical block, creating it if needed.
    pub fn arrow(mut self, label: impl Into<String>, value: impl Into<SyntaxNode>) -> Self {
        self.vert_mut().entries.push(arrow(label, value.into()));
        self
    }

    /// Attach an explicitly empty vertical block.
    pub fn empty_block(mut self) -> Self {
        self.vert_mut();
        self
    }

    fn vert_mut(&mut self) -> &mut Suite {
        self.xexpr.vert.get_or_insert_with(Suite::default)
    }

    pub fn build(self) -> SyntaxNode {
        node(NodeKind::XExpr(self.xexpr))
    }
}

impl From<XExprBuilder> for SyntaxNode {
    fn from(builder: XExprBuilder) -> Self {
        builder.build()
    }
}
