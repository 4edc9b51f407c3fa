//! Host-language statement/expression IR.
//!
//! Lowering produces this tree; an out-of-workspace renderer prints it as
//! host script source. Until the renaming pass runs every identifier is an
//! opaque [`Ident::Var`]; afterwards every one is [`Ident::Named`].

use crate::VarId;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ident {
    Var(VarId),
    Named(String),
}

impl Ident {
    pub fn var(&self) -> Option<VarId> {
        match self {
            Ident::Var(id) => Some(*id),
            Ident::Named(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Ident::Named(name) => Some(name),
            Ident::Var(_) => None,
        }
    }
}

impl From<VarId> for Ident {
    fn from(id: VarId) -> Self {
        Ident::Var(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostLiteral {
    Str(String),
    /// Integer digits as written; the host has arbitrary precision.
    Int(String),
    Float(String),
    Bool(bool),
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostCall {
    pub callee: HostExpr,
    pub args: Vec<HostExpr>,
    pub kwargs: Vec<(String, HostExpr)>,
    pub star: Option<HostExpr>,
    pub dstar: Option<HostExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostExpr {
    Ident(Ident),
    Literal(HostLiteral),
    Attr {
        scope: Box<HostExpr>,
        attr: String,
    },
    Item {
        scope: Box<HostExpr>,
        index: Box<HostExpr>,
    },
    Slice {
        scope: Box<HostExpr>,
        lower: Option<Box<HostExpr>>,
        upper: Option<Box<HostExpr>>,
    },
    Call(Box<HostCall>),
    Binop {
        op: String,
        lhs: Box<HostExpr>,
        rhs: Box<HostExpr>,
    },
    Unop {
        op: String,
        operand: Box<HostExpr>,
    },
    List(Vec<HostExpr>),
    Dict(Vec<(HostExpr, HostExpr)>),
}

impl HostExpr {
    #[inline]
    pub fn var(id: VarId) -> Self {
        HostExpr::Ident(Ident::Var(id))
    }

    #[inline]
    pub fn none() -> Self {
        HostExpr::Literal(HostLiteral::None)
    }

    pub fn int(value: impl ToString) -> Self {
        HostExpr::Literal(HostLiteral::Int(value.to_string()))
    }

    pub fn str(value: impl Into<String>) -> Self {
        HostExpr::Literal(HostLiteral::Str(value.into()))
    }

    pub fn attr(scope: HostExpr, attr: impl Into<String>) -> Self {
        HostExpr::Attr {
            scope: Box::new(scope),
            attr: attr.into(),
        }
    }

    /// A call with positional arguments only.
    pub fn call(callee: HostExpr, args: Vec<HostExpr>) -> Self {
        HostExpr::Call(Box::new(HostCall {
            callee,
            args,
            kwargs: Vec::new(),
            star: None,
            dstar: None,
        }))
    }

    pub fn binop(op: impl Into<String>, lhs: HostExpr, rhs: HostExpr) -> Self {
        HostExpr::Binop {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unop(op: impl Into<String>, operand: HostExpr) -> Self {
        HostExpr::Unop {
            op: op.into(),
            operand: Box::new(operand),
        }
    }

    pub fn as_var(&self) -> Option<VarId> {
        match self {
            HostExpr::Ident(ident) => ident.var(),
            _ => None,
        }
    }

    /// Whether evaluating the expression may have an observable effect.
    ///
    /// Only literals and bare identifiers are known to be effect-free;
    /// attribute access may run host code.
    pub fn may_have_effect(&self) -> bool {
        !matches!(self, HostExpr::Literal(_) | HostExpr::Ident(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostTarget {
    Name(Ident),
    Attr { scope: HostExpr, attr: String },
    Item { scope: HostExpr, index: HostExpr },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch {
    pub cond: HostExpr,
    pub body: Vec<HostStmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<HostExpr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Param>,
    pub star: Option<Ident>,
    pub dstar: Option<Ident>,
    pub body: Vec<HostStmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostStmt {
    Assign {
        target: HostTarget,
        value: HostExpr,
    },
    Expr(HostExpr),
    Def(FunctionDef),
    Return(Option<HostExpr>),
    If {
        branches: Vec<Branch>,
        orelse: Vec<HostStmt>,
    },
    While {
        cond: HostExpr,
        body: Vec<HostStmt>,
    },
    For {
        target: Ident,
        iter: HostExpr,
        body: Vec<HostStmt>,
    },
    /// `import a.b as alias`
    Import {
        module: Vec<String>,
        alias: Ident,
    },
    /// `from a.b import x as alias, ...`
    ImportFrom {
        module: Vec<String>,
        names: Vec<(String, Ident)>,
    },
    Break,
    Continue,
    Pass,
}

impl HostStmt {
    /// `id = value`
    pub fn assign_var(id: VarId, value: HostExpr) -> Self {
        HostStmt::Assign {
            target: HostTarget::Name(Ident::Var(id)),
            value,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
