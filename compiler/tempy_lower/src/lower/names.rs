//! Names and literals.

use tempy_diagnostic::{ErrorCode, ErrorFlood};
use tempy_ir::host::HostLiteral;
use tempy_ir::syntax::LiteralKind;
use tempy_ir::{HostExpr, HostStmt, NodeKind, SyntaxNode};

use crate::env::Binding;
use crate::{Conclusion, Premise, TranslateResult, Translator};

/// How a name resolved.
enum Resolved {
    Expr(HostExpr),
    Macro,
}

impl Translator {
    /// `True`, `False` and `None`.
    pub(crate) fn visit_literal_name(
        &mut self,
        node: &SyntaxNode,
        _premise: Premise,
    ) -> Result<Option<Conclusion>, ErrorFlood> {
        let literal = match node.as_name() {
            Some("True") => HostLiteral::Bool(true),
            Some("False") => HostLiteral::Bool(false),
            Some("None") => HostLiteral::None,
            _ => return Ok(None),
        };
        Ok(Some(Conclusion::pure(HostExpr::Literal(literal))))
    }

    /// `break`, `continue` and `pass`, which have no value.
    pub(crate) fn visit_control_name(
        &mut self,
        node: &SyntaxNode,
        premise: Premise,
    ) -> Result<Option<Conclusion>, ErrorFlood> {
        let (name, stmt) = match node.as_name() {
            Some(name @ "break") => (name, HostStmt::Break),
            Some(name @ "continue") => (name, HostStmt::Continue),
            Some(name @ "pass") => (name, HostStmt::Pass),
            _ => return Ok(None),
        };
        if premise.wants_value {
            return self
                .error_at(ErrorCode::E1008, node.span, format!("`{name}` has no value"))
                .map(Some);
        }
        Ok(Some(Conclusion::stmts(vec![stmt])))
    }

    pub(crate) fn lower_name_lookup(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let Some(name) = node.as_name() else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a name");
        };
        let resolved = self.env.lookup_binding(name).map(|(id, binding)| match binding {
            Binding::Variable(_) | Binding::GlobalBuiltin(_) => Resolved::Expr(HostExpr::var(id)),
            Binding::RuntimeExternal(external) => Resolved::Expr(self.runtime_attr(external)),
            Binding::MacroExpander(_) | Binding::MacroConverter(_) => Resolved::Macro,
        });
        match resolved {
            Some(Resolved::Expr(expr)) => Ok(Conclusion::pure(expr)),
            Some(Resolved::Macro) => self.error_at(
                ErrorCode::E1006,
                node.span,
                format!("macro `{name}` cannot be used as a value"),
            ),
            None => self.error_at(ErrorCode::E1002, node.span, format!("unbound name `{name}`")),
        }
    }

    pub(crate) fn lower_literal(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let NodeKind::Literal(literal) = &node.kind else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a literal");
        };
        let content = literal.content.clone();
        let host = match literal.kind {
            LiteralKind::String => HostLiteral::Str(content),
            LiteralKind::Integer => HostLiteral::Int(content),
            LiteralKind::Float => HostLiteral::Float(content),
            LiteralKind::Null => HostLiteral::None,
            LiteralKind::True => HostLiteral::Bool(true),
            LiteralKind::False => HostLiteral::Bool(false),
        };
        Ok(Conclusion::pure(HostExpr::Literal(host)))
    }
}
