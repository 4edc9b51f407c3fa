//! Operators, trailers and assignment.

use tempy_diagnostic::ErrorCode;
use tempy_ir::host::{Branch, HostTarget};
use tempy_ir::syntax::{AssignOp, AssignTarget, TrailerKind};
use tempy_ir::{HostExpr, HostStmt, NodeKind, SyntaxNode};

use crate::env::HintSource;
use crate::{Combined, Conclusion, Premise, TranslateResult, Translator};

/// Take the first `N` values; missing ones become `None`.
pub(crate) fn take_values<const N: usize>(values: Vec<HostExpr>) -> [HostExpr; N] {
    let mut values = values.into_iter();
    std::array::from_fn(|_| values.next().unwrap_or_else(HostExpr::none))
}

fn host_binop(op: &str) -> &str {
    match op {
        "&&" => "and",
        "||" => "or",
        other => other,
    }
}

fn host_unop(op: &str) -> &str {
    match op {
        "!" => "not",
        other => other,
    }
}

impl Translator {
    pub(crate) fn lower_binop(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let NodeKind::Binop(binop) = &node.kind else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a binary operation");
        };
        let op = host_binop(&binop.op).to_string();
        let lhs = self.value(&binop.lhs)?;
        let rhs = self.value(&binop.rhs)?;

        if matches!(op.as_str(), "and" | "or") && !rhs.is_pure() && !rhs.is_error() {
            return Ok(self.short_circuit(&op, lhs, rhs));
        }
        Ok(self.integrate(vec![lhs, rhs], |_, values| {
            let [lhs, rhs] = take_values(values);
            Combined::Expr(HostExpr::binop(op, lhs, rhs))
        }))
    }

    /// `and`/`or` whose right side needs statements: those statements may
    /// only run when the left side does not decide the result.
    fn short_circuit(&mut self, op: &str, lhs: Conclusion, rhs: Conclusion) -> Conclusion {
        let (mut stmts, [lhs]) = match self.flatten(vec![lhs]) {
            Ok((stmts, values)) => (stmts, take_values(values)),
            Err(guarantee) => return Conclusion::Error(guarantee),
        };
        let (mut body, rhs) = match rhs.into_parts() {
            Ok(parts) => parts,
            Err(guarantee) => return Conclusion::Error(guarantee),
        };

        let tmp = self.env.fresh_immediate();
        stmts.push(HostStmt::assign_var(tmp, lhs));
        body.push(HostStmt::assign_var(tmp, rhs.unwrap_or_else(HostExpr::none)));
        let cond = if op == "and" {
            HostExpr::var(tmp)
        } else {
            HostExpr::unop("not", HostExpr::var(tmp))
        };
        stmts.push(HostStmt::If {
            branches: vec![Branch { cond, body }],
            orelse: Vec::new(),
        });
        Conclusion::with_result(stmts, Some(HostExpr::var(tmp)))
    }

    pub(crate) fn lower_unop(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let NodeKind::Unop(unop) = &node.kind else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a unary operation");
        };
        let op = host_unop(&unop.op).to_string();
        let operand = self.value(&unop.operand)?;
        Ok(self.integrate(vec![operand], |_, values| {
            let [operand] = take_values(values);
            Combined::Expr(HostExpr::unop(op, operand))
        }))
    }

    pub(crate) fn lower_trailer(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let NodeKind::Trailer(trailer) = &node.kind else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a trailer");
        };
        let scope = self.value(&trailer.scope)?;
        match &trailer.kind {
            TrailerKind::Attr(attr) => Ok(self.integrate(vec![scope], |_, values| {
                let [scope] = take_values(values);
                Combined::Expr(HostExpr::attr(scope, attr.as_str()))
            })),
            TrailerKind::Index(index) => {
                let index = self.value(index)?;
                Ok(self.integrate(vec![scope, index], |_, values| {
                    let [scope, index] = take_values(values);
                    Combined::Expr(HostExpr::Item {
                        scope: Box::new(scope),
                        index: Box::new(index),
                    })
                }))
            }
            TrailerKind::Slice { lower, upper } => {
                let mut inputs = vec![scope];
                for bound in [lower, upper].into_iter().flatten() {
                    inputs.push(self.value(bound)?);
                }
                let (has_lower, has_upper) = (lower.is_some(), upper.is_some());
                Ok(self.integrate(inputs, |_, values| {
                    let mut values = values.into_iter();
                    let scope = values.next().unwrap_or_else(HostExpr::none);
                    let lower = if has_lower { values.next() } else { None };
                    let upper = if has_upper { values.next() } else { None };
                    Combined::Expr(HostExpr::Slice {
                        scope: Box::new(scope),
                        lower: lower.map(Box::new),
                        upper: upper.map(Box::new),
                    })
                }))
            }
        }
    }

    /// `name = value`, `name := value`, `scope.attr = value` and
    /// `scope[index] = value`.
    pub(crate) fn lower_assign(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        let NodeKind::Assign(assign) = &node.kind else {
            return self.error_at(ErrorCode::E9001, node.span, "expected an assignment");
        };

        let name = match &assign.target {
            AssignTarget::Name(name) => name,
            _ if assign.op == AssignOp::Define => {
                return self.error_at(
                    ErrorCode::E1003,
                    node.span,
                    "`:=` can only bind a name",
                );
            }
            AssignTarget::Attr { scope, attr } => {
                let scope = self.value(scope)?;
                let value = self.value(&assign.value)?;
                return Ok(self.integrate(vec![scope, value], |t, values| {
                    let [scope, value] = take_values(values);
                    let target = HostTarget::Attr {
                        scope,
                        attr: attr.clone(),
                    };
                    t.store(target, value, premise)
                }));
            }
            AssignTarget::Item { scope, index } => {
                let scope = self.value(scope)?;
                let index = self.value(index)?;
                let value = self.value(&assign.value)?;
                return Ok(self.integrate(vec![scope, index, value], |t, values| {
                    let [scope, index, value] = take_values(values);
                    t.store(HostTarget::Item { scope, index }, value, premise)
                }));
            }
        };

        // The value is evaluated before the name is bound, so `x := x + 1`
        // reads the outer `x`. The name is bound even when the value failed,
        // so later reads do not report it as unbound.
        let value = self.value(&assign.value)?;
        let id = match assign.op {
            AssignOp::Normal => self.env.assign(name, HintSource::Local),
            AssignOp::Define => self.env.define(name, HintSource::Local),
        };
        if value.is_error() {
            return Ok(value);
        }
        Ok(self.integrate(vec![value], |_, values| {
            let [value] = take_values(values);
            Combined::Stmts(
                vec![HostStmt::assign_var(id, value)],
                Some(HostExpr::var(id)),
            )
        }))
    }

    /// Store into an attribute or item. The stored value is the result; an
    /// unstable one is pinned first so it is evaluated once.
    fn store(&mut self, target: HostTarget, value: HostExpr, premise: Premise) -> Combined {
        let mut stmts = Vec::new();
        let value = if premise.wants_value && !self.is_stable(&value) {
            self.pin(&mut stmts, value)
        } else {
            value
        };
        let result = premise.wants_value.then(|| value.clone());
        stmts.push(HostStmt::Assign { target, value });
        Combined::Stmts(stmts, result)
    }
}
