//! The Conclusion/Premise protocol.
//!
//! Translating a node yields a [`Conclusion`]: statements that must run
//! first, plus an optional pure result expression. A [`Premise`] tells the
//! translation whether that result is wanted at all.
//!
//! Combining several conclusions goes through [`Translator::integrate`],
//! which keeps source evaluation order intact once everything is flattened
//! into one statement list.

use tempy_diagnostic::{ErrorFlood, ErrorGuaranteed};
use tempy_ir::{HostExpr, HostStmt, VarId};

use crate::env::{Binding, Usage};
use crate::Translator;

/// Result of translating one node.
///
/// `Err(ErrorFlood)` unwinds the whole compilation; an ordinary error is an
/// `Ok(Conclusion::Error(..))` that poisons whatever consumes it.
pub type TranslateResult = Result<Conclusion, ErrorFlood>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conclusion {
    Value {
        stmts: Vec<HostStmt>,
        result: Option<HostExpr>,
    },
    Error(ErrorGuaranteed),
}

impl Conclusion {
    /// No statements, just a value.
    pub fn pure(expr: HostExpr) -> Self {
        Conclusion::Value {
            stmts: Vec::new(),
            result: Some(expr),
        }
    }

    /// Statements with no value.
    pub fn stmts(stmts: Vec<HostStmt>) -> Self {
        Conclusion::Value { stmts, result: None }
    }

    pub fn with_result(stmts: Vec<HostStmt>, result: Option<HostExpr>) -> Self {
        Conclusion::Value { stmts, result }
    }

    pub fn empty() -> Self {
        Self::stmts(Vec::new())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Conclusion::Error(_))
    }

    pub fn is_pure(&self) -> bool {
        matches!(self, Conclusion::Value { stmts, .. } if stmts.is_empty())
    }

    /// The statements and result, or the error proof.
    pub fn into_parts(self) -> Result<(Vec<HostStmt>, Option<HostExpr>), ErrorGuaranteed> {
        match self {
            Conclusion::Value { stmts, result } => Ok((stmts, result)),
            Conclusion::Error(guarantee) => Err(guarantee),
        }
    }
}

/// Per-call translation context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Premise {
    pub wants_value: bool,
    /// ID already bound to the name this node defines.
    pub prebound: Option<VarId>,
}

impl Premise {
    pub const VALUE: Premise = Premise {
        wants_value: true,
        prebound: None,
    };

    pub const STATEMENT: Premise = Premise {
        wants_value: false,
        prebound: None,
    };

    #[must_use]
    pub fn with_value(self, wants_value: bool) -> Self {
        Premise { wants_value, ..self }
    }

    #[must_use]
    pub fn with_prebound(self, id: VarId) -> Self {
        Premise {
            prebound: Some(id),
            ..self
        }
    }

    /// The premise for a child: same value request, nothing prebound.
    #[must_use]
    pub fn child(self) -> Self {
        Premise {
            prebound: None,
            ..self
        }
    }
}

/// What a combine step produces from the flattened input values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Combined {
    Expr(HostExpr),
    Stmts(Vec<HostStmt>, Option<HostExpr>),
}

impl Translator {
    /// Flatten `inputs` in order, returning the accumulated statements and
    /// one value per input. The first error poisons the whole list.
    ///
    /// A value followed by an input with statements is pinned to a
    /// temporary, unless it cannot change in between. Values after the last
    /// statements stay inline.
    pub fn flatten(
        &mut self,
        inputs: Vec<Conclusion>,
    ) -> Result<(Vec<HostStmt>, Vec<HostExpr>), ErrorGuaranteed> {
        let mut parts = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (stmts, result) = input.into_parts()?;
            parts.push((stmts, result.unwrap_or_else(HostExpr::none)));
        }
        let last_impure = parts.iter().rposition(|(stmts, _)| !stmts.is_empty());

        let mut acc = Vec::new();
        let mut values = Vec::with_capacity(parts.len());
        for (index, (stmts, value)) in parts.into_iter().enumerate() {
            acc.extend(stmts);
            let later_impure = last_impure.is_some_and(|last| index < last);
            let value = if later_impure && !self.is_stable(&value) {
                self.pin(&mut acc, value)
            } else {
                value
            };
            values.push(value);
        }
        Ok((acc, values))
    }

    /// Flatten `inputs` and hand their values to `combine`.
    pub fn integrate(
        &mut self,
        inputs: Vec<Conclusion>,
        combine: impl FnOnce(&mut Self, Vec<HostExpr>) -> Combined,
    ) -> Conclusion {
        let (mut stmts, values) = match self.flatten(inputs) {
            Ok(flat) => flat,
            Err(guarantee) => return Conclusion::Error(guarantee),
        };
        match combine(self, values) {
            Combined::Expr(expr) => Conclusion::Value {
                stmts,
                result: Some(expr),
            },
            Combined::Stmts(extra, result) => {
                stmts.extend(extra);
                Conclusion::Value { stmts, result }
            }
        }
    }

    /// Assign `value` to a fresh temporary and return a reference to it.
    pub fn pin(&mut self, stmts: &mut Vec<HostStmt>, value: HostExpr) -> HostExpr {
        let id = self.env.fresh_immediate();
        stmts.push(HostStmt::assign_var(id, value));
        HostExpr::var(id)
    }

    /// Literals, temporaries and host builtins cannot change once computed.
    pub(crate) fn is_stable(&self, expr: &HostExpr) -> bool {
        let HostExpr::Ident(ident) = expr else {
            return matches!(expr, HostExpr::Literal(_));
        };
        ident.var().is_some_and(|id| match self.env.binding(id) {
            Some(Binding::GlobalBuiltin(_)) => true,
            Some(Binding::Variable(hint)) => hint.usage == Usage::Immediate,
            _ => false,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
