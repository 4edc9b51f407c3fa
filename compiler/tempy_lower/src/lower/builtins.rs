//! Built-in block forms: `if`/`elif`/`else`, `while`, `for`, `let`,
//! `lambda` and `return`.
//!
//! Each form is a global `MacroConverter`. Its accepted shapes are compiled
//! once per translator into [`FormMatchers`]; a node that matches none of
//! them is reported with the form's own error code.

use std::rc::Rc;

use tempy_diagnostic::{ErrorCode, ErrorGuaranteed};
use tempy_ir::host::{Branch, HostLiteral, Param};
use tempy_ir::syntax::build::{call_named, name, XExprBuilder};
use tempy_ir::{FunctionDef, HostExpr, HostStmt, Ident, SyntaxNode, VarId};
use tempy_match::{compile, Bindings, CaseMatcher, PatternError};

use crate::env::{Binding, CompileEnv, FrameKind, HintSource};
use crate::{Conclusion, Premise, TranslateResult, Translator};

use super::block::join;

/// Invoked with the captures of the winning shape.
pub(crate) type FormHandler = fn(&mut Translator, &SyntaxNode, &Bindings<'_>, Premise) -> TranslateResult;

/// IDs of the branch forms, used to group `if`/`elif`/`else` siblings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BuiltinIds {
    pub(crate) if_form: VarId,
    pub(crate) elif_form: VarId,
    pub(crate) else_form: VarId,
}

/// Bind every built-in form in the global table.
pub(crate) fn install(env: &mut CompileEnv) -> BuiltinIds {
    let converter = |f: fn(&mut Translator, &SyntaxNode, Premise) -> TranslateResult| {
        Binding::MacroConverter(Rc::new(f))
    };

    let ids = BuiltinIds {
        if_form: env.bind_global("if", converter(Translator::lower_if_form)),
        elif_form: env.bind_global("elif", converter(Translator::lower_stray_branch)),
        else_form: env.bind_global("else", converter(Translator::lower_stray_branch)),
    };
    env.bind_global("while", converter(Translator::lower_while_form));
    env.bind_global("for", converter(Translator::lower_for_form));
    env.bind_global("let", converter(Translator::lower_let_form));
    env.bind_global("lambda", converter(Translator::lower_lambda_form));
    env.bind_global("return", converter(Translator::lower_return_form));
    ids
}

fn body_star() -> XExprBuilder {
    call_named("__kleene_star__").line(name("$stmt"))
}

fn body_plus() -> XExprBuilder {
    call_named("__kleene_plus__").line(name("$stmt"))
}

/// Compiled shapes of the built-in forms.
pub(crate) struct FormMatchers {
    /// `if($cond): ...` and `elif($cond): ...`
    pub(crate) branch: CaseMatcher<()>,
    /// `else: ...`
    pub(crate) else_form: CaseMatcher<()>,
    pub(crate) while_form: CaseMatcher<FormHandler>,
    pub(crate) for_form: CaseMatcher<FormHandler>,
    pub(crate) let_form: CaseMatcher<FormHandler>,
    pub(crate) lambda_form: CaseMatcher<FormHandler>,
    pub(crate) return_form: CaseMatcher<FormHandler>,
}

impl FormMatchers {
    pub(crate) fn new() -> Result<Self, PatternError> {
        let branch = call_named("NAME$form").arg(name("$cond")).line(body_star());
        let else_form = call_named("NAME$form").line(body_star());
        let while_form = call_named("while").arg(name("$cond")).line(body_star());
        let for_form = call_named("for")
            .arg(name("NAME$elem"))
            .arg(name("$iterable"))
            .line(body_star());
        let let_form = call_named("let")
            .kwarg(
                "keyword",
                call_named("seq").line(
                    call_named("__kleene_star__")
                        .arg(name("defs"))
                        .arrow("NAME$key", name("$value")),
                ),
            )
            .line(body_plus());
        let lambda_form = call_named("lambda")
            .arg(call_named("__kleene_star__").line(name("NAME$param")))
            .line(body_plus());
        let return_form = call_named("return").arg(
            call_named("__optional__")
                .arg(name("value"))
                .line(name("$value")),
        );

        Ok(FormMatchers {
            branch: CaseMatcher::new().case(compile(&branch.build())?, ()),
            else_form: CaseMatcher::new().case(compile(&else_form.build())?, ()),
            while_form: CaseMatcher::new().case(compile(&while_form.build())?, lower_while as FormHandler),
            for_form: CaseMatcher::new().case(compile(&for_form.build())?, lower_for as FormHandler),
            let_form: CaseMatcher::new().case(compile(&let_form.build())?, lower_let as FormHandler),
            lambda_form: CaseMatcher::new().case(compile(&lambda_form.build())?, lower_lambda as FormHandler),
            return_form: CaseMatcher::new().case(compile(&return_form.build())?, lower_return as FormHandler),
        })
    }
}

impl Translator {
    /// Run `node` through one form's matcher and its winning handler.
    fn apply_form(
        &mut self,
        pick: fn(&FormMatchers) -> &CaseMatcher<FormHandler>,
        node: &SyntaxNode,
        premise: Premise,
        mismatch: (ErrorCode, &str),
    ) -> TranslateResult {
        let forms = Rc::clone(&self.forms);
        let matchers = match forms.as_ref() {
            Ok(matchers) => matchers,
            Err(err) => return self.broken_forms(node, err),
        };
        match pick(matchers).select(node) {
            Ok(selected) => (selected.handler)(self, node, &selected.bindings, premise),
            Err(_) => self.error_at(mismatch.0, node.span, mismatch.1),
        }
    }

    fn broken_forms(&mut self, node: &SyntaxNode, err: &PatternError) -> TranslateResult {
        tracing::error!(%err, "built-in form patterns failed to compile");
        self.error_at(
            ErrorCode::E9001,
            node.span,
            format!("built-in form patterns are invalid: {err}"),
        )
    }

    fn lower_while_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.apply_form(
            |forms| &forms.while_form,
            node,
            premise,
            (ErrorCode::E1005, "`while` takes exactly one condition and a block"),
        )
    }

    fn lower_for_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.apply_form(
            |forms| &forms.for_form,
            node,
            premise,
            (ErrorCode::E1001, "`for` takes a loop variable name, an iterable and a block"),
        )
    }

    fn lower_let_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.apply_form(
            |forms| &forms.let_form,
            node,
            premise,
            (ErrorCode::E1001, "`let` takes `name=value` bindings and a non-empty block"),
        )
    }

    fn lower_lambda_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.apply_form(
            |forms| &forms.lambda_form,
            node,
            premise,
            (ErrorCode::E1001, "`lambda` takes parameter names and a non-empty block"),
        )
    }

    fn lower_return_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.apply_form(
            |forms| &forms.return_form,
            node,
            premise,
            (ErrorCode::E1001, "`return` takes at most one value"),
        )
    }

    fn lower_if_form(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        self.lower_if_chain(&[node], premise)
    }

    /// `elif` or `else` that does not follow an `if` in the same block.
    fn lower_stray_branch(&mut self, node: &SyntaxNode, _premise: Premise) -> TranslateResult {
        let form = node
            .as_xexpr()
            .and_then(|xexpr| xexpr.head_name())
            .unwrap_or("elif");
        self.error_at(
            ErrorCode::E1009,
            node.span,
            format!("`{form}` without a preceding `if`"),
        )
    }

    /// Whether `node` is a branch form, and which.
    pub(crate) fn branch_form(&self, node: &SyntaxNode) -> Option<VarId> {
        let xexpr = node.as_xexpr()?;
        if xexpr.head_label.is_some() {
            return None;
        }
        let id = self.env.lookup(xexpr.head_name()?)?;
        let ids = self.builtin_ids;
        [ids.if_form, ids.elif_form, ids.else_form]
            .contains(&id)
            .then_some(id)
    }

    /// Lower an `if` followed by its `elif`/`else` siblings.
    ///
    /// When a value is wanted every branch assigns it to one temporary; a
    /// missing `else` assigns `None`.
    pub(crate) fn lower_if_chain(&mut self, chain: &[&SyntaxNode], premise: Premise) -> TranslateResult {
        let Some(&head) = chain.first() else {
            return Ok(Conclusion::empty());
        };
        let forms = Rc::clone(&self.forms);
        let matchers = match forms.as_ref() {
            Ok(matchers) => matchers,
            Err(err) => return self.broken_forms(head, err),
        };
        let target = premise.wants_value.then(|| self.env.fresh_immediate());

        let mut arms = Vec::with_capacity(chain.len());
        let mut orelse = None;
        for (index, &node) in chain.iter().enumerate() {
            let is_else = index > 0 && self.branch_form(node) == Some(self.builtin_ids.else_form);
            if is_else {
                let body = match matchers.else_form.select(node) {
                    Ok(selected) => self.lower_body(&selected.bindings.nodes("stmt"), target)?,
                    Err(_) => self.error_at(ErrorCode::E1005, node.span, "`else` takes no condition")?,
                };
                orelse = Some(body);
                continue;
            }
            match matchers.branch.select(node) {
                Ok(selected) => {
                    let cond = match selected.bindings.node("cond") {
                        Some(cond) => self.value(cond)?,
                        None => self.error_at(ErrorCode::E9001, node.span, "branch matched without a condition")?,
                    };
                    let body = self.lower_body(&selected.bindings.nodes("stmt"), target)?;
                    arms.push((cond, body));
                }
                Err(_) => {
                    let form = node
                        .as_xexpr()
                        .and_then(|xexpr| xexpr.head_name())
                        .unwrap_or("if");
                    let error = self.error_at(
                        ErrorCode::E1005,
                        node.span,
                        format!("`{form}` takes exactly one condition"),
                    )?;
                    arms.push((error, Conclusion::empty()));
                }
            }
        }

        let mut poisoned: Option<ErrorGuaranteed> = None;
        let mut parts = Vec::with_capacity(arms.len());
        for (cond, body) in arms {
            match join(cond, body) {
                Ok(((pre, cond), (body, _))) => {
                    parts.push((pre, cond.unwrap_or_else(HostExpr::none), body));
                }
                Err(guarantee) => {
                    poisoned.get_or_insert(guarantee);
                }
            }
        }
        let orelse = match orelse.map(Conclusion::into_parts) {
            Some(Ok((stmts, _))) => stmts,
            Some(Err(guarantee)) => {
                poisoned.get_or_insert(guarantee);
                Vec::new()
            }
            None => target
                .map(|id| vec![HostStmt::assign_var(id, HostExpr::none())])
                .unwrap_or_default(),
        };
        if let Some(guarantee) = poisoned {
            return Ok(Conclusion::Error(guarantee));
        }

        Ok(Conclusion::with_result(
            assemble_if(parts, orelse),
            target.map(HostExpr::var),
        ))
    }
}

/// Build the host `if` statement. A condition that needs statements of its
/// own starts a nested `if` inside the previous branch's `else`.
fn assemble_if(parts: Vec<(Vec<HostStmt>, HostExpr, Vec<HostStmt>)>, orelse: Vec<HostStmt>) -> Vec<HostStmt> {
    let mut orelse = orelse;
    let mut branches: Vec<Branch> = Vec::new();
    for (pre, cond, body) in parts.into_iter().rev() {
        branches.push(Branch { cond, body });
        if !pre.is_empty() {
            branches.reverse();
            let mut stmts = pre;
            stmts.push(HostStmt::If {
                branches: std::mem::take(&mut branches),
                orelse,
            });
            orelse = stmts;
        }
    }
    if branches.is_empty() {
        return orelse;
    }
    branches.reverse();
    vec![HostStmt::If { branches, orelse }]
}

fn lower_while(t: &mut Translator, node: &SyntaxNode, bindings: &Bindings<'_>, premise: Premise) -> TranslateResult {
    let Some(cond) = bindings.node("cond") else {
        return t.error_at(ErrorCode::E9001, node.span, "`while` matched without a condition");
    };
    let cond = t.value(cond)?;
    let body = t.lower_body(&bindings.nodes("stmt"), None)?;
    let ((pre, cond), (body, _)) = match join(cond, body) {
        Ok(parts) => parts,
        Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
    };
    let cond = cond.unwrap_or_else(HostExpr::none);

    // A condition with statements is re-evaluated at the top of every pass.
    let stmt = if pre.is_empty() {
        HostStmt::While { cond, body }
    } else {
        let mut loop_body = pre;
        loop_body.push(HostStmt::If {
            branches: vec![Branch {
                cond: HostExpr::unop("not", cond),
                body: vec![HostStmt::Break],
            }],
            orelse: Vec::new(),
        });
        loop_body.extend(body);
        HostStmt::While {
            cond: HostExpr::Literal(HostLiteral::Bool(true)),
            body: loop_body,
        }
    };
    Ok(Conclusion::with_result(vec![stmt], premise.wants_value.then(HostExpr::none)))
}

fn lower_for(t: &mut Translator, node: &SyntaxNode, bindings: &Bindings<'_>, premise: Premise) -> TranslateResult {
    let (Some(elem), Some(iterable)) = (bindings.text("elem"), bindings.node("iterable")) else {
        return t.error_at(ErrorCode::E9001, node.span, "`for` matched without its operands");
    };
    // The iterable is evaluated before the loop variable exists.
    let iterable = t.value(iterable)?;
    let elem = t.env.assign(elem, HintSource::Local);
    let body = t.lower_body(&bindings.nodes("stmt"), None)?;
    let ((mut stmts, iter), (body, _)) = match join(iterable, body) {
        Ok(parts) => parts,
        Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
    };
    stmts.push(HostStmt::For {
        target: Ident::Var(elem),
        iter: iter.unwrap_or_else(HostExpr::none),
        body,
    });
    Ok(Conclusion::with_result(stmts, premise.wants_value.then(HostExpr::none)))
}

fn lower_let(t: &mut Translator, node: &SyntaxNode, bindings: &Bindings<'_>, premise: Premise) -> TranslateResult {
    t.env.push_frame(FrameKind::Let);
    let result = lower_let_scope(t, node, bindings, premise);
    t.env.pop_frame();
    result
}

/// Bindings are sequential: each value sees the names bound before it.
fn lower_let_scope(
    t: &mut Translator,
    node: &SyntaxNode,
    bindings: &Bindings<'_>,
    premise: Premise,
) -> TranslateResult {
    let mut stmts = Vec::new();
    let mut poisoned = None;
    for def in bindings.seq("defs").unwrap_or_default() {
        let Some((key, value)) = def
            .as_group()
            .and_then(|group| Some((group.text("key")?, group.node("value")?)))
        else {
            return t.error_at(ErrorCode::E9001, node.span, "`let` binding matched without a name");
        };
        let value = t.value(value)?;
        let id = t.env.define(key, HintSource::Let);
        match value.into_parts() {
            Ok((pre, value)) => {
                stmts.extend(pre);
                stmts.push(HostStmt::assign_var(id, value.unwrap_or_else(HostExpr::none)));
            }
            Err(guarantee) => {
                poisoned.get_or_insert(guarantee);
            }
        }
    }

    let body = t.lower_block(&bindings.nodes("stmt"), premise.child())?;
    if let Some(guarantee) = poisoned {
        return Ok(Conclusion::Error(guarantee));
    }
    Ok(match body.into_parts() {
        Ok((body, result)) => {
            stmts.extend(body);
            Conclusion::with_result(stmts, result)
        }
        Err(guarantee) => Conclusion::Error(guarantee),
    })
}

fn lower_lambda(t: &mut Translator, node: &SyntaxNode, bindings: &Bindings<'_>, premise: Premise) -> TranslateResult {
    let params: Vec<&str> = bindings
        .seq("param")
        .unwrap_or_default()
        .iter()
        .filter_map(|capture| capture.as_str())
        .collect();
    if let Some(duplicate) = first_duplicate(&params) {
        return t.error_at(
            ErrorCode::E1004,
            node.span,
            format!("duplicate parameter `{duplicate}`"),
        );
    }

    let closure = t.env.fresh_hidden("_lambda", HintSource::Closure);
    t.env.push_frame(FrameKind::Lambda);
    let params: Vec<Param> = params
        .iter()
        .map(|param| Param {
            name: Ident::Var(t.env.define(param, HintSource::Argument)),
            default: None,
        })
        .collect();
    let body = t.lower_function_body(&bindings.nodes("stmt"));
    t.env.pop_frame();

    let body = match body?.into_parts() {
        Ok((body, _)) => body,
        Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
    };
    let def = HostStmt::Def(FunctionDef {
        name: Ident::Var(closure),
        params,
        star: None,
        dstar: None,
        body,
    });
    Ok(Conclusion::with_result(
        vec![def],
        premise.wants_value.then(|| HostExpr::var(closure)),
    ))
}

fn lower_return(t: &mut Translator, node: &SyntaxNode, bindings: &Bindings<'_>, _premise: Premise) -> TranslateResult {
    if !t.env.in_function() {
        return t.error_at(ErrorCode::E1009, node.span, "`return` outside of a function");
    }
    let Some(value) = bindings.group("value").and_then(|group| group.node("value")) else {
        return Ok(Conclusion::stmts(vec![HostStmt::Return(None)]));
    };
    let value = t.value(value)?;
    Ok(match value.into_parts() {
        Ok((mut stmts, value)) => {
            stmts.push(HostStmt::Return(Some(value.unwrap_or_else(HostExpr::none))));
            Conclusion::stmts(stmts)
        }
        Err(guarantee) => Conclusion::Error(guarantee),
    })
}

pub(crate) fn first_duplicate<'a>(names: &[&'a str]) -> Option<&'a str> {
    let mut seen = rustc_hash::FxHashSet::default();
    names.iter().copied().find(|name| !seen.insert(*name))
}
