//! `XExpr` dispatch: reserved head labels, macros and ordinary calls.

use std::rc::Rc;

use tempy_diagnostic::{ErrorCode, ErrorFlood};
use tempy_ir::host::HostCall;
use tempy_ir::syntax::SpecialSlot;
use tempy_ir::{HostExpr, HostStmt, SyntaxNode};

use crate::env::{Binding, MacroConverter, MacroExpander};
use crate::{Combined, Conclusion, Premise, TranslateResult, Translator};

enum Macro {
    Expand(MacroExpander),
    Convert(MacroConverter),
}

impl Translator {
    /// `def>`, `import>`, `import_from>`, `pyimport>` and `pyimport_from>`.
    pub(crate) fn visit_reserved_label(
        &mut self,
        node: &SyntaxNode,
        premise: Premise,
    ) -> Result<Option<Conclusion>, ErrorFlood> {
        let Some(xexpr) = node.as_xexpr() else {
            return Ok(None);
        };
        let Some(label) = xexpr.head_label.as_deref() else {
            return Ok(None);
        };
        let conclusion = match label {
            "def" => self.lower_def(node, xexpr, premise)?,
            "import" => self.lower_import(node, xexpr)?,
            "import_from" => self.lower_import_from(node, xexpr)?,
            "pyimport" => self.lower_host_import(node, xexpr)?,
            "pyimport_from" => self.lower_host_import_from(node, xexpr)?,
            other => self.error_at(
                ErrorCode::E1001,
                node.span,
                format!("unknown form label `{other}>`"),
            )?,
        };
        Ok(Some(conclusion))
    }

    /// An unlabelled `XExpr` whose head name is bound to a macro.
    pub(crate) fn visit_macro(
        &mut self,
        node: &SyntaxNode,
        premise: Premise,
    ) -> Result<Option<Conclusion>, ErrorFlood> {
        let Some(head) = node
            .as_xexpr()
            .filter(|xexpr| xexpr.head_label.is_none())
            .and_then(|xexpr| xexpr.head_name())
        else {
            return Ok(None);
        };
        let found = match self.env.lookup_binding(head) {
            Some((_, Binding::MacroExpander(expander))) => Macro::Expand(Rc::clone(expander)),
            Some((_, Binding::MacroConverter(converter))) => Macro::Convert(Rc::clone(converter)),
            _ => return Ok(None),
        };
        match found {
            Macro::Expand(expander) => {
                tracing::trace!(name = head, "expanding macro");
                match expander(node) {
                    Ok(expanded) => self.translate(&expanded, premise).map(Some),
                    Err(diagnostic) => self.report(diagnostic).map(Some),
                }
            }
            Macro::Convert(converter) => converter(self, node, premise).map(Some),
        }
    }

    /// An ordinary call.
    ///
    /// Evaluation order is the head, positional arguments, keywords, the
    /// `*`, `**`, `&` and `&&` slots, then the vertical block's lines.
    /// Plain vertical lines become extra positional arguments and arrow
    /// lines extra keywords; the runtime joins them with the slots when
    /// the host call syntax cannot.
    ///
    /// The call itself is lifted into a statement, so that sibling calls
    /// keep their order once flattened.
    pub(crate) fn lower_call(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        let Some(xexpr) = node.as_xexpr() else {
            return self.error_at(ErrorCode::E9001, node.span, "expected a call");
        };
        let args = &xexpr.args;

        let mut inputs = vec![self.value(&xexpr.head)?];
        for arg in &args.positional {
            inputs.push(self.value(arg)?);
        }
        for keyword in &args.keywords {
            inputs.push(self.value(&keyword.value)?);
        }
        for slot in SpecialSlot::ALL {
            if let Some(value) = args.slot(slot) {
                inputs.push(self.value(value)?);
            }
        }
        let vert = xexpr.vert_entries();
        for entry in vert {
            inputs.push(self.value(&entry.value)?);
        }

        let concat_args = self.runtime_attr("concat_args");
        let merge_kwargs = self.runtime_attr("merge_kwargs");
        Ok(self.integrate(inputs, |t, values| {
            let mut values = values.into_iter();
            let mut next = || values.next().unwrap_or_else(HostExpr::none);

            let callee = next();
            let positional: Vec<HostExpr> = args.positional.iter().map(|_| next()).collect();
            let keywords: Vec<(String, HostExpr)> = args
                .keywords
                .iter()
                .map(|keyword| (keyword.name.clone(), next()))
                .collect();
            let [star, dstar, amp, damp] = SpecialSlot::ALL.map(|slot| args.slot(slot).map(|_| next()));

            let mut vert_positional = Vec::new();
            let mut vert_keywords = Vec::new();
            for entry in vert {
                match &entry.label {
                    None => vert_positional.push(next()),
                    Some(label) => vert_keywords.push((label.clone(), next())),
                }
            }

            let mut call = HostCall {
                callee,
                args: positional,
                kwargs: keywords,
                star: None,
                dstar: None,
            };
            if amp.is_some() || (star.is_some() && !vert_positional.is_empty()) {
                call.star = Some(HostExpr::call(
                    concat_args,
                    vec![
                        star.unwrap_or_else(HostExpr::none),
                        HostExpr::List(vert_positional),
                        amp.unwrap_or_else(HostExpr::none),
                    ],
                ));
            } else {
                call.args.extend(vert_positional);
                call.star = star;
            }
            if damp.is_some() || (dstar.is_some() && !vert_keywords.is_empty()) {
                call.dstar = Some(HostExpr::call(
                    merge_kwargs,
                    vec![
                        dstar.unwrap_or_else(HostExpr::none),
                        HostExpr::Dict(
                            vert_keywords
                                .into_iter()
                                .map(|(key, value)| (HostExpr::str(key), value))
                                .collect(),
                        ),
                        damp.unwrap_or_else(HostExpr::none),
                    ],
                ));
            } else {
                call.kwargs.extend(vert_keywords);
                call.dstar = dstar;
            }
            let call = HostExpr::Call(Box::new(call));
            if premise.wants_value {
                let mut stmts = Vec::new();
                let result = t.pin(&mut stmts, call);
                Combined::Stmts(stmts, Some(result))
            } else {
                Combined::Stmts(vec![HostStmt::Expr(call)], None)
            }
        }))
    }
}
