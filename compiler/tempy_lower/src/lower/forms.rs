//! Forms selected by a reserved head label.

use tempy_diagnostic::{ErrorCode, ErrorGuaranteed};
use tempy_ir::host::Param;
use tempy_ir::syntax::{SpecialSlot, XExpr};
use tempy_ir::{FunctionDef, HostExpr, HostStmt, Ident, SyntaxNode};

use super::builtins::first_duplicate;
use crate::env::{FrameKind, HintSource};
use crate::{Conclusion, Premise, TranslateResult, Translator};

/// Remember the first error of a list of checks.
fn poison(poisoned: &mut Option<ErrorGuaranteed>, conclusion: &Conclusion) {
    if let Conclusion::Error(guarantee) = conclusion {
        poisoned.get_or_insert(*guarantee);
    }
}

impl Translator {
    /// `def> name(params...): body`
    ///
    /// Defaults are evaluated where the function is defined, in the
    /// enclosing scope. The function's value is its own name.
    pub(crate) fn lower_def(&mut self, node: &SyntaxNode, xexpr: &XExpr, premise: Premise) -> TranslateResult {
        let Some(name) = xexpr.head_name() else {
            return self.error_at(ErrorCode::E1001, xexpr.head.span, "`def>` needs a function name");
        };
        let args = &xexpr.args;
        let mut poisoned = None;

        for slot in [SpecialSlot::Amp, SpecialSlot::DoubleAmp] {
            if let Some(arg) = args.slot(slot) {
                let error = self.error_at(
                    ErrorCode::E1007,
                    arg.span,
                    format!("`{}` parameters cannot be defined", slot.sigil()),
                )?;
                poison(&mut poisoned, &error);
            }
        }

        let mut params: Vec<(&str, Option<&SyntaxNode>)> = Vec::new();
        for arg in &args.positional {
            match arg.as_name() {
                Some(param) => params.push((param, None)),
                None => {
                    let error = self.error_at(ErrorCode::E1003, arg.span, "parameter must be a name")?;
                    poison(&mut poisoned, &error);
                }
            }
        }
        for keyword in &args.keywords {
            params.push((keyword.name.as_str(), Some(&keyword.value)));
        }
        let mut rest = [None, None];
        for (slot, target) in [SpecialSlot::Star, SpecialSlot::DoubleStar].into_iter().zip(&mut rest) {
            let Some(arg) = args.slot(slot) else { continue };
            match arg.as_name() {
                Some(param) => *target = Some(param),
                None => {
                    let error = self.error_at(
                        ErrorCode::E1003,
                        arg.span,
                        format!("`{}` parameter must be a name", slot.sigil()),
                    )?;
                    poison(&mut poisoned, &error);
                }
            }
        }
        let [star, dstar] = rest;

        let names: Vec<&str> = params
            .iter()
            .map(|&(param, _)| param)
            .chain(star)
            .chain(dstar)
            .collect();
        if let Some(duplicate) = first_duplicate(&names) {
            let error = self.error_at(
                ErrorCode::E1004,
                node.span,
                format!("duplicate parameter `{duplicate}` in `{name}`"),
            )?;
            poison(&mut poisoned, &error);
        }
        if let Some(guarantee) = poisoned {
            return Ok(Conclusion::Error(guarantee));
        }

        let function = match premise.prebound {
            Some(id) => id,
            None => self.env.ensure_local(name, HintSource::Function),
        };

        let mut defaults = Vec::new();
        for default in params.iter().filter_map(|&(_, default)| default) {
            defaults.push(self.value(default)?);
        }
        let (mut stmts, defaults) = match self.flatten(defaults) {
            Ok(flat) => flat,
            Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
        };
        let mut defaults = defaults.into_iter();

        self.env.push_frame(FrameKind::Function);
        let host_params: Vec<Param> = params
            .iter()
            .map(|&(param, default)| Param {
                name: Ident::Var(self.env.define(param, HintSource::Argument)),
                default: default.and_then(|_| defaults.next()),
            })
            .collect();
        let star = star.map(|param| Ident::Var(self.env.define(param, HintSource::Argument)));
        let dstar = dstar.map(|param| Ident::Var(self.env.define(param, HintSource::Argument)));
        let body = self.lower_def_body(xexpr);
        self.env.pop_frame();

        let body = match body?.into_parts() {
            Ok((body, _)) => body,
            Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
        };
        tracing::trace!(function = name, params = host_params.len(), "lowered def");
        stmts.push(HostStmt::Def(FunctionDef {
            name: Ident::Var(function),
            params: host_params,
            star,
            dstar,
            body,
        }));
        Ok(Conclusion::with_result(
            stmts,
            premise.wants_value.then(|| HostExpr::var(function)),
        ))
    }

    fn lower_def_body(&mut self, xexpr: &XExpr) -> TranslateResult {
        let (lines, poisoned) = self.plain_lines(xexpr.vert_entries())?;
        let body = self.lower_function_body(&lines)?;
        Ok(match poisoned {
            Some(guarantee) => Conclusion::Error(guarantee),
            None => body,
        })
    }

    /// `import> a.b.c` binds `c` to the module `a.b.c`.
    pub(crate) fn lower_import(&mut self, node: &SyntaxNode, xexpr: &XExpr) -> TranslateResult {
        let path = match import_path(xexpr, "import", false) {
            Ok(path) => path,
            Err(message) => return self.error_at(ErrorCode::E1001, node.span, message),
        };
        let Some(&last) = path.last() else {
            return self.error_at(ErrorCode::E1001, node.span, "`import>` needs a module path");
        };
        let module = self.imported_module(&path);
        let id = self.env.assign(last, HintSource::Local);
        Ok(Conclusion::with_result(
            vec![HostStmt::assign_var(id, module)],
            Some(HostExpr::var(id)),
        ))
    }

    /// `import_from> a.b: x; y -> z` binds `x` to `a.b.x` and `z` to `a.b.y`.
    pub(crate) fn lower_import_from(&mut self, node: &SyntaxNode, xexpr: &XExpr) -> TranslateResult {
        let path = match import_path(xexpr, "import_from", true) {
            Ok(path) => path,
            Err(message) => return self.error_at(ErrorCode::E1001, node.span, message),
        };
        let names = match import_names(xexpr) {
            Ok(names) => names,
            Err(span) => {
                return self.error_at(
                    ErrorCode::E1001,
                    span,
                    "imported names must be `name` or `name -> alias`",
                );
            }
        };

        let module = self.env.fresh_immediate();
        let mut stmts = vec![HostStmt::assign_var(module, self.imported_module(&path))];
        for (source, dest) in names {
            let id = self.env.assign(dest, HintSource::Local);
            stmts.push(HostStmt::assign_var(
                id,
                HostExpr::attr(HostExpr::var(module), source),
            ));
        }
        Ok(Conclusion::stmts(stmts))
    }

    /// `pyimport> a.b.c`: a host-level `import a.b.c as c`.
    pub(crate) fn lower_host_import(&mut self, node: &SyntaxNode, xexpr: &XExpr) -> TranslateResult {
        let path = match import_path(xexpr, "pyimport", false) {
            Ok(path) => path,
            Err(message) => return self.error_at(ErrorCode::E1001, node.span, message),
        };
        let Some(&last) = path.last() else {
            return self.error_at(ErrorCode::E1001, node.span, "`pyimport>` needs a module path");
        };
        let alias = self.env.assign(last, HintSource::Local);
        Ok(Conclusion::stmts(vec![HostStmt::Import {
            module: path.iter().map(ToString::to_string).collect(),
            alias: Ident::Var(alias),
        }]))
    }

    /// `pyimport_from> a.b: x; y -> z`: a host-level `from a.b import ...`.
    pub(crate) fn lower_host_import_from(&mut self, node: &SyntaxNode, xexpr: &XExpr) -> TranslateResult {
        let path = match import_path(xexpr, "pyimport_from", true) {
            Ok(path) => path,
            Err(message) => return self.error_at(ErrorCode::E1001, node.span, message),
        };
        let names = match import_names(xexpr) {
            Ok(names) => names,
            Err(span) => {
                return self.error_at(
                    ErrorCode::E1001,
                    span,
                    "imported names must be `name` or `name -> alias`",
                );
            }
        };
        let names = names
            .into_iter()
            .map(|(source, dest)| (source.to_string(), Ident::Var(self.env.assign(dest, HintSource::Local))))
            .collect();
        Ok(Conclusion::stmts(vec![HostStmt::ImportFrom {
            module: path.iter().map(ToString::to_string).collect(),
            names,
        }]))
    }

    /// `__importer__.a.b.c`
    fn imported_module(&self, path: &[&str]) -> HostExpr {
        path.iter()
            .fold(HostExpr::var(self.module.importer), |scope, part| HostExpr::attr(scope, *part))
    }
}

/// The dotted module path of an import form. Import forms take no
/// arguments; the `_from` variants require a block of names.
fn import_path<'x>(xexpr: &'x XExpr, form: &str, with_names: bool) -> Result<Vec<&'x str>, String> {
    if !xexpr.args.is_empty() {
        return Err(format!("`{form}>` takes no arguments"));
    }
    if with_names && xexpr.vert_entries().is_empty() {
        return Err(format!("`{form}>` needs a block of names to import"));
    }
    if !with_names && xexpr.vert.is_some() {
        return Err(format!("`{form}>` takes no block"));
    }
    xexpr
        .head
        .dotted_name()
        .ok_or_else(|| format!("`{form}>` needs a dotted module path"))
}

/// `(source, dest)` per block line; the span of the first bad line.
fn import_names(xexpr: &XExpr) -> Result<Vec<(&str, &str)>, tempy_ir::Span> {
    xexpr
        .vert_entries()
        .iter()
        .map(|entry| match (entry.label.as_deref(), entry.value.as_name()) {
            (None, Some(name)) => Ok((name, name)),
            (Some(source), Some(dest)) => Ok((source, dest)),
            (_, None) => Err(entry.value.span),
        })
        .collect()
}
