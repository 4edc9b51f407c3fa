//! Syntax → host IR lowering.
//!
//! A [`Translator`] walks the syntax tree through a per-node-type visitor
//! [`Registry`]. Each node type has an ordered list of visitors, tried until
//! one does not decline, plus a default:
//! - `Name`: literal names, control names; default: environment lookup
//! - `XExpr`: reserved head labels, macros; default: ordinary call
//! - everything else: a single default
//!
//! Built-in forms (`if`, `while`, `for`, `let`, `lambda`, `return`) are
//! `MacroConverter` bindings in the global table, so they dispatch through
//! the macro visitor like any user macro.

mod block;
mod builtins;
mod call;
mod expr;
mod forms;
mod names;

use std::rc::Rc;

use tempy_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorFlood};
use tempy_ir::host::{HostLiteral, Param};
use tempy_ir::stack::ensure_sufficient_stack;
use tempy_ir::{FunctionDef, HostExpr, HostStmt, Ident, NodeKind, NodeTag, Span, SyntaxNode, VarId};
use tempy_match::PatternError;

use crate::env::{Binding, CompileEnv, FrameId, HintSource, MacroConverter, MacroExpander, Usage};
use crate::host_names::HOST_BUILTINS;
use crate::{rename_module, Conclusion, LowerConfig, Premise, TranslateResult};

pub(crate) use builtins::BuiltinIds;

/// A visitor that may decline a node by returning `Ok(None)`.
pub type Visitor = fn(&mut Translator, &SyntaxNode, Premise) -> Result<Option<Conclusion>, ErrorFlood>;

/// The last resort for a node type.
pub type DefaultVisitor = fn(&mut Translator, &SyntaxNode, Premise) -> TranslateResult;

/// Per-node-type visitor lists.
#[derive(Clone, Default)]
pub struct Registry {
    visitors: [Vec<Visitor>; NodeTag::COUNT],
    defaults: [Option<DefaultVisitor>; NodeTag::COUNT],
}

impl Registry {
    /// A registry with no visitors at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The visitors every compilation starts with.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.register(NodeTag::Name, Translator::visit_literal_name);
        registry.register(NodeTag::Name, Translator::visit_control_name);
        registry.set_default(NodeTag::Name, Translator::lower_name_lookup);

        registry.set_default(NodeTag::Literal, Translator::lower_literal);
        registry.set_default(NodeTag::Binop, Translator::lower_binop);
        registry.set_default(NodeTag::Unop, Translator::lower_unop);
        registry.set_default(NodeTag::Assign, Translator::lower_assign);
        registry.set_default(NodeTag::Trailer, Translator::lower_trailer);
        registry.set_default(NodeTag::Suite, Translator::lower_suite_expr);

        registry.register(NodeTag::XExpr, Translator::visit_reserved_label);
        registry.register(NodeTag::XExpr, Translator::visit_macro);
        registry.set_default(NodeTag::XExpr, Translator::lower_call);

        registry
    }

    /// Append a visitor; earlier registrations are tried first.
    pub fn register(&mut self, tag: NodeTag, visitor: Visitor) {
        self.visitors[tag.index()].push(visitor);
    }

    /// Insert a visitor ahead of every existing one.
    pub fn register_first(&mut self, tag: NodeTag, visitor: Visitor) {
        self.visitors[tag.index()].insert(0, visitor);
    }

    pub fn set_default(&mut self, tag: NodeTag, visitor: DefaultVisitor) {
        self.defaults[tag.index()] = Some(visitor);
    }

    pub fn clear_default(&mut self, tag: NodeTag) {
        self.defaults[tag.index()] = None;
    }

    fn visitors(&self, tag: NodeTag) -> &[Visitor] {
        &self.visitors[tag.index()]
    }

    fn default_for(&self, tag: NodeTag) -> Option<DefaultVisitor> {
        self.defaults[tag.index()]
    }
}

/// Handles to the generated module function's parameters.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ModuleParams {
    pub(crate) main: VarId,
    pub(crate) runtime: VarId,
    pub(crate) importer: VarId,
    pub(crate) line: VarId,
}

/// Output of a successful lowering, already renamed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredModule {
    pub main: FunctionDef,
    /// Source names returned by the module function, in binding order.
    pub exports: Vec<String>,
}

/// Every diagnostic collected before lowering stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowerFailure {
    pub diagnostics: Vec<Diagnostic>,
    /// The error ceiling was reached and lowering stopped early.
    pub flooded: bool,
}

/// State for lowering one compilation unit.
pub struct Translator {
    pub(crate) env: CompileEnv,
    pub(crate) queue: DiagnosticQueue,
    pub(crate) config: LowerConfig,
    registry: Rc<Registry>,
    pub(crate) forms: Rc<Result<builtins::FormMatchers, PatternError>>,
    pub(crate) builtin_ids: BuiltinIds,
    pub(crate) module: ModuleParams,
}

impl Translator {
    pub fn new(config: LowerConfig) -> Self {
        Self::with_registry(config, Registry::standard())
    }

    pub fn with_registry(config: LowerConfig, registry: Registry) -> Self {
        let mut env = CompileEnv::new();
        for name in HOST_BUILTINS {
            env.bind_global(name, Binding::GlobalBuiltin((*name).to_string()));
        }
        for name in &config.runtime_externals {
            env.bind_global(name, Binding::RuntimeExternal(name.clone()));
        }
        let builtin_ids = builtins::install(&mut env);
        let module = ModuleParams {
            main: env.fresh_hidden(&config.main_name, HintSource::Function),
            runtime: env.fresh_hidden("__runtime__", HintSource::Argument),
            importer: env.fresh_hidden("__importer__", HintSource::Argument),
            line: env.fresh_hidden("__line__", HintSource::Argument),
        };

        Translator {
            env,
            queue: DiagnosticQueue::with_config(config.diagnostic_config()),
            config,
            registry: Rc::new(registry),
            forms: Rc::new(builtins::FormMatchers::new()),
            builtin_ids,
            module,
        }
    }

    pub fn env(&self) -> &CompileEnv {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut CompileEnv {
        &mut self.env
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.queue.peek()
    }

    /// Bind a macro expander globally.
    pub fn define_expander(&mut self, name: &str, expander: MacroExpander) -> VarId {
        self.env.bind_global(name, Binding::MacroExpander(expander))
    }

    /// Bind a macro converter globally.
    pub fn define_converter(&mut self, name: &str, converter: MacroConverter) -> VarId {
        self.env.bind_global(name, Binding::MacroConverter(converter))
    }

    /// Translate one node.
    pub fn translate(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        ensure_sufficient_stack(|| self.dispatch(node, premise))
    }

    fn dispatch(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        let registry = Rc::clone(&self.registry);
        let tag = node.tag();
        for (index, visitor) in registry.visitors(tag).iter().enumerate() {
            if let Some(conclusion) = visitor(self, node, premise)? {
                tracing::trace!(%tag, visitor = index, "node translated");
                return Ok(conclusion);
            }
        }
        match registry.default_for(tag) {
            Some(visitor) => visitor(self, node, premise),
            None => self.error_at(
                ErrorCode::E9001,
                node.span,
                format!("no translation registered for {tag} nodes"),
            ),
        }
    }

    /// Translate `node` for its value.
    pub(crate) fn value(&mut self, node: &SyntaxNode) -> TranslateResult {
        self.translate(node, Premise::VALUE)
    }

    /// Record `diagnostic` and produce an error conclusion.
    pub fn report(&mut self, diagnostic: Diagnostic) -> TranslateResult {
        Ok(Conclusion::Error(self.queue.emit_error(diagnostic)?))
    }

    pub(crate) fn error_at(
        &mut self,
        code: ErrorCode,
        span: Span,
        message: impl Into<String>,
    ) -> TranslateResult {
        self.report(Diagnostic::error(code).with_message(message).with_label(span, ""))
    }

    pub(crate) fn runtime_attr(&self, name: &str) -> HostExpr {
        HostExpr::attr(HostExpr::var(self.module.runtime), name)
    }

    /// `__line__(start_line, end_line, start_col, end_col)`
    pub(crate) fn line_info(&self, span: Span) -> HostStmt {
        let args = [span.start_line, span.end_line, span.start_col, span.end_col]
            .into_iter()
            .map(HostExpr::int)
            .collect();
        HostStmt::Expr(HostExpr::call(HostExpr::var(self.module.line), args))
    }

    // Module assembly

    /// Lower a whole module and rename the result.
    #[tracing::instrument(level = "debug", skip_all, fields(main = %self.config.main_name))]
    pub fn lower_module(mut self, root: &SyntaxNode) -> Result<LoweredModule, LowerFailure> {
        let body = match &root.kind {
            NodeKind::Suite(suite) => self.lower_suite(&suite.entries, Premise::STATEMENT),
            _ => self.lower_block(&[root], Premise::STATEMENT),
        };
        let body = match body {
            Ok(body) => body,
            Err(flood) => {
                tracing::debug!(limit = flood.limit, "lowering aborted");
                return Err(self.failure());
            }
        };
        let mut stmts = match body.into_parts() {
            Ok((stmts, _)) if self.queue.has_errors().is_none() => stmts,
            _ => return Err(self.failure()),
        };

        let exports: Vec<(String, VarId)> = self
            .env
            .frame_names(FrameId::TOPLEVEL)
            .into_iter()
            .filter(|&(name, id)| {
                !name.starts_with('_')
                    && self.env.hint(id).is_some_and(|hint| hint.usage == Usage::Local)
            })
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        let entries = exports
            .iter()
            .map(|(name, id)| (HostExpr::Literal(HostLiteral::Str(name.clone())), HostExpr::var(*id)))
            .collect();
        stmts.push(HostStmt::Return(Some(HostExpr::Dict(entries))));

        let params = [self.module.runtime, self.module.importer, self.module.line]
            .into_iter()
            .map(|id| Param {
                name: Ident::Var(id),
                default: None,
            })
            .collect();
        let mut main = FunctionDef {
            name: Ident::Var(self.module.main),
            params,
            star: None,
            dstar: None,
            body: stmts,
        };
        rename_module(&mut main, &self.env);

        Ok(LoweredModule {
            main,
            exports: exports.into_iter().map(|(name, _)| name).collect(),
        })
    }

    fn failure(&mut self) -> LowerFailure {
        let flooded = self.queue.is_flooded();
        LowerFailure {
            diagnostics: self.queue.flush(),
            flooded,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
