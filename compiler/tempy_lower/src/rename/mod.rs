//! Renaming pass.
//!
//! Lowering refers to every binding by [`VarId`]. This pass runs once on the
//! finished module function and gives each ID a final host name, then
//! rewrites every [`Ident::Var`] to [`Ident::Named`].
//!
//! A scope is the module function or any nested [`FunctionDef`]. An ID is
//! owned by the scope holding its binding site (parameter, assignment
//! target, loop variable, import alias or nested `def` name). Within a
//! scope:
//! - names of IDs the scope's subtree uses but does not own are reserved,
//!   along with host keywords
//! - parameters are named first, then the other owned IDs in ID order
//! - a source name is kept when free; otherwise a suffix from the binding
//!   kind and a counter is appended (`x_1`, `x_l1`, `x_c1`, `x_f1`)
//! - temporaries are numbered `_imd_1`, `_imd_2`, ...
//!
//! Scopes are named outermost first, so reserved names are always final.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tempy_ir::host::{HostCall, HostTarget};
use tempy_ir::stack::ensure_sufficient_stack;
use tempy_ir::{FunctionDef, HostExpr, HostStmt, Ident, VarId};

use crate::env::{Binding, CompileEnv, HintSource, Usage};
use crate::host_names::{is_host_keyword, HOST_KEYWORDS};

#[derive(Default)]
struct Scope {
    parent: Option<usize>,
    children: SmallVec<[usize; 4]>,
    params: Vec<VarId>,
    /// Binding sites, in the order they were found.
    owned: Vec<VarId>,
    /// Every ID mentioned directly in this scope.
    uses: FxHashSet<VarId>,
}

/// Scope tree of a module function, in pre-order.
#[derive(Default)]
struct Collector {
    scopes: Vec<Scope>,
    owner: FxHashMap<VarId, usize>,
}

impl Collector {
    fn function(&mut self, def: &FunctionDef, parent: Option<usize>) {
        let index = self.scopes.len();
        self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(index);
        }

        let params = def
            .params
            .iter()
            .map(|param| &param.name)
            .chain(def.star.as_ref())
            .chain(def.dstar.as_ref());
        for param in params {
            if let Some(id) = param.var() {
                self.scopes[index].params.push(id);
            }
            self.own(index, param);
        }
        self.stmts(index, &def.body);
    }

    fn own(&mut self, scope: usize, ident: &Ident) {
        let Some(id) = ident.var() else {
            return;
        };
        self.scopes[scope].uses.insert(id);
        if let std::collections::hash_map::Entry::Vacant(entry) = self.owner.entry(id) {
            entry.insert(scope);
            self.scopes[scope].owned.push(id);
        }
    }

    fn stmts(&mut self, scope: usize, stmts: &[HostStmt]) {
        for stmt in stmts {
            ensure_sufficient_stack(|| self.stmt(scope, stmt));
        }
    }

    fn stmt(&mut self, scope: usize, stmt: &HostStmt) {
        match stmt {
            HostStmt::Assign { target, value } => {
                match target {
                    HostTarget::Name(ident) => self.own(scope, ident),
                    HostTarget::Attr { scope: object, .. } => self.expr(scope, object),
                    HostTarget::Item { scope: object, index } => {
                        self.expr(scope, object);
                        self.expr(scope, index);
                    }
                }
                self.expr(scope, value);
            }
            HostStmt::Expr(expr) | HostStmt::Return(Some(expr)) => self.expr(scope, expr),
            HostStmt::Def(def) => {
                self.own(scope, &def.name);
                // Defaults are evaluated where the function is defined.
                for default in def.params.iter().filter_map(|param| param.default.as_ref()) {
                    self.expr(scope, default);
                }
                self.function(def, Some(scope));
            }
            HostStmt::If { branches, orelse } => {
                for branch in branches {
                    self.expr(scope, &branch.cond);
                    self.stmts(scope, &branch.body);
                }
                self.stmts(scope, orelse);
            }
            HostStmt::While { cond, body } => {
                self.expr(scope, cond);
                self.stmts(scope, body);
            }
            HostStmt::For { target, iter, body } => {
                self.expr(scope, iter);
                self.own(scope, target);
                self.stmts(scope, body);
            }
            HostStmt::Import { alias, .. } => self.own(scope, alias),
            HostStmt::ImportFrom { names, .. } => {
                for (_, alias) in names {
                    self.own(scope, alias);
                }
            }
            HostStmt::Return(None) | HostStmt::Break | HostStmt::Continue | HostStmt::Pass => {}
        }
    }

    fn expr(&mut self, scope: usize, expr: &HostExpr) {
        ensure_sufficient_stack(|| match expr {
            HostExpr::Ident(ident) => {
                if let Some(id) = ident.var() {
                    self.scopes[scope].uses.insert(id);
                }
            }
            HostExpr::Literal(_) => {}
            HostExpr::Attr { scope: object, .. } => self.expr(scope, object),
            HostExpr::Item { scope: object, index } => {
                self.expr(scope, object);
                self.expr(scope, index);
            }
            HostExpr::Slice { scope: object, lower, upper } => {
                self.expr(scope, object);
                for bound in [lower, upper].into_iter().flatten() {
                    self.expr(scope, bound);
                }
            }
            HostExpr::Call(call) => {
                let HostCall {
                    callee,
                    args,
                    kwargs,
                    star,
                    dstar,
                } = call.as_ref();
                self.expr(scope, callee);
                for arg in args.iter().chain(kwargs.iter().map(|(_, value)| value)) {
                    self.expr(scope, arg);
                }
                for arg in [star, dstar].into_iter().flatten() {
                    self.expr(scope, arg);
                }
            }
            HostExpr::Binop { lhs, rhs, .. } => {
                self.expr(scope, lhs);
                self.expr(scope, rhs);
            }
            HostExpr::Unop { operand, .. } => self.expr(scope, operand),
            HostExpr::List(items) => {
                for item in items {
                    self.expr(scope, item);
                }
            }
            HostExpr::Dict(entries) => {
                for (key, value) in entries {
                    self.expr(scope, key);
                    self.expr(scope, value);
                }
            }
        });
    }
}

/// Allocates names within one scope.
struct Namer<'e> {
    env: &'e CompileEnv,
    taken: FxHashSet<String>,
    immediates: usize,
}

impl Namer<'_> {
    fn claim(&mut self, id: VarId) -> String {
        let Some(hint) = self.env.hint(id) else {
            return fallback_name(self.env, id);
        };
        if hint.usage == Usage::Immediate {
            loop {
                self.immediates += 1;
                let candidate = format!("_imd_{}", self.immediates);
                if self.taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        }

        let base = if is_host_keyword(&hint.original_name) {
            format!("_{}", hint.original_name)
        } else {
            hint.original_name.clone()
        };
        if self.taken.insert(base.clone()) {
            return base;
        }
        let tag = match hint.source {
            HintSource::Local | HintSource::Argument => "",
            HintSource::Let => "l",
            HintSource::Closure => "c",
            HintSource::Function => "f",
        };
        let mut counter = 0usize;
        loop {
            counter += 1;
            let candidate = format!("{base}_{tag}{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Name of an ID no scope owns: a host builtin, or an opaque placeholder.
fn fallback_name(env: &CompileEnv, id: VarId) -> String {
    match env.binding(id) {
        Some(Binding::GlobalBuiltin(name)) => name.clone(),
        _ => format!("_v{}", id.raw()),
    }
}

/// Assign final names to every ID in `main` and rewrite it in place.
#[tracing::instrument(level = "debug", skip_all)]
pub fn rename_module(main: &mut FunctionDef, env: &CompileEnv) {
    let mut collector = Collector::default();
    collector.function(main, None);
    let scopes = collector.scopes;

    // IDs each subtree uses but does not own, innermost first.
    let mut free: Vec<FxHashSet<VarId>> = vec![FxHashSet::default(); scopes.len()];
    for index in (0..scopes.len()).rev() {
        let scope = &scopes[index];
        let mut unowned = scope.uses.clone();
        for &child in &scope.children {
            unowned.extend(free[child].iter().copied());
        }
        for id in &scope.owned {
            unowned.remove(id);
        }
        free[index] = unowned;
    }

    let mut names: FxHashMap<VarId, String> = FxHashMap::default();
    let main_name = main.name.var().map(|id| {
        let name = env
            .hint(id)
            .map_or_else(|| fallback_name(env, id), |hint| hint.original_name.clone());
        names.insert(id, name.clone());
        name
    });

    for (index, scope) in scopes.iter().enumerate() {
        let mut taken: FxHashSet<String> = HOST_KEYWORDS.iter().map(ToString::to_string).collect();
        for id in &free[index] {
            let name = names
                .get(id)
                .cloned()
                .unwrap_or_else(|| fallback_name(env, *id));
            taken.insert(name);
        }
        if scope.parent.is_none() {
            taken.extend(main_name.clone());
        }

        let mut namer = Namer {
            env,
            taken,
            immediates: 0,
        };
        for &id in &scope.params {
            let name = namer.claim(id);
            names.insert(id, name);
        }
        let mut rest: Vec<VarId> = scope
            .owned
            .iter()
            .copied()
            .filter(|id| !scope.params.contains(id))
            .collect();
        rest.sort_unstable();
        for id in rest {
            let name = namer.claim(id);
            names.insert(id, name);
        }
    }
    tracing::debug!(scopes = scopes.len(), names = names.len(), "renamed module");

    Rewriter { names: &names, env }.function(main);
}

/// Replaces every `Ident::Var` with its final name.
struct Rewriter<'a> {
    names: &'a FxHashMap<VarId, String>,
    env: &'a CompileEnv,
}

impl Rewriter<'_> {
    fn ident(&self, ident: &mut Ident) {
        if let Ident::Var(id) = *ident {
            let name = self
                .names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| fallback_name(self.env, id));
            *ident = Ident::Named(name);
        }
    }

    fn function(&self, def: &mut FunctionDef) {
        self.ident(&mut def.name);
        for param in &mut def.params {
            self.ident(&mut param.name);
            if let Some(default) = &mut param.default {
                self.expr(default);
            }
        }
        for ident in [&mut def.star, &mut def.dstar].into_iter().flatten() {
            self.ident(ident);
        }
        self.stmts(&mut def.body);
    }

    fn stmts(&self, stmts: &mut [HostStmt]) {
        for stmt in stmts {
            ensure_sufficient_stack(|| self.stmt(stmt));
        }
    }

    fn stmt(&self, stmt: &mut HostStmt) {
        match stmt {
            HostStmt::Assign { target, value } => {
                match target {
                    HostTarget::Name(ident) => self.ident(ident),
                    HostTarget::Attr { scope, .. } => self.expr(scope),
                    HostTarget::Item { scope, index } => {
                        self.expr(scope);
                        self.expr(index);
                    }
                }
                self.expr(value);
            }
            HostStmt::Expr(expr) | HostStmt::Return(Some(expr)) => self.expr(expr),
            HostStmt::Def(def) => self.function(def),
            HostStmt::If { branches, orelse } => {
                for branch in branches {
                    self.expr(&mut branch.cond);
                    self.stmts(&mut branch.body);
                }
                self.stmts(orelse);
            }
            HostStmt::While { cond, body } => {
                self.expr(cond);
                self.stmts(body);
            }
            HostStmt::For { target, iter, body } => {
                self.ident(target);
                self.expr(iter);
                self.stmts(body);
            }
            HostStmt::Import { alias, .. } => self.ident(alias),
            HostStmt::ImportFrom { names, .. } => {
                for (_, alias) in names {
                    self.ident(alias);
                }
            }
            HostStmt::Return(None) | HostStmt::Break | HostStmt::Continue | HostStmt::Pass => {}
        }
    }

    fn expr(&self, expr: &mut HostExpr) {
        ensure_sufficient_stack(|| match expr {
            HostExpr::Ident(ident) => self.ident(ident),
            HostExpr::Literal(_) => {}
            HostExpr::Attr { scope, .. } | HostExpr::Unop { operand: scope, .. } => self.expr(scope),
            HostExpr::Item { scope, index } => {
                self.expr(scope);
                self.expr(index);
            }
            HostExpr::Slice { scope, lower, upper } => {
                self.expr(scope);
                for bound in [lower, upper].into_iter().flatten() {
                    self.expr(bound);
                }
            }
            HostExpr::Call(call) => {
                let call = call.as_mut();
                self.expr(&mut call.callee);
                for arg in &mut call.args {
                    self.expr(arg);
                }
                for (_, value) in &mut call.kwargs {
                    self.expr(value);
                }
                for arg in [&mut call.star, &mut call.dstar].into_iter().flatten() {
                    self.expr(arg);
                }
            }
            HostExpr::Binop { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            HostExpr::List(items) => {
                for item in items {
                    self.expr(item);
                }
            }
            HostExpr::Dict(entries) => {
                for (key, value) in entries {
                    self.expr(key);
                    self.expr(value);
                }
            }
        });
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
