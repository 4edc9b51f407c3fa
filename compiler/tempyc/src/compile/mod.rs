//! Compilation entry points.

use std::fmt::Write;

use tempy_diagnostic::{Diagnostic, DiagnosticRecord};
use tempy_ir::{FunctionDef, NodeTag, SyntaxError, SyntaxNode, SyntaxParser};
use tempy_lower::{LowerFailure, LoweredModule, Translator};

use crate::Config;

/// A compiled module: the host module function and what it exports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledModule {
    /// Every identifier is final; no `VarId` remains.
    pub main: FunctionDef,
    /// Source names of the exported bindings, in binding order.
    pub exports: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("{}", summarize(diagnostics, *flooded))]
    Failed {
        diagnostics: Vec<Diagnostic>,
        /// The error ceiling was reached before the whole tree was seen.
        flooded: bool,
    },
    #[error("module root must be a block, found a {0} node")]
    NotASuite(NodeTag),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl CompileError {
    /// The diagnostics of a failed lowering; empty for other failures.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Failed { diagnostics, .. } => diagnostics,
            CompileError::NotASuite(_) | CompileError::Syntax(_) => &[],
        }
    }

    /// Diagnostics as flat `{kind, message, location, filename}` records.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.diagnostics().iter().map(Diagnostic::to_record).collect()
    }
}

fn summarize(diagnostics: &[Diagnostic], flooded: bool) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let _ = writeln!(out, "{diagnostic}");
    }
    let _ = write!(out, "compilation failed with {} error(s)", diagnostics.len());
    if flooded {
        out.push_str(" (too many errors, stopped early)");
    }
    out
}

/// Compile a parsed module with the standard built-in forms.
pub fn compile(root: &SyntaxNode, config: &Config) -> Result<CompiledModule, CompileError> {
    compile_with(Translator::new(config.clone()), root)
}

/// Compile with a prepared translator, e.g. one with user macros bound.
#[tracing::instrument(level = "debug", skip_all, fields(tag = %root.tag()))]
pub fn compile_with(translator: Translator, root: &SyntaxNode) -> Result<CompiledModule, CompileError> {
    if root.tag() != NodeTag::Suite {
        return Err(CompileError::NotASuite(root.tag()));
    }
    match translator.lower_module(root) {
        Ok(LoweredModule { main, exports }) => {
            tracing::debug!(exports = exports.len(), "module compiled");
            Ok(CompiledModule { main, exports })
        }
        Err(LowerFailure { diagnostics, flooded }) => {
            tracing::debug!(errors = diagnostics.len(), flooded, "compilation failed");
            Err(CompileError::Failed { diagnostics, flooded })
        }
    }
}

/// Parse `source` with the external parser, then compile it.
pub fn compile_source(
    parser: &impl SyntaxParser,
    source: &str,
    config: &Config,
) -> Result<CompiledModule, CompileError> {
    let root = parser.parse(source)?;
    compile(&root, config)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
