//! Tempy lowering: syntax trees to host statements.
//!
//! The pass runs in two phases:
//! - [`Translator`] walks the tree and produces host IR that names every
//!   binding by opaque [`VarId`](tempy_ir::VarId), reporting errors into a
//!   capped diagnostic queue
//! - [`rename_module`] then gives every ID its final host name
//!
//! Sub-expression results compose through the [`Conclusion`]/[`Premise`]
//! protocol, which keeps source evaluation order once side-effecting
//! sub-expressions are hoisted into statements.

mod conclusion;
mod config;
mod env;
mod host_names;
mod lower;
mod rename;

pub use conclusion::{Combined, Conclusion, Premise, TranslateResult};
pub use config::LowerConfig;
pub use env::{
    Binding, CompileEnv, FrameId, FrameKind, Hint, HintSource, MacroConverter, MacroExpander, Usage,
};
pub use host_names::{is_host_keyword, HOST_BUILTINS, HOST_KEYWORDS};
pub use lower::{DefaultVisitor, LowerFailure, LoweredModule, Registry, Translator, Visitor};
pub use rename::rename_module;

use tempy_ir::SyntaxNode;

/// Lower `root` with the standard visitors.
pub fn lower_module(root: &SyntaxNode, config: LowerConfig) -> Result<LoweredModule, LowerFailure> {
    Translator::new(config).lower_module(root)
}
