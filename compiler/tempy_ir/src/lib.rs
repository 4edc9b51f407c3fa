//! Tempy IR - syntax trees in, host statements out.
//!
//! This crate holds the data structures every other tempy crate shares:
//! - [`Span`]: line/column ranges attached to every syntax node
//! - [`SyntaxNode`]: the tagged tree produced by the external parser
//! - [`host`]: the statement/expression IR handed to the external renderer
//! - [`VarId`]: opaque identifiers issued by the compile environment
//! - [`stack`]: stack growth for the recursive passes
//!
//! # Design Philosophy
//!
//! - **Read-only input**: syntax nodes come from an out-of-crate parser and
//!   are never mutated by the compiler; macro expansion builds new trees.
//! - **Opaque names**: the lowering pass never invents textual names. It
//!   refers to bindings by [`VarId`] and leaves naming to the renaming pass.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod host;
mod span;
pub mod stack;
pub mod syntax;
mod var_id;

pub use host::{FunctionDef, HostExpr, HostStmt, Ident};
pub use span::Span;
pub use syntax::{NodeKind, NodeTag, SyntaxError, SyntaxNode, SyntaxParser};
pub use var_id::VarId;
