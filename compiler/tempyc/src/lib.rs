//! Tempy compiler driver.
//!
//! Takes the syntax tree of one compilation unit and produces a single host
//! function: its parameters are the runtime handle, the importer and the
//! line reporter; it returns the module's exported bindings.
//!
//! ```text
//! source ──► SyntaxParser (external) ──► SyntaxNode
//!                                            │
//!                                            ▼
//!                              tempy_lower::Translator ──► host IR (VarIds)
//!                                            │
//!                                            ▼
//!                                 rename_module ──► CompiledModule
//! ```
//!
//! Rendering the host IR to text is left to the embedder.

mod compile;

use std::sync::Once;

pub use compile::{compile, compile_source, compile_with, CompileError, CompiledModule};
pub use tempy_diagnostic::{Diagnostic, DiagnosticRecord, ErrorCode};
pub use tempy_lower::{LowerConfig as Config, Translator};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tempy_lower=debug`
/// or `RUST_LOG=tempy_match=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}
