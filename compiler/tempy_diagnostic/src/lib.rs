//! Diagnostic system for the tempy compiler.
//!
//! Every user-facing compile error is a [`Diagnostic`] carrying:
//! - an [`ErrorCode`] whose kind tag is stable across releases
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - optional notes and secondary labels (why)
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that an error was recorded. The
//! lowering pass stores it in error conclusions, so a poisoned result can
//! never exist without a matching diagnostic.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic)?;  // `?` propagates a flood
//! return Ok(Conclusion::Error(guarantee));   // tempy_lower's error variant
//! ```
//!
//! # Flood Condition
//!
//! The [`DiagnosticQueue`] enforces an error ceiling. The error that reaches
//! it is still recorded, then [`ErrorFlood`] is returned so the caller can
//! unwind the whole compilation with `?`.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, DiagnosticRecord, Label};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue, ErrorFlood};
