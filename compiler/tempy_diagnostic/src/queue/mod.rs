//! Diagnostic queue with an error ceiling.
//!
//! Features:
//! - Emission order is preserved; the queue never reorders or deduplicates
//! - Error ceiling: reaching it records the error and reports a flood
//! - Filename stamping for diagnostics created without one
//! - `ErrorGuaranteed` proof that errors were emitted

use std::fmt;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Number of errors that triggers the flood condition (0 = unlimited).
    pub error_limit: usize,
    /// Filename stamped onto diagnostics that do not carry one.
    pub filename: Option<String>,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            filename: None,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            filename: None,
        }
    }
}

/// The error ceiling was reached; compilation must stop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorFlood {
    pub limit: usize,
}

impl fmt::Display for ErrorFlood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aborting after {} errors", self.limit)
    }
}

impl std::error::Error for ErrorFlood {}

/// Queue for collecting diagnostics during one compilation.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::with_config(config);
/// let guarantee = queue.emit_error(diagnostic)?;
/// // ... more errors
/// let diagnostics = queue.flush();
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    flooded: bool,
    config: DiagnosticConfig,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            flooded: false,
            config,
        }
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// Returns `Err(ErrorFlood)` when this error reaches the ceiling (the
    /// error is still recorded) or when the queue is already flooded (the
    /// error is dropped).
    pub fn emit_error(&mut self, mut diag: Diagnostic) -> Result<ErrorGuaranteed, ErrorFlood> {
        if self.flooded {
            return Err(self.flood());
        }
        if diag.filename.is_none() {
            diag.filename.clone_from(&self.config.filename);
        }
        tracing::debug!(code = %diag.code, message = %diag.message, "error emitted");
        self.diagnostics.push(diag);

        if self.limit_reached() {
            self.flooded = true;
            return Err(self.flood());
        }
        Ok(ErrorGuaranteed::new())
    }

    fn flood(&self) -> ErrorFlood {
        ErrorFlood {
            limit: self.config.error_limit,
        }
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.diagnostics.len() >= self.config.error_limit
    }

    /// Whether a flood has been reported.
    pub fn is_flooded(&self) -> bool {
        self.flooded
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        if self.diagnostics.is_empty() {
            None
        } else {
            Some(ErrorGuaranteed::new())
        }
    }

    /// Return the collected diagnostics in emission order and reset.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.flooded = false;
        std::mem::take(&mut self.diagnostics)
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
