//! Lowering configuration.

use tempy_diagnostic::DiagnosticConfig;

/// Knobs for one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowerConfig {
    /// Number of diagnostics that aborts the compilation (0 = unlimited).
    pub max_errors: usize,
    /// Precede each block statement with a call to the line reporter.
    pub emit_line_info: bool,
    /// Copied into every diagnostic.
    pub filename: Option<String>,
    /// Names bound globally as attributes of the runtime handle.
    pub runtime_externals: Vec<String>,
    /// Name of the generated module function.
    pub main_name: String,
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig {
            max_errors: 20,
            emit_line_info: true,
            filename: None,
            runtime_externals: Vec::new(),
            main_name: "tempy_main".to_string(),
        }
    }
}

impl LowerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    #[must_use]
    pub fn with_line_info(mut self, emit: bool) -> Self {
        self.emit_line_info = emit;
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_runtime_external(mut self, name: impl Into<String>) -> Self {
        self.runtime_externals.push(name.into());
        self
    }

    #[must_use]
    pub fn with_main_name(mut self, name: impl Into<String>) -> Self {
        self.main_name = name.into();
        self
    }

    pub(crate) fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.max_errors,
            filename: self.filename.clone(),
        }
    }
}
