//! First-match-wins dispatch over compiled patterns.

use tempy_ir::{NodeKind, NodeTag, Span, SyntaxNode, SyntaxParser};

use crate::{compile, Bindings, Pattern, PatternError};

/// No case matched and no default handler was registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no case matched {tag} node at {span}")]
pub struct NoCaseMatched {
    pub tag: NodeTag,
    pub span: Span,
}

/// The winning handler together with its captures.
#[derive(Debug)]
pub struct Selected<'m, 'n, H> {
    pub handler: &'m H,
    pub bindings: Bindings<'n>,
    /// Index of the winning case; `None` when the default was taken.
    pub case: Option<usize>,
}

/// An ordered list of `(pattern, handler)` cases plus an optional default.
///
/// Handlers are opaque to the matcher: a function pointer, a boxed closure,
/// or any value the caller knows how to invoke.
#[derive(Clone, Debug)]
pub struct CaseMatcher<H> {
    cases: Vec<(Pattern, H)>,
    default: Option<H>,
}

impl<H> Default for CaseMatcher<H> {
    fn default() -> Self {
        CaseMatcher {
            cases: Vec::new(),
            default: None,
        }
    }
}

impl<H> CaseMatcher<H> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn case(mut self, pattern: Pattern, handler: H) -> Self {
        self.add_case(pattern, handler);
        self
    }

    #[must_use]
    pub fn with_default(mut self, handler: H) -> Self {
        self.default = Some(handler);
        self
    }

    pub fn add_case(&mut self, pattern: Pattern, handler: H) {
        self.cases.push((pattern, handler));
    }

    /// Register a case whose pattern is given as source text.
    ///
    /// The text is dedented with [`pull_left`] and parsed; it must hold
    /// exactly one non-arrow statement, which is compiled as the pattern.
    pub fn add_case_source(
        &mut self,
        parser: &dyn SyntaxParser,
        source: &str,
        handler: H,
    ) -> Result<(), PatternError> {
        let root = parser.parse(&pull_left(source))?;
        let NodeKind::Suite(suite) = &root.kind else {
            return Err(PatternError::NotABlock);
        };
        let entry = match suite.entries.as_slice() {
            [entry] => entry,
            entries => return Err(PatternError::StatementCount(entries.len())),
        };
        if entry.is_arrow() {
            return Err(PatternError::ArrowStatement);
        }
        let pattern = compile(&entry.value)?;
        self.add_case(pattern, handler);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Find the first case whose pattern matches `node`, in registration
    /// order, falling back to the default with empty bindings.
    pub fn select<'n>(&self, node: &'n SyntaxNode) -> Result<Selected<'_, 'n, H>, NoCaseMatched> {
        for (index, (pattern, handler)) in self.cases.iter().enumerate() {
            if let Some(bindings) = pattern.match_node(node) {
                tracing::trace!(case = index, tag = %node.tag(), "case matched");
                return Ok(Selected {
                    handler,
                    bindings,
                    case: Some(index),
                });
            }
        }
        match &self.default {
            Some(handler) => Ok(Selected {
                handler,
                bindings: Bindings::new(),
                case: None,
            }),
            None => Err(NoCaseMatched {
                tag: node.tag(),
                span: node.span,
            }),
        }
    }

    /// Select a handler and invoke it through `invoke`.
    pub fn apply<'n, R>(
        &self,
        node: &'n SyntaxNode,
        invoke: impl FnOnce(&H, Bindings<'n>) -> R,
    ) -> Result<R, NoCaseMatched> {
        let selected = self.select(node)?;
        Ok(invoke(selected.handler, selected.bindings))
    }
}

/// Strip leading blank lines and the common indentation of the rest, so
/// that patterns can be written inline in indented source.
pub fn pull_left(source: &str) -> String {
    let lines: Vec<&str> = source
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(source.len());
    for line in lines {
        out.push_str(line.get(indent..).unwrap_or_else(|| line.trim_start()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
