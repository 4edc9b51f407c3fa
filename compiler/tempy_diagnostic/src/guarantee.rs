//! Proof that an error was reported.

/// Evidence that at least one error diagnostic has been emitted.
///
/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) can construct one, so
/// holding a value means the error is already in the queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    #[inline]
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }
}
