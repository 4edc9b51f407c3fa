//! Error codes for all compiler diagnostics.
//!
//! Each code is a unique identifier (e.g., `E1002`) paired with a kind tag
//! (e.g., `UnboundName`). The kind tag is what embedders see in diagnostic
//! records; the numeric code is for documentation lookups.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Lowering errors (user code)
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // Lowering Errors (E1xxx)
    /// Macro or built-in form used with the wrong shape
    E1001,
    /// Name used as a value but bound nowhere
    E1002,
    /// Assignment or binding target is not assignable
    E1003,
    /// The same formal argument name appears twice
    E1004,
    /// Branch form has the wrong number of predicates
    E1005,
    /// Name bound to a macro used as a value
    E1006,
    /// Argument form the host cannot express
    E1007,
    /// Statement-only construct used where a value is required
    E1008,
    /// Form valid only in a particular context appears elsewhere
    E1009,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E9001,
    ];

    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Stable kind tag used in diagnostic records.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "MalformedForm",
            ErrorCode::E1002 => "UnboundName",
            ErrorCode::E1003 => "IllegalAssignTarget",
            ErrorCode::E1004 => "DuplicateFormalArgument",
            ErrorCode::E1005 => "BranchArity",
            ErrorCode::E1006 => "MacroAsValue",
            ErrorCode::E1007 => "UnsupportedArgument",
            ErrorCode::E1008 => "NoResultValue",
            ErrorCode::E1009 => "MisplacedForm",
            ErrorCode::E9001 => "InternalError",
        }
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E1002"` or a kind tag like `"UnboundName"`.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper || code.kind() == s)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
