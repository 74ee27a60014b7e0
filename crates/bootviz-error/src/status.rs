//! Error status

use std::fmt;

/// Whether an error is inherent to the input or may go away on its own.
///
/// bootviz is a one-shot batch tool and never retries; the status is carried
/// so the CLI can tell the user whether re-running could help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorStatus {
    /// The snapshot or configuration itself is wrong.
    ///
    /// Examples: MalformedDuration, DanglingParent, ConfigInvalid
    #[default]
    Permanent,

    /// The environment failed; a later run may succeed.
    ///
    /// Examples: FetchFailed, Timeout
    Temporary,
}

impl ErrorStatus {
    /// Check if re-running might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    /// Get status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
