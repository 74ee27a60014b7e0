//! Error kinds for bootviz operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Callers match on ErrorKind to decide how to report a failure. Every
/// structural problem in a snapshot is fatal to the run, so there is no
/// "degraded" kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Snapshot errors
    // =========================================================================
    /// Duration string does not follow the `PT<seconds>S` period form
    MalformedDuration,

    /// An event references a parent id that is not in the snapshot
    DanglingParent,

    /// Two events in one snapshot share the same id
    DuplicateEvent,

    /// Parent references loop back on themselves
    CycleDetected,

    /// Snapshot payload could not be decoded
    DeserializationFailed,

    // =========================================================================
    // Rendering errors
    // =========================================================================
    /// A rendered node has an unrendered parent
    InvariantViolation,

    /// The layout engine failed to produce output
    RenderFailed,

    // =========================================================================
    // Fetch/IO errors
    // =========================================================================
    /// Fetching the snapshot over HTTP failed
    FetchFailed,

    /// Timeout occurred
    Timeout,

    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is caused by the environment rather than the input
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::FetchFailed | ErrorKind::IoFailed
        )
    }
}
