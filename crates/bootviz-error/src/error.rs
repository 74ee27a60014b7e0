use std::fmt;

use crate::{ErrorKind, ErrorStatus};

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The one error type every bootviz crate returns.
///
/// An error is raised once, at the point that knows what went wrong, and then
/// only gains context (operation name, offending ids, paths) on its way up.
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    /// `module::function` that raised or last re-tagged the error.
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<BoxedSource>,
}

impl Error {
    /// Status follows the kind: environment failures are `Temporary`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = if kind.is_transient() {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        };
        Self {
            kind,
            status,
            message: message.into(),
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Empty until [`Error::with_operation`] is called.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// First context value recorded under `key`.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(v.as_str()))
    }

    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn with_status(self, status: ErrorStatus) -> Self {
        Self { status, ..self }
    }

    /// Tag the error with the operation it is passing through.
    ///
    /// An earlier operation is kept in context under `called`, so the chain
    /// `snapshot::from_json` ← `duration::parse_period` stays visible.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() && self.operation != operation {
            let previous = std::mem::replace(&mut self.operation, operation);
            self.context.push(("called", previous.to_string()));
        } else {
            self.operation = operation;
        }
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the underlying error. Only one source is kept; setting a second
    /// one is a bug and trips a debug assertion.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "{} already has a source", self.kind);
        self.source = Some(Box::new(source));
        self
    }

    /// Whether a later run could succeed without changing the input.
    pub fn is_transient(&self) -> bool {
        self.status.is_transient()
    }
}

/// `Kind: message (at op; key=value, …)`, one line, for the CLI.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }

        let has_op = !self.operation.is_empty();
        if !has_op && self.context.is_empty() {
            return Ok(());
        }

        f.write_str(" (")?;
        if has_op {
            write!(f, "at {}", self.operation)?;
            if !self.context.is_empty() {
                f.write_str("; ")?;
            }
        }
        let pairs: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        write!(f, "{})", pairs.join(", "))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Error");
        out.field("kind", &self.kind)
            .field("status", &self.status)
            .field("message", &self.message);
        if !self.operation.is_empty() {
            out.field("operation", &self.operation);
        }
        if !self.context.is_empty() {
            out.field("context", &self.context);
        }
        if let Some(source) = &self.source {
            out.field("source", source);
        }
        out.finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => ErrorKind::Timeout,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    /// Create an Unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an Unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a MalformedDuration error for the offending period string
    pub fn malformed_duration(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::new(
            ErrorKind::MalformedDuration,
            format!("duration '{}' is not a PT<seconds>S period", raw),
        )
        .with_context("duration", raw)
    }

    /// Create a DanglingParent error
    pub fn dangling_parent(event_id: u64, parent_id: u64) -> Self {
        Self::new(
            ErrorKind::DanglingParent,
            format!("event {} references missing parent {}", event_id, parent_id),
        )
        .with_context("event_id", event_id.to_string())
        .with_context("parent_id", parent_id.to_string())
    }

    /// Create a DuplicateEvent error
    pub fn duplicate_event(event_id: u64) -> Self {
        Self::new(
            ErrorKind::DuplicateEvent,
            format!("event id {} appears more than once", event_id),
        )
        .with_context("event_id", event_id.to_string())
    }

    /// Create a CycleDetected error
    pub fn cycle_detected(event_id: u64) -> Self {
        Self::new(
            ErrorKind::CycleDetected,
            format!("parent chain of event {} loops back on itself", event_id),
        )
        .with_context("event_id", event_id.to_string())
    }

    /// Create an InvariantViolation error
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation, message)
    }

    /// Create a RenderFailed error
    pub fn render_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RenderFailed, message)
    }

    /// Create a FetchFailed error
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FetchFailed, message).with_context("url", url)
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorKind::FileNotFound,
            format!("file '{}' not found", path),
        )
        .with_context("path", path)
    }
}
