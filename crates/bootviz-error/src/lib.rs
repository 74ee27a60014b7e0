//! # bootviz-error
//!
//! Unified error handling for bootviz.
//!
//! ## Design
//!
//! - **ErrorKind**: what went wrong (e.g. MalformedDuration, DanglingParent)
//! - **ErrorStatus**: whether the failure is tied to the input or to the environment
//! - **Error Context**: key/value pairs pointing at the offending event, path or URL
//! - **Error Source**: the wrapped underlying error, if any
//!
//! ## Usage
//!
//! ```rust
//! use bootviz_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::DanglingParent, "parent 7 does not exist")
//!         .with_operation("tree::link")
//!         .with_context("event_id", "12")
//!         .with_context("parent_id", "7"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, bootviz_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - An error is created once; callers further up only append context
//! - There is no retry policy anywhere: a failed snapshot aborts the run

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using bootviz Error
pub type Result<T> = std::result::Result<T, Error>;
