//! Startup event model and render-eligibility tree.
//!
//! - [`event`]: typed snapshot decoded from the startup endpoint's JSON
//! - [`duration`]: `PT..S` period parsing and display
//! - [`tree`]: parent linking and upward render marking

pub mod duration;
pub mod event;
pub mod tree;

pub use bootviz_error::{Error, ErrorKind, Result};
pub use duration::{format_duration, parse_period};
pub use event::{NO_PARENT, Snapshot, StartupEvent, Tag};
pub use tree::{Node, StartupTree};
