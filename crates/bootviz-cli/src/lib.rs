//! bootviz command-line interface.
//!
pub mod config;
pub mod fetch;
pub mod options;
pub mod output;
pub mod pipeline;

pub use config::FileConfig;
pub use options::{BootvizOptions, Source, parse_filter};
pub use output::write_output;
pub use pipeline::{generate, run_main};
