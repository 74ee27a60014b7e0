//! Output sinks.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use bootviz_error::{Error, Result};

/// Write `bytes` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).map_err(|e| {
                Error::from(e)
                    .with_operation("output::write")
                    .with_context("path", path.display().to_string())
            })?;
            info!(path = %path.display(), bytes = bytes.len(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| Error::from(e).with_operation("output::stdout"))?;
        }
    }
    Ok(())
}
