//! Snapshot retrieval from the actuator endpoint, a file, or stdin.

use std::fs;
use std::io::Read;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use bootviz_error::{Error, ErrorKind, ErrorStatus, Result};

use crate::options::Source;

/// Read the raw snapshot body from `source`.
pub fn fetch_snapshot(source: &Source, timeout: Duration) -> Result<Vec<u8>> {
    let start = Instant::now();
    let body = match source {
        Source::Url(url) => fetch_url(url, timeout)?,
        Source::File(path) => fs::read(path).map_err(|e| {
            Error::from(e)
                .with_operation("fetch::file")
                .with_context("path", path.display().to_string())
        })?,
        Source::Stdin => {
            let mut body = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut body)
                .map_err(|e| Error::from(e).with_operation("fetch::stdin"))?;
            body
        }
    };

    info!(
        "Fetch {}: {:.2}s ({} bytes)",
        source.describe(),
        start.elapsed().as_secs_f64(),
        body.len()
    );
    Ok(body)
}

fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let failure = |e: reqwest::Error| {
        let kind = if e.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::FetchFailed
        };
        Error::new(kind, format!("request to {url} failed: {e}"))
            .with_operation("fetch::url")
            .with_context("url", url)
            .set_source(e)
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(failure)?;

    // Spring Boot 2.4 only answers POST here, which also drains the buffer.
    let response = client.get(url).send().map_err(failure)?;
    let response = if response.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED {
        warn!("{url} does not accept GET; falling back to POST, which drains the startup buffer");
        client.post(url).send().map_err(failure)?
    } else {
        response
    };

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(url, status));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(failure)
}

/// A 4xx means the endpoint is missing or not exposed, which waiting will not fix.
fn status_error(url: &str, status: reqwest::StatusCode) -> Error {
    let err = Error::fetch_failed(url, format!("{url} answered with HTTP {status}"))
        .with_operation("fetch::url")
        .with_context("status", status.as_u16().to_string());
    if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
        err.with_status(ErrorStatus::Permanent)
    } else {
        err
    }
}
