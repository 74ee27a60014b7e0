//! ISO-8601 period strings as emitted by the startup endpoint.
//!
//! Step durations arrive as `PT<seconds>S` (e.g. `PT0.003582S`). Steps that
//! run for a minute or more are written with hour/minute components as well
//! (`PT1M2.5S`), which are accepted too.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use bootviz_error::{Error, Result};

static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]*)(?:\.([0-9]*))?S)?$")
        .expect("period pattern is valid")
});

const FRACTION_DIGITS: usize = 9;

/// Parse a `PT..S` period string into a [`Duration`].
pub fn parse_period(raw: &str) -> Result<Duration> {
    let malformed = || Error::malformed_duration(raw).with_operation("duration::parse_period");

    // "PT" alone matches the pattern with every component absent.
    if raw.len() <= 2 {
        return Err(malformed());
    }
    let caps = PERIOD_RE.captures(raw).ok_or_else(malformed)?;

    let component = |idx: usize| -> Result<u64> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| malformed()))
            .transpose()
            .map(|v| v.unwrap_or(0))
    };

    // `.5S` and `5.S` are valid decimals, a bare `S` or `.S` is not.
    let whole = caps.get(3).map_or("", |m| m.as_str());
    let fraction = caps.get(4).map_or("", |m| m.as_str());
    if raw.ends_with('S') && whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }

    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| malformed())?
    };
    let nanos = fraction_to_nanos(fraction);

    let total_secs = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(malformed)?;

    Ok(Duration::new(total_secs, nanos))
}

/// Convert the digits after the decimal point into nanoseconds, dropping
/// anything finer than a nanosecond.
fn fraction_to_nanos(digits: &str) -> u32 {
    let kept = &digits[..digits.len().min(FRACTION_DIGITS)];
    let value = kept
        .bytes()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    value * 10u32.pow((FRACTION_DIGITS - kept.len()) as u32)
}

/// Human-readable duration for node labels (`2s`, `500ms`, `1.5ms`).
pub fn format_duration(duration: Duration) -> String {
    format!("{duration:?}")
}
