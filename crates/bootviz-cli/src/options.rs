//! Resolved run options.

use std::path::PathBuf;
use std::time::Duration;

use bootviz_core::parse_period;
use bootviz_dot::{ColorOptions, OutputFormat};
use bootviz_error::{Error, Result};

pub const DEFAULT_SOURCE: &str = "http://localhost:8081/actuator/startup";
pub const DEFAULT_FILTER: Duration = Duration::from_millis(500);
pub const DEFAULT_DOT_PROGRAM: &str = "dot";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the startup snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
    Stdin,
}

impl Source {
    /// `http(s)://…` is fetched, `-` reads stdin, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        if raw == "-" {
            Self::Stdin
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_string(),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::Url(DEFAULT_SOURCE.to_string())
    }
}

/// Options for running bootviz.
#[derive(Debug, Clone)]
pub struct BootvizOptions {
    pub source: Source,
    /// `None` writes to stdout.
    pub output: Option<PathBuf>,
    /// `None` infers from the output extension, falling back to SVG.
    pub format: Option<OutputFormat>,
    /// Steps at or below this duration are drawn only when a descendant is slower.
    pub filter: Duration,
    pub colors: ColorOptions,
    pub dot_program: PathBuf,
    pub fetch_timeout: Duration,
}

impl Default for BootvizOptions {
    fn default() -> Self {
        Self {
            source: Source::default(),
            output: None,
            format: None,
            filter: DEFAULT_FILTER,
            colors: ColorOptions::default(),
            dot_program: PathBuf::from(DEFAULT_DOT_PROGRAM),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl BootvizOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: Duration) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_colors(mut self, colors: ColorOptions) -> Self {
        self.colors = colors;
        self
    }

    /// Explicit format, else the output file's extension, else SVG.
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| self.output.as_ref().and_then(OutputFormat::from_path))
            .unwrap_or_default()
    }
}

/// Parse a filter threshold: `500ms`, `0.5s`, `2m`, `PT0.5S`, or bare seconds.
pub fn parse_filter(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.starts_with("PT") {
        return parse_period(raw);
    }

    let invalid = || {
        Error::invalid_argument(format!(
            "filter '{raw}' is not a duration (expected e.g. 500ms, 0.5s)"
        ))
        .with_operation("options::parse_filter")
        .with_context("filter", raw)
    };

    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    let seconds = match unit.trim() {
        "" | "s" => value,
        "ms" => value / 1e3,
        "us" | "µs" => value / 1e6,
        "ns" => value / 1e9,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(invalid()),
    };
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}
