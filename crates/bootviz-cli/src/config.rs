//! `bootviz.toml` configuration file.
//!
//! Every key is optional. Values from the file override built-in defaults and
//! are themselves overridden by command-line flags.
//!
//! ```toml
//! source = "http://localhost:8081/actuator/startup"
//! output = "startup.svg"
//! format = "svg"
//! filter = "500ms"
//! fade_scale = 0.25
//! fast_color = "#00FF00"
//! slow_color = "#FF0000"
//! dot_program = "dot"
//! fetch_timeout_secs = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use bootviz_dot::OutputFormat;
use bootviz_error::{Error, ErrorKind, Result};

use crate::options::{BootvizOptions, Source, parse_filter};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bootviz.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub filter: Option<String>,
    pub fade_scale: Option<f64>,
    pub fast_color: Option<String>,
    pub slow_color: Option<String>,
    pub dot_program: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            Error::config_invalid(e.message().to_string())
                .with_operation("config::parse")
                .set_source(e)
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("config::read")
                .with_context("path", path.display().to_string())
        })?;
        Self::parse(&text).map_err(|e| e.with_context("path", path.display().to_string()))
    }

    /// Load `explicit` (which must exist) or `./bootviz.toml` if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::from_path(path).map(Some);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        match Self::from_path(fallback) {
            Ok(config) => {
                debug!("loaded {}", fallback.display());
                Ok(Some(config))
            }
            Err(e) if e.kind() == ErrorKind::FileNotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Overwrite `opts` with every key present in the file.
    pub fn apply(&self, opts: &mut BootvizOptions) -> Result<()> {
        if let Some(source) = &self.source {
            opts.source = Source::parse(source);
        }
        if let Some(output) = &self.output {
            opts.output = Some(output.clone());
        }
        if let Some(format) = &self.format {
            opts.format = Some(parse_format(format)?);
        }
        if let Some(filter) = &self.filter {
            opts.filter = parse_filter(filter).map_err(|e| e.with_operation("config::apply"))?;
        }
        if let Some(scale) = self.fade_scale {
            opts.colors.fade_scale = scale;
        }
        if let Some(color) = &self.fast_color {
            opts.colors.fast_color = color.clone();
        }
        if let Some(color) = &self.slow_color {
            opts.colors.slow_color = color.clone();
        }
        if let Some(program) = &self.dot_program {
            opts.dot_program = program.clone();
        }
        if let Some(secs) = self.fetch_timeout_secs {
            opts.fetch_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    raw.parse().map_err(|_| {
        Error::config_invalid(format!("unknown format '{raw}' (expected svg, png or dot)"))
            .with_operation("config::apply")
            .with_context("format", raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::parse(
            r##"
            source = "startup.json"
            format = "png"
            filter = "1s"
            fade_scale = 0.5
            slow_color = "#AA0000"
            fetch_timeout_secs = 5
            "##,
        )
        .unwrap();

        let mut opts = BootvizOptions::new();
        config.apply(&mut opts).unwrap();

        assert_eq!(opts.source, Source::File(PathBuf::from("startup.json")));
        assert_eq!(opts.format, Some(OutputFormat::Png));
        assert_eq!(opts.filter, Duration::from_secs(1));
        assert_eq!(opts.colors.fade_scale, 0.5);
        assert_eq!(opts.colors.slow_color, "#AA0000");
        assert_eq!(opts.colors.fast_color, "#00FF00");
        assert_eq!(opts.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config, FileConfig::default());

        let mut opts = BootvizOptions::new();
        config.apply(&mut opts).unwrap();
        assert_eq!(opts.filter, Duration::from_millis(500));
        assert_eq!(opts.source, Source::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = FileConfig::parse("treshold = \"1s\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut opts = BootvizOptions::new();
        let config = FileConfig::parse("format = \"pdf\"").unwrap();
        assert_eq!(
            config.apply(&mut opts).unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );

        let config = FileConfig::parse("filter = \"soon\"").unwrap();
        assert_eq!(
            config.apply(&mut opts).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::discover(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootviz.toml");
        fs::write(&path, "dot_program = \"/opt/graphviz/bin/dot\"\n").unwrap();

        let config = FileConfig::discover(Some(&path)).unwrap().unwrap();
        assert_eq!(
            config.dot_program,
            Some(PathBuf::from("/opt/graphviz/bin/dot"))
        );
    }
}
