//! Layout/render engines.
//!
//! The projector hands a finished [`RenderGraph`] and a target format to a
//! [`LayoutEngine`], which returns the output bytes. The engine is a black
//! box: [`GraphvizCommand`] pipes DOT through the Graphviz `dot` program and
//! [`DotPassthrough`] emits the DOT text unchanged.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use strum_macros::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

use bootviz_error::{Error, ErrorKind, Result};

use crate::project::RenderGraph;

/// Output formats understood by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Vector image (default)
    #[default]
    Svg,
    /// Raster image
    Png,
    /// Graphviz source
    Dot,
}

impl OutputFormat {
    /// Infer the format from a file extension (`out.png` → Png).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
                "gv" => Some(Self::Dot),
                other => other.parse().ok(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Turns styled nodes and edges into an image or document.
pub trait LayoutEngine {
    fn name(&self) -> &str;

    fn render(&self, graph: &RenderGraph, format: OutputFormat) -> Result<Vec<u8>>;
}

/// Emits the DOT source itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotPassthrough;

impl LayoutEngine for DotPassthrough {
    fn name(&self) -> &str {
        "dot-source"
    }

    fn render(&self, graph: &RenderGraph, format: OutputFormat) -> Result<Vec<u8>> {
        if format != OutputFormat::Dot {
            return Err(Error::unsupported(format!(
                "{} cannot lay out {} output",
                self.name(),
                format
            ))
            .with_operation("engine::render")
            .with_context("format", format.as_str()));
        }
        Ok(graph.to_dot().into_bytes())
    }
}

/// Runs the Graphviz `dot` program: DOT on stdin, `-T<format>` bytes on stdout.
#[derive(Debug, Clone)]
pub struct GraphvizCommand {
    program: PathBuf,
}

impl Default for GraphvizCommand {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn failure(&self, message: String, format: OutputFormat) -> Error {
        Error::render_failed(message)
            .with_operation("engine::graphviz")
            .with_context("program", self.program.display().to_string())
            .with_context("format", format.as_str())
    }
}

impl LayoutEngine for GraphvizCommand {
    fn name(&self) -> &str {
        "graphviz"
    }

    fn render(&self, graph: &RenderGraph, format: OutputFormat) -> Result<Vec<u8>> {
        let start = Instant::now();
        let source = graph.to_dot();

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.as_str()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let message = if e.kind() == std::io::ErrorKind::NotFound {
                    format!(
                        "Graphviz program '{}' not found; install Graphviz or use --format dot",
                        self.program.display()
                    )
                } else {
                    format!("failed to start '{}': {e}", self.program.display())
                };
                self.failure(message, format).set_source(e)
            })?;

        // dot reads its whole input before writing, so writing first cannot
        // fill the stdout pipe. A closed pipe means dot quit early; its exit
        // status and stderr below say why.
        let mut write_error = None;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(source.as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("dot closed its input early");
                }
                Err(e) => write_error = Some(e),
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            self.failure(format!("failed waiting for dot: {e}"), format)
                .set_source(e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let mut err = self
                .failure(format!("dot exited with {}", output.status), format)
                .with_context("stderr", stderr);
            if let Some(code) = output.status.code() {
                err = err.with_context("exit_code", code.to_string());
            }
            return Err(err);
        }
        if let Some(e) = write_error {
            return Err(self
                .failure(format!("failed to send graph to dot: {e}"), format)
                .set_source(e));
        }
        if output.stdout.is_empty() {
            return Err(Error::unexpected("dot exited cleanly but produced no output")
                .with_operation("engine::graphviz")
                .with_context("format", format.as_str()));
        }

        debug!(bytes = output.stdout.len(), "graphviz output received");
        info!(
            "Graphviz layout ({}): {:.2}s",
            format,
            start.elapsed().as_secs_f64()
        );
        Ok(output.stdout)
    }
}

/// Pick the engine for a format: DOT needs no layout, images go through Graphviz.
pub fn engine_for(format: OutputFormat, dot_program: &Path) -> Box<dyn LayoutEngine> {
    match format {
        OutputFormat::Dot => Box::new(DotPassthrough),
        OutputFormat::Svg | OutputFormat::Png => Box::new(GraphvizCommand::new(dot_program)),
    }
}

/// True when an error came from the layout engine rather than the snapshot.
pub fn is_engine_error(err: &Error) -> bool {
    matches!(err.kind(), ErrorKind::RenderFailed | ErrorKind::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::RenderNode;
    use std::time::Duration;

    #[test]
    fn test_format_parsing() {
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("dot".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Svg);
        assert_eq!(OutputFormat::Png.to_string(), "png");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path("/tmp/a.svg"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path("out.PNG"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path("graph.gv"), Some(OutputFormat::Dot));
        assert_eq!(OutputFormat::from_path("graph"), None);
        assert_eq!(OutputFormat::from_path("graph.pdf"), None);
    }

    #[test]
    fn test_passthrough_emits_dot() {
        let bytes = DotPassthrough
            .render(&RenderGraph::default(), OutputFormat::Dot)
            .unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("digraph startup {"));
    }

    #[test]
    fn test_passthrough_rejects_images() {
        let err = DotPassthrough
            .render(&RenderGraph::default(), OutputFormat::Svg)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(is_engine_error(&err));
    }

    #[test]
    fn test_missing_graphviz_program() {
        let engine = GraphvizCommand::new("/nonexistent/bootviz-test/dot");
        let err = engine
            .render(&RenderGraph::default(), OutputFormat::Svg)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RenderFailed);
        assert_eq!(
            err.context_value("program"),
            Some("/nonexistent/bootviz-test/dot")
        );
        assert!(err.source_ref().is_some());
    }

    #[cfg(unix)]
    fn stub_program(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("dot");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Big enough that the DOT source overflows the stdin pipe buffer.
    #[cfg(unix)]
    fn large_graph(nodes: usize) -> RenderGraph {
        RenderGraph {
            nodes: (0..nodes)
                .map(|i| RenderNode {
                    id: i.to_string(),
                    name: format!("step-{i}"),
                    duration: Duration::from_millis(i as u64),
                    fill_color: "#00ff00".to_string(),
                    label: format!("<B>step-{i}</B>"),
                })
                .collect(),
            edges: Vec::new(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_keeps_dot_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let program = stub_program(dir.path(), "echo 'syntax error in line 1' >&2\nexit 3");

        let err = GraphvizCommand::new(&program)
            .render(&large_graph(20_000), OutputFormat::Svg)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RenderFailed);
        assert_eq!(err.context_value("stderr"), Some("syntax error in line 1"));
        assert_eq!(err.context_value("exit_code"), Some("3"));
        assert!(err.source_ref().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_graphviz_output_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let program = stub_program(dir.path(), "cat > /dev/null\nprintf '<svg/>'");

        let bytes = GraphvizCommand::new(&program)
            .render(&large_graph(100), OutputFormat::Svg)
            .unwrap();
        assert_eq!(bytes, b"<svg/>");
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_graphviz_output_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let program = stub_program(dir.path(), "cat > /dev/null");

        let err = GraphvizCommand::new(&program)
            .render(&RenderGraph::default(), OutputFormat::Png)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.context_value("format"), Some("png"));
    }

    #[test]
    fn test_engine_for_format() {
        let program = Path::new("dot");
        assert_eq!(engine_for(OutputFormat::Dot, program).name(), "dot-source");
        assert_eq!(engine_for(OutputFormat::Png, program).name(), "graphviz");
    }
}
