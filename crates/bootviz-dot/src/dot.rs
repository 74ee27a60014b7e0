//! Minimal DOT writer for the startup digraph.

use std::fmt::Write;

const INDENT: &str = "  ";

/// Escape a value for use inside a double-quoted DOT string.
pub fn escape_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Appends statements to a single `digraph` body.
pub struct DotBuilder {
    output: String,
}

impl DotBuilder {
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, 4096)
    }

    /// `capacity` is a size hint for the whole document.
    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        let mut output = String::with_capacity(capacity);
        let _ = writeln!(output, "digraph {name} {{");
        Self { output }
    }

    fn statement(&mut self) -> &mut String {
        self.output.push_str(INDENT);
        &mut self.output
    }

    /// Default attributes for every node, e.g. `shape=box, style=filled`.
    pub fn node_style(&mut self, attrs: &str) -> &mut Self {
        let _ = writeln!(self.statement(), "node [{attrs}];");
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Node with quoted attributes and an HTML-like `label=<...>`.
    ///
    /// `html` is written as is; its text must already be escaped.
    pub fn html_node(&mut self, id: &str, attrs: &[(&str, &str)], html: &str) -> &mut Self {
        let out = self.statement();
        let _ = write!(out, "\"{}\" [", escape_quoted(id));
        for (key, value) in attrs {
            let _ = write!(out, "{key}=\"{}\", ", escape_quoted(value));
        }
        let _ = writeln!(out, "label=<{html}>];");
        self
    }

    pub fn edge(&mut self, from: &str, to: &str) -> &mut Self {
        let (from, to) = (escape_quoted(from), escape_quoted(to));
        let _ = writeln!(self.statement(), "\"{from}\" -> \"{to}\";");
        self
    }

    /// Close the graph and return the document.
    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}
