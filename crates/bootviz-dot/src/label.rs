//! HTML-like table labels for startup steps.

use std::fmt::Write;
use std::time::Duration;

use bootviz_core::{Tag, format_duration};

/// Escape text for embedding in an HTML-like Graphviz label.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Build the label table: step name, duration, then one row per tag in
/// order (duplicate keys get their own rows).
pub fn render_table(name: &str, duration: Duration, tags: &[Tag]) -> String {
    let mut body = String::with_capacity(160 + tags.len() * 64);
    body.push_str("<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n");
    let _ = writeln!(
        body,
        "<TR><TD>Step</TD><TD>{}</TD></TR>",
        escape_html(name)
    );
    let _ = writeln!(
        body,
        "<TR><TD>Dur</TD><TD>{}</TD></TR>",
        escape_html(&format_duration(duration))
    );
    for tag in tags {
        let _ = writeln!(
            body,
            "<TR><TD>TagKey: {}</TD><TD>TagValue: {}</TD></TR>",
            escape_html(&tag.key),
            escape_html(&tag.value)
        );
    }
    body.push_str("</TABLE>");
    body
}
