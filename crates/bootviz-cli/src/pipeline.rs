//! Core processing pipeline: fetch → decode → build tree → project → render.

use std::time::Instant;

use tracing::{info, warn};

use bootviz_core::{Snapshot, StartupTree, format_duration};
use bootviz_dot::{engine_for, render_tree};
use bootviz_error::Result;

use crate::BootvizOptions;
use crate::fetch::fetch_snapshot;

/// Turn a raw snapshot body into output bytes.
///
/// 1. Decode the JSON timeline
/// 2. Build the startup tree and mark slow paths
/// 3. Project and render in the requested format
pub fn generate(opts: &BootvizOptions, payload: &[u8]) -> Result<Vec<u8>> {
    // 1. Decode
    let decode_start = Instant::now();
    let snapshot = Snapshot::from_json(payload)?;
    info!(
        "Decoding: {:.2}s ({} events, Spring Boot {})",
        decode_start.elapsed().as_secs_f64(),
        snapshot.len(),
        snapshot.spring_boot_version.as_deref().unwrap_or("unknown")
    );
    if snapshot.is_empty() {
        warn!("startup timeline is empty; is the BufferingApplicationStartup configured?");
    }

    // 2. Build + mark
    let build_start = Instant::now();
    let tree = StartupTree::build(snapshot.events, opts.filter)?;
    info!(
        "Tree building: {:.2}s ({} of {} steps above {})",
        build_start.elapsed().as_secs_f64(),
        tree.rendered_count(),
        tree.len(),
        format_duration(tree.filter())
    );

    // 3. Project + render
    let render_start = Instant::now();
    let format = opts.output_format();
    let engine = engine_for(format, &opts.dot_program);
    let bytes = render_tree(&tree, &opts.colors, engine.as_ref(), format)?;
    info!(
        "Rendering ({}, {}): {:.2}s",
        engine.name(),
        format,
        render_start.elapsed().as_secs_f64()
    );

    Ok(bytes)
}

/// Main entry point: fetch the snapshot and render it.
pub fn run_main(opts: &BootvizOptions) -> Result<Vec<u8>> {
    let payload = fetch_snapshot(&opts.source, opts.fetch_timeout)?;
    generate(opts, &payload)
}
