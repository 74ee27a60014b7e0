//! Render projection for startup trees.
//!
//! Transforms a marked [`StartupTree`] into styled nodes and edges and hands
//! them to a layout engine.
//!
//! # Module Structure
//!
//! - [`dot`]: DOT format utilities and the [`DotBuilder`]
//! - [`label`]: escaped HTML-like table labels
//! - [`color`]: duration to fill colour gradient
//! - [`project`]: marked tree to [`RenderGraph`]
//! - [`engine`]: [`LayoutEngine`] implementations (Graphviz, DOT source)

pub mod color;
pub mod dot;
pub mod engine;
pub mod label;
pub mod project;

use std::time::Instant;

use tracing::info;

use bootviz_core::StartupTree;
use bootviz_error::Result;

pub use color::{ColorOptions, ColorScale};
pub use dot::DotBuilder;
pub use engine::{DotPassthrough, GraphvizCommand, LayoutEngine, OutputFormat, engine_for};
pub use project::{RenderEdge, RenderGraph, RenderNode, project};

/// Project `tree` with the given colours and render it through `engine`.
pub fn render_tree(
    tree: &StartupTree,
    colors: &ColorOptions,
    engine: &dyn LayoutEngine,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    let project_start = Instant::now();
    let scale = ColorScale::new(colors, tree.max_duration())?;
    let graph = project(tree, &scale)?;
    info!(
        "Projection: {:.2}s ({} nodes, {} edges)",
        project_start.elapsed().as_secs_f64(),
        graph.nodes.len(),
        graph.edges.len()
    );

    engine.render(&graph, format)
}
