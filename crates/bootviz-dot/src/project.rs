//! Projection of a marked [`StartupTree`] into styled nodes and edges.

use std::time::Duration;

use tracing::debug;

use bootviz_core::StartupTree;
use bootviz_error::{Error, Result};

use crate::color::ColorScale;
use crate::dot::DotBuilder;
use crate::label::render_table;

pub const NODE_SHAPE: &str = "box";
pub const NODE_STYLE: &str = "filled";

/// One visual node, keyed by the stringified event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub id: String,
    pub name: String,
    pub duration: Duration,
    /// `#rrggbb`
    pub fill_color: String,
    /// HTML-like table, already escaped.
    pub label: String,
}

/// Directed edge from a parent step to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
}

/// Styled nodes and edges handed to a [`crate::LayoutEngine`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to DOT with HTML-like labels.
    pub fn to_dot(&self) -> String {
        let estimated_size = self.nodes.len() * 300 + self.edges.len() * 24 + 128;
        let mut builder = DotBuilder::with_capacity("startup", estimated_size);
        builder
            .node_style(&format!("shape={NODE_SHAPE}, style={NODE_STYLE}"))
            .blank();

        for node in &self.nodes {
            builder.html_node(&node.id, &[("fillcolor", &node.fill_color)], &node.label);
        }
        if !self.edges.is_empty() {
            builder.blank();
        }
        for edge in &self.edges {
            builder.edge(&edge.from, &edge.to);
        }
        builder.build()
    }
}

/// Build the visual graph for every node marked for rendering.
///
/// Marking propagates through every ancestor, so each rendered non-root node
/// has a rendered parent and edges always join adjacent tree levels. A
/// violation is reported instead of silently dropping the edge.
pub fn project(tree: &StartupTree, scale: &ColorScale) -> Result<RenderGraph> {
    let mut graph = RenderGraph::default();

    for node in tree.rendered() {
        let event = node.event();
        let id = event.id.to_string();

        graph.nodes.push(RenderNode {
            id: id.clone(),
            name: event.name.clone(),
            duration: event.duration,
            fill_color: scale.fill_for(event.duration),
            label: render_table(&event.name, event.duration, &event.tags),
        });

        let Some(parent) = tree.parent(node) else {
            continue;
        };
        if !parent.should_render() {
            return Err(Error::invariant_violation(format!(
                "step {} is rendered but its parent {} is not",
                event.id,
                parent.id()
            ))
            .with_operation("project")
            .with_context("event_id", id)
            .with_context("parent_id", parent.id().to_string()));
        }
        graph.edges.push(RenderEdge {
            from: parent.id().to_string(),
            to: id,
        });
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "projected render graph"
    );
    Ok(graph)
}
