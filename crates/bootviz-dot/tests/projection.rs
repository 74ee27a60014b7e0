use std::time::Duration;

use bootviz_core::{StartupEvent, StartupTree};
use bootviz_dot::{
    ColorOptions, ColorScale, DotPassthrough, OutputFormat, RenderEdge, project, render_tree,
};
use pretty_assertions::assert_eq;

fn event(id: u64, parent_id: u64, millis: u64) -> StartupEvent {
    StartupEvent::new(id, parent_id, format!("step-{id}"), Duration::from_millis(millis))
}

fn edge(from: &str, to: &str) -> RenderEdge {
    RenderEdge {
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn scenario() -> Vec<StartupEvent> {
    vec![
        event(1, 0, 2000),
        event(2, 1, 100),
        event(3, 1, 600),
        event(4, 3, 50),
    ]
}

#[test]
fn slow_path_projects_to_single_edge() {
    let tree = StartupTree::build(scenario(), Duration::from_millis(500)).unwrap();
    let scale = ColorScale::new(&ColorOptions::default(), tree.max_duration()).unwrap();
    let graph = project(&tree, &scale).unwrap();

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(graph.edges, vec![edge("1", "3")]);
}

#[test]
fn zero_filter_reproduces_every_edge() {
    let tree = StartupTree::build(scenario(), Duration::ZERO).unwrap();
    let scale = ColorScale::new(&ColorOptions::default(), tree.max_duration()).unwrap();
    let graph = project(&tree, &scale).unwrap();

    assert_eq!(graph.nodes.len(), 4);
    let mut edges = graph.edges.clone();
    edges.sort();
    assert_eq!(edges, vec![edge("1", "2"), edge("1", "3"), edge("3", "4")]);
}

#[test]
fn fill_colors_darken_toward_slow_steps() {
    let tree = StartupTree::build(scenario(), Duration::ZERO).unwrap();
    let scale = ColorScale::new(&ColorOptions::default(), tree.max_duration()).unwrap();
    let graph = project(&tree, &scale).unwrap();

    // saturation point is 2s * 0.25 = 500ms
    assert_eq!(graph.node("1").unwrap().fill_color, "#ff0000");
    assert_eq!(graph.node("3").unwrap().fill_color, "#ff0000");
    assert_ne!(graph.node("2").unwrap().fill_color, "#ff0000");
    assert_ne!(graph.node("4").unwrap().fill_color, "#00ff00");
}

#[test]
fn render_tree_through_dot_passthrough() {
    let tree = StartupTree::build(
        vec![
            event(1, 0, 2000).with_tag("beanName", "<init>"),
            event(2, 1, 900),
        ],
        Duration::from_millis(500),
    )
    .unwrap();

    let bytes = render_tree(
        &tree,
        &ColorOptions::default(),
        &DotPassthrough,
        OutputFormat::Dot,
    )
    .unwrap();
    let dot = String::from_utf8(bytes).unwrap();

    assert!(dot.contains("TagValue: &lt;init&gt;"));
    assert!(dot.contains("\"1\" -> \"2\";"));
}

#[test]
fn render_tree_rejects_invalid_colors() {
    let tree = StartupTree::build(scenario(), Duration::ZERO).unwrap();
    let colors = ColorOptions {
        slow_color: "#GG0000".to_string(),
        ..ColorOptions::default()
    };

    let err = render_tree(&tree, &colors, &DotPassthrough, OutputFormat::Dot).unwrap_err();
    assert_eq!(err.kind(), bootviz_error::ErrorKind::ConfigInvalid);
}
