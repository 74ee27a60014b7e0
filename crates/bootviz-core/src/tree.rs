//! Tree reconstruction and render-eligibility marking.
//!
//! Events arrive as a flat list with integer parent pointers and no ordering
//! guarantee, so the tree is built in strictly ordered passes over an arena
//! of [`Node`]s:
//!
//! 1. **allocate**: one node per event, min/max duration over every event
//! 2. **link**: resolve each parent id to the parent's arena slot
//! 3. **mark**: every node slower than the filter marks itself and all of its
//!    ancestors for rendering
//!
//! After marking, a node renders iff its own duration exceeds the filter or
//! some descendant's does, so the parent of any rendered node is rendered too.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use bootviz_error::{Error, Result};

use crate::event::StartupEvent;

/// One entry of the working tree.
#[derive(Debug, Clone)]
pub struct Node {
    event: StartupEvent,
    /// Arena slot of the parent; set once during linking.
    parent: Option<usize>,
    should_render: bool,
}

impl Node {
    fn new(event: StartupEvent) -> Self {
        Self {
            event,
            parent: None,
            should_render: false,
        }
    }

    pub fn event(&self) -> &StartupEvent {
        &self.event
    }

    pub fn id(&self) -> u64 {
        self.event.id
    }

    pub fn duration(&self) -> Duration {
        self.event.duration
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn should_render(&self) -> bool {
        self.should_render
    }
}

/// Linked and marked tree of one startup snapshot.
#[derive(Debug, Clone)]
pub struct StartupTree {
    nodes: Vec<Node>,
    index: HashMap<u64, usize>,
    filter: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl StartupTree {
    /// Build the tree and mark every node that should appear in the diagram.
    ///
    /// Nodes with a duration strictly greater than `filter` are render-worthy
    /// on their own; a zero filter renders everything.
    pub fn build(events: Vec<StartupEvent>, filter: Duration) -> Result<Self> {
        let mut tree = Self::allocate(events, filter)?;
        tree.link()?;
        tree.check_acyclic()?;
        let marked = tree.mark();

        debug!(
            nodes = tree.len(),
            marked,
            filter = ?filter,
            min = ?tree.min_duration,
            max = ?tree.max_duration,
            "startup tree built"
        );
        Ok(tree)
    }

    fn allocate(events: Vec<StartupEvent>, filter: Duration) -> Result<Self> {
        let mut nodes = Vec::with_capacity(events.len());
        let mut index = HashMap::with_capacity(events.len());
        let mut min_duration: Option<Duration> = None;
        let mut max_duration = Duration::ZERO;

        for event in events {
            if index.insert(event.id, nodes.len()).is_some() {
                return Err(Error::duplicate_event(event.id).with_operation("tree::allocate"));
            }
            min_duration = Some(min_duration.map_or(event.duration, |m| m.min(event.duration)));
            max_duration = max_duration.max(event.duration);
            nodes.push(Node::new(event));
        }

        Ok(Self {
            nodes,
            index,
            filter,
            min_duration: min_duration.unwrap_or_default(),
            max_duration,
        })
    }

    fn link(&mut self) -> Result<()> {
        for slot in 0..self.nodes.len() {
            let event = &self.nodes[slot].event;
            if event.is_root() {
                continue;
            }
            let parent = *self
                .index
                .get(&event.parent_id)
                .ok_or_else(|| {
                    Error::dangling_parent(event.id, event.parent_id).with_operation("tree::link")
                })?;
            self.nodes[slot].parent = Some(parent);
        }
        Ok(())
    }

    /// Reject parent chains that loop, so upward walks always reach a root.
    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Visit {
            Fresh,
            OnPath,
            Done,
        }

        let mut state = vec![Visit::Fresh; self.nodes.len()];
        let mut path = Vec::new();

        for start in 0..self.nodes.len() {
            let mut current = Some(start);
            while let Some(slot) = current {
                match state[slot] {
                    Visit::Done => break,
                    Visit::OnPath => {
                        return Err(Error::cycle_detected(self.nodes[slot].id())
                            .with_operation("tree::check_acyclic"));
                    }
                    Visit::Fresh => {
                        state[slot] = Visit::OnPath;
                        path.push(slot);
                        current = self.nodes[slot].parent;
                    }
                }
            }
            for slot in path.drain(..) {
                state[slot] = Visit::Done;
            }
        }
        Ok(())
    }

    /// Run the marking pass. Returns how many nodes were newly marked, so a
    /// second run on an already-marked tree returns zero.
    pub fn mark(&mut self) -> usize {
        let mut marked = 0;
        for slot in 0..self.nodes.len() {
            if self.exceeds_filter(&self.nodes[slot]) {
                marked += self.mark_ancestors(slot);
            }
        }
        marked
    }

    fn exceeds_filter(&self, node: &Node) -> bool {
        self.filter.is_zero() || node.duration() > self.filter
    }

    /// Walk up from `slot`, stopping at the first node that was already
    /// marked (its ancestors are marked as well) or past the root.
    fn mark_ancestors(&mut self, slot: usize) -> usize {
        let mut marked = 0;
        let mut current = Some(slot);
        while let Some(slot) = current {
            let node = &mut self.nodes[slot];
            if node.should_render {
                break;
            }
            node.should_render = true;
            marked += 1;
            current = node.parent;
        }
        marked
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: u64) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent.map(|slot| &self.nodes[slot])
    }

    pub fn parent_of(&self, id: u64) -> Option<&Node> {
        self.node(id).and_then(|node| self.parent(node))
    }

    /// Children of `id` in snapshot order.
    pub fn children_of(&self, id: u64) -> Vec<&Node> {
        let Some(&slot) = self.index.get(&id) else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .filter(|node| node.parent == Some(slot))
            .collect()
    }

    /// Nodes marked for rendering, in snapshot order.
    pub fn rendered(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.should_render)
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered().count()
    }

    pub fn filter(&self) -> Duration {
        self.filter
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
