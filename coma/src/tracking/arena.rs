//! Append-only storage for trajectory histories.
//!
//! Every trajectory is a node pointing at its predecessor. Extending a
//! trajectory pushes a new node and leaves the old one untouched, so forks
//! share their common prefix and no history is ever copied.
//!
//! Nodes are only released when the arena is dropped, retired and discarded
//! histories included. The arena therefore holds one node per seed plus one
//! per extension made over the whole sequence, regardless of how many
//! trajectories are live at the end.

use super::trajectory::TrackPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug)]
struct Node {
    point: TrackPoint,
    parent: Option<NodeId>,
    first: NodeId,
    len: u32,
}

#[derive(Debug, Default)]
pub struct TrackArena {
    nodes: Vec<Node>,
}

impl TrackArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new single-point history.
    pub fn seed(&mut self, point: TrackPoint) -> NodeId {
        let id = self.next_id();
        self.nodes.push(Node {
            point,
            parent: None,
            first: id,
            len: 1,
        });
        id
    }

    /// New history equal to `parent` plus `point`.
    pub fn extend(&mut self, parent: NodeId, point: TrackPoint) -> NodeId {
        let id = self.next_id();
        let (first, len) = {
            let p = self.node(parent);
            (p.first, p.len + 1)
        };
        self.nodes.push(Node {
            point,
            parent: Some(parent),
            first,
            len,
        });
        id
    }

    pub fn last(&self, id: NodeId) -> &TrackPoint {
        &self.node(id).point
    }

    pub fn first(&self, id: NodeId) -> &TrackPoint {
        &self.node(self.node(id).first).point
    }

    pub fn len(&self, id: NodeId) -> usize {
        self.node(id).len as usize
    }

    /// Total nodes allocated so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Materialize the full history ending at `id`, oldest point first.
    pub fn history(&self, id: NodeId) -> Vec<TrackPoint> {
        let mut points = Vec::with_capacity(self.len(id));
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            points.push(node.point);
            cursor = node.parent;
        }
        points.reverse();
        points
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn next_id(&self) -> NodeId {
        NodeId(u32::try_from(self.nodes.len()).expect("trajectory arena exceeds u32 nodes"))
    }
}
