/// Index of a node in `LayoutGraph::nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// Index of an edge in `LayoutGraph::edges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    /// Backed by a diagram shape, identified by its id.
    Real { shape: String },
    /// Synthetic routing waypoint for an edge spanning several levels.
    Virtual,
}

/// One node of the layout graph, real or virtual.
///
/// Relations are stored as index pairs (neighbor node, connecting edge) so
/// the graph is a flat arena with no ownership cycles. `left`/`right` are
/// the in-level neighbor pointers used only while balancing coordinates.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) level: Option<usize>,
    pub(crate) index: Option<usize>,
    pub(crate) barycenter: Option<f32>,
    pub(crate) parents: Vec<(NodeId, EdgeId)>,
    pub(crate) children: Vec<(NodeId, EdgeId)>,
    pub(crate) neighbors: Vec<(NodeId, EdgeId)>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl Node {
    pub(crate) fn real(shape: &str, width: f32, height: f32) -> Self {
        Self::new(
            NodeKind::Real {
                shape: shape.to_string(),
            },
            width,
            height,
        )
    }

    pub(crate) fn virtual_node() -> Self {
        Self::new(NodeKind::Virtual, 1.0, 1.0)
    }

    fn new(kind: NodeKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            width,
            height,
            x: 0.0,
            y: 0.0,
            level: None,
            index: None,
            barycenter: None,
            parents: Vec::new(),
            children: Vec::new(),
            neighbors: Vec::new(),
            left: None,
            right: None,
        }
    }

    pub(crate) fn is_real(&self) -> bool {
        matches!(self.kind, NodeKind::Real { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    Inheritance,
    Realization,
    Other,
}

impl EdgeKind {
    pub(crate) fn is_hierarchical(self) -> bool {
        matches!(self, EdgeKind::Inheritance | EdgeKind::Realization)
    }
}

/// One connection of the layout graph. `source` is the child side for
/// hierarchical edges; `link` indexes the diagram link it was built from.
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) source: NodeId,
    pub(crate) dest: NodeId,
    pub(crate) kind: EdgeKind,
    /// Waypoints ordered from the destination (parent) side down to the
    /// source (child) side; empty when the endpoints are one level apart.
    pub(crate) virtuals: Vec<NodeId>,
    pub(crate) link: usize,
}

/// The whole graph for one layout run: a node/edge arena, the hierarchy
/// and loose partitions in discovery order, and the level tables.
#[derive(Debug, Default)]
pub(crate) struct LayoutGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) hierarchy: Vec<NodeId>,
    pub(crate) loose: Vec<NodeId>,
    pub(crate) levels: Vec<Vec<NodeId>>,
}

impl LayoutGraph {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Rewrite the `index` fields of one level from its current order.
    pub(crate) fn reindex_level(&mut self, level: usize) {
        for i in 0..self.levels[level].len() {
            let id = self.levels[level][i];
            self.nodes[id.0].index = Some(i);
        }
    }

    pub(crate) fn index_of(&self, id: NodeId) -> usize {
        self.node(id).index.unwrap_or(0)
    }
}

/// Outcome of the coordinate-balancing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    /// A full sweep moved nothing; positions are a fixed point.
    Converged { sweeps: usize },
    /// The sweep cap was hit first; positions are best-effort.
    SweepLimitReached,
}

/// Summary of one layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReport {
    /// Hierarchical edge crossings remaining after ordering.
    pub crossings: usize,
    /// Number of levels in the final drawing.
    pub levels: usize,
    pub balance: BalanceStatus,
}

impl Default for LayoutReport {
    fn default() -> Self {
        Self {
            crossings: 0,
            levels: 0,
            balance: BalanceStatus::Converged { sweeps: 0 },
        }
    }
}
