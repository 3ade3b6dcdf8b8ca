use std::collections::{HashMap, HashSet};

use crate::ir::Diagram;

use super::types::{Edge, EdgeId, EdgeKind, LayoutGraph, Node, NodeId};

/// Build the layout graph from the diagram: one node per distinct shape,
/// one edge per link whose endpoints both exist. Hierarchical links record
/// a parent on the child node and a child on the parent node; all other
/// links record symmetric neighbor entries used by loose-node placement.
pub(super) fn build_graph(diagram: &Diagram) -> LayoutGraph {
    let mut graph = LayoutGraph::default();
    let mut by_shape: HashMap<&str, NodeId> = HashMap::new();
    let mut in_hierarchy: HashSet<NodeId> = HashSet::new();

    // Shapes first, so a shape with no links still gets a node.
    for shape in diagram.shapes.values() {
        let id = graph.push_node(Node::real(&shape.id, shape.width, shape.height));
        by_shape.insert(shape.id.as_str(), id);
    }

    for (link_idx, link) in diagram.links.iter().enumerate() {
        let (Some(&src), Some(&dst)) = (
            by_shape.get(link.from.as_str()),
            by_shape.get(link.to.as_str()),
        ) else {
            continue;
        };

        let kind = match link.kind {
            crate::ir::LinkKind::Inheritance => EdgeKind::Inheritance,
            crate::ir::LinkKind::Realization => EdgeKind::Realization,
            _ => EdgeKind::Other,
        };
        graph.edges.push(Edge {
            source: src,
            dest: dst,
            kind,
            virtuals: Vec::new(),
            link: link_idx,
        });
        let eid = EdgeId(graph.edges.len() - 1);

        if kind.is_hierarchical() {
            graph.node_mut(src).parents.push((dst, eid));
            graph.node_mut(dst).children.push((src, eid));
            for id in [src, dst] {
                if in_hierarchy.insert(id) {
                    graph.hierarchy.push(id);
                }
            }
        } else {
            graph.node_mut(src).neighbors.push((dst, eid));
            graph.node_mut(dst).neighbors.push((src, eid));
        }
    }

    // Whatever never took part in a hierarchical relation is loose and gets
    // placed after leveling, in creation order.
    for i in 0..graph.nodes.len() {
        let id = NodeId(i);
        if !in_hierarchy.contains(&id) {
            graph.loose.push(id);
        }
    }

    graph
}
