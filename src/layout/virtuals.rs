use super::types::{EdgeId, LayoutGraph, Node, NodeId};

/// Insert a chain of virtual nodes into every hierarchical edge whose
/// endpoints sit more than one level apart, so the ordering and balancing
/// phases only ever see relations between adjacent levels.
///
/// The chain replaces the direct parent/child entries on both endpoints and
/// is recorded on the edge from the parent side down to the child side for
/// the final control-point walk.
pub(super) fn insert_virtual_nodes(graph: &mut LayoutGraph) {
    for e in 0..graph.edges.len() {
        if graph.edges[e].kind.is_hierarchical() {
            split_long_edge(graph, EdgeId(e));
        }
    }
}

fn split_long_edge(graph: &mut LayoutGraph, eid: EdgeId) {
    let edge = &graph.edges[eid.0];
    let (child, parent) = (edge.source, edge.dest);
    let (Some(child_level), Some(parent_level)) =
        (graph.node(child).level, graph.node(parent).level)
    else {
        return;
    };
    if child_level <= parent_level + 1 {
        return;
    }

    // One virtual node per crossed level, parent side first.
    let chain: Vec<NodeId> = (parent_level + 1..child_level)
        .map(|level| {
            let id = graph.push_node(Node::virtual_node());
            graph.node_mut(id).level = Some(level);
            id
        })
        .collect();

    for window in chain.windows(2) {
        let (upper, lower) = (window[0], window[1]);
        graph.node_mut(upper).children.push((lower, eid));
        graph.node_mut(lower).parents.push((upper, eid));
    }
    let (first, last) = (chain[0], chain[chain.len() - 1]);
    graph.node_mut(first).parents.push((parent, eid));
    graph.node_mut(last).children.push((child, eid));
    replace_relation(&mut graph.node_mut(parent).children, eid, first);
    replace_relation(&mut graph.node_mut(child).parents, eid, last);

    for &vnode in &chain {
        let level = graph.node(vnode).level.unwrap_or(0);
        graph.levels[level].push(vnode);
        let index = graph.levels[level].len() - 1;
        graph.node_mut(vnode).index = Some(index);
    }

    graph.edges[eid.0].virtuals = chain;
}

/// Swap the node of the relation entry carrying `eid` for `new_node`.
fn replace_relation(relations: &mut [(NodeId, EdgeId)], eid: EdgeId, new_node: NodeId) {
    for entry in relations.iter_mut() {
        if entry.1 == eid {
            entry.0 = new_node;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::build::build_graph;
    use super::super::leveling::assign_levels;
    use super::*;
    use crate::ir::{Diagram, LinkKind, ShapeKind};

    fn leveled_graph() -> LayoutGraph {
        // A at the top, B below it, C at the bottom; C also inherits A
        // directly, skipping B's level.
        let mut d = Diagram::new();
        for id in ["A", "B", "C"] {
            d.ensure_shape(id, 100.0, 60.0, ShapeKind::Class);
        }
        d.add_link("B", "A", LinkKind::Inheritance);
        d.add_link("C", "B", LinkKind::Inheritance);
        d.add_link("C", "A", LinkKind::Inheritance);
        let mut graph = build_graph(&d);
        assign_levels(&mut graph).unwrap();
        graph
    }

    #[test]
    fn long_edge_gets_one_virtual_per_crossed_level() {
        let mut graph = leveled_graph();
        insert_virtual_nodes(&mut graph);
        let long = graph
            .edges
            .iter()
            .find(|e| !e.virtuals.is_empty())
            .expect("the level-skipping edge must be split");
        assert_eq!(long.virtuals.len(), 1);
        assert_eq!(graph.node(long.virtuals[0]).level, Some(1));
    }

    #[test]
    fn all_relations_span_one_level_afterwards() {
        let mut graph = leveled_graph();
        insert_virtual_nodes(&mut graph);
        for node in &graph.nodes {
            let Some(level) = node.level else { continue };
            for &(child, _) in &node.children {
                assert_eq!(graph.node(child).level, Some(level + 1));
            }
        }
    }

    #[test]
    fn chain_is_spliced_into_both_endpoints() {
        let mut graph = leveled_graph();
        insert_virtual_nodes(&mut graph);
        let long = graph
            .edges
            .iter()
            .find(|e| !e.virtuals.is_empty())
            .unwrap();
        let vnode = long.virtuals[0];
        let parent = long.dest;
        let child = long.source;
        assert!(graph.node(parent).children.iter().any(|&(n, _)| n == vnode));
        assert!(graph.node(child).parents.iter().any(|&(n, _)| n == vnode));
        // The direct relation is gone.
        assert!(!graph.node(parent).children.iter().any(|&(n, _)| n == child));
    }

    #[test]
    fn virtual_nodes_get_dense_level_indices() {
        let mut graph = leveled_graph();
        insert_virtual_nodes(&mut graph);
        for (l, level) in graph.levels.iter().enumerate() {
            for (i, &id) in level.iter().enumerate() {
                assert_eq!(graph.node(id).level, Some(l));
                assert_eq!(graph.node(id).index, Some(i));
            }
        }
    }

    #[test]
    fn deep_skip_builds_ordered_chain() {
        let mut d = Diagram::new();
        for id in ["A", "B", "C", "D"] {
            d.ensure_shape(id, 100.0, 60.0, ShapeKind::Class);
        }
        d.add_link("B", "A", LinkKind::Inheritance);
        d.add_link("C", "B", LinkKind::Inheritance);
        d.add_link("D", "C", LinkKind::Inheritance);
        d.add_link("D", "A", LinkKind::Inheritance);
        let mut graph = build_graph(&d);
        assign_levels(&mut graph).unwrap();
        insert_virtual_nodes(&mut graph);
        let long = graph
            .edges
            .iter()
            .find(|e| e.virtuals.len() == 2)
            .expect("edge spanning three levels needs two waypoints");
        assert_eq!(graph.node(long.virtuals[0]).level, Some(1));
        assert_eq!(graph.node(long.virtuals[1]).level, Some(2));
    }
}
