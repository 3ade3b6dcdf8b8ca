use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Diagram;

use super::types::{BalanceStatus, LayoutGraph, NodeId, NodeKind};

/// Turn level/index assignments into pixel coordinates: pack every level
/// left-to-right, then sweep the whole graph moving each node toward the
/// average midpoint of its parents and children until nothing moves or the
/// sweep cap is hit.
pub(super) fn assign_coordinates(graph: &mut LayoutGraph, config: &LayoutConfig) -> BalanceStatus {
    pack_levels(graph, config);
    link_level_neighbors(graph);

    let mut sweeps = 0;
    loop {
        let mut moved = false;
        for level in 0..graph.levels.len() {
            for slot in 0..graph.levels[level].len() {
                let id = graph.levels[level][slot];
                if balance(graph, id, config) {
                    moved = true;
                }
            }
        }
        sweeps += 1;
        if !moved {
            debug!(sweeps, "balancing converged");
            return BalanceStatus::Converged { sweeps };
        }
        if sweeps >= config.max_balance_sweeps {
            debug!(sweeps, "balancing stopped at the sweep cap");
            return BalanceStatus::SweepLimitReached;
        }
    }
}

fn pack_levels(graph: &mut LayoutGraph, config: &LayoutConfig) {
    let mut y = config.top_margin;
    for level in 0..graph.levels.len() {
        let mut x = config.left_margin;
        let mut max_height = 0.0f32;
        for slot in 0..graph.levels[level].len() {
            let id = graph.levels[level][slot];
            let node = graph.node_mut(id);
            node.x = x;
            node.y = y;
            x += node.width + config.node_spacing;
            max_height = max_height.max(node.height);
        }
        y += max_height + config.rank_spacing;
    }
}

fn link_level_neighbors(graph: &mut LayoutGraph) {
    for level in 0..graph.levels.len() {
        let nodes = graph.levels[level].clone();
        for (slot, &id) in nodes.iter().enumerate() {
            graph.node_mut(id).left = if slot > 0 { Some(nodes[slot - 1]) } else { None };
            graph.node_mut(id).right = nodes.get(slot + 1).copied();
        }
    }
}

/// The x position this node would take to sit centered under its parents
/// and over its children, with the number of relations as its weight.
fn wanted_x(graph: &LayoutGraph, id: NodeId) -> Option<(f32, usize)> {
    let node = graph.node(id);
    let related: Vec<NodeId> = node
        .parents
        .iter()
        .chain(node.children.iter())
        .map(|&(n, _)| n)
        .collect();
    if related.is_empty() {
        return None;
    }
    let sum: f32 = related
        .iter()
        .map(|&n| {
            let other = graph.node(n);
            other.x + other.width / 2.0
        })
        .sum();
    Some((sum / related.len() as f32 - node.width / 2.0, related.len()))
}

/// Largest x this node may take without crowding its right neighbor;
/// unbounded when the node is the rightmost of its level.
fn max_x(graph: &LayoutGraph, id: NodeId, config: &LayoutConfig) -> Option<f32> {
    let node = graph.node(id);
    let right = node.right?;
    Some(graph.node(right).x - node.width - config.node_spacing)
}

/// Move one node toward its wanted position, pushing the right neighbor
/// along when room is missing. Only rightward moves are taken; repeated
/// sweeps converge from the left-packed start. Returns whether the node
/// traveled further than the epsilon.
fn balance(graph: &mut LayoutGraph, id: NodeId, config: &LayoutConfig) -> bool {
    let (x, y) = (graph.node(id).x, graph.node(id).y);
    let Some((wanted, weight)) = wanted_x(graph, id) else {
        return false;
    };

    if wanted > x {
        if graph.node(id).right.is_some() {
            if let Some(limit) = max_x(graph, id, config)
                && wanted > limit
                && let Some(right) = graph.node(id).right
            {
                push_right(graph, right, (wanted - limit) * weight as f32, weight, config);
            }
            let limit = max_x(graph, id, config).unwrap_or(wanted);
            let node = graph.node_mut(id);
            node.x = wanted.min(limit);
            node.y = y;
        } else {
            let node = graph.node_mut(id);
            node.x = wanted;
            node.y = y;
        }
    }

    graph.node(id).x - x > config.balance_epsilon
}

/// Called by the left neighbor: take the accumulated pull and move right
/// as far as the own wanted position and the next neighbor allow,
/// cascading further right when space runs out.
fn push_right(
    graph: &mut LayoutGraph,
    id: NodeId,
    mut x_delta_sum: f32,
    mut pulling: usize,
    config: &LayoutConfig,
) {
    let (x, y) = (graph.node(id).x, graph.node(id).y);
    if let Some((wanted, weight)) = wanted_x(graph, id) {
        x_delta_sum += (wanted - x) * weight as f32;
        pulling += weight;
    }
    let x_delta = (x_delta_sum / pulling as f32).floor();

    if x_delta > 0.0 {
        if graph.node(id).right.is_some() {
            if let Some(limit) = max_x(graph, id, config)
                && limit < x + x_delta
                && let Some(right) = graph.node(id).right
            {
                push_right(graph, right, (x + x_delta - limit) * pulling as f32, pulling, config);
            }
            let limit = max_x(graph, id, config).unwrap_or(x + x_delta);
            let node = graph.node_mut(id);
            node.x = (x + x_delta).min(limit);
            node.y = y;
        } else {
            let node = graph.node_mut(id);
            node.x = x + x_delta;
            node.y = y;
        }
    }
}

/// Copy the computed geometry back onto the caller's diagram: shape
/// positions, link anchors fanned out along the class borders, and control
/// points threading every split edge through its waypoints. This is the
/// only place the diagram is mutated.
pub(super) fn write_back(graph: &LayoutGraph, diagram: &mut Diagram) {
    for node in &graph.nodes {
        if let NodeKind::Real { shape } = &node.kind
            && let Some(shape) = diagram.shapes.get_mut(shape)
        {
            shape.x = node.x;
            shape.y = node.y;
        }
    }

    // Default anchors at the shape centers and drop any waypoints from a
    // previous run; the hierarchical fan-out below overrides the anchors
    // for inheritance and realization links, and only edges split in this
    // run get waypoints back.
    for link in diagram.links.iter_mut() {
        link.control_points.clear();
        if let Some(shape) = diagram.shapes.get(&link.from) {
            link.source_anchor = (shape.x + shape.width / 2.0, shape.y + shape.height / 2.0);
        }
        if let Some(shape) = diagram.shapes.get(&link.to) {
            link.dest_anchor = (shape.x + shape.width / 2.0, shape.y + shape.height / 2.0);
        }
    }

    fan_out_anchors(graph, diagram);

    for edge in &graph.edges {
        if edge.virtuals.is_empty() {
            continue;
        }
        let Some(link) = diagram.links.get_mut(edge.link) else {
            continue;
        };

        // Walk the chain from the child side up, as the link is drawn.
        let x_start = link.source_anchor.0;
        for &vnode in edge.virtuals.iter().rev() {
            let (xv, yv) = (graph.node(vnode).x, graph.node(vnode).y);
            // When the link bends around the level, route under the first
            // real node beside the waypoint so it clears that node's box.
            let lateral = if x_start > xv {
                first_real(graph, vnode, |n| graph.node(n).right)
            } else {
                first_real(graph, vnode, |n| graph.node(n).left)
            };
            if let Some(real) = lateral {
                let under = graph.node(real);
                link.control_points.push((xv, under.y + under.height));
            }
            link.control_points.push((xv, yv));
        }
    }
}

/// First real node reached by repeatedly following a lateral neighbor
/// pointer from a virtual node.
fn first_real(
    graph: &LayoutGraph,
    from: NodeId,
    step: impl Fn(NodeId) -> Option<NodeId>,
) -> Option<NodeId> {
    let mut current = step(from);
    while let Some(id) = current {
        if graph.node(id).is_real() {
            return Some(id);
        }
        current = step(id);
    }
    None
}

/// Distribute the anchors of hierarchical links along the borders of each
/// real node: children attach across the bottom edge, parents across the
/// top edge, both in level-index order so the stubs do not cross.
fn fan_out_anchors(graph: &LayoutGraph, diagram: &mut Diagram) {
    for node in &graph.nodes {
        if !node.is_real() {
            continue;
        }
        let (x, y) = (node.x, node.y);
        let (width, height) = (node.width, node.height);

        let mut children = node.children.clone();
        children.sort_by_key(|&(child, _)| graph.index_of(child));
        let count = children.len();
        for (i, (_, eid)) in children.into_iter().enumerate() {
            if let Some(link) = diagram.links.get_mut(graph.edges[eid.0].link) {
                let step = width * (i + 1) as f32 / (count + 1) as f32;
                link.dest_anchor = (x + step, y + height);
            }
        }

        let mut parents = node.parents.clone();
        parents.sort_by_key(|&(parent, _)| graph.index_of(parent));
        let count = parents.len();
        for (i, (_, eid)) in parents.into_iter().enumerate() {
            if let Some(link) = diagram.links.get_mut(graph.edges[eid.0].link) {
                let step = width * (i + 1) as f32 / (count + 1) as f32;
                link.source_anchor = (x + step, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::build::build_graph;
    use super::super::leveling::assign_levels;
    use super::super::placement::place_loose_nodes;
    use super::super::virtuals::insert_virtual_nodes;
    use super::*;
    use crate::ir::{Diagram, LinkKind, ShapeKind};

    fn chain_diagram() -> Diagram {
        let mut d = Diagram::new();
        for id in ["A", "B", "C"] {
            d.ensure_shape(id, 100.0, 60.0, ShapeKind::Class);
        }
        d.add_link("B", "A", LinkKind::Inheritance);
        d.add_link("C", "B", LinkKind::Inheritance);
        d
    }

    fn prepared(d: &Diagram) -> LayoutGraph {
        let mut graph = build_graph(d);
        assign_levels(&mut graph).unwrap();
        insert_virtual_nodes(&mut graph);
        place_loose_nodes(&mut graph);
        graph
    }

    #[test]
    fn levels_stack_top_to_bottom() {
        let d = chain_diagram();
        let mut graph = prepared(&d);
        assign_coordinates(&mut graph, &LayoutConfig::default());
        let mut last_y = f32::MIN;
        for level in &graph.levels {
            let y = graph.node(level[0]).y;
            assert!(y > last_y);
            last_y = y;
        }
    }

    #[test]
    fn neighbors_never_overlap() {
        let mut d = chain_diagram();
        d.ensure_shape("D", 100.0, 60.0, ShapeKind::Class);
        d.ensure_shape("E", 100.0, 60.0, ShapeKind::Class);
        d.add_link("D", "A", LinkKind::Inheritance);
        d.add_link("E", "A", LinkKind::Inheritance);
        let mut graph = prepared(&d);
        let config = LayoutConfig::default();
        assign_coordinates(&mut graph, &config);
        for level in &graph.levels {
            for pair in level.windows(2) {
                let left = graph.node(pair[0]);
                let right = graph.node(pair[1]);
                assert!(left.x + left.width <= right.x);
            }
        }
    }

    #[test]
    fn balancing_reaches_a_fixed_point() {
        let d = chain_diagram();
        let mut graph = prepared(&d);
        let config = LayoutConfig::default();
        let status = assign_coordinates(&mut graph, &config);
        assert!(matches!(status, BalanceStatus::Converged { .. }));

        // A second full sweep over already-balanced output moves nothing.
        let before: Vec<(f32, f32)> = graph.nodes.iter().map(|n| (n.x, n.y)).collect();
        let mut moved = false;
        for level in 0..graph.levels.len() {
            for slot in 0..graph.levels[level].len() {
                let id = graph.levels[level][slot];
                if balance(&mut graph, id, &config) {
                    moved = true;
                }
            }
        }
        let after: Vec<(f32, f32)> = graph.nodes.iter().map(|n| (n.x, n.y)).collect();
        assert!(!moved);
        assert_eq!(before, after);
    }

    #[test]
    fn sweep_cap_is_honored() {
        let d = chain_diagram();
        let mut graph = prepared(&d);
        let config = LayoutConfig {
            max_balance_sweeps: 1,
            ..LayoutConfig::default()
        };
        // One sweep either converges or reports the cap; it must return.
        let status = assign_coordinates(&mut graph, &config);
        assert!(matches!(
            status,
            BalanceStatus::Converged { sweeps: 1 } | BalanceStatus::SweepLimitReached
        ));
    }

    #[test]
    fn write_back_moves_shapes_and_sets_anchors() {
        let mut d = chain_diagram();
        let mut graph = prepared(&d);
        let config = LayoutConfig::default();
        assign_coordinates(&mut graph, &config);
        write_back(&graph, &mut d);

        let a = &d.shapes["A"];
        let b = &d.shapes["B"];
        assert!(b.y > a.y);

        // The B->A inheritance anchors: source on B's top edge, destination
        // on A's bottom edge.
        let link = &d.links[0];
        assert_eq!(link.source_anchor.1, b.y);
        assert_eq!(link.dest_anchor.1, a.y + a.height);
    }

    #[test]
    fn split_edge_gets_control_points_through_its_waypoint() {
        let mut d = chain_diagram();
        d.add_link("C", "A", LinkKind::Inheritance);
        let mut graph = prepared(&d);
        let config = LayoutConfig::default();
        assign_coordinates(&mut graph, &config);
        write_back(&graph, &mut d);

        let long = &d.links[2];
        assert!(!long.control_points.is_empty());
        let edge = graph
            .edges
            .iter()
            .find(|e| !e.virtuals.is_empty())
            .unwrap();
        let vnode = graph.node(edge.virtuals[0]);
        assert!(
            long.control_points
                .iter()
                .any(|&(x, y)| x == vnode.x && y == vnode.y)
        );
    }
}
