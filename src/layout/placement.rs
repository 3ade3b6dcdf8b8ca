use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{LayoutGraph, NodeId};

/// Insert every node left out of the hierarchy into some level, most
/// connected first, each at the level and index that disturb the drawing
/// least. A diagram with no hierarchy at all gets a single fresh level.
pub(super) fn place_loose_nodes(graph: &mut LayoutGraph) {
    let mut placed: HashSet<NodeId> = graph.hierarchy.iter().copied().collect();
    let mut pending: Vec<NodeId> = graph.loose.clone();

    if graph.levels.is_empty() && !pending.is_empty() {
        graph.levels.push(Vec::new());
    }

    // Count per pending node its links into the already-placed set.
    let mut placed_links: HashMap<NodeId, usize> = pending
        .iter()
        .map(|&id| {
            let count = graph
                .node(id)
                .neighbors
                .iter()
                .filter(|(n, _)| placed.contains(n))
                .count();
            (id, count)
        })
        .collect();

    while !pending.is_empty() {
        // Most connections first; ties keep discovery order.
        let mut best = 0;
        for i in 1..pending.len() {
            if placed_links[&pending[i]] > placed_links[&pending[best]] {
                best = i;
            }
        }
        let id = pending.remove(best);

        let (level, index) = match best_position(graph, id, &placed) {
            Some(spot) => spot,
            None => {
                let level = least_filled_level(graph);
                (level, graph.levels[level].len())
            }
        };
        debug!(node = id.0, level, index, "placing loose node");

        graph.levels[level].insert(index, id);
        graph.node_mut(id).level = Some(level);
        graph.reindex_level(level);

        placed.insert(id);
        for i in 0..graph.node(id).neighbors.len() {
            let neighbor = graph.node(id).neighbors[i].0;
            if let Some(count) = placed_links.get_mut(&neighbor) {
                *count += 1;
            }
        }
    }
}

/// Best level and index for one loose node: the placed-neighbor level
/// closest to the average placed-neighbor level (ties go to the emptier
/// level), at the median index of the neighbors found there. `None` when
/// no neighbor is placed yet.
fn best_position(graph: &LayoutGraph, id: NodeId, placed: &HashSet<NodeId>) -> Option<(usize, usize)> {
    let neighbors: Vec<NodeId> = graph
        .node(id)
        .neighbors
        .iter()
        .map(|&(n, _)| n)
        .filter(|n| placed.contains(n))
        .collect();
    if neighbors.is_empty() {
        return None;
    }

    let average: f32 = neighbors
        .iter()
        .map(|&n| graph.node(n).level.unwrap_or(0) as f32)
        .sum::<f32>()
        / neighbors.len() as f32;

    let mut best_level = graph.node(neighbors[0]).level.unwrap_or(0);
    let mut level_nodes: Vec<NodeId> = Vec::new();
    for &neighbor in &neighbors {
        let level = graph.node(neighbor).level.unwrap_or(0);
        if level == best_level {
            level_nodes.push(neighbor);
        } else {
            let closer = (level as f32 - average).abs() < (best_level as f32 - average).abs();
            let as_close_but_emptier = (level as f32 - average).abs()
                == (best_level as f32 - average).abs()
                && graph.levels[level].len() < graph.levels[best_level].len();
            if closer || as_close_but_emptier {
                best_level = level;
                level_nodes = vec![neighbor];
            }
        }
    }

    let median = level_nodes[level_nodes.len() / 2];
    Some((best_level, graph.index_of(median)))
}

fn least_filled_level(graph: &LayoutGraph) -> usize {
    let mut best = 0;
    for (level, nodes) in graph.levels.iter().enumerate() {
        if nodes.len() < graph.levels[best].len() {
            best = level;
        }
    }
    best
}
