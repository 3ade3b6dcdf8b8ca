use tracing::debug;

use crate::config::LayoutConfig;

use super::types::{EdgeId, LayoutGraph, NodeId};

/// Reorder nodes within each level to cut hierarchical edge crossings,
/// using bounded alternating barycenter passes. Every individual
/// reordering is rolled back when it would increase the total crossing
/// count, so the count never gets worse than the input order.
///
/// Returns the crossing count of the final order.
pub(super) fn minimize_crossings(graph: &mut LayoutGraph, config: &LayoutConfig) -> usize {
    let level_count = graph.levels.len();
    if level_count > 1 {
        let mut moved = true;
        let mut shift_on_upward = false;
        let mut passes_left = config.order_passes;

        while moved && passes_left > 0 {
            moved = false;

            // Downward: reorder each level by the positions of its parents.
            for i in 1..level_count {
                let before = graph.levels[i].clone();
                down_barycenters(graph, i - 1);
                if i + 1 < level_count {
                    up_barycenters(graph, i + 1);
                }
                up_barycenters(graph, i);
                sort_by_barycenter(graph, i);
                if !shift_on_upward && total_crossings(graph) > 0 {
                    shift_equal_barycenters(graph, i);
                } else {
                    resort_equal_barycenters(graph, i);
                }
                if before != graph.levels[i] {
                    moved = true;
                }
            }

            // Upward: symmetric, driven by child positions.
            for i in (0..level_count - 1).rev() {
                let before = graph.levels[i].clone();
                if i > 0 {
                    down_barycenters(graph, i - 1);
                }
                up_barycenters(graph, i + 1);
                down_barycenters(graph, i);
                sort_by_barycenter(graph, i);
                if shift_on_upward && total_crossings(graph) > 0 {
                    shift_equal_barycenters(graph, i);
                } else {
                    resort_equal_barycenters(graph, i);
                }
                if before != graph.levels[i] {
                    moved = true;
                }
            }

            passes_left -= 1;
            shift_on_upward = !shift_on_upward;
            debug!(
                pass = config.order_passes - passes_left,
                crossings = total_crossings(graph),
                moved,
                "barycenter pass finished"
            );
        }
    }

    total_crossings(graph)
}

/// Total crossing count over all adjacent level pairs.
pub(super) fn total_crossings(graph: &LayoutGraph) -> usize {
    if graph.levels.is_empty() {
        return 0;
    }
    (0..graph.levels.len() - 1)
        .map(|upper| crossings_below(graph, upper))
        .sum()
}

/// Crossings between level `upper` and the level below it: for every pair
/// of upper nodes in left-to-right order, one crossing per pair of their
/// children whose indices invert.
fn crossings_below(graph: &LayoutGraph, upper: usize) -> usize {
    let nodes = &graph.levels[upper];
    let mut count = 0;
    for left in 0..nodes.len().saturating_sub(1) {
        for &(child_l, _) in &graph.node(nodes[left]).children {
            for &right_node in &nodes[left + 1..] {
                for &(child_r, _) in &graph.node(right_node).children {
                    if graph.index_of(child_l) > graph.index_of(child_r) {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

/// Average index of the related nodes, or `None` for an empty relation
/// list (such a node keeps its slot when sorting).
fn average_index(graph: &LayoutGraph, relations: &[(NodeId, EdgeId)]) -> Option<f32> {
    if relations.is_empty() {
        return None;
    }
    let sum: f32 = relations
        .iter()
        .map(|&(node, _)| graph.index_of(node) as f32)
        .sum();
    Some(sum / relations.len() as f32)
}

fn up_barycenters(graph: &mut LayoutGraph, level: usize) {
    for i in 0..graph.levels[level].len() {
        let id = graph.levels[level][i];
        let value = average_index(graph, &graph.node(id).parents);
        graph.node_mut(id).barycenter = value;
    }
}

fn down_barycenters(graph: &mut LayoutGraph, level: usize) {
    for i in 0..graph.levels[level].len() {
        let id = graph.levels[level][i];
        let value = average_index(graph, &graph.node(id).children);
        graph.node_mut(id).barycenter = value;
    }
}

/// Average of the parents' and children's current barycenter values;
/// neighbors without a value are left out of the average.
fn combined_barycenters(graph: &mut LayoutGraph, level: usize) {
    for i in 0..graph.levels[level].len() {
        let id = graph.levels[level][i];
        let node = graph.node(id);
        let values: Vec<f32> = node
            .parents
            .iter()
            .chain(node.children.iter())
            .filter_map(|&(neighbor, _)| graph.node(neighbor).barycenter)
            .collect();
        let value = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f32>() / values.len() as f32)
        };
        graph.node_mut(id).barycenter = value;
    }
}

/// Stable sort of the barycenter-carrying nodes of a level, placed back
/// into the slots they occupied so valueless nodes keep their position.
/// Rolled back when the total crossing count got worse.
fn sort_by_barycenter(graph: &mut LayoutGraph, level: usize) {
    let before = graph.levels[level].clone();
    let crossings_before = total_crossings(graph);

    let slots: Vec<usize> = before
        .iter()
        .enumerate()
        .filter(|&(_, &id)| graph.node(id).barycenter.is_some())
        .map(|(slot, _)| slot)
        .collect();
    let mut sortable: Vec<NodeId> = slots.iter().map(|&slot| before[slot]).collect();
    sortable.sort_by(|&a, &b| {
        let a = graph.node(a).barycenter.unwrap_or(0.0);
        let b = graph.node(b).barycenter.unwrap_or(0.0);
        a.total_cmp(&b)
    });

    let mut reordered = before.clone();
    for (&slot, &id) in slots.iter().zip(sortable.iter()) {
        reordered[slot] = id;
    }
    graph.levels[level] = reordered;
    graph.reindex_level(level);

    if total_crossings(graph) > crossings_before {
        graph.levels[level] = before;
        graph.reindex_level(level);
    }
}

/// Left-circular shift inside runs of equal barycenter values, one adjacent
/// swap at a time, reverted as a whole if it created extra crossings.
fn shift_equal_barycenters(graph: &mut LayoutGraph, level: usize) {
    let before = graph.levels[level].clone();
    let crossings_before = total_crossings(graph);

    for i in 0..graph.levels[level].len().saturating_sub(1) {
        let a = graph.node(graph.levels[level][i]).barycenter;
        let b = graph.node(graph.levels[level][i + 1]).barycenter;
        if let (Some(a), Some(b)) = (a, b)
            && a == b
        {
            graph.levels[level].swap(i, i + 1);
            let left = graph.levels[level][i];
            let right = graph.levels[level][i + 1];
            graph.node_mut(left).index = Some(i);
            graph.node_mut(right).index = Some(i + 1);
        }
    }

    if total_crossings(graph) > crossings_before {
        graph.levels[level] = before;
        graph.reindex_level(level);
    }
}

/// Group consecutive nodes with the same barycenter, recompute each node's
/// combined barycenter from its neighbors' values, and stable-sort every
/// group by the recomputed key.
fn resort_equal_barycenters(graph: &mut LayoutGraph, level: usize) {
    if graph.levels[level].is_empty() {
        return;
    }
    graph.reindex_level(level);

    // Runs of equal (old) barycenter values.
    let mut groups: Vec<Vec<NodeId>> = vec![Vec::new()];
    let mut current = graph.node(graph.levels[level][0]).barycenter;
    for i in 0..graph.levels[level].len() {
        let id = graph.levels[level][i];
        let value = graph.node(id).barycenter;
        if value == current {
            if let Some(group) = groups.last_mut() {
                group.push(id);
            }
        } else {
            groups.push(vec![id]);
            current = value;
        }
    }

    combined_barycenters(graph, level);

    for group in &mut groups {
        group.sort_by(|&a, &b| {
            let a = graph.node(a).barycenter.unwrap_or(0.0);
            let b = graph.node(b).barycenter.unwrap_or(0.0);
            a.total_cmp(&b)
        });
    }

    let reordered: Vec<NodeId> = groups.into_iter().flatten().collect();
    graph.levels[level] = reordered;
    graph.reindex_level(level);
}
