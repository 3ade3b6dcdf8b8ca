use std::collections::HashMap;

use super::error::LayoutError;
use super::types::{LayoutGraph, NodeId};

/// Assign every hierarchy node to a level by repeated peeling: nodes whose
/// parents are all already leveled form the next level. Parents always end
/// up strictly above their children; level 0 holds the topmost ancestors.
///
/// Fails without touching any node when the hierarchical links contain a
/// cycle, since no iteration can select a node then.
pub(super) fn assign_levels(graph: &mut LayoutGraph) -> Result<(), LayoutError> {
    let nodes = &graph.hierarchy;
    let count = nodes.len();
    if count == 0 {
        return Ok(());
    }

    let pos: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    // matrix[child][parent] marks a hierarchical relation; the per-row sum
    // is the number of parents not yet assigned to a level.
    let mut matrix = vec![vec![false; count]; count];
    for (child_pos, &id) in nodes.iter().enumerate() {
        for &(parent, _) in &graph.node(id).parents {
            if let Some(&parent_pos) = pos.get(&parent) {
                matrix[child_pos][parent_pos] = true;
            }
        }
    }
    let mut unresolved: Vec<usize> = matrix
        .iter()
        .map(|row| row.iter().filter(|&&set| set).count())
        .collect();

    let mut remaining: Vec<usize> = (0..count).collect();
    let mut levels: Vec<Vec<NodeId>> = Vec::new();

    while !remaining.is_empty() {
        let (selected, rest): (Vec<usize>, Vec<usize>) =
            remaining.iter().copied().partition(|&i| unresolved[i] == 0);
        if selected.is_empty() {
            return Err(LayoutError::CycleDetected);
        }

        for &i in &selected {
            for &j in &rest {
                if matrix[j][i] {
                    unresolved[j] -= 1;
                }
            }
        }
        levels.push(selected.iter().map(|&i| nodes[i]).collect());
        remaining = rest;
    }

    // Only now, with peeling complete, touch the nodes.
    graph.levels = levels;
    for l in 0..graph.levels.len() {
        for i in 0..graph.levels[l].len() {
            let id = graph.levels[l][i];
            let node = graph.node_mut(id);
            node.level = Some(l);
            node.index = Some(i);
        }
    }

    Ok(())
}
