mod build;
mod coords;
mod error;
mod leveling;
mod ordering;
mod placement;
pub(crate) mod types;
mod virtuals;

pub use error::LayoutError;
pub use types::{BalanceStatus, LayoutReport};

use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::ir::Diagram;

use build::build_graph;
use coords::{assign_coordinates, write_back};
use leveling::assign_levels;
use ordering::minimize_crossings;
use placement::place_loose_nodes;
use virtuals::insert_virtual_nodes;

/// Host surface the diagram is drawn on. The engine only ever asks it to
/// repaint once the new positions are in place.
pub trait Canvas {
    fn request_redraw(&mut self);
}

/// Canvas for headless callers; ignores the redraw request.
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn request_redraw(&mut self) {}
}

/// Lay out the diagram in place: build the layout graph, assign hierarchy
/// levels, split long edges with virtual waypoints, reduce crossings,
/// attach the non-hierarchical nodes, compute coordinates, and write the
/// result back onto the shapes and links.
///
/// The diagram is untouched on error; an empty diagram is a successful
/// no-op. The whole graph is scratch state owned by this one call.
pub fn apply_layout(
    diagram: &mut Diagram,
    canvas: &mut dyn Canvas,
    config: &LayoutConfig,
) -> Result<LayoutReport, LayoutError> {
    if diagram.shapes.is_empty() {
        return Ok(LayoutReport::default());
    }

    let mut graph = build_graph(diagram);
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        hierarchy = graph.hierarchy.len(),
        "layout graph built"
    );

    if let Err(err) = assign_levels(&mut graph) {
        warn!(%err, "aborting layout");
        return Err(err);
    }
    insert_virtual_nodes(&mut graph);

    let crossings = minimize_crossings(&mut graph, config);
    debug!(crossings, "crossing minimization finished");

    place_loose_nodes(&mut graph);
    let balance = assign_coordinates(&mut graph, config);
    write_back(&graph, diagram);
    canvas.request_redraw();

    let report = LayoutReport {
        crossings,
        levels: graph.levels.len(),
        balance,
    };
    info!(
        crossings = report.crossings,
        levels = report.levels,
        converged = matches!(report.balance, BalanceStatus::Converged { .. }),
        "layout applied"
    );
    Ok(report)
}
