use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spacing constants and iteration bounds for the layout engine.
///
/// The defaults reproduce the classic spacing of layered UML drawings:
/// 80px between neighbors on a level, 40px between levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// X coordinate the leftmost node of every level starts at.
    pub left_margin: f32,
    /// Y coordinate of the topmost level.
    pub top_margin: f32,
    /// Minimum horizontal gap between two nodes on the same level.
    pub node_spacing: f32,
    /// Vertical gap between the bottom of one level and the top of the next.
    pub rank_spacing: f32,
    /// Maximum number of full barycenter passes (one downward + one upward).
    pub order_passes: usize,
    /// Horizontal travel below which a balancing move does not count as
    /// movement, so the sweep loop can reach a fixed point.
    pub balance_epsilon: f32,
    /// Hard cap on balancing sweeps; the loop is not guaranteed to converge
    /// on every input, so the cap turns a hang into a best-effort result.
    pub max_balance_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left_margin: 20.0,
            top_margin: 20.0,
            node_spacing: 80.0,
            rank_spacing: 40.0,
            order_passes: 20,
            balance_epsilon: 3.0,
            max_balance_sweeps: 1000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    left_margin: Option<f32>,
    top_margin: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    order_passes: Option<usize>,
    balance_epsilon: Option<f32>,
    max_balance_sweeps: Option<usize>,
}

/// Load a config overlay from a JSON file; absent keys keep their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.left_margin {
        config.left_margin = v;
    }
    if let Some(v) = parsed.top_margin {
        config.top_margin = v;
    }
    if let Some(v) = parsed.node_spacing {
        config.node_spacing = v;
    }
    if let Some(v) = parsed.rank_spacing {
        config.rank_spacing = v;
    }
    if let Some(v) = parsed.order_passes {
        config.order_passes = v;
    }
    if let Some(v) = parsed.balance_epsilon {
        config.balance_epsilon = v;
    }
    if let Some(v) = parsed.max_balance_sweeps {
        config.max_balance_sweeps = v.max(1);
    }

    Ok(config)
}
