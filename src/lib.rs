pub mod config;
pub mod ir;
pub mod layout;

pub use config::{LayoutConfig, load_config};
pub use ir::{Diagram, Link, LinkKind, Shape, ShapeKind};
pub use layout::{BalanceStatus, Canvas, LayoutError, LayoutReport, NullCanvas, apply_layout};
