//! Org chart graph module: the structural backbone of the crate.
//!
//! Provides the node/edge model, the level layout, the canvas seam and
//! the interactive builder session.

pub mod builder;
pub mod canvas;
pub mod engine;
pub mod layout;
pub mod types;

pub use builder::{Clock, GraphBuilder, Notice, NoticeKind, PaletteItem, SystemClock};
pub use canvas::{Bounds, Canvas, Viewport};
pub use engine::{ChartGraph, GraphStats};
pub use layout::{compute_positions, relayout, snap_to_grid, LayoutSettings, RelayoutReport};
pub use types::{
    Connection, Edge, EdgeMarker, EdgeStyle, LevelBucket, Node, NodeData, NodeStyle,
    Organization, Position,
};
