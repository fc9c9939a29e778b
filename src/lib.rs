//! # orgchart
//!
//! Organizational hierarchy charts: turn an ordered list of organizations
//! into a positioned node/edge graph, edit it interactively, export it.
//!
//! ## Key Features
//!
//! - **Level layout**: one centred row per hierarchy level, snapped to a grid
//! - **Interactive building**: palette drops, validated connections, drag ends
//! - **Export**: round-trippable JSON and 2x PNG snapshots
//! - **Session server**: JSON-RPC over stdio for a canvas front end
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orgchart::{export_json, ChartGraph, LayoutSettings, Organization};
//!
//! let orgs = vec![
//!     Organization::new("acme", "Acme Corp", "company", 1),
//!     Organization::new("sec", "Security", "department", 2).with_parent("acme"),
//! ];
//! let graph = ChartGraph::transform(&orgs, &LayoutSettings::default());
//! let json = export_json(&graph).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod registry;
pub mod session;

// Re-exports for convenience
pub use error::{ChartError, ErrorKind, Result};

// Graph re-exports
pub use graph::{
    ChartGraph, Connection, Edge, GraphBuilder, GraphStats, LayoutSettings, Node, Notice,
    NoticeKind, Organization, PaletteItem, Position, Viewport,
};

// Export
pub use export::{export_json, import_json, render_png, RasterExporter};
