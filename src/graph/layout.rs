//! Level-based grid layout.
//!
//! Organizations on the same hierarchy level form one horizontal row centred
//! on x = 0; rows stack downwards by level. Every coordinate is snapped to
//! the grid. The computation is a pure function of its ordered input.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::engine::ChartGraph;
use super::types::{Organization, Position};
use crate::error::{ChartError, Result};

pub const VERTICAL_SPACING: f64 = 300.0;
pub const HORIZONTAL_SPACING: f64 = 400.0;
pub const GRID_SIZE: f64 = 20.0;

/// Spacing constants shared by the initial layout and every re-layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub vertical_spacing: f64,
    pub horizontal_spacing: f64,
    pub grid_size: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            vertical_spacing: VERTICAL_SPACING,
            horizontal_spacing: HORIZONTAL_SPACING,
            grid_size: GRID_SIZE,
        }
    }
}

impl LayoutSettings {
    /// Reject spacings that would collapse or invert the grid.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("vertical_spacing", self.vertical_spacing),
            ("horizontal_spacing", self.horizontal_spacing),
            ("grid_size", self.grid_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::Config(format!(
                    "layout.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Round `value` to the nearest multiple of `grid`.
///
/// Halves round away from zero, so mirrored inputs snap to mirrored outputs.
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    let snapped = (value / grid).round() * grid;
    // Avoid emitting -0.0 for the centre column.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Compute positions for `organizations`, keyed by organization id.
///
/// Organizations without a usable level (0) cannot join any row; they are
/// logged and left out of the map.
pub fn compute_positions(
    organizations: &[Organization],
    settings: &LayoutSettings,
) -> HashMap<String, Position> {
    let mut rows: BTreeMap<u32, Vec<&Organization>> = BTreeMap::new();
    for org in organizations {
        if org.hierarchy_level == 0 {
            warn!(organization = %org.id, "no hierarchy level, skipping placement");
            continue;
        }
        rows.entry(org.hierarchy_level).or_default().push(org);
    }

    let mut positions = HashMap::with_capacity(organizations.len());
    for (&level, row) in &rows {
        let y = snap_to_grid(
            f64::from(level - 1) * settings.vertical_spacing,
            settings.grid_size,
        );
        let row_width = row.len() as f64 * settings.horizontal_spacing;
        let start_x = snap_to_grid(
            -(row_width - settings.horizontal_spacing) / 2.0,
            settings.grid_size,
        );
        for (i, org) in row.iter().enumerate() {
            let x = snap_to_grid(
                start_x + i as f64 * settings.horizontal_spacing,
                settings.grid_size,
            );
            positions.insert(org.id.clone(), Position::new(x, y));
        }
        debug!(level, count = row.len(), y, "laid out row");
    }

    positions
}

/// Outcome of a re-layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayoutReport {
    /// Nodes whose position was overwritten.
    pub moved: usize,
    /// Nodes that kept their previous position.
    pub unmatched: Vec<String>,
}

/// Recompute every node position from the data the nodes carry.
///
/// Only positions change; node and edge identity is untouched. Nodes the
/// layout cannot place keep where they are.
pub fn relayout(graph: &mut ChartGraph, settings: &LayoutSettings) -> RelayoutReport {
    let organizations: Vec<Organization> =
        graph.nodes().iter().map(Organization::from_node).collect();
    let positions = compute_positions(&organizations, settings);

    let unmatched = graph.set_positions(&positions);
    for id in &unmatched {
        warn!(node = %id, "re-layout could not place node, keeping current position");
    }

    RelayoutReport {
        moved: graph.nodes().len() - unmatched.len(),
        unmatched,
    }
}
