//! The canvas seam.
//!
//! The real rendering surface lives outside this crate; the builder only
//! needs it to project drop coordinates and to re-fit after a re-layout.
//! `Viewport` is the pan/zoom implementation used by the binaries and tests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Node, Position};

/// Width of a rendered node box, in graph units.
pub const NODE_WIDTH: f64 = 240.0;
/// Height of a rendered node box, in graph units.
pub const NODE_HEIGHT: f64 = 96.0;

/// Operations the builder delegates to the rendering surface.
pub trait Canvas {
    /// Map a screen point (e.g. a drop event) into graph coordinates.
    fn project(&self, screen_x: f64, screen_y: f64) -> Position;

    /// Re-fit the visible region around `nodes`.
    fn fit_view(&mut self, nodes: &[Node]);
}

/// Pan (`x`, `y`) and zoom (`k`) of a screen-sized viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub k: f64,
    pub width: f64,
    pub height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Padding kept around the content on fit, as a fraction of the viewport.
    pub fit_padding: f64,
}

impl Viewport {
    /// A viewport with the graph origin at the screen centre.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0,
            y: height / 2.0,
            k: 1.0,
            width,
            height,
            min_zoom: 0.1,
            max_zoom: 2.0,
            fit_padding: 0.1,
        }
    }

    pub fn set_transform(&mut self, x: f64, y: f64, k: f64) {
        self.x = x;
        self.y = y;
        self.k = k.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn graph_to_screen(&self, p: Position) -> (f64, f64) {
        (p.x * self.k + self.x, p.y * self.k + self.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl Canvas for Viewport {
    fn project(&self, screen_x: f64, screen_y: f64) -> Position {
        Position::new((screen_x - self.x) / self.k, (screen_y - self.y) / self.k)
    }

    fn fit_view(&mut self, nodes: &[Node]) {
        let Some(bounds) = Bounds::of_nodes(nodes) else {
            return;
        };
        let usable_w = self.width * (1.0 - 2.0 * self.fit_padding);
        let usable_h = self.height * (1.0 - 2.0 * self.fit_padding);
        let k = (usable_w / bounds.width())
            .min(usable_h / bounds.height())
            .clamp(self.min_zoom, self.max_zoom);
        let (cx, cy) = bounds.centre();
        self.set_transform(self.width / 2.0 - cx * k, self.height / 2.0 - cy * k, k);
        debug!(x = self.x, y = self.y, k = self.k, "viewport fitted");
    }
}

/// Axis-aligned box around rendered nodes (positions are box centres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of_nodes(nodes: &[Node]) -> Option<Self> {
        let mut iter = nodes.iter();
        let first = iter.next()?;
        let mut bounds = Self::around(first.position);
        for node in iter {
            let b = Self::around(node.position);
            bounds.min_x = bounds.min_x.min(b.min_x);
            bounds.min_y = bounds.min_y.min(b.min_y);
            bounds.max_x = bounds.max_x.max(b.max_x);
            bounds.max_y = bounds.max_y.max(b.max_y);
        }
        Some(bounds)
    }

    fn around(p: Position) -> Self {
        Self {
            min_x: p.x - NODE_WIDTH / 2.0,
            min_y: p.y - NODE_HEIGHT / 2.0,
            max_x: p.x + NODE_WIDTH / 2.0,
            max_y: p.y + NODE_HEIGHT / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn centre(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}
