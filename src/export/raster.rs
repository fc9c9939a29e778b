//! Raster snapshots of the chart.
//!
//! The chart is drawn into an SVG scene (level-bucket styles, reporting
//! lines with arrow heads, labels) and rasterized with resvg at the export
//! scale. Only one snapshot may be in flight per exporter.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ExportSettings;
use crate::error::{ChartError, Result};
use crate::graph::canvas::{Bounds, NODE_HEIGHT, NODE_WIDTH};
use crate::graph::{ChartGraph, Edge, Node};

const FONT_FAMILY: &str = "Inter, Arial, sans-serif";

// ─── Scene ──────────────────────────────────────────────────────────────────

/// Draw the chart as an SVG document sized to its content plus padding.
pub fn render_svg(graph: &ChartGraph, settings: &ExportSettings) -> Result<String> {
    let bounds = Bounds::of_nodes(graph.nodes()).ok_or(ChartError::EmptyChart)?;
    let pad = settings.padding.max(0.0);
    let min_x = bounds.min_x - pad;
    let min_y = bounds.min_y - pad;
    let width = bounds.width() + 2.0 * pad;
    let height = bounds.height() + 2.0 * pad;

    let mut svg = String::new();
    write_scene(&mut svg, graph, settings, (min_x, min_y, width, height))
        .map_err(|e| ChartError::SvgParse(e.to_string()))?;
    Ok(svg)
}

fn write_scene(
    svg: &mut String,
    graph: &ChartGraph,
    settings: &ExportSettings,
    (min_x, min_y, width, height): (f64, f64, f64, f64),
) -> std::fmt::Result {
    write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}" font-family="{font}">
  <defs>
    <marker id="arrow-end" markerWidth="8" markerHeight="8" refX="7" refY="4" orient="auto" markerUnits="strokeWidth">
      <path d="M1,1 L7,4 L1,7 z" fill="#64748b" />
    </marker>
  </defs>
  <rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{bg}" />
"##,
        x = min_x,
        y = min_y,
        w = width,
        h = height,
        font = FONT_FAMILY,
        bg = escape_xml(&settings.background),
    )?;

    for edge in graph.edges() {
        let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
        else {
            continue;
        };
        write_edge(svg, edge, source, target)?;
    }
    for node in graph.nodes() {
        write_node(svg, node)?;
    }

    svg.push_str("</svg>\n");
    Ok(())
}

/// Step-shaped path from the bottom of `source` to the top of `target`.
fn write_edge(svg: &mut String, edge: &Edge, source: &Node, target: &Node) -> std::fmt::Result {
    let sx = source.position.x;
    let sy = source.position.y + NODE_HEIGHT / 2.0;
    let tx = target.position.x;
    let ty = target.position.y - NODE_HEIGHT / 2.0;
    let mid_y = (sy + ty) / 2.0;
    let marker = if edge.marker_end.is_some() {
        r#" marker-end="url(#arrow-end)""#
    } else {
        ""
    };
    writeln!(
        svg,
        r#"  <path d="M{sx},{sy} V{mid_y} H{tx} V{ty}" fill="none" stroke="{stroke}" stroke-width="{sw}"{marker} />"#,
        stroke = escape_xml(&edge.style.stroke),
        sw = edge.style.stroke_width,
    )
}

fn write_node(svg: &mut String, node: &Node) -> std::fmt::Result {
    let style = node.bucket().style();
    let x = node.position.x - NODE_WIDTH / 2.0;
    let y = node.position.y - NODE_HEIGHT / 2.0;
    let cx = node.position.x;
    writeln!(
        svg,
        r#"  <rect x="{x}" y="{y}" width="{NODE_WIDTH}" height="{NODE_HEIGHT}" rx="8" fill="{}" stroke="{}" stroke-width="{}" />"#,
        style.fill, style.border, style.border_width,
    )?;
    writeln!(
        svg,
        r#"  <text x="{cx}" y="{}" text-anchor="middle" font-size="16" font-weight="600" fill="{}">{}</text>"#,
        node.position.y - 12.0,
        style.text,
        escape_xml(&node.data.label),
    )?;
    writeln!(
        svg,
        r#"  <text x="{cx}" y="{}" text-anchor="middle" font-size="12" fill="{}">{} · level {}</text>"#,
        node.position.y + 8.0,
        style.text,
        escape_xml(&node.data.org_type),
        node.data.hierarchy_level,
    )?;
    if let Some(contact) = &node.data.security_contact {
        writeln!(
            svg,
            r#"  <text x="{cx}" y="{}" text-anchor="middle" font-size="11" fill="{}">{}</text>"#,
            node.position.y + 28.0,
            style.text,
            escape_xml(contact),
        )?;
    }
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ─── Rasterization ──────────────────────────────────────────────────────────

/// Rasterize an SVG document at `scale` and encode it as PNG.
pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|e| ChartError::SvgParse(e.to_string()))?;

    let size = tree.size().to_int_size();
    let width = ((size.width() as f32) * scale).ceil().max(1.0) as u32;
    let height = ((size.height() as f32) * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(ChartError::PixmapAlloc { width, height })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| ChartError::PngEncode(e.to_string()))
}

/// Synchronous snapshot: scene + rasterization in one call.
pub fn render_png(graph: &ChartGraph, settings: &ExportSettings) -> Result<Vec<u8>> {
    let svg = render_svg(graph, settings)?;
    svg_to_png(&svg, settings.scale)
}

// ─── Single-flight exporter ─────────────────────────────────────────────────

/// Produces PNG snapshots, one at a time.
#[derive(Debug, Clone)]
pub struct RasterExporter {
    settings: ExportSettings,
    in_flight: Arc<AtomicBool>,
}

/// Held for the duration of one export; releases the slot on drop, including
/// when the export future is abandoned.
#[derive(Debug)]
pub struct ExportGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

impl RasterExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the export slot, or fail with `Busy` if a snapshot is running.
    pub fn begin(&self) -> Result<ExportGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChartError::Busy)?;
        Ok(ExportGuard {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Capture the chart and encode it off the calling task.
    ///
    /// The chart is only read while the scene is built, before the first
    /// await; encoding works on the captured scene.
    pub async fn export_png(&self, graph: &ChartGraph) -> Result<Vec<u8>> {
        let guard = match self.begin() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("export requested while another is in flight");
                return Err(e);
            }
        };

        let svg = render_svg(graph, &self.settings)?;
        let scale = self.settings.scale;
        debug!(bytes = svg.len(), scale, "scene captured");

        let png = tokio::task::spawn_blocking(move || svg_to_png(&svg, scale))
            .await
            .map_err(|e| ChartError::RenderTask(e.to_string()))??;

        drop(guard);
        info!(bytes = png.len(), "PNG snapshot encoded");
        Ok(png)
    }
}
