//! Graph builder: the interactive editing session.
//!
//! Owns the chart being edited and turns canvas events (palette drops,
//! connection drags, drag ends, "arrange hierarchy") into checked mutations.
//! Every rejected event leaves the chart untouched and queues a notice.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::canvas::Canvas;
use super::engine::ChartGraph;
use super::layout::{relayout, LayoutSettings, RelayoutReport};
use super::types::{Connection, Edge, Node, Organization, Position};
use crate::error::{ChartError, Result};

/// Source of millisecond timestamps for synthesized ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// A transient, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// The string payload carried by a palette drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem(String);

impl PaletteItem {
    /// Serialize an organization onto the drag channel.
    pub fn from_organization(org: &Organization) -> Result<Self> {
        Ok(Self(serde_json::to_string(org)?))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Deserialize and validate the carried organization.
    pub fn organization(&self) -> Result<Organization> {
        let org: Organization =
            serde_json::from_str(&self.0).map_err(ChartError::InvalidPayload)?;
        if org.hierarchy_level == 0 {
            return Err(ChartError::Unplaceable {
                id: org.id,
                level: 0,
            });
        }
        Ok(org)
    }
}

/// An editing session over one chart.
pub struct GraphBuilder<C: Clock = SystemClock> {
    graph: ChartGraph,
    settings: LayoutSettings,
    clock: C,
    last_stamp: i64,
    notices: Vec<Notice>,
}

impl GraphBuilder<SystemClock> {
    pub fn new(settings: LayoutSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> GraphBuilder<C> {
    pub fn with_clock(settings: LayoutSettings, clock: C) -> Self {
        Self {
            graph: ChartGraph::new(),
            settings,
            clock,
            last_stamp: i64::MIN,
            notices: Vec::new(),
        }
    }

    pub fn graph(&self) -> &ChartGraph {
        &self.graph
    }

    /// Drain the queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Chart Reset ────────────────────────────────────────────

    /// Replace the chart with the view-mode transform of `organizations`.
    pub fn load_organizations(&mut self, organizations: &[Organization]) {
        self.graph = ChartGraph::transform(organizations, &self.settings);
        let skipped = organizations.len() - self.graph.nodes().len();
        if skipped > 0 {
            self.notices.push(Notice::warning(format!(
                "{} organization(s) could not be placed on the chart",
                skipped
            )));
        }
    }

    /// Replace the chart wholesale (e.g. after an import).
    pub fn reset(&mut self, graph: ChartGraph) {
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "chart reset"
        );
        self.graph = graph;
    }

    // ─── Canvas Events ──────────────────────────────────────────

    /// Handle a palette item dropped at a screen point. Returns the new node id.
    ///
    /// The same organization may be dropped any number of times; every drop
    /// gets its own `{organizationId}-{timestamp}` node.
    pub fn drop_palette_item(
        &mut self,
        item: &PaletteItem,
        screen_x: f64,
        screen_y: f64,
        canvas: &impl Canvas,
    ) -> Result<String> {
        let org = match item.organization() {
            Ok(org) => org,
            Err(e) => {
                warn!(error = %e, "ignoring palette drop");
                self.notices
                    .push(Notice::error(format!("Could not add organization: {}", e)));
                return Err(e);
            }
        };

        let position = canvas.project(screen_x, screen_y);
        // Imported or loaded nodes may already hold a `{orgId}-{stamp}` id.
        let mut id = format!("{}-{}", org.id, self.next_stamp());
        while self.graph.contains(&id) {
            id = format!("{}-{}", org.id, self.next_stamp());
        }
        self.graph
            .add_node(Node::for_organization(id.clone(), &org, position));
        debug!(node = %id, %position, "palette drop placed");
        self.notices
            .push(Notice::success(format!("Added {} to the chart", org.name)));
        Ok(id)
    }

    /// Handle a connection drawn between two handles. Returns the new edge id.
    pub fn connect(&mut self, candidate: Connection) -> Result<String> {
        if let Err(e) = self.graph.validate_connection(&candidate) {
            warn!(error = %e, "connection rejected");
            let message = match &e {
                ChartError::DuplicateConnection { .. } => {
                    "This connection already exists".to_string()
                }
                other => format!("Connection rejected: {}", other),
            };
            self.notices.push(Notice::error(message));
            return Err(e);
        }

        let id = format!(
            "edge-{}-{}-{}",
            candidate.source,
            candidate.target,
            self.next_stamp()
        );
        let mut edge = Edge::directed(id.clone(), &candidate.source, &candidate.target);
        edge.source_handle = candidate.source_handle;
        edge.target_handle = candidate.target_handle;
        self.graph.add_edge(edge)?;
        self.notices.push(Notice::success("Connection created"));
        Ok(id)
    }

    /// Commit the position a node was dragged to. Intermediate frames never
    /// reach the builder.
    pub fn commit_drag(&mut self, node_id: &str, position: Position) -> Result<()> {
        if self.graph.update_position(node_id, position) {
            debug!(node = %node_id, %position, "drag committed");
            Ok(())
        } else {
            warn!(node = %node_id, "drag end for unknown node");
            self.notices
                .push(Notice::warning(format!("Node '{}' is no longer on the chart", node_id)));
            Err(ChartError::UnknownNode(node_id.to_string()))
        }
    }

    /// Re-run the level layout over the current nodes and re-fit the canvas.
    pub fn arrange_hierarchy(&mut self, canvas: &mut impl Canvas) -> RelayoutReport {
        let report = relayout(&mut self.graph, &self.settings);
        canvas.fit_view(self.graph.nodes());
        if report.unmatched.is_empty() {
            self.notices.push(Notice::success(format!(
                "Arranged {} node(s) by hierarchy",
                report.moved
            )));
        } else {
            self.notices.push(Notice::warning(format!(
                "Arranged {} node(s); {} kept their position: {}",
                report.moved,
                report.unmatched.len(),
                report.unmatched.join(", ")
            )));
        }
        report
    }

    /// Strictly increasing millisecond stamps for this session.
    fn next_stamp(&mut self) -> i64 {
        let now = self.clock.now_millis();
        self.last_stamp = if now > self.last_stamp {
            now
        } else {
            self.last_stamp + 1
        };
        self.last_stamp
    }
}
