//! Core types for the org chart graph.
//!
//! Defines the organization input record, the positioned nodes and
//! directed edges emitted for the canvas, and the level-bucket style table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node type tag understood by the canvas.
pub const ORGANIZATION_NODE_TYPE: &str = "organization";
/// Edge type tag understood by the canvas.
pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

/// An organization record as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// 1 is the root level. A missing level reads as 0, which no row accepts.
    #[serde(default)]
    pub hierarchy_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_contact: Option<String>,
}

impl Organization {
    pub fn new(id: &str, name: &str, org_type: &str, hierarchy_level: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            org_type: org_type.to_string(),
            parent_id: None,
            hierarchy_level,
            security_contact: None,
        }
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_security_contact(mut self, contact: &str) -> Self {
        self.security_contact = Some(contact.to_string());
        self
    }

    /// Rebuild the organization a node was created from.
    ///
    /// Node data does not carry the parent link, so the result is only
    /// good for placement (id, level, labels).
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.data.label.clone(),
            org_type: node.data.org_type.clone(),
            parent_id: None,
            hierarchy_level: node.data.hierarchy_level,
            security_contact: node.data.security_contact.clone(),
        }
    }
}

/// A point in graph (canvas) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Payload carried by a node, copied from its organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub hierarchy_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_contact: Option<String>,
}

impl From<&Organization> for NodeData {
    fn from(org: &Organization) -> Self {
        Self {
            label: org.name.clone(),
            org_type: org.org_type.clone(),
            hierarchy_level: org.hierarchy_level,
            security_contact: org.security_contact.clone(),
        }
    }
}

/// A positioned visual unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    /// Build a node for `org` under an explicit id.
    pub fn for_organization(id: String, org: &Organization, position: Position) -> Self {
        Self {
            id,
            node_type: ORGANIZATION_NODE_TYPE.to_string(),
            position,
            data: NodeData::from(org),
        }
    }

    pub fn bucket(&self) -> LevelBucket {
        LevelBucket::from_level(self.data.hierarchy_level)
    }
}

/// Stroke settings applied to an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: "#64748b".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Arrow head drawn at an edge end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub marker_type: String,
}

impl EdgeMarker {
    pub fn arrow_closed() -> Self {
        Self {
            marker_type: "arrowclosed".to_string(),
        }
    }
}

/// A directed parent -> child link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub style: EdgeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
}

impl Edge {
    /// Directed edge with the default style and an arrow marker.
    pub fn directed(id: String, source: &str, target: &str) -> Self {
        Self {
            id,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
            style: EdgeStyle::default(),
            marker_end: Some(EdgeMarker::arrow_closed()),
        }
    }

    /// The connection this edge realizes, for duplicate checks.
    pub fn connection(&self) -> Connection {
        Connection {
            source: self.source.clone(),
            target: self.target.clone(),
            source_handle: self.source_handle.clone(),
            target_handle: self.target_handle.clone(),
        }
    }
}

/// A connection candidate drawn from an output handle to an input handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source_handle: &str, target_handle: &str) -> Self {
        self.source_handle = Some(source_handle.to_string());
        self.target_handle = Some(target_handle.to_string());
        self
    }

    /// True when `other` links the same pair through the same handles,
    /// either as drawn or reversed with the handles swapped.
    pub fn duplicates(&self, other: &Connection) -> bool {
        let same = self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle;
        let reversed = self.source == other.target
            && self.target == other.source
            && self.source_handle == other.target_handle
            && self.target_handle == other.source_handle;
        same || reversed
    }
}

// ─── Level Styling ──────────────────────────────────────────────────────────

/// Styling bucket for a hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelBucket {
    /// Level 1.
    Root,
    /// Level 2.
    Division,
    /// Everything deeper.
    Unit,
}

impl LevelBucket {
    pub fn from_level(level: u32) -> Self {
        match level {
            1 => LevelBucket::Root,
            2 => LevelBucket::Division,
            _ => LevelBucket::Unit,
        }
    }

    pub fn style(self) -> &'static NodeStyle {
        &LEVEL_STYLES[self as usize]
    }
}

impl fmt::Display for LevelBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelBucket::Root => write!(f, "root"),
            LevelBucket::Division => write!(f, "division"),
            LevelBucket::Unit => write!(f, "unit"),
        }
    }
}

/// Visual style of a node box.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub border_width: f64,
}

/// Indexed by `LevelBucket as usize`.
static LEVEL_STYLES: [NodeStyle; 3] = [
    NodeStyle {
        fill: "#1e3a8a",
        border: "#1e40af",
        text: "#ffffff",
        border_width: 3.0,
    },
    NodeStyle {
        fill: "#dbeafe",
        border: "#3b82f6",
        text: "#1e3a8a",
        border_width: 2.0,
    },
    NodeStyle {
        fill: "#ffffff",
        border: "#94a3b8",
        text: "#334155",
        border_width: 1.0,
    },
];
