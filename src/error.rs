//! Error types for the org chart engine.
//!
//! Every failure belongs to one of three recoverable families (data,
//! validation, export) plus plain infrastructure errors. The families are
//! recovered at the boundary of the operation that detected them; nothing
//! here is meant to bring a session down.

use thiserror::Error;

/// Coarse classification used for notices and JSON-RPC error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An organization or payload could not be turned into a node.
    Data,
    /// A mutation would break a graph invariant.
    Validation,
    /// A snapshot could not be produced.
    Export,
    /// I/O, parsing or configuration failure outside the model.
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum ChartError {
    // ─── Data ───────────────────────────────────────────────────
    #[error("invalid palette payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("organization '{id}' has no placeable hierarchy level ({level})")]
    Unplaceable { id: String, level: u32 },

    #[error("duplicate organization id '{0}'")]
    DuplicateNodeId(String),

    #[error("parent '{parent}' of '{child}' is not on the chart")]
    MissingParent { parent: String, child: String },

    // ─── Validation ─────────────────────────────────────────────
    #[error("connection between '{source_id}' and '{target_id}' already exists")]
    DuplicateConnection { source_id: String, target_id: String },

    #[error("node '{0}' does not exist")]
    UnknownNode(String),

    #[error("node '{0}' cannot be connected to itself")]
    SelfConnection(String),

    #[error("invalid chart: {0}")]
    InvalidGraph(String),

    // ─── Export ─────────────────────────────────────────────────
    #[error("an export is already in progress")]
    Busy,

    #[error("chart has no nodes to render")]
    EmptyChart,

    #[error("failed to parse rendered SVG: {0}")]
    SvgParse(String),

    #[error("failed to allocate {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    PngEncode(String),

    #[error("render task failed: {0}")]
    RenderTask(String),

    // ─── Infrastructure ─────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl ChartError {
    /// Which recovery family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChartError::InvalidPayload(_)
            | ChartError::Unplaceable { .. }
            | ChartError::DuplicateNodeId(_)
            | ChartError::MissingParent { .. } => ErrorKind::Data,
            ChartError::DuplicateConnection { .. }
            | ChartError::UnknownNode(_)
            | ChartError::SelfConnection(_)
            | ChartError::InvalidGraph(_) => ErrorKind::Validation,
            ChartError::Busy
            | ChartError::EmptyChart
            | ChartError::SvgParse(_)
            | ChartError::PixmapAlloc { .. }
            | ChartError::PngEncode(_)
            | ChartError::RenderTask(_) => ErrorKind::Export,
            ChartError::Io(_) | ChartError::Json(_) | ChartError::Yaml(_) | ChartError::Config(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = ChartError::DuplicateConnection {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "connection between 'a' and 'b' already exists"
        );

        let payload = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ChartError::InvalidPayload(payload).kind(), ErrorKind::Data);
        assert_eq!(ChartError::Busy.kind(), ErrorKind::Export);
        assert_eq!(
            ChartError::Config("bad".to_string()).kind(),
            ErrorKind::Infrastructure
        );
    }
}
