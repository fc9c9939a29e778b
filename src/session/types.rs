//! Session protocol types: JSON-RPC 2.0 message structures and method params.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartError, ErrorKind};
use crate::graph::{Notice, Organization};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_PARAMS: i64 = -32602;
pub const METHOD_NOT_FOUND: i64 = -32601;

// ─── JSON-RPC 2.0 Base Types ────────────────────────────────────

/// An incoming JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }
}

// ─── Session Results ────────────────────────────────────────────

/// Server identity returned by `initialize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub server_info: ServerInfo,
    pub methods: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// A recovered failure, reported inside a successful response.
#[derive(Debug, Serialize)]
pub struct FailureInfo {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ChartError> for FailureInfo {
    fn from(err: &ChartError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Data => "data",
            ErrorKind::Validation => "validation",
            ErrorKind::Export => "export",
            ErrorKind::Infrastructure => "infrastructure",
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Envelope for every session method result.
#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureInfo>,
    pub notices: Vec<Notice>,
}

// ─── Method Params ──────────────────────────────────────────────

/// `chart/load`: inline organizations or a file to read them from.
#[derive(Debug, Deserialize)]
pub struct LoadParams {
    #[serde(default)]
    pub organizations: Option<Vec<Organization>>,
    #[serde(default)]
    pub path: Option<String>,
}

/// `chart/import`: an exported document, inline or on disk.
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub document: Option<Value>,
    #[serde(default)]
    pub path: Option<String>,
}

/// `chart/export_json`: optionally also write the artifact.
#[derive(Debug, Default, Deserialize)]
pub struct ExportJsonParams {
    #[serde(default)]
    pub write: bool,
}

/// `palette/drop`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropParams {
    pub payload: String,
    pub screen_x: f64,
    pub screen_y: f64,
}

/// `node/drag_end`.
#[derive(Debug, Deserialize)]
pub struct DragEndParams {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// `viewport/set`.
#[derive(Debug, Deserialize)]
pub struct ViewportParams {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}
