//! Session commands: maps JSON-RPC methods onto the graph builder.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::*;
use crate::config::ChartConfig;
use crate::export::{export_value, import_json, render_png, write_artifact};
use crate::graph::{Canvas, Connection, GraphBuilder, PaletteItem, Position, Viewport};
use crate::registry::load_organizations;

/// Every method the session understands, as advertised by `initialize`.
pub const METHODS: &[&str] = &[
    "initialize",
    "ping",
    "chart/load",
    "chart/import",
    "chart/get",
    "chart/export_json",
    "chart/export_png",
    "palette/drop",
    "graph/connect",
    "node/drag_end",
    "graph/arrange",
    "graph/stats",
    "viewport/set",
];

/// A method call that could not even be attempted.
#[derive(Debug)]
pub struct CommandError {
    pub code: i64,
    pub message: String,
}

impl CommandError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
        }
    }
}

type CommandOutcome = std::result::Result<Value, CommandError>;

/// One editing session: the builder, the viewport it projects through,
/// and where artifacts go.
pub struct ChartSession {
    builder: GraphBuilder,
    viewport: Viewport,
    config: ChartConfig,
    root: PathBuf,
}

impl ChartSession {
    pub fn new(config: ChartConfig, root: PathBuf) -> Self {
        let viewport = Viewport::new(config.canvas.width, config.canvas.height);
        Self {
            builder: GraphBuilder::new(config.layout),
            viewport,
            config,
            root,
        }
    }

    pub fn builder(&self) -> &GraphBuilder {
        &self.builder
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Dispatch a method. `None` means the method is unknown.
    pub fn call(&mut self, method: &str, params: &Value) -> Option<CommandOutcome> {
        let outcome = match method {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "chart/load" => self.load(params),
            "chart/import" => self.import(params),
            "chart/get" => {
                let doc = export_value(self.builder.graph());
                Ok(self.finish(doc))
            }
            "chart/export_json" => self.export_json(params),
            "chart/export_png" => Ok(self.export_png()),
            "palette/drop" => self.drop_item(params),
            "graph/connect" => self.connect(params),
            "node/drag_end" => self.drag_end(params),
            "graph/arrange" => Ok(self.arrange()),
            "graph/stats" => {
                let stats = self.builder.graph().stats();
                Ok(self.finish(Ok(stats)))
            }
            "viewport/set" => self.set_viewport(params),
            _ => return None,
        };
        Some(outcome)
    }

    fn initialize(&self) -> Value {
        let result = InitializeResult {
            protocol_version: "2.0".to_string(),
            server_info: ServerInfo {
                name: "orgchart".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            methods: METHODS.to_vec(),
        };
        serde_json::to_value(result).unwrap_or_default()
    }

    fn load(&mut self, params: &Value) -> CommandOutcome {
        let params: LoadParams = parse_params(params)?;
        let orgs = match (params.organizations, params.path) {
            (Some(orgs), _) => orgs,
            (None, Some(path)) => match load_organizations(&self.resolve(&path)) {
                Ok(orgs) => orgs,
                Err(e) => return Ok(self.finish::<Value>(Err(e))),
            },
            (None, None) => {
                return Err(CommandError::invalid_params(
                    "expected `organizations` or `path`",
                ))
            }
        };
        self.builder.load_organizations(&orgs);
        self.viewport.fit_view(self.builder.graph().nodes());
        let graph = self.builder.graph();
        let data = json!({
            "nodes": graph.nodes().len(),
            "edges": graph.edges().len(),
        });
        Ok(self.finish(Ok(data)))
    }

    fn import(&mut self, params: &Value) -> CommandOutcome {
        let params: ImportParams = parse_params(params)?;
        let text = match (params.document, params.path) {
            (Some(doc), _) => doc.to_string(),
            (None, Some(path)) => match fs::read_to_string(self.resolve(&path)) {
                Ok(text) => text,
                Err(e) => return Ok(self.finish::<Value>(Err(e.into()))),
            },
            (None, None) => {
                return Err(CommandError::invalid_params("expected `document` or `path`"))
            }
        };
        let outcome = import_json(&text).map(|graph| {
            self.builder.reset(graph);
            self.viewport.fit_view(self.builder.graph().nodes());
            json!({ "nodes": self.builder.graph().nodes().len() })
        });
        Ok(self.finish(outcome))
    }

    fn export_json(&mut self, params: &Value) -> CommandOutcome {
        let params: ExportJsonParams = if params.is_null() {
            ExportJsonParams::default()
        } else {
            parse_params(params)?
        };
        let outcome = export_value(self.builder.graph()).and_then(|doc| {
            if !params.write {
                return Ok(json!({ "document": doc }));
            }
            let text = serde_json::to_string_pretty(&doc)?;
            let path = write_artifact(
                &self.config.resolve_output_dir(&self.root),
                &self.config.export.json_file_name,
                text.as_bytes(),
            )?;
            Ok(json!({ "document": doc, "path": path }))
        });
        Ok(self.finish(outcome))
    }

    fn export_png(&mut self) -> Value {
        let outcome = render_png(self.builder.graph(), &self.config.export).and_then(|png| {
            let path = write_artifact(
                &self.config.resolve_output_dir(&self.root),
                &self.config.export.png_file_name,
                &png,
            )?;
            Ok(json!({ "path": path, "bytes": png.len() }))
        });
        self.finish(outcome)
    }

    fn drop_item(&mut self, params: &Value) -> CommandOutcome {
        let params: DropParams = parse_params(params)?;
        let item = PaletteItem::from_raw(params.payload);
        let outcome = self
            .builder
            .drop_palette_item(&item, params.screen_x, params.screen_y, &self.viewport)
            .map(|id| json!({ "nodeId": id }));
        Ok(self.finish(outcome))
    }

    fn connect(&mut self, params: &Value) -> CommandOutcome {
        let candidate: Connection = parse_params(params)?;
        let outcome = self
            .builder
            .connect(candidate)
            .map(|id| json!({ "edgeId": id }));
        Ok(self.finish(outcome))
    }

    fn drag_end(&mut self, params: &Value) -> CommandOutcome {
        let params: DragEndParams = parse_params(params)?;
        let outcome = self
            .builder
            .commit_drag(&params.id, Position::new(params.x, params.y))
            .map(|()| Value::Null);
        Ok(self.finish(outcome))
    }

    fn arrange(&mut self) -> Value {
        let report = self.builder.arrange_hierarchy(&mut self.viewport);
        let data = json!({ "report": report, "viewport": self.viewport });
        self.finish(Ok(data))
    }

    fn set_viewport(&mut self, params: &Value) -> CommandOutcome {
        let params: ViewportParams = parse_params(params)?;
        if let Some(width) = params.width {
            self.viewport.width = width;
        }
        if let Some(height) = params.height {
            self.viewport.height = height;
        }
        self.viewport.set_transform(params.x, params.y, params.zoom);
        let data = json!({ "viewport": self.viewport });
        Ok(self.finish(Ok(data)))
    }

    /// Wrap an outcome with the notices the call produced.
    fn finish<T: serde::Serialize>(&mut self, outcome: crate::error::Result<T>) -> Value {
        let notices = self.builder.take_notices();
        let result = match outcome {
            Ok(data) => CommandResult {
                ok: true,
                data: serde_json::to_value(data).unwrap_or_default(),
                error: None,
                notices,
            },
            Err(e) => {
                warn!(error = %e, "command failed");
                CommandResult {
                    ok: false,
                    data: Value::Null,
                    error: Some(FailureInfo::from(&e)),
                    notices,
                }
            }
        };
        serde_json::to_value(result).unwrap_or_default()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: &Value) -> std::result::Result<T, CommandError> {
    serde_json::from_value(params.clone()).map_err(|e| {
        debug!(error = %e, "bad params");
        CommandError::invalid_params(format!("Invalid params: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Organization;

    fn session(root: &Path) -> ChartSession {
        ChartSession::new(ChartConfig::default(), root.to_path_buf())
    }

    fn orgs() -> Value {
        json!([
            {"id": "A", "name": "Acme", "type": "company", "hierarchyLevel": 1},
            {"id": "B", "name": "Finance", "type": "department", "parentId": "A", "hierarchyLevel": 2},
            {"id": "C", "name": "Security", "type": "department", "parentId": "A", "hierarchyLevel": 2}
        ])
    }

    #[test]
    fn test_unknown_method() {
        let dir = tempfile::tempdir().unwrap();
        assert!(session(dir.path()).call("graph/explode", &Value::Null).is_none());
    }

    #[test]
    fn test_load_and_connect_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());

        let loaded = s
            .call("chart/load", &json!({ "organizations": orgs() }))
            .unwrap()
            .unwrap();
        assert_eq!(loaded["ok"], true);
        assert_eq!(loaded["data"]["edges"], 2);

        let first = s
            .call("graph/connect", &json!({"source": "B", "target": "C"}))
            .unwrap()
            .unwrap();
        assert_eq!(first["ok"], true);
        assert_eq!(first["notices"][0]["kind"], "success");

        let second = s
            .call("graph/connect", &json!({"source": "B", "target": "C"}))
            .unwrap()
            .unwrap();
        assert_eq!(second["ok"], false);
        assert_eq!(second["error"]["kind"], "validation");
        assert_eq!(second["notices"][0]["kind"], "error");
        assert_eq!(s.builder().graph().edges().len(), 3);
    }

    #[test]
    fn test_drop_bad_payload_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let result = s
            .call(
                "palette/drop",
                &json!({"payload": "nope", "screenX": 1.0, "screenY": 2.0}),
            )
            .unwrap()
            .unwrap();
        assert_eq!(result["ok"], false);
        assert_eq!(result["error"]["kind"], "data");
        assert!(s.builder().graph().is_empty());
    }

    #[test]
    fn test_drop_projects_through_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        s.call("viewport/set", &json!({"x": 100.0, "y": 50.0, "zoom": 2.0}))
            .unwrap()
            .unwrap();
        let payload = serde_json::to_string(&Organization::new("X", "X", "team", 3)).unwrap();
        let result = s
            .call(
                "palette/drop",
                &json!({"payload": payload, "screenX": 300.0, "screenY": 250.0}),
            )
            .unwrap()
            .unwrap();
        let id = result["data"]["nodeId"].as_str().unwrap();
        assert!(id.starts_with("X-"));
        let node = s.builder().graph().node(id).unwrap();
        assert_eq!(node.position, Position::new(100.0, 100.0));
    }

    #[test]
    fn test_missing_params_is_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let err = s.call("node/drag_end", &json!({"id": "A"})).unwrap().unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS);
        let err = s.call("chart/load", &json!({})).unwrap().unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS);
    }

    #[test]
    fn test_export_and_import_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        s.call("chart/load", &json!({ "organizations": orgs() }))
            .unwrap()
            .unwrap();
        s.call("node/drag_end", &json!({"id": "B", "x": 10.0, "y": 20.0}))
            .unwrap()
            .unwrap();

        let exported = s
            .call("chart/export_json", &json!({"write": true}))
            .unwrap()
            .unwrap();
        assert_eq!(exported["ok"], true);
        let json_path = dir.path().join("organizational-chart.json");
        assert!(json_path.exists());

        let png = s.call("chart/export_png", &Value::Null).unwrap().unwrap();
        assert_eq!(png["ok"], true);
        assert!(dir.path().join("organizational-chart.png").exists());

        let mut other = session(dir.path());
        let imported = other
            .call("chart/import", &json!({"path": "organizational-chart.json"}))
            .unwrap()
            .unwrap();
        assert_eq!(imported["ok"], true);
        assert_eq!(other.builder().graph(), s.builder().graph());
    }

    #[test]
    fn test_export_png_of_empty_chart_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let result = s.call("chart/export_png", &Value::Null).unwrap().unwrap();
        assert_eq!(result["ok"], false);
        assert_eq!(result["error"]["kind"], "export");
    }

    #[test]
    fn test_arrange_returns_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        s.call("chart/load", &json!({ "organizations": orgs() }))
            .unwrap()
            .unwrap();
        let result = s.call("graph/arrange", &Value::Null).unwrap().unwrap();
        assert_eq!(result["data"]["report"]["moved"], 3);
        assert!(result["data"]["viewport"]["k"].as_f64().is_some());
    }
}
