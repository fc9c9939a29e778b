//! JSON export and import of a chart.
//!
//! The export is the node and edge arrays verbatim. Positions live on the
//! nodes, so importing an export reproduces the chart exactly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::graph::{ChartGraph, Edge, Node};

#[derive(Serialize)]
struct ChartDocumentRef<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
}

#[derive(Deserialize)]
struct ChartDocument {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Pretty-printed `{nodes, edges}` document.
pub fn export_json(graph: &ChartGraph) -> Result<String> {
    let doc = ChartDocumentRef {
        nodes: graph.nodes(),
        edges: graph.edges(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// `{nodes, edges}` as a JSON value, for embedding in other payloads.
pub fn export_value(graph: &ChartGraph) -> Result<serde_json::Value> {
    let doc = ChartDocumentRef {
        nodes: graph.nodes(),
        edges: graph.edges(),
    };
    Ok(serde_json::to_value(doc)?)
}

/// Parse an exported chart, rejecting documents that break the graph
/// invariants (repeated node ids, dangling edges).
pub fn import_json(text: &str) -> Result<ChartGraph> {
    let doc: ChartDocument = serde_json::from_str(text)?;
    debug!(
        nodes = doc.nodes.len(),
        edges = doc.edges.len(),
        "importing chart"
    );
    ChartGraph::from_parts(doc.nodes, doc.edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;
    use crate::graph::{Connection, GraphBuilder, LayoutSettings, Organization, Position};

    fn chart() -> ChartGraph {
        let orgs = vec![
            Organization::new("A", "Acme", "company", 1).with_security_contact("ciso@acme.test"),
            Organization::new("B", "Finance", "department", 2).with_parent("A"),
            Organization::new("C", "Security", "department", 2).with_parent("A"),
        ];
        let mut builder = GraphBuilder::new(LayoutSettings::default());
        builder.load_organizations(&orgs);
        builder
            .connect(Connection::new("B", "C").with_handles("right", "left"))
            .unwrap();
        builder.commit_drag("C", Position::new(12.5, -7.25)).unwrap();
        builder.graph().clone()
    }

    #[test]
    fn test_round_trip() {
        let graph = chart();
        let text = export_json(&graph).unwrap();
        let back = import_json(&text).unwrap();
        assert_eq!(back, graph);
        assert_eq!(back.node("C").unwrap().position, Position::new(12.5, -7.25));
    }

    #[test]
    fn test_document_shape() {
        let value = export_value(&chart()).unwrap();
        let nodes = value["nodes"].as_array().unwrap();
        let edges = value["edges"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(edges.len(), 3);
        assert_eq!(nodes[0]["position"]["x"], 0.0);
        assert_eq!(nodes[0]["data"]["securityContact"], "ciso@acme.test");
        assert_eq!(edges[0]["source"], "A");
        assert_eq!(edges[0]["type"], "smoothstep");
        assert_eq!(edges[2]["sourceHandle"], "right");
    }

    #[test]
    fn test_import_rejects_dangling_edge() {
        let text = r##"{"nodes":[{"id":"a","type":"organization","position":{"x":0,"y":0},
            "data":{"label":"A","type":"t","hierarchyLevel":1}}],
            "edges":[{"id":"a-b","source":"a","target":"b","type":"smoothstep",
            "style":{"stroke":"#000","strokeWidth":1}}]}"##;
        assert!(matches!(import_json(text), Err(ChartError::InvalidGraph(_))));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        assert!(matches!(import_json("{\"nodes\": 3}"), Err(ChartError::Json(_))));
    }

    #[test]
    fn test_empty_chart() {
        let text = export_json(&ChartGraph::new()).unwrap();
        assert!(import_json(&text).unwrap().is_empty());
    }
}
