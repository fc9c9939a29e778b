//! CLI module for orgchart.
//!
//! Commands:
//! - Build: layout, relayout
//! - Export: render
//! - Inspect: stats

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ChartConfig;
use crate::error::Result;
use crate::export::import_json;
use crate::graph::{ChartGraph, LayoutSettings};
use crate::registry::{parse_organizations, ListFormat};

#[derive(Parser)]
#[command(name = "orgchart")]
#[command(about = "Organizational hierarchy charts")]
#[command(override_help = HELP_TEXT)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/.orgchart/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

const HELP_TEXT: &str = "
orgchart - organizational hierarchy charts

Build:
  layout <orgs>         Lay out an organization list, write chart JSON
  relayout <chart>      Re-arrange an exported chart by hierarchy level

Export:
  render <input>        PNG snapshot of an organization list or chart

Inspect:
  stats <input>         Node, edge and level statistics

Options:
  -r, --root <PATH>     Project root (default: .)
  -c, --config <FILE>   Config file (default: .orgchart/config.toml)
  -o, --output <FILE>   Output file (per command)
";

#[derive(Subcommand)]
pub enum Commands {
    // ─── Build ──────────────────────────────────────────────────────
    /// Lay out an organization list (JSON or YAML) and write chart JSON
    Layout {
        /// Organization list file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-arrange an exported chart by hierarchy level
    Relayout {
        /// Chart JSON file
        input: PathBuf,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    // ─── Export ─────────────────────────────────────────────────────
    /// Render a PNG snapshot
    Render {
        /// Organization list or chart JSON
        input: PathBuf,

        /// Output file (default: configured png file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Device scale (overrides config)
        #[arg(short, long)]
        scale: Option<f32>,
    },

    // ─── Inspect ────────────────────────────────────────────────────
    /// Show chart statistics
    Stats {
        /// Organization list or chart JSON
        input: PathBuf,
    },
}

impl Cli {
    /// Config location: explicit flag, else the default under the root.
    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => ChartConfig::default_path(&self.root),
        }
    }
}

// ─── Input ──────────────────────────────────────────────────────

/// Whether a file holds an exported chart rather than an organization list.
///
/// Chart documents are JSON objects with a `nodes` array; organization lists
/// are arrays (JSON) or sequences (YAML).
pub fn is_chart_document(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|v| v.get("nodes").map_or(false, |n| n.is_array()))
        .unwrap_or(false)
}

/// Load either input form into a chart.
pub fn load_chart(path: &Path, settings: &LayoutSettings) -> Result<ChartGraph> {
    let text = fs::read_to_string(path)?;
    if is_chart_document(&text) {
        debug!(path = %path.display(), "reading chart document");
        import_json(&text)
    } else {
        debug!(path = %path.display(), "reading organization list");
        let orgs = parse_organizations(&text, ListFormat::from_path(path))?;
        Ok(ChartGraph::transform(&orgs, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export_json;

    const ORGS: &str = r#"[
        {"id": "A", "name": "Acme", "type": "company", "hierarchyLevel": 1},
        {"id": "B", "name": "Finance", "type": "department", "parentId": "A", "hierarchyLevel": 2}
    ]"#;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["orgchart", "-c", "my.toml", "render", "orgs.yaml", "-s", "3"])
            .unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("my.toml"));
        match cli.command {
            Commands::Render { input, scale, output } => {
                assert_eq!(input, PathBuf::from("orgs.yaml"));
                assert_eq!(scale, Some(3.0));
                assert!(output.is_none());
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["orgchart", "-r", "/tmp/proj", "stats", "x.json"]).unwrap();
        assert_eq!(
            cli.config_path(),
            PathBuf::from("/tmp/proj/.orgchart/config.toml")
        );
    }

    #[test]
    fn test_detects_input_kind() {
        assert!(!is_chart_document(ORGS));
        assert!(is_chart_document(r#"{"nodes": [], "edges": []}"#));
        assert!(!is_chart_document("- id: A\n"));
    }

    #[test]
    fn test_load_chart_from_both_forms() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LayoutSettings::default();

        let list = dir.path().join("orgs.json");
        fs::write(&list, ORGS).unwrap();
        let from_list = load_chart(&list, &settings).unwrap();
        assert_eq!(from_list.nodes().len(), 2);
        assert_eq!(from_list.edges().len(), 1);

        let doc = dir.path().join("chart.json");
        fs::write(&doc, export_json(&from_list).unwrap()).unwrap();
        let from_doc = load_chart(&doc, &settings).unwrap();
        assert_eq!(from_doc, from_list);
    }
}
