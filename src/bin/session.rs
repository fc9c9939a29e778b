//! orgchart session server - interactive chart building over STDIO.
//!
//! Runs a JSON-RPC 2.0 server over STDIO that turns canvas events (palette
//! drops, connections, drag ends, re-layout and export requests) into edits
//! of a single chart.
//!
//! Usage:
//!   orgchart-session [project_root]
//!
//! If no project root is given, uses the current working directory.
//! Config is read from `<root>/.orgchart/config.toml` when present.

use std::path::PathBuf;

use tracing::info;

use orgchart::config::ChartConfig;
use orgchart::session::{server, ChartSession};

fn main() {
    // Initialize tracing to stderr (stdout carries the protocol)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let project_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    info!(root = %project_root.display(), "orgchart session starting");

    let config = ChartConfig::load(&ChartConfig::default_path(&project_root));
    let mut session = ChartSession::new(config, project_root);

    info!("session ready, waiting for JSON-RPC requests on stdin");

    // Blocks until stdin closes
    server::run(&mut session);
}
