//! orgchart CLI - organizational hierarchy charts.
//!
//! Usage:
//!   orgchart layout orgs.yaml -o chart.json    # Lay out an organization list
//!   orgchart relayout chart.json               # Re-arrange an exported chart
//!   orgchart render chart.json                 # PNG snapshot (2x)
//!   orgchart stats orgs.json                   # Chart statistics

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing::info;

use orgchart::cli::{load_chart, Cli, Commands};
use orgchart::config::ChartConfig;
use orgchart::export::{export_json, import_json, write_artifact, RasterExporter};
use orgchart::graph::relayout;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());
    let config_path = cli.config_path();
    let config = if cli.config.is_some() {
        // An explicit config must be valid.
        ChartConfig::try_load(&config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        ChartConfig::load(&config_path)
    };

    match cli.command {
        Commands::Layout { input, output } => {
            let orgs = orgchart::registry::load_organizations(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let graph = orgchart::ChartGraph::transform(&orgs, &config.layout);
            let json = export_json(&graph)?;
            emit_text(&json, output.as_deref())?;
            info!(nodes = graph.nodes().len(), edges = graph.edges().len(), "layout done");
        }

        Commands::Relayout { input, output } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut graph = import_json(&text)?;
            let report = relayout(&mut graph, &config.layout);
            let target = output.unwrap_or(input);
            fs::write(&target, export_json(&graph)?)?;
            println!(
                "Moved {} node(s), {} left in place -> {}",
                report.moved,
                report.unmatched.len(),
                target.display()
            );
        }

        Commands::Render {
            input,
            output,
            scale,
        } => {
            let graph = load_chart(&input, &config.layout)
                .with_context(|| format!("reading {}", input.display()))?;

            let mut settings = config.export.clone();
            if let Some(scale) = scale {
                settings.scale = scale;
            }
            let exporter = RasterExporter::new(settings);
            let png = exporter.export_png(&graph).await?;

            let path = match output {
                Some(path) => {
                    fs::write(&path, &png)?;
                    path
                }
                None => write_artifact(
                    &config.resolve_output_dir(&root),
                    &config.export.png_file_name,
                    &png,
                )?,
            };
            println!("Wrote {} ({} bytes)", path.display(), png.len());
        }

        Commands::Stats { input } => {
            let graph = load_chart(&input, &config.layout)
                .with_context(|| format!("reading {}", input.display()))?;
            let stats = graph.stats();

            println!("Chart: {}", input.display());
            println!("  nodes:     {}", stats.node_count);
            println!("  edges:     {}", stats.edge_count);
            println!("  roots:     {}", stats.root_count);
            println!("  max depth: {}", stats.max_depth);
            println!("  cycle:     {}", if stats.has_cycle { "yes" } else { "no" });
            for (level, count) in &stats.nodes_per_level {
                println!("  level {:>2}:  {}", level, count);
            }
        }
    }

    Ok(())
}

fn emit_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
