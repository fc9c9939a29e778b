//! Chart export: JSON documents and PNG snapshots.

pub mod json;
pub mod raster;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

pub use json::{export_json, export_value, import_json};
pub use raster::{render_png, render_svg, svg_to_png, ExportGuard, RasterExporter};

/// Write an export artifact to `dir/name`, creating `dir` if needed.
pub fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_artifact_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let path = write_artifact(&out, "organizational-chart.json", b"{}").unwrap();
        assert_eq!(path, out.join("organizational-chart.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }
}
