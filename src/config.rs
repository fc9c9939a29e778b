//! Chart configuration, read from `.orgchart/config.toml`.
//!
//! Every field is optional; a missing file means defaults. A file that does
//! not parse is reported and ignored so a typo never blocks rendering.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ChartError, Result};
use crate::graph::LayoutSettings;

pub const CONFIG_DIR: &str = ".orgchart";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub layout: LayoutSettings,
    pub export: ExportSettings,
    pub canvas: CanvasSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Device scale for raster snapshots.
    pub scale: f32,
    /// CSS colour painted behind the chart.
    pub background: String,
    /// Margin around the chart in the snapshot, in graph units.
    pub padding: f64,
    pub json_file_name: String,
    pub png_file_name: String,
    /// Directory artifacts are written to. Relative paths resolve against
    /// the project root.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: "#ffffff".to_string(),
            padding: 40.0,
            json_file_name: "organizational-chart.json".to_string(),
            png_file_name: "organizational-chart.png".to_string(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl ChartConfig {
    /// Load from `path`, falling back to defaults when the file is missing
    /// or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Strict load: parse and validate, reporting every problem.
    pub fn try_load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ChartConfig =
            toml::from_str(text).map_err(|e| ChartError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if !(self.export.scale.is_finite() && self.export.scale > 0.0) {
            return Err(ChartError::Config(format!(
                "export.scale must be a positive number, got {}",
                self.export.scale
            )));
        }
        if self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            return Err(ChartError::Config(
                "canvas width and height must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Default config location under a project root.
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Where exported artifacts go.
    pub fn resolve_output_dir(&self, root: &Path) -> PathBuf {
        match &self.export.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        }
    }
}
