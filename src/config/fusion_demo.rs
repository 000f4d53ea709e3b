use crate::fusion::{FusionParams, PixelType};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct FusionDemoConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub params: FusionParams,
    #[serde(default)]
    pub pixel_type: PixelType,
    #[serde(default = "default_downsampling")]
    pub downsampling: f64,
    pub output: FusionDemoOutputConfig,
}

fn default_downsampling() -> f64 {
    1.0
}

/// Synthetic acquisition: one coarse base view of the whole specimen plus two
/// detail views that overlap in the middle along x.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Edge length of the cubic specimen region in world voxels.
    pub size: usize,
    /// Width (voxels along x) shared by both detail views.
    pub overlap: usize,
    /// Block size used to degrade the base view.
    pub base_block: usize,
    /// Zero-run length used to derive detail-view coverage from content.
    pub empty_run: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            size: 64,
            overlap: 16,
            base_block: 4,
            empty_run: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FusionDemoOutputConfig {
    #[serde(rename = "slice_png")]
    pub slice_png: PathBuf,
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
}

pub fn load_config(path: &Path) -> Result<FusionDemoConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
