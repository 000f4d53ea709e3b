use crate::estimate::DatasetProperties;
use crate::fusion::FusionPlan;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct MemoryEstimateConfig {
    pub plan: FusionPlan,
    #[serde(default)]
    pub dataset: DatasetProperties,
    /// Optional JSON destination for the full estimate.
    #[serde(default)]
    pub estimate_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<MemoryEstimateConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
