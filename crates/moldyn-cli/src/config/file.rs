use crate::error::{CliError, Result};
use moldyn::engine::interpolation::InterpolationMode;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileBondsConfig {
    pub search_radius: Option<f32>,
    pub upper_tolerance: Option<f32>,
    pub lower_tolerance: Option<f32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSplineConfig {
    pub subdivisions: Option<usize>,
    pub tension: Option<f32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePlaybackConfig {
    pub interpolation: Option<InterpolationMode>,
    pub frames_per_second: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub bonds: Option<FileBondsConfig>,
    pub spline: Option<FileSplineConfig>,
    pub playback: Option<FilePlaybackConfig>,
    pub coloring: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
