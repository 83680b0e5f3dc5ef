// src/config.rs

use crate::dashboard::render::RenderConfig;
use crate::read::{SourceEncoding, DEFAULT_ENCODINGS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Where the source files live and how to read them.
///
/// Relative file paths are taken relative to `data_dir`. Every field has a
/// default matching the stock `data/` layout, so a YAML file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub cctv: PathBuf,
    pub crime_by_station: PathBuf,
    pub crime_totals: PathBuf,
    pub streetlights: PathBuf,
    pub police_stations: PathBuf,
    /// Attempt order for delimited files.
    pub encodings: Vec<SourceEncoding>,
    pub output_dir: PathBuf,
    pub render: RenderConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cctv: PathBuf::from("12_04_08_E_CCTV정보.xlsx"),
            crime_by_station: PathBuf::from(
                "경찰청 부산광역시경찰청_경찰서별 5대 범죄 발생 현황_20231231.csv",
            ),
            crime_totals: PathBuf::from("경찰청_범죄현황.csv"),
            streetlights: PathBuf::from("가로등현황.csv"),
            police_stations: PathBuf::from("부산동별경찰서.csv"),
            encodings: DEFAULT_ENCODINGS.to_vec(),
            output_dir: PathBuf::from("out"),
            render: RenderConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from a YAML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        let config: Self = serde_yaml::from_reader(file)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// `file` resolved against `data_dir`.
    pub fn data_path(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }
}
