// src/dashboard/mod.rs
//! Panel assembly. Every panel is built from cached canonical tables and
//! fails on its own: one broken source never takes down the other tabs.

pub mod panels;
pub mod render;

pub use panels::{ChartKind, ChartSpec, NamedTable, Panel, PanelId, Series};
pub use render::{ParquetExporter, RenderConfig, Renderer};

use crate::cache::TableCache;
use crate::config::DashboardConfig;
use crate::normalize::{cctv, crime, police, streetlight};
use crate::read::SourceEncoding;
use crate::resolve::RuleSet;
use crate::table::CanonicalTable;
use anyhow::{Context, Result};
use std::{path::Path, sync::Arc};
use tracing::{error, info};

/// Result of building one panel.
#[derive(Debug)]
pub enum PanelOutcome {
    Built(Panel),
    Failed { id: PanelId, message: String },
}

impl PanelOutcome {
    pub fn id(&self) -> PanelId {
        match self {
            PanelOutcome::Built(p) => p.id,
            PanelOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        match self {
            PanelOutcome::Built(p) => Some(p),
            PanelOutcome::Failed { .. } => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, PanelOutcome::Built(_))
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: TableCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: TableCache::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    fn cached<F>(&self, file: &Path, rules: &RuleSet, what: &str, load: F) -> Result<Arc<CanonicalTable>>
    where
        F: FnOnce(&Path, &[SourceEncoding]) -> crate::error::Result<CanonicalTable>,
    {
        let path = self.config.data_path(file);
        let encodings = self.config.encodings.as_slice();
        self.cache
            .get_or_load(&path, &rules.name, || load(path.as_path(), encodings))
            .with_context(|| format!("loading {} from {}", what, path.display()))
    }

    pub fn cctv_sites(&self) -> Result<Arc<CanonicalTable>> {
        self.cached(&self.config.cctv, &cctv::RULES, "CCTV sites", cctv::load)
    }

    pub fn crime_by_station(&self) -> Result<Arc<CanonicalTable>> {
        self.cached(
            &self.config.crime_by_station,
            &crime::STATION_RULES,
            "crime by station",
            crime::load_stations,
        )
    }

    pub fn crime_totals(&self) -> Result<Arc<CanonicalTable>> {
        self.cached(
            &self.config.crime_totals,
            &crime::TOTALS_RULES,
            "crime totals",
            crime::load_totals,
        )
    }

    pub fn streetlights(&self) -> Result<Arc<CanonicalTable>> {
        self.cached(
            &self.config.streetlights,
            &streetlight::RULES,
            "streetlights",
            streetlight::load,
        )
    }

    pub fn police_stations(&self) -> Result<Arc<CanonicalTable>> {
        self.cached(
            &self.config.police_stations,
            &police::RULES,
            "police stations",
            police::load,
        )
    }

    /// Build a single panel; errors are returned, not logged.
    pub fn try_build(&self, id: PanelId) -> Result<Panel> {
        match id {
            PanelId::Cctv => panels::cctv_panel(self),
            PanelId::LightsVsCrime => panels::lights_vs_crime_panel(self),
            PanelId::HouseholdsVsLights => panels::households_vs_lights_panel(self),
            PanelId::PoliceCount => panels::police_count_panel(self),
        }
    }

    #[tracing::instrument(level = "info", skip(self), fields(panel = id.as_str()))]
    pub fn build(&self, id: PanelId) -> PanelOutcome {
        match self.try_build(id) {
            Ok(panel) => {
                info!(
                    tables = panel.tables.len(),
                    charts = panel.charts.len(),
                    section_errors = panel.section_errors.len(),
                    "panel built"
                );
                PanelOutcome::Built(panel)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                error!(error = %message, "panel failed");
                PanelOutcome::Failed { id, message }
            }
        }
    }

    /// All four panels in tab order.
    pub fn build_all(&self) -> Vec<PanelOutcome> {
        PanelId::ALL.iter().map(|&id| self.build(id)).collect()
    }
}
