// src/dashboard/render.rs

use super::{Panel, PanelOutcome};
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use super::panels::ChartSpec;

/// Styling handed to the rendering layer. The data pipeline never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font with Hangul glyphs for chart labels.
    pub font_path: Option<PathBuf>,
    /// Use U+2212 for negative axis ticks; the stock dashboard turns it off.
    pub unicode_minus: bool,
}

impl RenderConfig {
    /// The configured font if it exists on disk.
    pub fn font(&self) -> Option<&Path> {
        match self.font_path.as_deref() {
            Some(p) if p.is_file() => Some(p),
            Some(p) => {
                warn!(font = %p.display(), "configured font not found; renderer default applies");
                None
            }
            None => None,
        }
    }
}

/// Consumer of finished panels.
pub trait Renderer {
    fn render(&mut self, outcomes: &[PanelOutcome], config: &RenderConfig) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct TableEntry {
    name: String,
    file: String,
    rows: usize,
    columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unmatched: Option<(usize, usize)>,
}

#[derive(Debug, Serialize)]
struct PanelEntry<'a> {
    id: &'a str,
    title: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "no_errors")]
    section_errors: &'a [String],
    tables: Vec<TableEntry>,
    charts: &'a [ChartSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    points_file: Option<String>,
}

fn no_errors(errors: &&[String]) -> bool {
    errors.is_empty()
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: DateTime<Utc>,
    font: Option<&'a Path>,
    unicode_minus: bool,
    panels: Vec<PanelEntry<'a>>,
}

/// Writes each panel table to `<out>/<panel>/<table>.parquet`, CCTV markers to
/// `<out>/<panel>/points.json`, and a `manifest.json` describing the charts.
pub struct ParquetExporter {
    out_dir: PathBuf,
}

impl ParquetExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn write_panel(&self, panel: &Panel) -> Result<(Vec<TableEntry>, Option<String>)> {
        let dir = self.out_dir.join(panel.id.as_str());
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        let mut entries = Vec::with_capacity(panel.tables.len());
        for named in &panel.tables {
            let file = format!("{}/{}.parquet", panel.id.as_str(), named.name);
            write_parquet(named.table.batch(), &self.out_dir.join(&file))?;
            entries.push(TableEntry {
                name: named.name.clone(),
                file,
                rows: named.table.num_rows(),
                columns: named.table.column_names(),
                unmatched: named.unmatched,
            });
        }

        let points_file = if panel.points.is_empty() {
            None
        } else {
            let file = format!("{}/points.json", panel.id.as_str());
            let out = File::create(self.out_dir.join(&file))
                .with_context(|| format!("creating {}", file))?;
            serde_json::to_writer(out, &panel.points).context("writing map points")?;
            Some(file)
        };

        Ok((entries, points_file))
    }
}

impl Renderer for ParquetExporter {
    fn render(&mut self, outcomes: &[PanelOutcome], config: &RenderConfig) -> Result<()> {
        let mut panels = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                PanelOutcome::Built(panel) => {
                    let (tables, points_file) = self
                        .write_panel(panel)
                        .with_context(|| format!("exporting panel {}", panel.id.as_str()))?;
                    panels.push(PanelEntry {
                        id: panel.id.as_str(),
                        title: panel.title(),
                        status: "ok",
                        error: None,
                        section_errors: &panel.section_errors,
                        tables,
                        charts: &panel.charts,
                        points_file,
                    });
                }
                PanelOutcome::Failed { id, message } => panels.push(PanelEntry {
                    id: id.as_str(),
                    title: id.title(),
                    status: "failed",
                    error: Some(message.as_str()),
                    section_errors: &[],
                    tables: Vec::new(),
                    charts: &[],
                    points_file: None,
                }),
            }
        }

        let manifest = Manifest {
            generated_at: Utc::now(),
            font: config.font(),
            unicode_minus: config.unicode_minus,
            panels,
        };
        let path = self.out_dir.join("manifest.json");
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &manifest).context("writing manifest")?;
        info!(path = %path.display(), "wrote manifest");
        Ok(())
    }
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
