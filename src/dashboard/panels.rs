// src/dashboard/panels.rs

use super::Dashboard;
use crate::join::join;
use crate::normalize::{
    cctv::{self, CctvPoint},
    crime::{CCTV_COUNT, CRIME_TOTAL},
    households::{self, SINGLE_PERSON_HOUSEHOLDS},
    police::POLICE_COUNT,
    streetlight::STREETLIGHT_TOTAL,
};
use crate::table::{CanonicalTable, LATITUDE, LONGITUDE, REGION};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// The four dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    Cctv,
    LightsVsCrime,
    HouseholdsVsLights,
    PoliceCount,
}

impl PanelId {
    pub const ALL: [PanelId; 4] = [
        PanelId::Cctv,
        PanelId::LightsVsCrime,
        PanelId::HouseholdsVsLights,
        PanelId::PoliceCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelId::Cctv => "cctv",
            PanelId::LightsVsCrime => "lights_vs_crime",
            PanelId::HouseholdsVsLights => "households_vs_lights",
            PanelId::PoliceCount => "police_count",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelId::Cctv => "CCTV 지도 + 범죄 비교",
            PanelId::LightsVsCrime => "가로등 vs 범죄",
            PanelId::HouseholdsVsLights => "1인 가구 vs 가로등",
            PanelId::PoliceCount => "동별 경찰서 수",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    PointMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub column: String,
    pub label: String,
}

/// What to draw, over which table and columns. Styling is not part of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub table: String,
    pub x: String,
    pub series: Vec<Series>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Columns shown next to each point (scatter annotations, map popups).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<(f64, f64)>,
}

impl ChartSpec {
    fn new(kind: ChartKind, table: &str, x: &str, title: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            x: x.to_string(),
            series: Vec::new(),
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            labels: Vec::new(),
            center: None,
        }
    }

    fn series(mut self, column: &str, label: &str) -> Self {
        self.series.push(Series {
            column: column.to_string(),
            label: label.to_string(),
        });
        self
    }

    fn axes(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }

    fn labels(mut self, columns: &[&str]) -> Self {
        self.labels = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub name: String,
    pub table: Arc<CanonicalTable>,
    /// (left, right) rows dropped by the join that produced this table.
    pub unmatched: Option<(usize, usize)>,
}

/// A finished tab: final tables plus the charts drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    pub tables: Vec<NamedTable>,
    pub charts: Vec<ChartSpec>,
    pub points: Vec<CctvPoint>,
    /// Sections of this panel that failed while the rest still built.
    pub section_errors: Vec<String>,
}

impl Panel {
    fn new(id: PanelId) -> Self {
        Self {
            id,
            tables: Vec::new(),
            charts: Vec::new(),
            points: Vec::new(),
            section_errors: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.id.title()
    }

    pub fn table(&self, name: &str) -> Option<&NamedTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn push_table(&mut self, name: &str, table: Arc<CanonicalTable>, unmatched: Option<(usize, usize)>) {
        self.tables.push(NamedTable {
            name: name.to_string(),
            table,
            unmatched,
        });
    }
}

/// CCTV map and the CCTV-vs-crime line chart. The two halves fail independently.
pub fn cctv_panel(d: &Dashboard) -> Result<Panel> {
    let mut panel = Panel::new(PanelId::Cctv);

    match d.cctv_sites() {
        Ok(sites) => {
            let mut map = ChartSpec::new(ChartKind::PointMap, "cctv_sites", LONGITUDE, "CCTV 위치 분포도")
                .series(LATITUDE, "위도")
                .labels(&[cctv::PURPOSE, cctv::LOCATION, cctv::INSTALL_YEAR, cctv::CAMERA_COUNT]);
            map.center = cctv::center(&sites);
            panel.points = cctv::points(&sites);
            panel.push_table("cctv_sites", sites, None);
            panel.charts.push(map);
        }
        Err(e) => {
            warn!(error = %format!("{:#}", e), "CCTV map section failed");
            panel.section_errors.push(format!("CCTV 지도 오류: {:#}", e));
        }
    }

    match d.crime_by_station() {
        Ok(crime) => {
            panel.push_table("crime_by_station", crime, None);
            panel.charts.push(
                ChartSpec::new(
                    ChartKind::Line,
                    "crime_by_station",
                    REGION,
                    "지역별 CCTV 개수와 범죄 발생 건수 비교(강도, 살인,성범죄, 폭력)",
                )
                .series(CCTV_COUNT, "CCTV 개수")
                .series(CRIME_TOTAL, "범죄 건수")
                .axes("경찰서", "건수"),
            );
        }
        Err(e) => {
            warn!(error = %format!("{:#}", e), "CCTV/crime chart section failed");
            panel.section_errors.push(format!("CCTV/범죄 시각화 오류: {:#}", e));
        }
    }

    if panel.tables.is_empty() {
        bail!("{}", panel.section_errors.join("; "));
    }
    Ok(panel)
}

pub fn lights_vs_crime_panel(d: &Dashboard) -> Result<Panel> {
    let lights = d.streetlights()?;
    let crime = d.crime_totals()?;
    let joined = join(&lights, &crime, REGION).context("joining streetlights with crime totals")?;

    let mut panel = Panel::new(PanelId::LightsVsCrime);
    panel.push_table(
        "lights_vs_crime",
        Arc::new(joined.table),
        Some((joined.unmatched_left, joined.unmatched_right)),
    );
    panel.charts.push(
        ChartSpec::new(ChartKind::Line, "lights_vs_crime", REGION, "지역별 가로등 수와 범죄 발생 수 비교")
            .series(STREETLIGHT_TOTAL, "가로등 수")
            .series(CRIME_TOTAL, "범죄 발생 수")
            .axes("지역", "건수"),
    );
    Ok(panel)
}

pub fn households_vs_lights_panel(d: &Dashboard) -> Result<Panel> {
    let households = households::table()?;
    let lights = d.streetlights()?;
    let joined =
        join(&households, &lights, REGION).context("joining households with streetlights")?;

    let mut panel = Panel::new(PanelId::HouseholdsVsLights);
    panel.push_table(
        "households_vs_lights",
        Arc::new(joined.table),
        Some((joined.unmatched_left, joined.unmatched_right)),
    );
    panel.charts.push(
        ChartSpec::new(
            ChartKind::Scatter,
            "households_vs_lights",
            SINGLE_PERSON_HOUSEHOLDS,
            "1인 가구 수 vs 가로등 수 (산점도)",
        )
        .series(STREETLIGHT_TOTAL, "가로등 수")
        .axes("1인 가구 수", "가로등 수")
        .labels(&[REGION]),
    );
    panel.charts.push(
        ChartSpec::new(
            ChartKind::Bar,
            "households_vs_lights",
            REGION,
            "지역별 1인 가구 수 vs 가로등 수 비교",
        )
        .series(SINGLE_PERSON_HOUSEHOLDS, "1인 가구 수")
        .series(STREETLIGHT_TOTAL, "가로등 수")
        .axes("지역", "건수"),
    );
    Ok(panel)
}

pub fn police_count_panel(d: &Dashboard) -> Result<Panel> {
    let police = d.police_stations()?;

    let mut panel = Panel::new(PanelId::PoliceCount);
    panel.push_table("police_count", police, None);
    panel.charts.push(
        ChartSpec::new(ChartKind::Bar, "police_count", REGION, "부산 동별 경찰서 수")
            .series(POLICE_COUNT, "경찰서 수")
            .axes("지역", "경찰서 수"),
    );
    Ok(panel)
}
