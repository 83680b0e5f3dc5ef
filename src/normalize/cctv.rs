// src/normalize/cctv.rs

use super::{normalize_file, normalize_raw, Steps};
use crate::error::Result;
use crate::read::SourceEncoding;
use crate::resolve::{KeywordRule, RuleSet};
use crate::table::{CanonicalTable, RawTable, LATITUDE, LONGITUDE};
use arrow::array::Array;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::path::Path;

pub const PURPOSE: &str = "purpose";
pub const LOCATION: &str = "location";
pub const INSTALL_YEAR: &str = "install_year";
pub const CAMERA_COUNT: &str = "camera_count";

/// CCTV installation sites: one point per row.
pub static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        "cctv",
        vec![
            KeywordRule::first(PURPOSE, &["설치목적"]),
            KeywordRule::first(LOCATION, &["도로명주소"]),
            KeywordRule::first(LATITUDE, &["위도"]).number().drop_blank(),
            KeywordRule::first(LONGITUDE, &["경도"]).number().drop_blank(),
            KeywordRule::first(INSTALL_YEAR, &["설치연"]),
            KeywordRule::first(CAMERA_COUNT, &["카메라대수"]).number(),
        ],
    )
});

/// Rows without coordinates cannot be plotted and are dropped.
pub fn from_raw(raw: &RawTable) -> Result<CanonicalTable> {
    normalize_raw(raw, &RULES, Steps::default())
}

pub fn load(path: &Path, encodings: &[SourceEncoding]) -> Result<CanonicalTable> {
    normalize_file(path, encodings, &RULES, Steps::default())
}

/// A map marker with the fields shown in its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CctvPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub install_year: Option<String>,
    pub camera_count: Option<f64>,
}

/// Point records for the map layer, in table order.
pub fn points(table: &CanonicalTable) -> Vec<CctvPoint> {
    let (Some(lat), Some(lon)) = (table.number(LATITUDE), table.number(LONGITUDE)) else {
        return Vec::new();
    };
    let text = |name: &str, row: usize| {
        table
            .text(name)
            .filter(|col| !col.is_null(row))
            .map(|col| col.value(row).to_string())
    };
    let count = table.number(CAMERA_COUNT);

    (0..table.num_rows())
        .map(|row| CctvPoint {
            latitude: lat.value(row),
            longitude: lon.value(row),
            purpose: text(PURPOSE, row),
            location: text(LOCATION, row),
            install_year: text(INSTALL_YEAR, row),
            camera_count: count.filter(|c| !c.is_null(row)).map(|c| c.value(row)),
        })
        .collect()
}

/// Mean coordinate, used to center the map.
pub fn center(table: &CanonicalTable) -> Option<(f64, f64)> {
    let lat = table.number(LATITUDE)?;
    let lon = table.number(LONGITUDE)?;
    let n = table.num_rows();
    if n == 0 {
        return None;
    }
    let sum = |col: &arrow::array::Float64Array| col.iter().flatten().sum::<f64>();
    Some((sum(lat) / n as f64, sum(lon) / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample() -> RawTable {
        RawTable::new(
            vec![
                "관리기관명".into(),
                "소재지도로명주소".into(),
                "설치목적구분".into(),
                "카메라대수".into(),
                "설치연월".into(),
                "WGS84위도".into(),
                "WGS84경도".into(),
            ],
            vec![
                vec!["부산 중구".into(), "중앙대로 1".into(), "생활방범".into(), "2".into(), "2019".into(), "35.10".into(), "129.03".into()],
                vec!["부산 중구".into(), "중앙대로 2".into(), "어린이보호".into(), "1".into(), "2020".into(), "".into(), "129.04".into()],
                vec!["부산 동래구".into(), "충렬대로 3".into(), "생활방범".into(), "".into(), "2021".into(), "35.20".into(), "129.08".into()],
            ],
            "xlsx",
        )
    }

    #[test]
    fn rows_without_coordinates_are_dropped() -> Result<()> {
        let t = from_raw(&sample())?;
        assert_eq!(t.num_rows(), 2);
        assert_eq!(
            t.column_names(),
            vec!["purpose", "location", "latitude", "longitude", "install_year", "camera_count"]
        );
        Ok(())
    }

    #[test]
    fn points_carry_popup_fields() -> Result<()> {
        let pts = points(&from_raw(&sample())?);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].purpose.as_deref(), Some("생활방범"));
        assert_eq!(pts[0].location.as_deref(), Some("중앙대로 1"));
        assert_eq!(pts[0].camera_count, Some(2.0));
        assert_eq!(pts[1].camera_count, None);
        assert_eq!(pts[1].install_year.as_deref(), Some("2021"));
        Ok(())
    }

    #[test]
    fn center_is_mean_coordinate() -> Result<()> {
        let (lat, lon) = center(&from_raw(&sample())?).unwrap();
        assert!((lat - 35.15).abs() < 1e-9);
        assert!((lon - 129.055).abs() < 1e-9);
        Ok(())
    }
}
