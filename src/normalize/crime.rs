// src/normalize/crime.rs

use super::{normalize_file, normalize_raw, Steps};
use crate::error::Result;
use crate::read::SourceEncoding;
use crate::resolve::{KeywordRule, RuleSet};
use crate::table::{CanonicalTable, RawTable, REGION};
use once_cell::sync::Lazy;
use std::path::Path;

pub const CCTV_COUNT: &str = "cctv_count";
pub const CRIME_TOTAL: &str = "crime_total";

/// Categories summed into `crime_total` for the per-station file.
pub const CATEGORY_KEYWORDS: [&str; 4] = ["살인", "강도", "성범죄", "폭력"];

/// Per-police-station file: station name, CCTV count, category counts.
pub static STATION_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        "crime_by_station",
        vec![
            KeywordRule::first(REGION, &["경찰서"]).drop_blank(),
            KeywordRule::first(CCTV_COUNT, &["cctv"]).number(),
            KeywordRule::sum(CRIME_TOTAL, &CATEGORY_KEYWORDS),
        ],
    )
});

/// Regional totals file: a region column and a precomputed `합계` column.
pub static TOTALS_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        "crime_totals",
        vec![
            KeywordRule::first(REGION, &["지역", "관서", "구역"]).drop_blank(),
            KeywordRule::first(CRIME_TOTAL, &["합계"]).number(),
        ],
    )
});

pub fn stations_from_raw(raw: &RawTable) -> Result<CanonicalTable> {
    normalize_raw(raw, &STATION_RULES, Steps::default())
}

/// Station table, ordered by station name.
pub fn load_stations(path: &Path, encodings: &[SourceEncoding]) -> Result<CanonicalTable> {
    normalize_file(path, encodings, &STATION_RULES, Steps::default())?.sorted_by(REGION, false)
}

pub fn totals_from_raw(raw: &RawTable) -> Result<CanonicalTable> {
    normalize_raw(raw, &TOTALS_RULES, Steps::default())
}

pub fn load_totals(path: &Path, encodings: &[SourceEncoding]) -> Result<CanonicalTable> {
    normalize_file(path, encodings, &TOTALS_RULES, Steps::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, SchemaError};
    use anyhow::Result;
    use std::io::Write;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            "test",
        )
    }

    #[test]
    fn station_file_scenario() -> Result<()> {
        let t = stations_from_raw(&raw(
            &["경찰서명", "CCTV설치수", "살인", "강도", "성범죄", "폭력"],
            &[&["중부서", "10", "1", "2", "3", "4"]],
        ))?;
        assert_eq!(t.regions().unwrap().value(0), "중부서");
        assert_eq!(t.number(CCTV_COUNT).unwrap().value(0), 10.0);
        assert_eq!(t.number(CRIME_TOTAL).unwrap().value(0), 10.0);
        Ok(())
    }

    #[test]
    fn each_required_group_is_checked() {
        let cases: [(&[&str], &str); 3] = [
            (&["관서", "CCTV", "살인"], "region"),
            (&["경찰서명", "살인"], "cctv_count"),
            (&["경찰서명", "CCTV", "절도"], "crime_total"),
        ];
        for (headers, missing) in cases {
            let row: Vec<&str> = headers.iter().map(|_| "1").collect();
            let err = stations_from_raw(&raw(headers, &[row.as_slice()])).unwrap_err();
            match err {
                PipelineError::Schema(SchemaError::Unresolved { field, .. }) => {
                    assert_eq!(field, missing)
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn load_stations_sorts_by_name() -> Result<()> {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile()?;
        write!(
            tmp,
            "경찰서명,CCTV설치수,살인,강도,성범죄,폭력\n해운대서,5,0,1,2,3\n금정서,4,1,1,1,1\n"
        )?;
        let t = load_stations(tmp.path(), &crate::read::DEFAULT_ENCODINGS)?;
        let names: Vec<&str> = t.regions().unwrap().iter().flatten().collect();
        assert_eq!(names, vec!["금정서", "해운대서"]);
        Ok(())
    }

    #[test]
    fn totals_file_uses_sum_column() -> Result<()> {
        let t = totals_from_raw(&raw(
            &["구분", "지역", "합계", "살인"],
            &[&["발생", "중부", "1,204", "1"], &["발생", "", "10", "0"]],
        ))?;
        assert_eq!(t.num_rows(), 1);
        assert_eq!(t.number(CRIME_TOTAL).unwrap().value(0), 1204.0);
        Ok(())
    }
}
