// src/normalize/streetlight.rs

use super::{normalize_file, normalize_raw, Steps};
use crate::error::Result;
use crate::read::SourceEncoding;
use crate::resolve::{Fallback, KeywordRule, RuleSet};
use crate::table::{CanonicalTable, RawTable, REGION};
use once_cell::sync::Lazy;
use std::path::Path;

pub const STREETLIGHT_TOTAL: &str = "streetlight_total";

/// The streetlight export has padding columns and shifting header offsets,
/// so the region column falls back to a positional guess when no keyword hits.
pub static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        "streetlights",
        vec![
            KeywordRule::first(REGION, &["관리부서", "지역"])
                .with_fallback(Fallback::LastTextColumn)
                .drop_blank(),
            KeywordRule::first(STREETLIGHT_TOTAL, &["합계"]).number(),
        ],
    )
});

const STEPS: Steps = Steps {
    drop_empty_columns: true,
};

pub fn from_raw(raw: &RawTable) -> Result<CanonicalTable> {
    normalize_raw(raw, &RULES, STEPS)
}

pub fn load(path: &Path, encodings: &[SourceEncoding]) -> Result<CanonicalTable> {
    normalize_file(path, encodings, &RULES, STEPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

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
    fn empty_column_scenario() -> Result<()> {
        let t = from_raw(&raw(&["관리부서", "", "합계"], &[&["동래구", "", "500"]]))?;
        assert_eq!(t.column_names(), vec!["region", "streetlight_total"]);
        assert_eq!(t.regions().unwrap().value(0), "동래구");
        assert_eq!(t.number(STREETLIGHT_TOTAL).unwrap().value(0), 500.0);
        Ok(())
    }

    #[test]
    fn blank_total_column_is_dropped_before_matching() -> Result<()> {
        // first "합계" column is padding; the keyword must land on "합계(개)"
        let t = from_raw(&raw(
            &["관리부서", "합계", "합계(개)"],
            &[&["동래구", "", "500"]],
        ))?;
        assert_eq!(t.number(STREETLIGHT_TOTAL).unwrap().value(0), 500.0);
        Ok(())
    }

    #[test]
    fn fallback_takes_last_text_column() -> Result<()> {
        // no region keyword; "비고" is blank, so "부서명" is the last text column
        let t = from_raw(&raw(
            &["번호", "부서명", "합계", "비고"],
            &[&["1", "영도구", "20", ""], &["2", "사하구", "35", ""]],
        ))?;
        let names: Vec<&str> = t.regions().unwrap().iter().flatten().collect();
        assert_eq!(names, vec!["영도구", "사하구"]);
        Ok(())
    }

    #[test]
    fn missing_total_is_schema_error() {
        let err = from_raw(&raw(&["관리부서", "등기구"], &[&["동래구", "3"]])).unwrap_err();
        assert!(err.to_string().contains("streetlight_total"));
        assert!(err.to_string().contains("등기구"));
    }
}
