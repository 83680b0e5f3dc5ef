// src/normalize/police.rs

use super::{normalize_file, normalize_raw, Steps};
use crate::error::Result;
use crate::read::SourceEncoding;
use crate::resolve::{KeywordRule, RuleSet};
use crate::table::{CanonicalTable, RawTable, REGION};
use once_cell::sync::Lazy;
use std::path::Path;

pub const POLICE_COUNT: &str = "police_count";

pub static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        "police_stations",
        vec![
            KeywordRule::first(REGION, &["경찰서", "지역"])
                .or_keywords(&["동별", "구별"])
                .drop_blank(),
            KeywordRule::first(POLICE_COUNT, &["개수", "수", "건수"]).number(),
        ],
    )
});

pub fn from_raw(raw: &RawTable) -> Result<CanonicalTable> {
    normalize_raw(raw, &RULES, Steps::default())
}

/// Police counts, largest first.
pub fn load(path: &Path, encodings: &[SourceEncoding]) -> Result<CanonicalTable> {
    normalize_file(path, encodings, &RULES, Steps::default())?.sorted_by(POLICE_COUNT, true)
}
