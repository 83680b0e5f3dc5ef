// src/normalize/mod.rs
//! One normalizer per source dataset. Each is a fixed pipeline:
//! read → clean headers → (drop empty columns) → resolve → drop incomplete rows.

pub mod cctv;
pub mod crime;
pub mod households;
pub mod police;
pub mod streetlight;

use crate::error::Result;
use crate::read::{read_table, SourceEncoding};
use crate::resolve::{resolve, RuleSet};
use crate::table::{CanonicalTable, RawTable};
use std::path::Path;
use tracing::info;

/// Options that differ between datasets but not between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Steps {
    /// Remove columns whose every cell is blank before resolving, so that
    /// padding columns cannot be picked up by a positional fallback.
    pub drop_empty_columns: bool,
}

/// Apply `rules` to an already-read table.
pub fn normalize_raw(raw: &RawTable, rules: &RuleSet, steps: Steps) -> Result<CanonicalTable> {
    if steps.drop_empty_columns {
        let trimmed = raw.drop_empty_columns();
        resolve(&trimmed, rules)
    } else {
        resolve(raw, rules)
    }
}

/// Read `path` and normalize it with `rules`.
#[tracing::instrument(level = "info", skip(path, encodings, rules), fields(path = %path.display(), rule_set = %rules.name))]
pub fn normalize_file(
    path: &Path,
    encodings: &[SourceEncoding],
    rules: &RuleSet,
    steps: Steps,
) -> Result<CanonicalTable> {
    let raw = read_table(path, encodings)?;
    let table = normalize_raw(&raw, rules, steps)?;
    info!(
        rows_in = raw.num_rows(),
        rows_out = table.num_rows(),
        decoded_as = %raw.decoded_as,
        "normalized"
    );
    Ok(table)
}
