// src/table/mod.rs
pub mod utils;

use crate::error::{Result, SchemaError};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray, UInt32Array},
    compute::take_record_batch,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{cmp::Ordering, sync::Arc};
use tracing::debug;

use utils::{clean_header, is_blank, normalize_key};

pub const REGION: &str = "region";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names as found in the file, whitespace-stripped.
    pub headers: Vec<String>,
    /// Each data row, padded or truncated to `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
    /// Label of the encoding (or spreadsheet reader) that produced this table.
    pub decoded_as: String,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, decoded_as: impl Into<String>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| clean_header(h)).collect();
        let width = headers.len();
        let mut truncated = 0;
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() > width {
                    truncated += 1;
                }
                row.resize(width, String::new());
                row
            })
            .collect();
        if truncated > 0 {
            debug!(truncated, width, "rows wider than the header lost trailing cells");
        }
        Self {
            headers,
            rows,
            decoded_as: decoded_as.into(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of column `idx`, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[idx].as_str())
    }

    /// New table without the columns whose every cell is blank.
    pub fn drop_empty_columns(&self) -> RawTable {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !self.column(i).all(is_blank))
            .collect();
        RawTable {
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
            decoded_as: self.decoded_as.clone(),
        }
    }
}

/// Values of one canonical column before it becomes an arrow array.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Number(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_array(self) -> (DataType, ArrayRef) {
        match self {
            ColumnData::Text(v) => (DataType::Utf8, Arc::new(StringArray::from(v)) as ArrayRef),
            ColumnData::Number(v) => (
                DataType::Float64,
                Arc::new(Float64Array::from(v)) as ArrayRef,
            ),
        }
    }
}

/// A normalized dataset: canonical column names over an arrow batch.
///
/// Columns are Utf8 or Float64. A `region` column is non-null and holds
/// whitespace-normalized names; `latitude`/`longitude` are non-null when present.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    rule_set: String,
    batch: RecordBatch,
}

impl CanonicalTable {
    pub fn try_new(rule_set: impl Into<String>, batch: RecordBatch) -> Result<Self> {
        check_invariants(&batch)?;
        Ok(Self {
            rule_set: rule_set.into(),
            batch,
        })
    }

    /// Build from named columns, in order.
    pub fn from_columns(
        rule_set: impl Into<String>,
        columns: Vec<(String, ColumnData)>,
    ) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, data) in columns {
            let (ty, arr) = data.into_array();
            fields.push(Field::new(name, ty, true));
            arrays.push(arr);
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Self::try_new(rule_set, batch)
    }

    /// Identity of the rule set (or join) this table was derived from.
    pub fn rule_set(&self) -> &str {
        &self.rule_set
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn text(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
    }

    pub fn number(&self, name: &str) -> Option<&Float64Array> {
        self.batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
    }

    pub fn regions(&self) -> Option<&StringArray> {
        self.text(REGION)
    }

    /// Copy of this table with rows ordered by `column`. Ties keep their
    /// current order; nulls sort last.
    pub fn sorted_by(&self, column: &str, descending: bool) -> Result<Self> {
        let mut idx: Vec<u32> = (0..self.num_rows() as u32).collect();
        if let Some(text) = self.text(column) {
            idx.sort_by(|&a, &b| {
                order_nullable(text.is_null(a as usize), text.is_null(b as usize), descending, || {
                    text.value(a as usize).cmp(text.value(b as usize))
                })
            });
        } else if let Some(num) = self.number(column) {
            idx.sort_by(|&a, &b| {
                order_nullable(num.is_null(a as usize), num.is_null(b as usize), descending, || {
                    num.value(a as usize)
                        .partial_cmp(&num.value(b as usize))
                        .unwrap_or(Ordering::Equal)
                })
            });
        } else {
            return Err(SchemaError::Unresolved {
                field: column.to_string(),
                columns: self.column_names(),
            }
            .into());
        }
        let indices = UInt32Array::from(idx);
        let batch = take_record_batch(&self.batch, &indices)?;
        Self::try_new(self.rule_set.clone(), batch)
    }

    /// Render back to raw string cells, e.g. to feed a table through the pipeline again.
    pub fn to_raw(&self) -> RawTable {
        let headers = self.column_names();
        let rows = (0..self.num_rows())
            .map(|r| {
                self.batch
                    .columns()
                    .iter()
                    .map(|col| cell_to_string(col.as_ref(), r))
                    .collect()
            })
            .collect();
        RawTable::new(headers, rows, "canonical")
    }
}

fn order_nullable(
    a_null: bool,
    b_null: bool,
    descending: bool,
    cmp: impl FnOnce() -> Ordering,
) -> Ordering {
    match (a_null, b_null) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if descending => cmp().reverse(),
        (false, false) => cmp(),
    }
}

fn cell_to_string(col: &dyn Array, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
        s.value(row).to_string()
    } else if let Some(n) = col.as_any().downcast_ref::<Float64Array>() {
        n.value(row).to_string()
    } else {
        String::new()
    }
}

fn check_invariants(batch: &RecordBatch) -> Result<(), SchemaError> {
    let schema = batch.schema();
    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name().as_str();
        match field.data_type() {
            DataType::Utf8 | DataType::Float64 => {}
            other => {
                return Err(SchemaError::Invariant {
                    detail: format!("column `{}` has unsupported type {}", name, other),
                })
            }
        }
        if matches!(name, REGION | LATITUDE | LONGITUDE) && col.null_count() > 0 {
            return Err(SchemaError::Invariant {
                detail: format!("column `{}` has {} null values", name, col.null_count()),
            });
        }
    }

    if let Some(col) = batch.column_by_name(REGION) {
        let regions = col
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| SchemaError::Invariant {
                detail: "column `region` is not text".into(),
            })?;
        if let Some(bad) = regions.iter().flatten().find(|r| normalize_key(r) != *r || r.is_empty()) {
            return Err(SchemaError::Invariant {
                detail: format!("region value {:?} is not normalized", bad),
            });
        }
    }
    for coord in [LATITUDE, LONGITUDE] {
        if let Some(col) = batch.column_by_name(coord) {
            if col.data_type() != &DataType::Float64 {
                return Err(SchemaError::Invariant {
                    detail: format!("column `{}` is not numeric", coord),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample() -> crate::error::Result<CanonicalTable> {
        CanonicalTable::from_columns(
            "test",
            vec![
                (
                    REGION.to_string(),
                    ColumnData::Text(vec![Some("중부".into()), Some("동래".into()), Some("영도".into())]),
                ),
                (
                    "police_count".to_string(),
                    ColumnData::Number(vec![Some(2.0), None, Some(5.0)]),
                ),
            ],
        )
    }

    #[test]
    fn raw_table_pads_rows_and_cleans_headers() {
        let raw = RawTable::new(
            vec![" 관리부서 ".into(), "합계".into()],
            vec![vec!["동래구".into()]],
            "utf-8",
        );
        assert_eq!(raw.headers, vec!["관리부서", "합계"]);
        assert_eq!(raw.rows[0], vec!["동래구".to_string(), String::new()]);
    }

    #[test]
    fn raw_table_cuts_wide_rows_to_header_width() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
        let raw = RawTable::new(
            vec!["지역".into(), "합계".into()],
            vec![
                vec!["중부".into(), "3".into(), "비고".into(), "x".into()],
                vec!["동래".into(), "4".into()],
            ],
            "utf-8",
        );
        assert_eq!(raw.rows[0], vec!["중부", "3"]);
        assert_eq!(raw.rows[1], vec!["동래", "4"]);
    }

    #[test]
    fn drop_empty_columns_keeps_populated_ones() {
        let raw = RawTable::new(
            vec!["관리부서".into(), "".into(), "합계".into()],
            vec![vec!["동래구".into(), " ".into(), "500".into()]],
            "utf-8",
        );
        let dropped = raw.drop_empty_columns();
        assert_eq!(dropped.headers, vec!["관리부서", "합계"]);
        assert_eq!(dropped.rows[0], vec!["동래구", "500"]);
        // the source table is untouched
        assert_eq!(raw.headers.len(), 3);
    }

    #[test]
    fn sorted_by_number_puts_nulls_last() -> Result<()> {
        let t = sample()?.sorted_by("police_count", true)?;
        let regions: Vec<&str> = t.regions().unwrap().iter().flatten().collect();
        assert_eq!(regions, vec!["영도", "중부", "동래"]);
        Ok(())
    }

    #[test]
    fn sorted_by_unknown_column_is_schema_error() -> Result<()> {
        let err = sample()?.sorted_by("missing", false).unwrap_err();
        assert!(err.to_string().contains("missing"));
        Ok(())
    }

    #[test]
    fn unnormalized_region_is_rejected() {
        let err = CanonicalTable::from_columns(
            "test",
            vec![(
                REGION.to_string(),
                ColumnData::Text(vec![Some(" 중부 ".into())]),
            )],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not normalized"));
    }

    #[test]
    fn to_raw_renders_numbers_plainly() -> Result<()> {
        let raw = sample()?.to_raw();
        assert_eq!(raw.headers, vec!["region", "police_count"]);
        assert_eq!(raw.rows[0], vec!["중부", "2"]);
        assert_eq!(raw.rows[1], vec!["동래", ""]);
        Ok(())
    }
}
