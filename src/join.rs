// src/join.rs

use crate::error::{PipelineError, Result, SchemaError};
use crate::table::{utils::normalize_key, CanonicalTable};
use arrow::{
    array::{ArrayRef, StringArray, UInt32Array},
    compute::take_record_batch,
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::debug;

/// Inner join result plus how many rows on each side found no partner.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub table: CanonicalTable,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
}

fn key_column<'a>(table: &'a CanonicalTable, on: &str) -> Result<&'a StringArray> {
    table.text(on).ok_or_else(|| {
        SchemaError::Unresolved {
            field: on.to_string(),
            columns: table.column_names(),
        }
        .into()
    })
}

/// Inner join on `on`.
///
/// Keys match by exact equality after whitespace normalization; there is no
/// fuzzy or synonym matching, so spelling variants across sources simply do
/// not join. Left row order is kept and duplicate keys produce every pairing.
/// Non-key columns present on both sides get `_x` (left) and `_y` (right).
/// Rows without a partner are dropped silently and counted in the result.
pub fn join(left: &CanonicalTable, right: &CanonicalTable, on: &str) -> Result<JoinedTable> {
    let left_keys = key_column(left, on)?;
    let right_keys = key_column(right, on)?;

    let mut right_index: HashMap<String, Vec<u32>> = HashMap::new();
    for (i, key) in right_keys.iter().enumerate() {
        if let Some(key) = key {
            right_index
                .entry(normalize_key(key))
                .or_default()
                .push(i as u32);
        }
    }

    let mut left_take = Vec::new();
    let mut right_take = Vec::new();
    let mut left_seen: HashSet<String> = HashSet::new();
    let mut unmatched_left = 0;
    for (i, key) in left_keys.iter().enumerate() {
        let key = key.map(normalize_key);
        match key.as_ref().and_then(|k| right_index.get(k)) {
            Some(partners) => {
                for &r in partners {
                    left_take.push(i as u32);
                    right_take.push(r);
                }
            }
            None => unmatched_left += 1,
        }
        if let Some(key) = key {
            left_seen.insert(key);
        }
    }
    let unmatched_right = right_keys
        .iter()
        .filter(|k| !k.map(|k| left_seen.contains(&normalize_key(k))).unwrap_or(false))
        .count();

    debug!(
        left = left.rule_set(),
        right = right.rule_set(),
        rows = left_take.len(),
        unmatched_left,
        unmatched_right,
        "joined"
    );

    if left_take.is_empty() {
        return Err(PipelineError::JoinEmpty {
            unmatched_left,
            unmatched_right,
        });
    }

    let lb = take_record_batch(left.batch(), &UInt32Array::from(left_take))?;
    let rb = take_record_batch(right.batch(), &UInt32Array::from(right_take))?;
    let batch = combine(&lb, &rb, on)?;
    let table = CanonicalTable::try_new(format!("{}+{}", left.rule_set(), right.rule_set()), batch)?;

    Ok(JoinedTable {
        table,
        unmatched_left,
        unmatched_right,
    })
}

/// Key column first, then the left columns, then the right columns.
fn combine(left: &RecordBatch, right: &RecordBatch, on: &str) -> Result<RecordBatch> {
    let left_schema = left.schema();
    let right_schema = right.schema();
    let left_names: HashSet<&str> = left_schema.fields().iter().map(|f| f.name().as_str()).collect();
    let right_names: HashSet<&str> = right_schema.fields().iter().map(|f| f.name().as_str()).collect();

    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    let mut push = |name: String, field: &Field, array: &ArrayRef| {
        fields.push(Field::new(name, field.data_type().clone(), field.is_nullable()));
        arrays.push(array.clone());
    };

    if let Some((i, f)) = left_schema.column_with_name(on) {
        push(on.to_string(), f, left.column(i));
    }
    for (f, col) in left_schema.fields().iter().zip(left.columns()) {
        if f.name() == on {
            continue;
        }
        let name = if right_names.contains(f.name().as_str()) {
            format!("{}_x", f.name())
        } else {
            f.name().clone()
        };
        push(name, f, col);
    }
    for (f, col) in right_schema.fields().iter().zip(right.columns()) {
        if f.name() == on {
            continue;
        }
        let name = if left_names.contains(f.name().as_str()) {
            format!("{}_y", f.name())
        } else {
            f.name().clone()
        };
        push(name, f, col);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(Into::into)
}

/// Fold [`join`] over two or more tables, left to right.
///
/// The unmatched counts are totals over every step: `unmatched_left` counts
/// rows dropped from the accumulated side, `unmatched_right` from each newly
/// joined table.
pub fn join_all(tables: &[&CanonicalTable], on: &str) -> Result<JoinedTable> {
    let [first, second, rest @ ..] = tables else {
        return Err(SchemaError::Invariant {
            detail: format!("join needs at least two tables, got {}", tables.len()),
        }
        .into());
    };

    let mut acc = join(first, second, on)?;
    for next in rest {
        let step = join(&acc.table, next, on)?;
        acc = JoinedTable {
            table: step.table,
            unmatched_left: acc.unmatched_left + step.unmatched_left,
            unmatched_right: acc.unmatched_right + step.unmatched_right,
        };
    }
    Ok(acc)
}
