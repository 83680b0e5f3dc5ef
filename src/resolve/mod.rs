// src/resolve/mod.rs
pub mod rules;

use crate::error::{Result, SchemaError};
use crate::table::{
    utils::{clean_str, is_blank, looks_numeric, normalize_key, parse_number},
    CanonicalTable, ColumnData, RawTable, REGION,
};
use tracing::{debug, warn};

pub use rules::{ColumnKind, Fallback, KeywordRule, Policy, RuleSet};

/// First header, left to right, containing any of `keywords`.
///
/// Both sides are lowercased before the substring test, so Latin tokens match
/// case-insensitively while Hangul tokens match exactly.
pub fn find_column<'a, S: AsRef<str>>(table: &'a RawTable, keywords: &[S]) -> Option<&'a str> {
    let unclaimed = vec![false; table.headers.len()];
    find_index(&table.headers, keywords, &unclaimed).map(|i| table.headers[i].as_str())
}

fn header_matches<S: AsRef<str>>(header: &str, keywords: &[S]) -> bool {
    let header = header.to_lowercase();
    keywords.iter().any(|kw| {
        let kw = kw.as_ref();
        !kw.is_empty() && header.contains(&kw.to_lowercase())
    })
}

fn find_index<S: AsRef<str>>(headers: &[String], keywords: &[S], claimed: &[bool]) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .find(|(i, h)| !claimed[*i] && header_matches(h, keywords))
        .map(|(i, _)| i)
}

fn find_all<S: AsRef<str>>(headers: &[String], keywords: &[S], claimed: &[bool]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !claimed[*i] && header_matches(h, keywords))
        .map(|(i, _)| i)
        .collect()
}

/// Positional fallback, kept apart from keyword matching.
pub fn apply_fallback(table: &RawTable, fallback: Fallback, claimed: &[bool]) -> Option<usize> {
    match fallback {
        Fallback::LastTextColumn => (0..table.headers.len()).rev().find(|&i| {
            !claimed[i] && !table.column(i).all(is_blank) && !looks_numeric(table.column(i))
        }),
    }
}

/// Locate the columns for one rule, honoring tiers and the fallback.
fn locate(table: &RawTable, rule: &KeywordRule, claimed: &[bool]) -> Vec<usize> {
    for tier in rule.keyword_tiers() {
        let found = match rule.policy {
            Policy::First => find_index(&table.headers, &tier, claimed).into_iter().collect(),
            Policy::Sum => find_all(&table.headers, &tier, claimed),
        };
        if !found.is_empty() {
            return found;
        }
    }
    if let Some(fallback) = rule.fallback {
        if let Some(idx) = apply_fallback(table, fallback, claimed) {
            warn!(
                field = %rule.canonical,
                column = %table.headers[idx],
                "no keyword matched, using positional fallback"
            );
            return vec![idx];
        }
    }
    Vec::new()
}

fn numeric_cells(
    table: &RawTable,
    rule: &KeywordRule,
    idx: usize,
) -> Result<Vec<Option<f64>>, SchemaError> {
    table
        .column(idx)
        .enumerate()
        .map(|(row, cell)| {
            parse_number(cell).map_err(|value| SchemaError::NotNumeric {
                field: rule.canonical.clone(),
                column: table.headers[idx].clone(),
                row,
                value,
            })
        })
        .collect()
}

fn build_column(table: &RawTable, rule: &KeywordRule, cols: &[usize]) -> Result<ColumnData, SchemaError> {
    match (rule.policy, rule.kind) {
        (Policy::First, ColumnKind::Text) => {
            let is_region = rule.canonical == REGION;
            let cells = table
                .column(cols[0])
                .map(|cell| {
                    let v = if is_region {
                        normalize_key(cell)
                    } else {
                        clean_str(cell)
                    };
                    (!v.is_empty()).then_some(v)
                })
                .collect();
            Ok(ColumnData::Text(cells))
        }
        (Policy::First, ColumnKind::Number) => {
            Ok(ColumnData::Number(numeric_cells(table, rule, cols[0])?))
        }
        (Policy::Sum, _) => {
            let mut totals = vec![0.0; table.num_rows()];
            for &idx in cols {
                for (total, v) in totals.iter_mut().zip(numeric_cells(table, rule, idx)?) {
                    *total += v.unwrap_or(0.0);
                }
            }
            Ok(ColumnData::Number(totals.into_iter().map(Some).collect()))
        }
    }
}

/// Map `table` onto the canonical columns named by `rules`.
///
/// Rules run in order. Each column is claimed by at most one rule, so a later
/// rule never sees a column an earlier rule took. The result holds only the
/// canonical columns, in rule order, minus rows blank in any `drop_blank` rule.
/// The input table is not modified.
pub fn resolve(table: &RawTable, rules: &RuleSet) -> Result<CanonicalTable> {
    let mut claimed = vec![false; table.headers.len()];
    let mut located: Vec<(&KeywordRule, Vec<usize>)> = Vec::with_capacity(rules.rules.len());

    for rule in &rules.rules {
        let cols = locate(table, rule, &claimed);
        if cols.is_empty() {
            if rule.optional {
                debug!(field = %rule.canonical, "optional column not found");
                continue;
            }
            return Err(SchemaError::Unresolved {
                field: rule.canonical.clone(),
                columns: table.headers.clone(),
            }
            .into());
        }
        debug!(
            field = %rule.canonical,
            columns = ?cols.iter().map(|&i| &table.headers[i]).collect::<Vec<_>>(),
            "resolved"
        );
        for &i in &cols {
            claimed[i] = true;
        }
        located.push((rule, cols));
    }

    let mut columns = Vec::with_capacity(located.len());
    let mut keep = vec![true; table.num_rows()];
    for (rule, cols) in &located {
        let data = build_column(table, rule, cols)?;
        if rule.drop_blank {
            let blanks: Vec<bool> = match &data {
                ColumnData::Text(v) => v.iter().map(Option::is_none).collect(),
                ColumnData::Number(v) => v.iter().map(Option::is_none).collect(),
            };
            for (k, blank) in keep.iter_mut().zip(blanks) {
                *k &= !blank;
            }
        }
        columns.push((rule.canonical.clone(), data));
    }

    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped > 0 {
        debug!(rule_set = %rules.name, dropped, "dropped rows missing mandatory fields");
    }
    let columns = columns
        .into_iter()
        .map(|(name, data)| (name, retain_rows(data, &keep)))
        .collect();

    CanonicalTable::from_columns(rules.name.clone(), columns)
}

fn retain_rows(data: ColumnData, keep: &[bool]) -> ColumnData {
    fn retain<T>(v: Vec<T>, keep: &[bool]) -> Vec<T> {
        v.into_iter()
            .zip(keep)
            .filter_map(|(x, k)| k.then_some(x))
            .collect()
    }
    match data {
        ColumnData::Text(v) => ColumnData::Text(retain(v, keep)),
        ColumnData::Number(v) => ColumnData::Number(retain(v, keep)),
    }
}
