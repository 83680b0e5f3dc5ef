// src/normalize/households.rs

use crate::error::Result;
use crate::table::{CanonicalTable, ColumnData, REGION};

pub const SINGLE_PERSON_HOUSEHOLDS: &str = "single_person_households";
pub const RULE_SET: &str = "single_person_households";

/// Single-person household counts per district. Embedded, never read from disk.
pub const DISTRICTS: [(&str, f64); 15] = [
    ("중부", 11786.0),
    ("동래", 35220.0),
    ("영도", 20116.0),
    ("동부", 18603.0),
    ("부산진", 70609.0),
    ("서부", 20760.0),
    ("남부", 40521.0),
    ("해운대", 50516.0),
    ("사상", 36299.0),
    ("금정", 40412.0),
    ("사하", 46442.0),
    ("연제", 30846.0),
    ("강서", 17355.0),
    ("북부", 36975.0),
    ("기장", 22500.0),
];

pub fn table() -> Result<CanonicalTable> {
    CanonicalTable::from_columns(
        RULE_SET,
        vec![
            (
                REGION.to_string(),
                ColumnData::Text(DISTRICTS.iter().map(|(r, _)| Some(r.to_string())).collect()),
            ),
            (
                SINGLE_PERSON_HOUSEHOLDS.to_string(),
                ColumnData::Number(DISTRICTS.iter().map(|(_, n)| Some(*n)).collect()),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn embedded_table_has_fifteen_districts() -> Result<()> {
        let t = table()?;
        assert_eq!(t.num_rows(), 15);
        assert_eq!(t.column_names(), vec!["region", "single_person_households"]);
        assert_eq!(t.regions().unwrap().value(4), "부산진");
        assert_eq!(t.number(SINGLE_PERSON_HOUSEHOLDS).unwrap().value(4), 70609.0);
        Ok(())
    }
}
