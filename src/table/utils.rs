// src/table/utils.rs

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Header cleanup: strip a leading byte-order mark, then surrounding whitespace.
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Join key form of a region name: trimmed, internal whitespace runs collapsed to one space.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_blank(cell: &str) -> bool {
    clean_str(cell).is_empty()
}

/// Parse a statistics cell into a number.
///
/// - blank cells and a lone `-` are missing values (`Ok(None)`)
/// - thousands separators are removed (`"1,234"` → 1234)
/// - `NaN` and infinities are rejected like any other non-number
/// - anything else that does not parse is an error carrying the cleaned text
pub fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() || cleaned == "-" {
        return Ok(None);
    }
    let digits: String = cleaned.chars().filter(|c| *c != ',').collect();
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(cleaned),
    }
}

/// True when every non-blank cell parses as a number (and there is at least one).
pub fn looks_numeric<'a>(cells: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = false;
    for cell in cells {
        match parse_number(cell) {
            Ok(Some(_)) => seen = true,
            Ok(None) => {}
            Err(_) => return false,
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_header_strips_bom_and_padding() {
        assert_eq!(clean_header("\u{feff} 경찰서명 "), "경찰서명");
        assert_eq!(clean_header("\t합계\r"), "합계");
    }

    #[test]
    fn normalize_key_collapses_spacing() {
        assert_eq!(normalize_key("  해운대   구 "), "해운대 구");
        assert_eq!(normalize_key("동래"), "동래");
    }

    #[test]
    fn parse_number_policy() {
        assert_eq!(parse_number(" 1,234 "), Ok(Some(1234.0)));
        assert_eq!(parse_number("\"35.1\""), Ok(Some(35.1)));
        assert_eq!(parse_number(""), Ok(None));
        assert_eq!(parse_number("-"), Ok(None));
        assert_eq!(parse_number("n/a"), Err("n/a".to_string()));
        assert_eq!(parse_number("NaN"), Err("NaN".to_string()));
        assert_eq!(parse_number("inf"), Err("inf".to_string()));
        assert_eq!(parse_number("-Infinity"), Err("-Infinity".to_string()));
    }

    #[test]
    fn looks_numeric_needs_one_value() {
        assert!(looks_numeric(["1", "", "2.5"]));
        assert!(!looks_numeric(["", ""]));
        assert!(!looks_numeric(["1", "중부"]));
    }
}
