//! Type inference over raw string cells.
//!
//! Classification runs per column, in priority order: boolean, then
//! numeric, then timestamp, then categorical. A column earns a kind only
//! when every non-missing cell parses under it; a name that hints at
//! dates (contains "date" or "time") promotes the timestamp check ahead
//! of the numeric one. Empty strings are missing cells.

use chrono::NaiveDateTime;

use super::{Column, Table, TableError};

/// Timestamp layouts accepted by inference, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Parses one cell as a timestamp, trying RFC 3339 first and then the
/// fixed layouts. Date-only layouts resolve to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
        if let Ok(d) = chrono::NaiveDate::parse_from_str(trimmed, format) {
            return Some(d.and_hms_opt(0, 0, 0)?);
        }
    }
    None
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn is_missing(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn name_hints_datetime(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("date") || lower.contains("time")
}

/// Whether `parse` succeeds for every non-missing cell. Columns that are
/// entirely missing never qualify.
fn all_cells_parse<T>(cells: &[String], parse: impl Fn(&str) -> Option<T>) -> bool {
    let mut any = false;
    for cell in cells {
        if is_missing(cell) {
            continue;
        }
        if parse(cell).is_none() {
            return false;
        }
        any = true;
    }
    any
}

fn infer_column(name: &str, cells: &[String]) -> Column {
    if all_cells_parse(cells, parse_boolean) {
        let values = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse_boolean(c) })
            .collect();
        return Column::boolean(name, values);
    }

    let datetime_first = name_hints_datetime(name);
    if datetime_first && all_cells_parse(cells, parse_timestamp) {
        let values = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse_timestamp(c) })
            .collect();
        return Column::datetime(name, values);
    }

    if all_cells_parse(cells, parse_numeric) {
        let values = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse_numeric(c) })
            .collect();
        return Column::numeric(name, values);
    }

    if !datetime_first && all_cells_parse(cells, parse_timestamp) {
        let values = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse_timestamp(c) })
            .collect();
        return Column::datetime(name, values);
    }

    let values = cells
        .iter()
        .map(|c| {
            if is_missing(c) {
                None
            } else {
                Some(c.trim().to_string())
            }
        })
        .collect();
    Column::categorical(name, values)
}

impl Table {
    /// Builds a table from raw string columns, inferring each column's
    /// kind. `columns` pairs a name with its cells; empty strings become
    /// missing cells.
    pub fn from_raw(columns: Vec<(String, Vec<String>)>) -> Result<Self, TableError> {
        let inferred = columns
            .into_iter()
            .map(|(name, cells)| infer_column(&name, &cells))
            .collect();
        Table::new(inferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    fn raw(name: &str, cells: &[&str]) -> (String, Vec<String>) {
        (
            name.to_string(),
            cells.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[test]
    fn booleans_win_over_categorical() {
        let table = Table::from_raw(vec![raw("active", &["true", "FALSE", ""])]).unwrap();
        let col = table.column("active").unwrap();
        assert_eq!(col.kind(), ColumnKind::Boolean);
        assert_eq!(col.missing_count(), 1);
    }

    #[test]
    fn zero_one_columns_stay_numeric() {
        let table = Table::from_raw(vec![raw("flag", &["0", "1", "1"])]).unwrap();
        assert_eq!(table.column("flag").unwrap().kind(), ColumnKind::Numeric);
    }

    #[test]
    fn date_name_hint_beats_numeric_parse() {
        // All cells parse as dates but not as numbers, so the hint only
        // changes priority, not the outcome; the interesting case is a
        // pure date column without any hint in the name.
        let table = Table::from_raw(vec![
            raw("created_date", &["2024-01-01", "2024-01-02"]),
            raw("label", &["2024-01-01", "2024-01-02"]),
        ])
        .unwrap();
        assert_eq!(
            table.column("created_date").unwrap().kind(),
            ColumnKind::DateTime
        );
        assert_eq!(table.column("label").unwrap().kind(), ColumnKind::DateTime);
    }

    #[test]
    fn mixed_cells_fall_back_to_categorical() {
        let table = Table::from_raw(vec![raw("mixed", &["1.5", "apple", "true"])]).unwrap();
        assert_eq!(table.column("mixed").unwrap().kind(), ColumnKind::Categorical);
    }

    #[test]
    fn all_missing_column_is_categorical() {
        let table = Table::from_raw(vec![raw("blank", &["", "", ""])]).unwrap();
        let col = table.column("blank").unwrap();
        assert_eq!(col.kind(), ColumnKind::Categorical);
        assert_eq!(col.missing_count(), 3);
    }

    #[test]
    fn timestamp_layouts_parse() {
        assert!(parse_timestamp("2024-03-05 12:30:00").is_some());
        assert!(parse_timestamp("2024-03-05T12:30:00").is_some());
        assert!(parse_timestamp("2024-03-05").is_some());
        assert!(parse_timestamp("03/05/2024").is_some());
        assert!(parse_timestamp("2024-03-05T12:30:00+02:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
