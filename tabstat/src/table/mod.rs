//! Columnar data model for the analysis engine.
//!
//! A [`Table`] is an ordered sequence of named, typed columns of equal
//! length. Every cell is explicitly nullable: each column owns a
//! `Vec<Option<T>>` for its value type. Tables are immutable once
//! constructed; every analyzer reads the same shared instance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub mod inference;

/// Errors raised while constructing or validating a [`Table`].
///
/// These are the only fatal errors in the engine: a structurally invalid
/// table is rejected before any analyzer runs.
#[derive(Error, Debug)]
pub enum TableError {
    /// Columns of a table must all have the same number of rows.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column names identify columns and must be unique.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Mixed-type coercion was ambiguous across the entire column.
    #[error("unsupported column type for '{column}'")]
    UnsupportedColumnType { column: String },
}

/// The inferred semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// 64-bit floating point values.
    Numeric,
    /// Free-form string values.
    Categorical,
    /// Timestamps.
    DateTime,
    /// Booleans; treated as a numeric subtype for zero/negative checks.
    Boolean,
}

impl ColumnKind {
    /// Human-readable name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Boolean => "boolean",
        }
    }
}

/// The typed value storage of a column. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Boolean(Vec<Option<bool>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
        }
    }

    fn missing_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::DateTime(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Boolean(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }
}

/// A hashable, comparable view of a single cell.
///
/// Used for duplicate-row detection and distinct-value counting, where
/// `Missing == Missing` and numeric values compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Missing,
    Number(u64),
    Text(String),
    Timestamp(i64),
    Flag(bool),
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    /// Creates a categorical column.
    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(values),
        }
    }

    /// Creates a datetime column.
    pub fn datetime(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::DateTime(values),
        }
    }

    /// Creates a boolean column.
    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Boolean(values),
        }
    }

    /// The column name (its identity within a table).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inferred semantic kind.
    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
            ColumnValues::DateTime(_) => ColumnKind::DateTime,
            ColumnValues::Boolean(_) => ColumnKind::Boolean,
        }
    }

    /// Number of rows, including missing cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has zero rows.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.missing_count()
    }

    /// The raw typed storage.
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// The nullable numeric cells, if this is a numeric column.
    pub fn numeric_cells(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// The nullable string cells, if this is a categorical column.
    pub fn categorical_cells(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Categorical(v) => Some(v),
            _ => None,
        }
    }

    /// The nullable timestamp cells, if this is a datetime column.
    pub fn datetime_cells(&self) -> Option<&[Option<NaiveDateTime>]> {
        match &self.values {
            ColumnValues::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// The nullable boolean cells, if this is a boolean column.
    pub fn boolean_cells(&self) -> Option<&[Option<bool>]> {
        match &self.values {
            ColumnValues::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Non-missing numeric values in original row order.
    ///
    /// Empty for non-numeric columns.
    pub fn non_missing_numeric(&self) -> Vec<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter_map(|c| *c).collect(),
            _ => Vec::new(),
        }
    }

    /// A hashable key for the cell at `row`, with `Missing == Missing`.
    pub fn cell_key(&self, row: usize) -> CellKey {
        match &self.values {
            ColumnValues::Numeric(v) => match v[row] {
                Some(x) => CellKey::Number(x.to_bits()),
                None => CellKey::Missing,
            },
            ColumnValues::Categorical(v) => match &v[row] {
                Some(s) => CellKey::Text(s.clone()),
                None => CellKey::Missing,
            },
            ColumnValues::DateTime(v) => match v[row] {
                Some(ts) => CellKey::Timestamp(ts.and_utc().timestamp_micros()),
                None => CellKey::Missing,
            },
            ColumnValues::Boolean(v) => match v[row] {
                Some(b) => CellKey::Flag(b),
                None => CellKey::Missing,
            },
        }
    }
}

/// An immutable, validated set of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table from columns, validating the structural invariants:
    /// all columns share one length and names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let row_count = columns.first().map(|c| c.len()).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(TableError::LengthMismatch {
                    column: column.name().to_string(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name().to_string()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Re-checks the structural invariants.
    ///
    /// Tables built through [`Table::new`] always pass; the orchestrator
    /// still runs this before spawning analyzers so an invalid table is
    /// rejected as a hard error rather than surfacing mid-analysis.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.len() != self.row_count {
                return Err(TableError::LengthMismatch {
                    column: column.name().to_string(),
                    expected: self.row_count,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of rows shared by every column.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has zero rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Numeric columns in declaration order.
    ///
    /// Booleans are not included: they participate only in the quality
    /// checks, not in the numeric statistics.
    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
            .collect()
    }

    /// Categorical columns in declaration order.
    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Categorical)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_lengths() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(1.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { .. }));
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("a", vec![Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn { .. }));
    }

    #[test]
    fn empty_table_is_valid() {
        let table = Table::new(vec![]).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn numeric_columns_exclude_booleans() {
        let table = Table::new(vec![
            Column::numeric("x", vec![Some(1.0)]),
            Column::boolean("flag", vec![Some(true)]),
            Column::categorical("tag", vec![Some("a".into())]),
        ])
        .unwrap();
        let numeric: Vec<&str> = table.numeric_columns().iter().map(|c| c.name()).collect();
        assert_eq!(numeric, vec!["x"]);
    }

    #[test]
    fn missing_count_plus_non_missing_is_row_count() {
        let col = Column::numeric("x", vec![Some(1.0), None, Some(3.0), None]);
        assert_eq!(col.missing_count() + col.non_missing_numeric().len(), col.len());
    }

    #[test]
    fn cell_keys_treat_missing_as_equal() {
        let col = Column::numeric("x", vec![None, None, Some(1.0)]);
        assert_eq!(col.cell_key(0), col.cell_key(1));
        assert_ne!(col.cell_key(0), col.cell_key(2));
    }
}
