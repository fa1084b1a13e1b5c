//! Data-quality assessment: missingness, duplication, completeness, and
//! per-column checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::table::{CellKey, Column, ColumnKind, ColumnValues, Table};

/// Dataset-wide missing-cell totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValues {
    pub by_column: BTreeMap<String, usize>,
    pub total_missing: usize,
    pub missing_percentage: f64,
}

/// Exact duplicate rows, with missing cells comparing equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRows {
    pub count: usize,
    pub percentage: f64,
}

/// Rows without any missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCompleteness {
    pub complete_rows: usize,
    pub complete_percentage: f64,
}

/// Checks that only apply to numeric-compatible columns. Booleans count
/// `false` as zero but are excluded from the negative check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericQuality {
    pub zero_count: usize,
    pub negative_count: usize,
    pub infinite_count: usize,
}

/// Per-column quality profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_values: usize,
    pub unique_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_checks: Option<NumericQuality>,
}

/// Full quality-assessment result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    pub missing_values: MissingValues,
    pub duplicate_rows: DuplicateRows,
    pub data_completeness: DataCompleteness,
    pub column_quality: BTreeMap<String, ColumnQuality>,
}

/// Computes missingness, duplication, and per-column quality metrics.
///
/// Has no preconditions: an empty table yields all-zero metrics rather
/// than division errors.
#[derive(Debug, Default)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn numeric_checks(column: &Column) -> Option<NumericQuality> {
    match column.values() {
        ColumnValues::Numeric(cells) => {
            let mut checks = NumericQuality {
                zero_count: 0,
                negative_count: 0,
                infinite_count: 0,
            };
            for value in cells.iter().flatten() {
                if *value == 0.0 {
                    checks.zero_count += 1;
                }
                if *value < 0.0 {
                    checks.negative_count += 1;
                }
                if value.is_infinite() {
                    checks.infinite_count += 1;
                }
            }
            Some(checks)
        }
        ColumnValues::Boolean(cells) => Some(NumericQuality {
            zero_count: cells.iter().flatten().filter(|b| !**b).count(),
            negative_count: 0,
            infinite_count: 0,
        }),
        _ => None,
    }
}

fn distinct_values(column: &Column) -> usize {
    let mut seen = HashSet::new();
    for row in 0..column.len() {
        match column.cell_key(row) {
            CellKey::Missing => {}
            key => {
                seen.insert(key);
            }
        }
    }
    seen.len()
}

fn duplicate_row_count(table: &Table) -> usize {
    let mut seen: HashSet<Vec<CellKey>> = HashSet::new();
    for row in 0..table.row_count() {
        let key: Vec<CellKey> = table.columns().iter().map(|c| c.cell_key(row)).collect();
        seen.insert(key);
    }
    table.row_count() - seen.len()
}

fn complete_row_count(table: &Table) -> usize {
    (0..table.row_count())
        .filter(|&row| {
            table
                .columns()
                .iter()
                .all(|c| c.cell_key(row) != CellKey::Missing)
        })
        .count()
}

#[async_trait]
impl Analyzer for QualityAssessor {
    type Output = QualityResult;

    #[instrument(skip_all, fields(rows = table.row_count(), cols = table.column_count()))]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<QualityResult> {
        let total_cells = table.row_count() * table.column_count();

        let mut by_column = BTreeMap::new();
        let mut total_missing = 0;
        for column in table.columns() {
            let missing = column.missing_count();
            total_missing += missing;
            by_column.insert(column.name().to_string(), missing);
        }

        let duplicates = duplicate_row_count(table);
        let complete = complete_row_count(table);

        let mut column_quality = BTreeMap::new();
        for column in table.columns() {
            let missing = column.missing_count();
            let distinct = distinct_values(column);
            column_quality.insert(
                column.name().to_string(),
                ColumnQuality {
                    kind: column.kind(),
                    missing_count: missing,
                    missing_percentage: percentage(missing, column.len()),
                    unique_values: distinct,
                    unique_percentage: percentage(distinct, column.len()),
                    numeric_checks: numeric_checks(column),
                },
            );
        }

        Ok(QualityResult {
            missing_values: MissingValues {
                by_column,
                total_missing,
                missing_percentage: percentage(total_missing, total_cells),
            },
            duplicate_rows: DuplicateRows {
                count: duplicates,
                percentage: percentage(duplicates, table.row_count()),
            },
            data_completeness: DataCompleteness {
                complete_rows: complete,
                complete_percentage: percentage(complete, table.row_count()),
            },
            column_quality,
        })
    }

    fn name(&self) -> &'static str {
        "quality"
    }

    fn description(&self) -> &str {
        "Missingness, duplication and completeness assessment"
    }
}
