//! Per-column descriptive summaries for numeric and categorical columns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::stats;
use crate::table::{Column, Table};

/// Summary of one numeric column over its non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub range: f64,
    pub iqr: f64,
    pub std_dev: Option<f64>,
    pub variance: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
}

/// One entry of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summary of one categorical column over its non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    pub most_frequent: Option<String>,
    pub most_frequent_count: usize,
    /// Top 10 values by frequency, ties broken by first appearance.
    pub value_counts: Vec<ValueCount>,
    pub entropy: f64,
}

/// Column-kind tallies for the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub numeric_columns_count: usize,
    pub categorical_columns_count: usize,
    pub total_columns: usize,
}

/// Full descriptive-statistics result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveResult {
    pub numeric_summary: BTreeMap<String, NumericSummary>,
    pub categorical_summary: BTreeMap<String, CategoricalSummary>,
    pub overall_summary: OverallSummary,
}

/// Computes per-column descriptive statistics.
///
/// DateTime and Boolean columns appear in neither summary; they are only
/// counted toward the column total.
#[derive(Debug, Default)]
pub struct DescriptiveStatsCalculator;

impl DescriptiveStatsCalculator {
    pub fn new() -> Self {
        Self
    }
}

fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = stats::mean(values)?;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let q25 = stats::quantile(&sorted, 0.25)?;
    let median = stats::median(&sorted)?;
    let q75 = stats::quantile(&sorted, 0.75)?;
    let std_dev = stats::sample_std(values);
    let coefficient_of_variation = if mean == 0.0 {
        None
    } else {
        std_dev.map(|s| s / mean)
    };

    Some(NumericSummary {
        count: values.len(),
        mean,
        min,
        max,
        q25,
        median,
        q75,
        range: max - min,
        iqr: q75 - q25,
        std_dev,
        variance: stats::sample_variance(values),
        skewness: stats::skewness(values),
        kurtosis: stats::excess_kurtosis(values),
        coefficient_of_variation,
    })
}

fn categorical_summary(column: &Column) -> Option<CategoricalSummary> {
    let cells = column.categorical_cells()?;

    // Counts keep first-appearance order so frequency ties resolve the
    // same way on every run.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in cells.iter().flatten() {
        let entry = counts.entry(value.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(value.as_str());
        }
        *entry += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.iter().map(|v| (*v, counts[v])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let count_values: Vec<usize> = ranked.iter().map(|(_, c)| *c).collect();
    let entropy = if ranked.len() > 1 {
        stats::shannon_entropy(&count_values)
    } else {
        0.0
    };

    Some(CategoricalSummary {
        unique_count: ranked.len(),
        most_frequent: ranked.first().map(|(v, _)| v.to_string()),
        most_frequent_count: ranked.first().map(|(_, c)| *c).unwrap_or(0),
        value_counts: ranked
            .iter()
            .take(10)
            .map(|(v, c)| ValueCount {
                value: v.to_string(),
                count: *c,
            })
            .collect(),
        entropy,
    })
}

#[async_trait]
impl Analyzer for DescriptiveStatsCalculator {
    type Output = DescriptiveResult;

    #[instrument(skip_all, fields(cols = table.column_count()))]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<DescriptiveResult> {
        let mut numeric = BTreeMap::new();
        for column in table.numeric_columns() {
            let values = column.non_missing_numeric();
            if let Some(summary) = numeric_summary(&values) {
                numeric.insert(column.name().to_string(), summary);
            }
        }

        let mut categorical = BTreeMap::new();
        for column in table.categorical_columns() {
            if let Some(summary) = categorical_summary(column) {
                categorical.insert(column.name().to_string(), summary);
            }
        }

        let overall = OverallSummary {
            numeric_columns_count: table.numeric_columns().len(),
            categorical_columns_count: table.categorical_columns().len(),
            total_columns: table.column_count(),
        };

        Ok(DescriptiveResult {
            numeric_summary: numeric,
            categorical_summary: categorical,
            overall_summary: overall,
        })
    }

    fn name(&self) -> &'static str {
        "descriptive"
    }

    fn description(&self) -> &str {
        "Per-column numeric and categorical summaries"
    }
}
