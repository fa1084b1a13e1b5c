//! Outlier detection with two independent methods per numeric column.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::report::Section;
use crate::stats;
use crate::table::Table;

/// Minimum non-missing values for a column to be checked.
const MIN_SAMPLE: usize = 10;

/// |z| cutoff for the z-score method.
const ZSCORE_THRESHOLD: f64 = 3.0;

/// Flagged values reported per method.
const SAMPLE_CAP: usize = 10;

/// Tukey-fence outliers: values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrOutliers {
    pub count: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// First 10 flagged values in original row order.
    pub outlier_values: Vec<f64>,
}

/// Standardized-score outliers: values with `|z| > 3` under the sample
/// mean and standard deviation. A zero-variance column flags nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreOutliers {
    pub count: usize,
    pub percentage: f64,
    pub threshold: f64,
    /// First 10 flagged values in original row order.
    pub outlier_values: Vec<f64>,
}

/// Both methods' findings for one column. The methods are independent
/// and may disagree; no reconciliation is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSet {
    pub iqr_method: IqrOutliers,
    pub zscore_method: ZScoreOutliers,
}

/// Per-column outlier sets, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierResult {
    pub columns: BTreeMap<String, OutlierSet>,
}

/// Runs the IQR and z-score methods over each numeric column with at
/// least [`MIN_SAMPLE`] non-missing values.
#[derive(Debug, Default)]
pub struct OutlierDetector;

impl OutlierDetector {
    pub fn new() -> Self {
        Self
    }
}

fn iqr_outliers(values: &[f64]) -> Option<IqrOutliers> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q1 = stats::quantile(&sorted, 0.25)?;
    let q3 = stats::quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    let flagged: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lower || *v > upper)
        .collect();

    Some(IqrOutliers {
        count: flagged.len(),
        percentage: flagged.len() as f64 / values.len() as f64 * 100.0,
        lower_bound: lower,
        upper_bound: upper,
        outlier_values: flagged.into_iter().take(SAMPLE_CAP).collect(),
    })
}

fn zscore_outliers(values: &[f64]) -> ZScoreOutliers {
    let flagged: Vec<f64> = match (stats::mean(values), stats::sample_std(values)) {
        (Some(mean), Some(std)) if std > 0.0 => values
            .iter()
            .copied()
            .filter(|v| ((v - mean) / std).abs() > ZSCORE_THRESHOLD)
            .collect(),
        // Zero spread: no value can clear the threshold.
        _ => Vec::new(),
    };

    ZScoreOutliers {
        count: flagged.len(),
        percentage: flagged.len() as f64 / values.len() as f64 * 100.0,
        threshold: ZSCORE_THRESHOLD,
        outlier_values: flagged.into_iter().take(SAMPLE_CAP).collect(),
    }
}

#[async_trait]
impl Analyzer for OutlierDetector {
    type Output = Section<OutlierResult>;

    #[instrument(skip_all)]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Section<OutlierResult>> {
        let numeric = table.numeric_columns();
        if numeric.is_empty() {
            return Ok(Section::unavailable(
                "No numeric columns for outlier detection",
            ));
        }

        let mut columns = BTreeMap::new();
        for column in numeric {
            let values = column.non_missing_numeric();
            if values.len() < MIN_SAMPLE {
                continue;
            }
            let Some(iqr) = iqr_outliers(&values) else {
                continue;
            };
            columns.insert(
                column.name().to_string(),
                OutlierSet {
                    iqr_method: iqr,
                    zscore_method: zscore_outliers(&values),
                },
            );
        }

        Ok(Section::Ready(OutlierResult { columns }))
    }

    fn name(&self) -> &'static str {
        "outliers"
    }

    fn description(&self) -> &str {
        "IQR and z-score outlier detection"
    }
}
