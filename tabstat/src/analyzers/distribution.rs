//! Distribution shape and normality profiling per numeric column.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::report::Section;
use crate::stats::normality::{kolmogorov_smirnov, shapiro_wilk, NormalityTest};
use crate::stats::{excess_kurtosis, skewness};
use crate::table::Table;

/// Minimum non-missing values for a column to be profiled.
const MIN_SAMPLE: usize = 10;

/// Largest sample the Shapiro-Wilk approximation is applied to.
const SHAPIRO_MAX_SAMPLE: usize = 5000;

/// Categorical shape label derived from skewness and excess kurtosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionShape {
    #[serde(rename = "Normal-like")]
    NormalLike,
    #[serde(rename = "Leptokurtic (peaked)")]
    Leptokurtic,
    #[serde(rename = "Platykurtic (flat)")]
    Platykurtic,
    #[serde(rename = "Right-skewed")]
    RightSkewed,
    #[serde(rename = "Left-skewed")]
    LeftSkewed,
}

/// One normality test with its verdict at alpha = 0.05.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityVerdict {
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
}

impl NormalityVerdict {
    fn from_test(test: NormalityTest, alpha: f64) -> Self {
        Self {
            statistic: test.statistic,
            p_value: test.p_value,
            is_normal: test.p_value > alpha,
        }
    }
}

/// Shape and normality profile of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionProfile {
    pub sample_size: usize,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub is_symmetric: Option<bool>,
    pub shape: Option<DistributionShape>,
    pub shapiro_wilk: Option<NormalityVerdict>,
    pub kolmogorov_smirnov: Option<NormalityVerdict>,
}

/// Per-column distribution profiles, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionResult {
    pub columns: BTreeMap<String, DistributionProfile>,
}

fn classify(skew: f64, kurt: f64) -> DistributionShape {
    if skew.abs() < 0.5 {
        if kurt >= 0.5 {
            DistributionShape::Leptokurtic
        } else if kurt <= -0.5 {
            DistributionShape::Platykurtic
        } else {
            DistributionShape::NormalLike
        }
    } else if skew > 0.5 {
        DistributionShape::RightSkewed
    } else {
        DistributionShape::LeftSkewed
    }
}

/// Profiles each numeric column with at least [`MIN_SAMPLE`] non-missing
/// values. Smaller columns are absent from the result, not errors.
#[derive(Debug)]
pub struct DistributionAnalyzer {
    alpha: f64,
}

impl DistributionAnalyzer {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

#[async_trait]
impl Analyzer for DistributionAnalyzer {
    type Output = Section<DistributionResult>;

    #[instrument(skip_all)]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Section<DistributionResult>> {
        let numeric = table.numeric_columns();
        if numeric.is_empty() {
            return Ok(Section::unavailable(
                "No numeric columns for distribution analysis",
            ));
        }

        let mut columns = BTreeMap::new();
        for column in numeric {
            let values = column.non_missing_numeric();
            if values.len() < MIN_SAMPLE {
                continue;
            }

            let skew = skewness(&values);
            let kurt = excess_kurtosis(&values);
            let shape = match (skew, kurt) {
                (Some(s), Some(k)) => Some(classify(s, k)),
                _ => None,
            };

            let shapiro = if values.len() <= SHAPIRO_MAX_SAMPLE {
                shapiro_wilk(&values).map(|t| NormalityVerdict::from_test(t, self.alpha))
            } else {
                None
            };
            let ks = kolmogorov_smirnov(&values)
                .map(|t| NormalityVerdict::from_test(t, self.alpha));

            columns.insert(
                column.name().to_string(),
                DistributionProfile {
                    sample_size: values.len(),
                    skewness: skew,
                    kurtosis: kurt,
                    is_symmetric: skew.map(|s| s.abs() < 0.5),
                    shape,
                    shapiro_wilk: shapiro,
                    kolmogorov_smirnov: ks,
                },
            );
        }

        Ok(Section::Ready(DistributionResult { columns }))
    }

    fn name(&self) -> &'static str {
        "distribution"
    }

    fn description(&self) -> &str {
        "Shape statistics and normality testing"
    }
}
