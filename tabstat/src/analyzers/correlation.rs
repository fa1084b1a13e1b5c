//! Pairwise correlation structure over the numeric columns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::config::AnalysisConfig;
use crate::report::Section;
use crate::stats;
use crate::table::{Column, Table};

/// Qualitative strength label for an emitted correlation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationStrength {
    Moderate,
    Strong,
}

/// One column pair whose Pearson correlation cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column_a: String,
    pub column_b: String,
    pub pearson: f64,
    pub spearman: Option<f64>,
    pub strength: CorrelationStrength,
}

/// Pair totals and the threshold used for this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub total_pairs: usize,
    pub strong_correlations_count: usize,
    pub threshold_used: f64,
}

/// Full correlation-analysis result.
///
/// Matrix rows/columns follow `columns` order. Cells are `None` when a
/// pair has fewer than two complete observations or a zero-variance
/// margin; the diagonal is fixed at `Some(1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub columns: Vec<String>,
    pub pearson_matrix: Vec<Vec<Option<f64>>>,
    pub spearman_matrix: Vec<Vec<Option<f64>>>,
    pub strong_correlations: Vec<CorrelationPair>,
    pub correlation_summary: CorrelationSummary,
}

/// Computes Pearson and Spearman matrices over pairwise-complete
/// observations and extracts pairs above the configured threshold.
#[derive(Debug)]
pub struct CorrelationAnalyzer {
    threshold: f64,
}

impl CorrelationAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            threshold: config.correlation_threshold,
        }
    }
}

/// Rows where both columns are non-missing.
fn complete_pairs(a: &Column, b: &Column) -> (Vec<f64>, Vec<f64>) {
    let (Some(xs), Some(ys)) = (a.numeric_cells(), b.numeric_cells()) else {
        return (Vec::new(), Vec::new());
    };
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (x, y) in xs.iter().zip(ys) {
        if let (Some(x), Some(y)) = (x, y) {
            left.push(*x);
            right.push(*y);
        }
    }
    (left, right)
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let mx = stats::mean(xs)?;
    let my = stats::mean(ys)?;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let rx = stats::average_ranks(xs);
    let ry = stats::average_ranks(ys);
    pearson(&rx, &ry)
}

#[async_trait]
impl Analyzer for CorrelationAnalyzer {
    type Output = Section<CorrelationResult>;

    #[instrument(skip_all, fields(threshold = self.threshold))]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Section<CorrelationResult>> {
        let numeric = table.numeric_columns();
        if numeric.len() < 2 {
            return Ok(Section::unavailable(
                "Insufficient numeric columns for correlation analysis",
            ));
        }

        let k = numeric.len();
        let mut pearson_matrix = vec![vec![None; k]; k];
        let mut spearman_matrix = vec![vec![None; k]; k];
        let mut strong = Vec::new();

        for i in 0..k {
            pearson_matrix[i][i] = Some(1.0);
            spearman_matrix[i][i] = Some(1.0);
            for j in (i + 1)..k {
                let (xs, ys) = complete_pairs(numeric[i], numeric[j]);
                let p = pearson(&xs, &ys);
                let s = spearman(&xs, &ys);
                pearson_matrix[i][j] = p;
                pearson_matrix[j][i] = p;
                spearman_matrix[i][j] = s;
                spearman_matrix[j][i] = s;

                if let Some(p) = p {
                    if p.abs() >= self.threshold {
                        strong.push(CorrelationPair {
                            column_a: numeric[i].name().to_string(),
                            column_b: numeric[j].name().to_string(),
                            pearson: p,
                            spearman: s,
                            strength: if p.abs() >= 0.7 {
                                CorrelationStrength::Strong
                            } else {
                                CorrelationStrength::Moderate
                            },
                        });
                    }
                }
            }
        }

        Ok(Section::Ready(CorrelationResult {
            columns: numeric.iter().map(|c| c.name().to_string()).collect(),
            pearson_matrix,
            spearman_matrix,
            correlation_summary: CorrelationSummary {
                total_pairs: k * (k - 1) / 2,
                strong_correlations_count: strong.len(),
                threshold_used: self.threshold,
            },
            strong_correlations: strong,
        }))
    }

    fn name(&self) -> &'static str {
        "correlation"
    }

    fn description(&self) -> &str {
        "Pearson/Spearman matrices and threshold-crossing pairs"
    }
}
