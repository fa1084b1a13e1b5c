//! One-sample and two-sample significance tests across numeric columns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::report::Section;
use crate::stats::inference::{mann_whitney_u, one_sample_t, two_sample_t};
use crate::table::Table;

/// Non-missing values required for the one-sample t-test (exclusive).
const ONE_SAMPLE_MIN: usize = 30;

/// Non-missing values required per column for two-sample tests
/// (exclusive).
const TWO_SAMPLE_MIN: usize = 10;

/// One-sample t-test of `H0: mean = 0` for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneSampleTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub mean: f64,
}

/// Statistic/p-value/verdict triple shared by the two-sample tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

/// Parametric and non-parametric comparison of one column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleTests {
    pub independent_t_test: Option<TestOutcome>,
    pub mann_whitney_u: Option<TestOutcome>,
}

/// Full hypothesis-testing result. Two-sample keys are
/// `"{col1}_vs_{col2}"` in column declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisResult {
    pub one_sample_tests: BTreeMap<String, OneSampleTest>,
    pub two_sample_tests: BTreeMap<String, TwoSampleTests>,
}

/// Runs t-tests and Mann-Whitney U tests over the numeric columns.
///
/// The whole section is unavailable below two numeric columns; each
/// sub-test additionally gates on its own sample-size requirement.
#[derive(Debug)]
pub struct HypothesisTestEngine {
    alpha: f64,
}

impl HypothesisTestEngine {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    fn outcome(&self, statistic: f64, p_value: f64) -> TestOutcome {
        TestOutcome {
            statistic,
            p_value,
            significant: p_value < self.alpha,
        }
    }
}

#[async_trait]
impl Analyzer for HypothesisTestEngine {
    type Output = Section<HypothesisResult>;

    #[instrument(skip_all)]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Section<HypothesisResult>> {
        let numeric = table.numeric_columns();
        if numeric.len() < 2 {
            return Ok(Section::unavailable(
                "Insufficient numeric columns for hypothesis testing",
            ));
        }

        let samples: Vec<(String, Vec<f64>)> = numeric
            .iter()
            .map(|c| (c.name().to_string(), c.non_missing_numeric()))
            .collect();

        let mut one_sample = BTreeMap::new();
        for (name, values) in &samples {
            if values.len() <= ONE_SAMPLE_MIN {
                continue;
            }
            if let (Some(test), Some(mean)) = (one_sample_t(values, 0.0), crate::stats::mean(values))
            {
                one_sample.insert(
                    name.clone(),
                    OneSampleTest {
                        t_statistic: test.statistic,
                        p_value: test.p_value,
                        significant: test.p_value < self.alpha,
                        mean,
                    },
                );
            }
        }

        let mut two_sample = BTreeMap::new();
        for i in 0..samples.len() {
            for j in (i + 1)..samples.len() {
                let (name_a, a) = &samples[i];
                let (name_b, b) = &samples[j];
                if a.len() <= TWO_SAMPLE_MIN || b.len() <= TWO_SAMPLE_MIN {
                    continue;
                }
                two_sample.insert(
                    format!("{name_a}_vs_{name_b}"),
                    TwoSampleTests {
                        independent_t_test: two_sample_t(a, b)
                            .map(|t| self.outcome(t.statistic, t.p_value)),
                        mann_whitney_u: mann_whitney_u(a, b)
                            .map(|t| self.outcome(t.statistic, t.p_value)),
                    },
                );
            }
        }

        Ok(Section::Ready(HypothesisResult {
            one_sample_tests: one_sample,
            two_sample_tests: two_sample,
        }))
    }

    fn name(&self) -> &'static str {
        "hypothesis"
    }

    fn description(&self) -> &str {
        "One-sample and two-sample significance tests"
    }
}
