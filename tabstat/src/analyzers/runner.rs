//! The orchestrator: runs every analyzer concurrently over one shared
//! table and assembles the composite report.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument};

use super::correlation::CorrelationAnalyzer;
use super::descriptive::DescriptiveStatsCalculator;
use super::distribution::DistributionAnalyzer;
use super::errors::AnalyzerResult;
use super::hypothesis::HypothesisTestEngine;
use super::outliers::OutlierDetector;
use super::quality::QualityAssessor;
use super::timeseries::TimeSeriesAnalyzer;
use super::traits::Analyzer;
use crate::config::AnalysisConfig;
use crate::report::{AnalysisReport, FileInfo, RunMetadata, Section};
use crate::table::{Table, TableError};

/// Runs the full analyzer suite over a validated table.
///
/// Analyzer failures and panics never abort the run: the affected
/// section degrades to a placeholder and a diagnostic note is recorded.
/// Only structural table violations are fatal.
#[derive(Debug)]
pub struct AnalysisRunner {
    config: AnalysisConfig,
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Resolves a task whose analyzer returns a plain result.
fn resolve<T>(
    name: &str,
    joined: Result<AnalyzerResult<T>, JoinError>,
    metadata: &mut RunMetadata,
) -> Section<T> {
    match joined {
        Ok(Ok(value)) => Section::Ready(value),
        Ok(Err(err)) => {
            error!(analyzer = name, error = %err, "analyzer failed");
            metadata.record_failure(name, err.to_string());
            Section::unavailable(format!("{name} analysis failed"))
        }
        Err(err) => {
            error!(analyzer = name, error = %err, "analyzer task panicked");
            metadata.record_failure(name, err.to_string());
            Section::unavailable(format!("{name} analysis failed"))
        }
    }
}

/// Resolves a task whose analyzer already reports availability itself.
fn resolve_gated<T>(
    name: &str,
    joined: Result<AnalyzerResult<Section<T>>, JoinError>,
    metadata: &mut RunMetadata,
) -> Section<T> {
    match resolve(name, joined, metadata) {
        Section::Ready(section) => section,
        Section::Unavailable { message } => Section::Unavailable { message },
    }
}

/// Spawns one analyzer task, keeping its self-reported name for
/// diagnostics.
fn spawn<A>(
    analyzer: A,
    table: Arc<Table>,
) -> (&'static str, JoinHandle<AnalyzerResult<A::Output>>)
where
    A: Analyzer + 'static,
{
    let name = analyzer.name();
    (
        name,
        tokio::spawn(async move { analyzer.analyze(&table).await }),
    )
}

impl AnalysisRunner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Runs all analyzers concurrently and merges their results.
    ///
    /// Fails only when the table violates its structural invariants.
    #[instrument(skip_all, fields(rows = table.row_count(), cols = table.column_count()))]
    pub async fn run(
        &self,
        table: Table,
        file_info: FileInfo,
    ) -> Result<AnalysisReport, TableError> {
        table.validate()?;
        let mut metadata = RunMetadata::begin();
        let table = Arc::new(table);
        let alpha = self.config.significance_level;

        info!(rows = table.row_count(), cols = table.column_count(), "analysis run started");

        let (quality_name, quality) = spawn(QualityAssessor::new(), table.clone());
        let (descriptive_name, descriptive) =
            spawn(DescriptiveStatsCalculator::new(), table.clone());
        let (correlation_name, correlation) =
            spawn(CorrelationAnalyzer::new(&self.config), table.clone());
        let (distribution_name, distribution) =
            spawn(DistributionAnalyzer::new(alpha), table.clone());
        let (outliers_name, outliers) = spawn(OutlierDetector::new(), table.clone());
        let (hypothesis_name, hypothesis) = spawn(HypothesisTestEngine::new(alpha), table.clone());
        let (timeseries_name, timeseries) = spawn(TimeSeriesAnalyzer::new(alpha), table.clone());

        let (quality, descriptive, correlation, distribution, outliers, hypothesis, timeseries) =
            futures::join!(
                quality,
                descriptive,
                correlation,
                distribution,
                outliers,
                hypothesis,
                timeseries
            );

        let data_quality = resolve(quality_name, quality, &mut metadata);
        let descriptive_stats = resolve(descriptive_name, descriptive, &mut metadata);
        let correlation_analysis = resolve_gated(correlation_name, correlation, &mut metadata);
        let distribution_analysis = resolve_gated(distribution_name, distribution, &mut metadata);
        let outlier_detection = resolve_gated(outliers_name, outliers, &mut metadata);
        let hypothesis_tests = resolve_gated(hypothesis_name, hypothesis, &mut metadata);
        let time_series_analysis = resolve_gated(timeseries_name, timeseries, &mut metadata);

        metadata.finish();
        info!(
            duration_ms = metadata.duration_ms,
            failures = metadata.diagnostics.len(),
            "analysis run finished"
        );

        Ok(AnalysisReport {
            file_info,
            data_quality,
            descriptive_stats,
            correlation_analysis,
            distribution_analysis,
            outlier_detection,
            hypothesis_tests,
            time_series_analysis,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::errors::AnalyzerError;
    use crate::table::Column;
    use std::collections::BTreeMap;

    fn file_info(table: &Table) -> FileInfo {
        FileInfo {
            file_name: "dataset.csv".into(),
            file_path: "/tmp/dataset.csv".into(),
            file_size_mb: 0.1,
            rows: table.row_count(),
            columns: table.column_count(),
            column_names: table.columns().iter().map(|c| c.name().to_string()).collect(),
            column_types: table
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.kind().as_str().to_string()))
                .collect::<BTreeMap<_, _>>(),
            memory_usage_mb: 0.1,
        }
    }

    #[tokio::test]
    async fn full_run_fills_every_section() {
        let table = Table::new(vec![
            Column::numeric("x", (0..40).map(|i| Some(i as f64)).collect()),
            Column::numeric("y", (0..40).map(|i| Some(2.0 * i as f64 + 1.0)).collect()),
            Column::categorical(
                "group",
                (0..40).map(|i| Some(format!("g{}", i % 3))).collect(),
            ),
        ])
        .unwrap();
        let info = file_info(&table);
        let report = AnalysisRunner::default().run(table, info).await.unwrap();

        assert!(report.data_quality.is_ready());
        assert!(report.descriptive_stats.is_ready());
        assert!(report.correlation_analysis.is_ready());
        assert!(report.distribution_analysis.is_ready());
        assert!(report.outlier_detection.is_ready());
        assert!(report.hypothesis_tests.is_ready());
        assert_eq!(
            report.time_series_analysis.message(),
            Some("No time series data detected")
        );
        assert!(report.metadata.diagnostics.is_empty());
        assert!(report.metadata.finished_at.is_some());
    }

    #[tokio::test]
    async fn empty_table_produces_complete_shaped_report() {
        let table = Table::new(vec![]).unwrap();
        let info = file_info(&table);
        let report = AnalysisRunner::default().run(table, info).await.unwrap();

        assert!(report.data_quality.is_ready());
        assert!(!report.correlation_analysis.is_ready());
        assert!(!report.outlier_detection.is_ready());
        assert!(!report.hypothesis_tests.is_ready());
    }

    #[tokio::test]
    async fn failed_task_degrades_to_placeholder_with_diagnostic() {
        let mut metadata = RunMetadata::begin();
        let handle: JoinHandle<AnalyzerResult<u32>> =
            tokio::spawn(async { Err(AnalyzerError::execution("backing store gone")) });
        let section = resolve("quality", handle.await, &mut metadata);
        assert_eq!(section.message(), Some("quality analysis failed"));
        assert_eq!(metadata.diagnostics.len(), 1);
        assert!(metadata.diagnostics[0].message.contains("backing store gone"));
    }

    #[tokio::test]
    async fn panicked_task_degrades_to_placeholder() {
        let mut metadata = RunMetadata::begin();
        let handle: JoinHandle<AnalyzerResult<u32>> = tokio::spawn(async { panic!("boom") });
        let section = resolve("outliers", handle.await, &mut metadata);
        assert_eq!(section.message(), Some("outliers analysis failed"));
        assert_eq!(metadata.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn spawned_tasks_carry_their_analyzers_names() {
        let table = Arc::new(Table::new(vec![]).unwrap());
        let alpha = AnalysisConfig::default().significance_level;

        assert_eq!(spawn(QualityAssessor::new(), table.clone()).0, "quality");
        assert_eq!(
            spawn(DescriptiveStatsCalculator::new(), table.clone()).0,
            "descriptive"
        );
        assert_eq!(spawn(OutlierDetector::new(), table.clone()).0, "outliers");
        assert_eq!(
            spawn(TimeSeriesAnalyzer::new(alpha), table.clone()).0,
            "timeseries"
        );
    }

    #[tokio::test]
    async fn repeated_runs_serialize_identically() {
        let build = || {
            Table::new(vec![
                Column::numeric("a", (0..30).map(|i| Some((i % 7) as f64)).collect()),
                Column::numeric("b", (0..30).map(|i| Some((i % 5) as f64 * 3.0)).collect()),
                Column::categorical(
                    "label",
                    (0..30).map(|i| Some(format!("v{}", i % 4))).collect(),
                ),
            ])
            .unwrap()
        };
        let runner = AnalysisRunner::default();

        let table1 = build();
        let info1 = file_info(&table1);
        let mut report1 = runner.run(table1, info1).await.unwrap();
        let table2 = build();
        let info2 = file_info(&table2);
        let mut report2 = runner.run(table2, info2).await.unwrap();

        // Timing metadata necessarily differs between runs.
        report1.metadata = RunMetadata::begin();
        report2.metadata = report1.metadata.clone();
        assert_eq!(
            serde_json::to_string(&report1).unwrap(),
            serde_json::to_string(&report2).unwrap()
        );
    }
}
