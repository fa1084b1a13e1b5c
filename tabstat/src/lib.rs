//! # tabstat
//!
//! A batch statistical-profiling engine for tabular datasets. Given an
//! in-memory [`Table`], the engine produces a structured
//! [`AnalysisReport`] covering data quality, descriptive statistics,
//! correlation structure, distribution shape and normality, outliers,
//! hypothesis tests, and time-series trends.
//!
//! The engine performs no I/O: loading data into a [`Table`] and
//! rendering the report are collaborator concerns. Every analyzer reads
//! the same immutable table and runs concurrently; a failure in one
//! degrades its report section to a placeholder without affecting the
//! others.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tabstat::{AnalysisConfig, AnalysisRunner, Column, FileInfo, Table};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let table = Table::new(vec![
//!     Column::numeric("price", vec![Some(9.5), Some(12.0), None]),
//!     Column::categorical("region", vec![Some("north".into()), None, Some("south".into())]),
//! ])?;
//!
//! let file_info = FileInfo {
//!     file_name: "sales.csv".into(),
//!     file_path: "/data/sales.csv".into(),
//!     file_size_mb: 0.4,
//!     rows: table.row_count(),
//!     columns: table.column_count(),
//!     column_names: vec!["price".into(), "region".into()],
//!     column_types: Default::default(),
//!     memory_usage_mb: 0.1,
//! };
//!
//! let runner = AnalysisRunner::new(AnalysisConfig::default());
//! let report = runner.run(table, file_info).await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod analyzers;
pub mod config;
pub mod logging;
pub mod report;
pub mod stats;
pub mod table;

pub use analyzers::{
    Analyzer, AnalyzerError, AnalyzerResult, AnalysisRunner, CorrelationAnalyzer,
    DescriptiveStatsCalculator, DistributionAnalyzer, HypothesisTestEngine, OutlierDetector,
    QualityAssessor, TimeSeriesAnalyzer,
};
pub use config::AnalysisConfig;
pub use report::{AnalysisReport, FileInfo, RunMetadata, Section};
pub use table::{Column, ColumnKind, Table, TableError};
