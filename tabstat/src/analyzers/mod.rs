//! The analyzer suite and its orchestrator.
//!
//! Each analyzer is an independent, read-only pass over one [`Table`];
//! [`runner::AnalysisRunner`] executes all of them concurrently and
//! assembles the composite report.
//!
//! [`Table`]: crate::table::Table

pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod errors;
pub mod hypothesis;
pub mod outliers;
pub mod quality;
pub mod runner;
pub mod timeseries;
pub mod traits;

pub use correlation::CorrelationAnalyzer;
pub use descriptive::DescriptiveStatsCalculator;
pub use distribution::DistributionAnalyzer;
pub use errors::{AnalyzerError, AnalyzerResult};
pub use hypothesis::HypothesisTestEngine;
pub use outliers::OutlierDetector;
pub use quality::QualityAssessor;
pub use runner::AnalysisRunner;
pub use timeseries::TimeSeriesAnalyzer;
pub use traits::Analyzer;
