//! Report assembly types: the top-level [`AnalysisReport`], the
//! [`Section`] availability wrapper, caller-supplied [`FileInfo`], and
//! [`RunMetadata`] timing/diagnostic records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzers::correlation::CorrelationResult;
use crate::analyzers::descriptive::DescriptiveResult;
use crate::analyzers::distribution::DistributionResult;
use crate::analyzers::hypothesis::HypothesisResult;
use crate::analyzers::outliers::OutlierResult;
use crate::analyzers::quality::QualityResult;
use crate::analyzers::timeseries::TimeSeriesResult;

/// One report section: either a computed result or a placeholder
/// explaining why the section could not be produced.
///
/// Serializes untagged, so the placeholder renders as
/// `{"message": "..."}` and the ready variant renders as the result
/// itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ready(T),
    Unavailable { message: String },
}

impl<T> Section<T> {
    /// Placeholder section with the given reason.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Section::Unavailable {
            message: message.into(),
        }
    }

    /// The computed result, if the section is ready.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Unavailable { .. } => None,
        }
    }

    /// Whether the section holds a computed result.
    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    /// The placeholder message, if the section is unavailable.
    pub fn message(&self) -> Option<&str> {
        match self {
            Section::Ready(_) => None,
            Section::Unavailable { message } => Some(message),
        }
    }
}

/// Caller-supplied description of the dataset's origin.
///
/// The engine never touches the filesystem; whoever loaded the table
/// fills this in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file_name: String,
    pub file_path: String,
    pub file_size_mb: f64,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_types: BTreeMap<String, String>,
    pub memory_usage_mb: f64,
}

/// A diagnostic note recorded when an analyzer fails or panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub analyzer: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Timing and diagnostics for one orchestrated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunMetadata {
    /// Starts the clock for a run.
    pub fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
            diagnostics: Vec::new(),
        }
    }

    /// Stops the clock and records the elapsed duration.
    pub fn finish(&mut self) {
        let now = Utc::now();
        self.duration_ms = Some(
            now.signed_duration_since(self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        self.finished_at = Some(now);
    }

    /// Appends a failure note for one analyzer.
    pub fn record_failure(&mut self, analyzer: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            analyzer: analyzer.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}

/// The full output of one orchestrated analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub file_info: FileInfo,
    pub data_quality: Section<QualityResult>,
    pub descriptive_stats: Section<DescriptiveResult>,
    pub correlation_analysis: Section<CorrelationResult>,
    pub distribution_analysis: Section<DistributionResult>,
    pub outlier_detection: Section<OutlierResult>,
    pub hypothesis_tests: Section<HypothesisResult>,
    pub time_series_analysis: Section<TimeSeriesResult>,
    pub metadata: RunMetadata,
}
