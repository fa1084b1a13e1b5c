//! The core [`Analyzer`] abstraction.

use async_trait::async_trait;
use std::fmt::Debug;

use super::errors::AnalyzerResult;
use crate::table::Table;

/// One self-contained analysis over an immutable table.
///
/// Analyzers are pure readers: they share one table instance and never
/// mutate it, which is what lets the orchestrator run all of them
/// concurrently.
#[async_trait]
pub trait Analyzer: Send + Sync + Debug {
    /// The typed result this analyzer produces.
    type Output: Send;

    /// Runs the analysis against the table.
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Self::Output>;

    /// Stable name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Optional human-readable description.
    fn description(&self) -> &str {
        ""
    }
}
