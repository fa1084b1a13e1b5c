//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for one analysis run.
///
/// Passed explicitly to the orchestrator at construction; the engine
/// never reads process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum |Pearson| for a correlation pair to be emitted.
    pub correlation_threshold: f64,
    /// Alpha used for every significance verdict.
    pub significance_level: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.5,
            significance_level: 0.05,
        }
    }
}

impl AnalysisConfig {
    /// Sets the correlation threshold.
    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    /// Sets the significance level.
    pub fn with_significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.correlation_threshold, 0.5);
        assert_eq!(config.significance_level, 0.05);
    }

    #[test]
    fn builders_override_fields() {
        let config = AnalysisConfig::default()
            .with_correlation_threshold(0.8)
            .with_significance_level(0.01);
        assert_eq!(config.correlation_threshold, 0.8);
        assert_eq!(config.significance_level, 0.01);
    }
}
