//! Date-column detection, interval frequency, and linear trends.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::instrument;

use super::errors::AnalyzerResult;
use super::traits::Analyzer;
use crate::report::Section;
use crate::stats::inference::index_trend;
use crate::table::inference::parse_timestamp;
use crate::table::{Column, ColumnKind, Table};

/// Paired (date, value) rows required for a trend fit (exclusive).
const TREND_MIN_ROWS: usize = 10;

/// Numeric columns considered for trends, by declaration order.
const TREND_COLUMN_CAP: usize = 3;

/// Observed timestamp span of one date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_days: i64,
}

/// Distinct calendar coverage of the observed timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCoverage {
    pub daily_coverage: usize,
    pub monthly_coverage: usize,
    pub yearly_coverage: usize,
}

/// Gap statistics over the sorted timestamps, in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    pub total_records: usize,
    pub unique_dates: usize,
    /// Modal consecutive gap; ties resolve to the first-observed gap.
    pub most_common_interval_seconds: i64,
    pub avg_interval_seconds: f64,
    pub data_coverage: DataCoverage,
}

/// Direction label of a fitted trend. `Stable` only at exactly zero
/// slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Least-squares trend of one numeric column against its date-sorted
/// row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub trend_direction: TrendDirection,
    pub significant_trend: bool,
}

/// Everything derived from one qualifying date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateColumnAnalysis {
    pub date_range: DateRange,
    pub frequency_analysis: Option<FrequencyAnalysis>,
    pub trend_analysis: BTreeMap<String, TrendResult>,
}

/// Per-date-column analyses, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResult {
    pub date_columns: BTreeMap<String, DateColumnAnalysis>,
}

/// Detects date columns and computes range, frequency, and trends.
#[derive(Debug)]
pub struct TimeSeriesAnalyzer {
    alpha: f64,
}

impl TimeSeriesAnalyzer {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

fn name_hints_datetime(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("date") || lower.contains("time")
}

/// Nullable timestamps of a qualifying date column: either typed
/// DateTime, or a name-hinted categorical whose cells all parse.
fn date_cells(column: &Column) -> Option<Vec<Option<NaiveDateTime>>> {
    if column.kind() == ColumnKind::DateTime {
        return column.datetime_cells().map(|c| c.to_vec());
    }
    if !name_hints_datetime(column.name()) {
        return None;
    }
    let cells = column.categorical_cells()?;
    let mut parsed = Vec::with_capacity(cells.len());
    let mut any = false;
    for cell in cells {
        match cell {
            None => parsed.push(None),
            Some(raw) => {
                let ts = parse_timestamp(raw)?;
                parsed.push(Some(ts));
                any = true;
            }
        }
    }
    any.then_some(parsed)
}

fn frequency_analysis(timestamps: &[NaiveDateTime]) -> Option<FrequencyAnalysis> {
    if timestamps.len() < 2 {
        return None;
    }
    let mut sorted = timestamps.to_vec();
    sorted.sort();

    let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|w| w[1].signed_duration_since(w[0]).num_seconds())
        .collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    let mut modal = gaps[0];
    let mut modal_count = 0;
    for &gap in &gaps {
        let count = counts.entry(gap).or_insert(0);
        *count += 1;
        if *count > modal_count {
            modal = gap;
            modal_count = *count;
        }
    }

    let unique: HashSet<&NaiveDateTime> = sorted.iter().collect();
    let days: HashSet<_> = sorted.iter().map(|t| t.date()).collect();
    let months: HashSet<_> = sorted.iter().map(|t| (t.year(), t.month())).collect();
    let years: HashSet<_> = sorted.iter().map(|t| t.year()).collect();

    Some(FrequencyAnalysis {
        total_records: sorted.len(),
        unique_dates: unique.len(),
        most_common_interval_seconds: modal,
        avg_interval_seconds: gaps.iter().sum::<i64>() as f64 / gaps.len() as f64,
        data_coverage: DataCoverage {
            daily_coverage: days.len(),
            monthly_coverage: months.len(),
            yearly_coverage: years.len(),
        },
    })
}

fn trend_for(
    dates: &[Option<NaiveDateTime>],
    values: &[Option<f64>],
    alpha: f64,
) -> Option<TrendResult> {
    let mut paired: Vec<(NaiveDateTime, f64)> = dates
        .iter()
        .zip(values)
        .filter_map(|(d, v)| Some(((*d)?, (*v)?)))
        .collect();
    if paired.len() <= TREND_MIN_ROWS {
        return None;
    }
    // Stable sort keeps the original row order within equal dates.
    paired.sort_by_key(|(d, _)| *d);

    let series: Vec<f64> = paired.iter().map(|(_, v)| *v).collect();
    let fit = index_trend(&series)?;

    let direction = if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else if fit.slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Some(TrendResult {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        p_value: fit.p_value,
        trend_direction: direction,
        significant_trend: fit.p_value < alpha,
    })
}

#[async_trait]
impl Analyzer for TimeSeriesAnalyzer {
    type Output = Section<TimeSeriesResult>;

    #[instrument(skip_all)]
    async fn analyze(&self, table: &Table) -> AnalyzerResult<Section<TimeSeriesResult>> {
        let detected: Vec<(&Column, Vec<Option<NaiveDateTime>>)> = table
            .columns()
            .iter()
            .filter_map(|c| date_cells(c).map(|cells| (c, cells)))
            .collect();

        if detected.is_empty() {
            return Ok(Section::unavailable("No time series data detected"));
        }

        let trend_columns: Vec<&Column> = table
            .numeric_columns()
            .into_iter()
            .take(TREND_COLUMN_CAP)
            .collect();

        let mut date_columns = BTreeMap::new();
        for (column, cells) in detected {
            let timestamps: Vec<NaiveDateTime> = cells.iter().flatten().copied().collect();
            let (Some(start), Some(end)) = (
                timestamps.iter().min().copied(),
                timestamps.iter().max().copied(),
            ) else {
                continue;
            };

            let mut trends = BTreeMap::new();
            for numeric in &trend_columns {
                if let Some(values) = numeric.numeric_cells() {
                    if let Some(trend) = trend_for(&cells, values, self.alpha) {
                        trends.insert(numeric.name().to_string(), trend);
                    }
                }
            }

            date_columns.insert(
                column.name().to_string(),
                DateColumnAnalysis {
                    date_range: DateRange {
                        start,
                        end,
                        duration_days: end.signed_duration_since(start).num_days(),
                    },
                    frequency_analysis: frequency_analysis(&timestamps),
                    trend_analysis: trends,
                },
            );
        }

        Ok(Section::Ready(TimeSeriesResult { date_columns }))
    }

    fn name(&self) -> &'static str {
        "timeseries"
    }

    fn description(&self) -> &str {
        "Date detection, interval frequency and trend fitting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn analyzer() -> TimeSeriesAnalyzer {
        TimeSeriesAnalyzer::new(0.05)
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn no_date_columns_yields_placeholder() {
        let table = Table::new(vec![Column::numeric("x", vec![Some(1.0)])]).unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        assert_eq!(section.message(), Some("No time series data detected"));
    }

    #[tokio::test]
    async fn daily_series_reports_range_and_modal_gap() {
        let dates: Vec<Option<NaiveDateTime>> = (1..=15).map(|d| Some(day(d))).collect();
        let table = Table::new(vec![Column::datetime("ts", dates)]).unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        let analysis = &section.ready().unwrap().date_columns["ts"];

        assert_eq!(analysis.date_range.start, day(1));
        assert_eq!(analysis.date_range.end, day(15));
        assert_eq!(analysis.date_range.duration_days, 14);

        let freq = analysis.frequency_analysis.as_ref().unwrap();
        assert_eq!(freq.total_records, 15);
        assert_eq!(freq.unique_dates, 15);
        assert_eq!(freq.most_common_interval_seconds, 86_400);
        assert!((freq.avg_interval_seconds - 86_400.0).abs() < 1e-9);
        assert_eq!(freq.data_coverage.daily_coverage, 15);
        assert_eq!(freq.data_coverage.monthly_coverage, 1);
        assert_eq!(freq.data_coverage.yearly_coverage, 1);
    }

    #[tokio::test]
    async fn single_timestamp_has_range_but_no_frequency() {
        let table = Table::new(vec![Column::datetime("ts", vec![Some(day(5)), None])]).unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        let analysis = &section.ready().unwrap().date_columns["ts"];
        assert_eq!(analysis.date_range.start, day(5));
        assert_eq!(analysis.date_range.end, day(5));
        assert_eq!(analysis.date_range.duration_days, 0);
        assert!(analysis.frequency_analysis.is_none());
    }

    #[tokio::test]
    async fn name_hinted_string_column_qualifies() {
        let cells: Vec<Option<String>> = (1..=12)
            .map(|d| Some(format!("2024-01-{d:02}")))
            .collect();
        let table = Table::new(vec![Column::categorical("order_date", cells)]).unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        assert!(section.ready().unwrap().date_columns.contains_key("order_date"));
    }

    #[tokio::test]
    async fn increasing_series_is_a_significant_trend() {
        let dates: Vec<Option<NaiveDateTime>> = (1..=20).map(|d| Some(day(d))).collect();
        let values: Vec<Option<f64>> = (0..20).map(|i| Some(3.0 * i as f64 + 1.0)).collect();
        let table = Table::new(vec![
            Column::datetime("ts", dates),
            Column::numeric("sales", values),
        ])
        .unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        let trend = &section.ready().unwrap().date_columns["ts"].trend_analysis["sales"];
        assert!((trend.slope - 3.0).abs() < 1e-9);
        assert!((trend.intercept - 1.0).abs() < 1e-9);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(trend.trend_direction, TrendDirection::Increasing);
        assert!(trend.significant_trend);
    }

    #[tokio::test]
    async fn trend_sorts_by_date_before_fitting() {
        // Dates arrive reversed; values decrease in row order, so after
        // sorting by date the series increases.
        let dates: Vec<Option<NaiveDateTime>> = (1..=15).rev().map(|d| Some(day(d))).collect();
        let values: Vec<Option<f64>> = (0..15).map(|i| Some(15.0 - i as f64)).collect();
        let table = Table::new(vec![
            Column::datetime("ts", dates),
            Column::numeric("metric", values),
        ])
        .unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        let trend = &section.ready().unwrap().date_columns["ts"].trend_analysis["metric"];
        assert_eq!(trend.trend_direction, TrendDirection::Increasing);
        assert!((trend.slope - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ten_paired_rows_are_not_enough_for_a_trend() {
        let dates: Vec<Option<NaiveDateTime>> = (1..=10).map(|d| Some(day(d))).collect();
        let values: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let table = Table::new(vec![
            Column::datetime("ts", dates),
            Column::numeric("v", values),
        ])
        .unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        assert!(section.ready().unwrap().date_columns["ts"]
            .trend_analysis
            .is_empty());
    }

    #[tokio::test]
    async fn trends_cap_at_first_three_numeric_columns() {
        let dates: Vec<Option<NaiveDateTime>> = (1..=20).map(|d| Some(day(d))).collect();
        let mk = |scale: f64| -> Vec<Option<f64>> {
            (0..20).map(|i| Some(scale * i as f64)).collect()
        };
        let table = Table::new(vec![
            Column::datetime("ts", dates),
            Column::numeric("a", mk(1.0)),
            Column::numeric("b", mk(2.0)),
            Column::numeric("c", mk(3.0)),
            Column::numeric("d", mk(4.0)),
        ])
        .unwrap();
        let section = analyzer().analyze(&table).await.unwrap();
        let trends = &section.ready().unwrap().date_columns["ts"].trend_analysis;
        assert_eq!(trends.len(), 3);
        assert!(!trends.contains_key("d"));
    }
}
