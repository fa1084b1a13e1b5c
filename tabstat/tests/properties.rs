//! Property-based invariants over randomly generated tables.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tabstat::{AnalysisRunner, Column, FileInfo, RunMetadata, Table};

fn file_info(table: &Table) -> FileInfo {
    FileInfo {
        file_name: "prop.csv".into(),
        file_path: "/data/prop.csv".into(),
        file_size_mb: 0.0,
        rows: table.row_count(),
        columns: table.column_count(),
        column_names: table.columns().iter().map(|c| c.name().to_string()).collect(),
        column_types: BTreeMap::new(),
        memory_usage_mb: 0.0,
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// A nullable numeric column with values that stay far from overflow.
fn nullable_values(len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    proptest::collection::vec(
        proptest::option::weighted(0.85, -1.0e6..1.0e6f64),
        len..=len,
    )
}

fn numeric_table(cols: usize, rows: usize) -> impl Strategy<Value = Table> {
    proptest::collection::vec(nullable_values(rows), cols..=cols).prop_map(|columns| {
        Table::new(
            columns
                .into_iter()
                .enumerate()
                .map(|(i, values)| Column::numeric(format!("col{i}"), values))
                .collect(),
        )
        .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal(
        table in (2usize..5, 8usize..40).prop_flat_map(|(c, r)| numeric_table(c, r))
    ) {
        let rt = runtime();
        let info = file_info(&table);
        let report = rt.block_on(AnalysisRunner::default().run(table, info)).unwrap();
        let correlation = report.correlation_analysis.ready().unwrap();

        let k = correlation.columns.len();
        for i in 0..k {
            prop_assert_eq!(correlation.pearson_matrix[i][i], Some(1.0));
            prop_assert_eq!(correlation.spearman_matrix[i][i], Some(1.0));
            for j in 0..k {
                prop_assert_eq!(
                    correlation.pearson_matrix[i][j],
                    correlation.pearson_matrix[j][i]
                );
            }
        }
        for row in &correlation.pearson_matrix {
            for cell in row.iter().flatten() {
                prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(cell));
            }
        }
    }

    #[test]
    fn iqr_bounds_are_ordered(
        table in numeric_table(1, 40)
    ) {
        let rt = runtime();
        let info = file_info(&table);
        let report = rt.block_on(AnalysisRunner::default().run(table, info)).unwrap();
        if let Some(outliers) = report.outlier_detection.ready() {
            for set in outliers.columns.values() {
                prop_assert!(set.iqr_method.lower_bound <= set.iqr_method.upper_bound);
                prop_assert!(set.iqr_method.outlier_values.len() <= 10);
                prop_assert!(set.iqr_method.outlier_values.len() <= set.iqr_method.count);
            }
        }
    }

    #[test]
    fn missing_and_present_cells_partition_each_column(
        values in nullable_values(25)
    ) {
        let column = Column::numeric("x", values);
        prop_assert_eq!(
            column.missing_count() + column.non_missing_numeric().len(),
            column.len()
        );
    }

    #[test]
    fn analysis_is_deterministic(
        table in (2usize..4, 12usize..30).prop_flat_map(|(c, r)| numeric_table(c, r))
    ) {
        let rt = runtime();
        let runner = AnalysisRunner::default();

        let twin = table.clone();
        let info = file_info(&table);
        let mut first = rt.block_on(runner.run(table, info.clone())).unwrap();
        let mut second = rt.block_on(runner.run(twin, info)).unwrap();

        // Wall-clock metadata differs by construction; everything else
        // must be bit-identical.
        first.metadata = RunMetadata::begin();
        second.metadata = first.metadata.clone();
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn quality_percentages_stay_in_range(
        table in (1usize..4, 0usize..20).prop_flat_map(|(c, r)| numeric_table(c, r))
    ) {
        let rt = runtime();
        let info = file_info(&table);
        let report = rt.block_on(AnalysisRunner::default().run(table, info)).unwrap();
        let quality = report.data_quality.ready().unwrap();

        prop_assert!((0.0..=100.0).contains(&quality.missing_values.missing_percentage));
        prop_assert!((0.0..=100.0).contains(&quality.duplicate_rows.percentage));
        prop_assert!((0.0..=100.0).contains(&quality.data_completeness.complete_percentage));
        for column in quality.column_quality.values() {
            prop_assert!((0.0..=100.0).contains(&column.missing_percentage));
            prop_assert!((0.0..=100.0).contains(&column.unique_percentage));
        }
    }
}
