//! # Scaling Metrics
//!
//! Derives speedup and parallel efficiency from a [`BenchmarkTable`].
//!
//! ## Definitions
//!
//! Rows are partitioned into [`ScalingGroup`]s by problem size (`points`).
//! Inside a group the rows are ordered by ascending thread count and the
//! first row is the baseline:
//!
//! ```text
//! speedup(p)    = T(baseline) / T(p)
//! efficiency(p) = speedup(p) / p
//! ```
//!
//! The baseline is the lowest thread count present, which is not always one
//! worker, so speedup is relative to the smallest measured configuration.
//! Super-linear results are kept as-is, nothing is clamped.

use crate::error::ReportError;
use crate::table::{BenchmarkRow, BenchmarkTable};
use serde::{Deserialize, Serialize};

/// Rows of one problem size ordered by ascending thread count
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingGroup {
    pub points: u64,
    rows: Vec<BenchmarkRow>,
}

impl ScalingGroup {
    pub fn rows(&self) -> &[BenchmarkRow] {
        &self.rows
    }

    /// Thread counts of the group, ascending
    pub fn threads(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.threads).collect()
    }

    /// Time of the lowest-thread row
    pub fn baseline_time(&self) -> f64 {
        self.rows.first().map_or(f64::NAN, |r| r.time_seconds)
    }

    /// Speedup and efficiency for every row, baseline included
    pub fn derive(&self) -> Vec<DerivedPoint> {
        let baseline = self.baseline_time();
        self.rows
            .iter()
            .map(|row| {
                let speedup = baseline / row.time_seconds;
                DerivedPoint {
                    threads: row.threads,
                    time_seconds: row.time_seconds,
                    speedup,
                    efficiency: speedup / row.threads as f64,
                }
            })
            .collect()
    }
}

/// Derived values for one row of a scaling group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub threads: u32,
    pub time_seconds: f64,
    pub speedup: f64,
    pub efficiency: f64,
}

/// Derived series of one problem size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSeries {
    pub points: u64,
    pub baseline_threads: u32,
    pub baseline_time_seconds: f64,
    pub series: Vec<DerivedPoint>,
}

impl GroupSeries {
    /// Point with the highest finite speedup
    pub fn best_speedup(&self) -> Option<&DerivedPoint> {
        self.series
            .iter()
            .filter(|p| p.speedup.is_finite())
            .max_by(|a, b| a.speedup.total_cmp(&b.speedup))
    }

    /// Efficiency at the largest thread count of the group
    pub fn efficiency_at_max_threads(&self) -> Option<f64> {
        self.series.last().map(|p| p.efficiency)
    }
}

/// Everything the chart renderer needs for one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingAnalysis {
    pub method: String,
    /// Groups in first-seen order of their problem size
    pub groups: Vec<GroupSeries>,
    /// Sorted union of all thread counts, the x values of the ideal line
    pub ideal_threads: Vec<u32>,
}

impl ScalingAnalysis {
    /// Legend labels in drawing order
    pub fn legend_labels(&self) -> Vec<String> {
        self.groups.iter().map(|g| format!("N={}", g.points)).collect()
    }
}

/// Partition a table by problem size
///
/// Groups appear in the order their `points` value is first encountered in
/// the table; rows inside a group are sorted by ascending thread count.
pub fn group_by_points(table: &BenchmarkTable) -> Vec<ScalingGroup> {
    let mut groups: Vec<ScalingGroup> = Vec::new();

    for row in table.rows() {
        match groups.iter_mut().find(|g| g.points == row.points) {
            Some(group) => group.rows.push(row.clone()),
            None => groups.push(ScalingGroup {
                points: row.points,
                rows: vec![row.clone()],
            }),
        }
    }

    for group in &mut groups {
        // Stable sort keeps source order for equal keys, which validated tables never contain
        group.rows.sort_by_key(|r| r.threads);
    }

    groups
}

/// Sorted union of the thread counts across groups
pub fn ideal_threads(groups: &[ScalingGroup]) -> Vec<u32> {
    let mut threads: Vec<u32> = groups.iter().flat_map(|g| g.threads()).collect();
    threads.sort_unstable();
    threads.dedup();
    threads
}

/// Derive every series the chart needs
///
/// Fails with [`ReportError::EmptyTable`] when there are no rows to group.
pub fn analyze(table: &BenchmarkTable) -> Result<ScalingAnalysis, ReportError> {
    if table.is_empty() {
        return Err(ReportError::EmptyTable {
            method: table.method().to_string(),
        });
    }

    let groups = group_by_points(table);
    let ideal = ideal_threads(&groups);

    let series = groups
        .iter()
        .map(|group| {
            let derived = group.derive();
            GroupSeries {
                points: group.points,
                baseline_threads: derived.first().map_or(0, |p| p.threads),
                baseline_time_seconds: group.baseline_time(),
                series: derived,
            }
        })
        .collect();

    Ok(ScalingAnalysis {
        method: table.method().to_string(),
        groups: series,
        ideal_threads: ideal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(method: &str, rows: &[(u64, u32, f64)]) -> BenchmarkTable {
        let rows = rows
            .iter()
            .map(|&(points, threads, time_seconds)| BenchmarkRow {
                method: method.to_string(),
                points,
                threads,
                time_seconds,
            })
            .collect();
        BenchmarkTable::from_rows(method, rows).unwrap()
    }

    #[test]
    fn test_grid_scenario_values() {
        let t = table("Grid", &[(1024, 1, 10.0), (1024, 2, 6.0), (1024, 4, 3.5)]);
        let analysis = analyze(&t).unwrap();
        let series = &analysis.groups[0].series;

        assert_eq!(series[0].speedup, 1.0);
        assert_relative_eq!(series[1].speedup, 1.667, epsilon = 1e-3);
        assert_relative_eq!(series[2].speedup, 2.857, epsilon = 1e-3);

        assert_eq!(series[0].efficiency, 1.0);
        assert_relative_eq!(series[1].efficiency, 0.833, epsilon = 1e-3);
        assert_relative_eq!(series[2].efficiency, 0.714, epsilon = 1e-3);
    }

    #[test]
    fn test_grouping_partitions_table() {
        let t = table(
            "Grid",
            &[(1024, 2, 5.0), (4096, 1, 40.0), (1024, 1, 9.0), (4096, 8, 6.0), (2048, 1, 20.0)],
        );
        let groups = group_by_points(&t);

        let total: usize = groups.iter().map(|g| g.rows().len()).sum();
        assert_eq!(total, t.len());
        for row in t.rows() {
            let owners = groups
                .iter()
                .filter(|g| g.rows().iter().any(|r| r == row))
                .count();
            assert_eq!(owners, 1);
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let t = table(
            "Grid",
            &[(4096, 1, 40.0), (1024, 1, 9.0), (4096, 2, 21.0), (2048, 1, 20.0)],
        );
        let analysis = analyze(&t).unwrap();
        assert_eq!(analysis.legend_labels(), vec!["N=4096", "N=1024", "N=2048"]);
    }

    #[test]
    fn test_baseline_is_lowest_thread_count() {
        let t = table("Grid", &[(1024, 8, 2.0), (1024, 2, 6.0), (1024, 4, 3.0)]);
        let groups = group_by_points(&t);

        assert_eq!(groups[0].threads(), vec![2, 4, 8]);
        assert_eq!(groups[0].baseline_time(), 6.0);

        let derived = groups[0].derive();
        assert_eq!(derived[0].speedup, 1.0);
        assert_eq!(derived[0].efficiency, 0.5);
    }

    #[test]
    fn test_super_linear_efficiency_is_not_clamped() {
        let t = table("Grid", &[(1024, 1, 10.0), (1024, 2, 4.0)]);
        let analysis = analyze(&t).unwrap();
        let p = analysis.groups[0].series[1];
        assert_relative_eq!(p.speedup, 2.5);
        assert_relative_eq!(p.efficiency, 1.25);
    }

    #[test]
    fn test_ideal_threads_is_sorted_union() {
        let t = table(
            "Grid",
            &[(1024, 1, 8.0), (1024, 2, 4.5), (1024, 4, 2.5), (2048, 3, 6.0), (2048, 1, 16.0)],
        );
        let analysis = analyze(&t).unwrap();
        assert_eq!(analysis.ideal_threads, vec![1, 2, 3, 4]);
        assert_eq!(analysis.groups.len(), 2);
        assert_eq!(analysis.groups[1].series.len(), 2);
    }

    #[test]
    fn test_empty_table_is_error() {
        let t = BenchmarkTable::from_rows("Grid", Vec::new()).unwrap();
        assert!(matches!(analyze(&t), Err(ReportError::EmptyTable { .. })));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let rows = [(1024, 1, 10.0), (1024, 3, 3.7), (2048, 2, 9.1), (2048, 1, 17.3)];
        let first = analyze(&table("Grid", &rows)).unwrap();
        let second = analyze(&table("Grid", &rows)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_summary_helpers() {
        let t = table("Grid", &[(1024, 1, 10.0), (1024, 2, 4.0), (1024, 4, 4.5)]);
        let analysis = analyze(&t).unwrap();
        let group = &analysis.groups[0];

        assert_eq!(group.best_speedup().map(|p| p.threads), Some(2));
        assert_relative_eq!(group.efficiency_at_max_threads().unwrap(), 10.0 / 4.5 / 4.0);
    }

    #[test]
    fn test_zero_time_yields_non_finite_speedup() {
        let t = table("Grid", &[(1024, 1, 1.0), (1024, 2, 0.0)]);
        let analysis = analyze(&t).unwrap();
        assert!(analysis.groups[0].series[1].speedup.is_infinite());
        assert_eq!(analysis.groups[0].best_speedup().map(|p| p.threads), Some(1));
    }
}
