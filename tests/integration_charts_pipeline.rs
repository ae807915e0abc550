use anyhow::Result;
use approx::assert_relative_eq;
use scaling_report::{
    chart::ImageFormat,
    report::{prepare_output_dir, run_parallel, run_sequential, ReportConfig},
    results::ResultsManager,
    ChartConfig, MeasurementMethod, ReportError, Stage,
};
use std::fs;
use std::path::Path;

fn write_table(root: &Path, method: &str, body: &str) {
    let dir = root.join(method);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("benchmark_results.csv"), body).unwrap();
}

fn config(root: &Path, format: ImageFormat) -> ReportConfig {
    ReportConfig {
        methods: vec![MeasurementMethod::MonteCarlo, MeasurementMethod::Grid],
        data_dir: root.to_path_buf(),
        output_dir: root.join("charts"),
        chart: ChartConfig {
            format,
            ..ChartConfig::default()
        },
        parallel: false,
        continue_on_error: true,
    }
}

/// Grid table from the reference scenario: two sizes, one of which has a
/// thread count the other lacks.
#[test]
fn grid_scenario_end_to_end() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(
        dir.path(),
        "Grid",
        "Points,Threads,Time_Seconds\n1024,1,10.0\n1024,2,6.0\n1024,4,3.5\n2048,1,21.0\n2048,3,8.0\n",
    );
    let mut config = config(dir.path(), ImageFormat::Png);
    config.methods = vec![MeasurementMethod::Grid];
    prepare_output_dir(&config)?;

    let outcomes = run_sequential(&config, |_| {});
    let report = outcomes[0].1.as_ref().unwrap();

    assert!(dir.path().join("charts/Grid_performance_plots.png").exists());
    assert_eq!(report.rows, 5);

    let analysis = &report.analysis;
    assert_eq!(analysis.legend_labels(), vec!["N=1024", "N=2048"]);
    assert_eq!(analysis.ideal_threads, vec![1, 2, 3, 4]);

    let small = &analysis.groups[0].series;
    assert_relative_eq!(small[1].speedup, 10.0 / 6.0, epsilon = 1e-9);
    assert_relative_eq!(small[2].speedup, 10.0 / 3.5, epsilon = 1e-9);
    assert_relative_eq!(small[2].efficiency, 10.0 / 14.0, epsilon = 1e-9);

    let large = &analysis.groups[1].series;
    assert_relative_eq!(large[1].speedup, 2.625, epsilon = 1e-9);
    assert_relative_eq!(large[1].efficiency, 0.875, epsilon = 1e-9);
    Ok(())
}

/// Missing `Threads` column fails at load time and writes nothing, while
/// the other method still succeeds.
#[test]
fn schema_failure_is_isolated() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(dir.path(), "Monte-Carlo", "Points,Time_Seconds\n1024,2.0\n");
    write_table(
        dir.path(),
        "Grid",
        "Points,Threads,Time_Seconds\n1024,1,2.0\n1024,2,1.2\n",
    );
    let config = config(dir.path(), ImageFormat::Svg);
    prepare_output_dir(&config)?;

    let outcomes = run_sequential(&config, |_| {});
    assert_eq!(outcomes.len(), 2);

    let err = outcomes[0].1.as_ref().unwrap_err();
    assert!(matches!(err, ReportError::Schema { column, .. } if column == "Threads"));
    assert_eq!(err.stage(), Stage::Load);
    assert!(!dir
        .path()
        .join("charts/Monte-Carlo_performance_plots.svg")
        .exists());

    assert!(outcomes[1].1.is_ok());
    assert!(dir.path().join("charts/Grid_performance_plots.svg").exists());
    Ok(())
}

/// A header-only table is reported as empty and produces no image.
#[test]
fn header_only_table_writes_no_image() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(dir.path(), "Grid", "Points,Threads,Time_Seconds\n");
    let mut config = config(dir.path(), ImageFormat::Png);
    config.methods = vec![MeasurementMethod::Grid];
    prepare_output_dir(&config)?;

    let outcomes = run_sequential(&config, |_| {});

    assert!(matches!(
        outcomes[0].1,
        Err(ReportError::EmptyTable { ref method }) if method == "Grid"
    ));
    assert!(!dir.path().join("charts/Grid_performance_plots.png").exists());
    Ok(())
}

/// Sizes with disjoint thread sets share one ideal axis and both render.
#[test]
fn disjoint_thread_sets_share_ideal_axis() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(
        dir.path(),
        "Monte-Carlo",
        "Points,Threads,Time_Seconds\n500,1,4.0\n500,2,2.2\n500,4,1.3\n900,1,7.0\n900,3,2.6\n",
    );
    let mut config = config(dir.path(), ImageFormat::Svg);
    config.methods = vec![MeasurementMethod::MonteCarlo];
    prepare_output_dir(&config)?;

    let outcomes = run_sequential(&config, |_| {});
    let report = outcomes[0].1.as_ref().unwrap();

    assert_eq!(report.analysis.ideal_threads, vec![1, 2, 3, 4]);
    assert_eq!(report.analysis.groups.len(), 2);

    let svg = fs::read_to_string(&report.artifact)?;
    assert!(svg.contains("N=500"));
    assert!(svg.contains("N=900"));
    Ok(())
}

/// Legend follows first appearance in the file, not numeric order.
#[test]
fn legend_follows_source_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(
        dir.path(),
        "Grid",
        "Points,Threads,Time_Seconds\n4096,2,5.0\n1024,1,1.0\n4096,1,9.0\n",
    );
    let mut config = config(dir.path(), ImageFormat::Svg);
    config.methods = vec![MeasurementMethod::Grid];
    prepare_output_dir(&config)?;

    let outcomes = run_sequential(&config, |_| {});
    let analysis = &outcomes[0].1.as_ref().unwrap().analysis;

    assert_eq!(analysis.legend_labels(), vec!["N=4096", "N=1024"]);
    // Baseline is the smallest thread count even when listed later
    assert_eq!(analysis.groups[0].baseline_threads, 1);
    assert_relative_eq!(analysis.groups[0].series[1].speedup, 1.8, epsilon = 1e-9);
    Ok(())
}

/// Parallel passes all run, report independently and feed the summary.
#[tokio::test]
async fn parallel_run_feeds_summary() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_table(
        dir.path(),
        "Monte-Carlo",
        "Points,Threads,Time_Seconds\n1024,1,2.0\n1024,1,1.9\n",
    );
    write_table(
        dir.path(),
        "Grid",
        "Points,Threads,Time_Seconds\n1024,1,2.0\n1024,8,0.4\n",
    );
    let mut config = config(dir.path(), ImageFormat::Png);
    config.parallel = true;
    prepare_output_dir(&config)?;

    let outcomes = run_parallel(&config).await;

    assert!(matches!(
        outcomes[0].1,
        Err(ReportError::MalformedRow { row: 2, .. })
    ));
    assert!(outcomes[1].1.is_ok());

    let summary = dir.path().join("summary.json");
    let mut manager = ResultsManager::new(Some(summary.as_path()));
    for pass in &outcomes {
        manager.add_outcome(pass);
    }
    manager.finalize()?;

    assert_eq!(manager.failed_count(), 1);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary)?)?;
    assert_eq!(json["summary"]["failed_methods"][0], "Monte-Carlo");
    assert_eq!(json["methods"][0]["failure"]["stage"], "Load");
    assert_eq!(json["methods"][1]["groups"][0]["best_speedup_threads"], 8);
    Ok(())
}
