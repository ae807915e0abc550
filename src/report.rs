//! # Report Pipeline Module
//!
//! Runs the Loader → Metrics → Renderer pass for each measurement method and
//! hands the outcome of every pass back to the caller.
//!
//! ## Pass Lifecycle
//!
//! 1. **Resolve**: `{data_dir}/{method}/benchmark_results.csv`
//! 2. **Load**: parse and validate the benchmark table
//! 3. **Derive**: group by problem size, compute speedup and efficiency
//! 4. **Render**: draw the three-panel figure and write it to
//!    `{output_dir}/{method}_performance_plots.{ext}`
//!
//! ## Concurrency
//!
//! Passes share nothing. They run one after another with
//! [`run_sequential`], or as one blocking worker task per method with
//! [`run_parallel`]. In parallel mode every pass runs to completion and
//! reports its own result; a failure, or even a panic, in one pass never
//! cancels the others.

use crate::{
    chart::{chart_path, render_performance_chart, ChartConfig},
    cli::{ChartsArgs, MeasurementMethod},
    error::ReportError,
    metrics::{analyze, ScalingAnalysis},
    table::load_table,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Configuration shared by every method's pass
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Methods to process, already expanded
    pub methods: Vec<MeasurementMethod>,

    /// Root of the per-method table directories
    pub data_dir: PathBuf,

    /// Destination directory of the chart images
    pub output_dir: PathBuf,

    /// Figure appearance and encoding
    pub chart: ChartConfig,

    /// Run the passes as concurrent worker tasks
    pub parallel: bool,

    /// Keep going after a failed pass in sequential mode
    pub continue_on_error: bool,
}

impl ReportConfig {
    /// Create report configuration from CLI arguments
    ///
    /// Expands `all`, and validates the figure size.
    pub fn from_args(args: &ChartsArgs) -> Result<Self> {
        crate::utils::validate_dimensions(args.width, args.height)?;

        let chart = ChartConfig {
            width: args.width,
            height: args.height,
            format: args.format,
            show_grid: !args.no_grid,
            ..ChartConfig::default()
        };

        Ok(Self {
            methods: MeasurementMethod::expand_all(args.methods.clone()),
            data_dir: args.data_dir.clone(),
            output_dir: args.output_dir.clone(),
            chart,
            parallel: args.parallel,
            continue_on_error: args.continue_on_error,
        })
    }

    /// Location of a method's benchmark table
    pub fn source_path(&self, method: MeasurementMethod) -> PathBuf {
        source_path(&self.data_dir, method.name())
    }

    /// Location of a method's chart
    pub fn artifact_path(&self, method: MeasurementMethod) -> PathBuf {
        chart_path(&self.output_dir, method.name(), self.chart.format)
    }
}

/// `{data_dir}/{method}/benchmark_results.csv`
pub fn source_path(data_dir: &Path, method: &str) -> PathBuf {
    data_dir.join(method).join(crate::defaults::TABLE_FILE)
}

/// Result of one successful pass
#[derive(Debug, Clone)]
pub struct MethodReport {
    pub method: MeasurementMethod,
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub rows: usize,
    pub analysis: ScalingAnalysis,
    pub elapsed: Duration,
}

/// Executes the pass of a single method
pub struct ReportRunner {
    config: ReportConfig,
    method: MeasurementMethod,
}

impl ReportRunner {
    pub fn new(config: ReportConfig, method: MeasurementMethod) -> Self {
        Self { config, method }
    }

    pub fn method(&self) -> MeasurementMethod {
        self.method
    }

    /// Load, derive and render; nothing is written unless every step succeeds
    pub fn run(&self) -> Result<MethodReport, ReportError> {
        let start = Instant::now();
        let name = self.method.name();
        let source = self.config.source_path(self.method);
        let artifact = self.config.artifact_path(self.method);

        info!("[{}] Loading {:?}", name, source);
        let table = load_table(name, &source)?;

        let analysis = analyze(&table)?;
        debug!(
            "[{}] {} rows in {} groups, ideal axis {:?}",
            name,
            table.len(),
            analysis.groups.len(),
            analysis.ideal_threads
        );

        render_performance_chart(&analysis, &artifact, &self.config.chart)?;
        info!("[{}] Chart written to {:?}", name, artifact);

        Ok(MethodReport {
            method: self.method,
            source,
            artifact,
            rows: table.len(),
            analysis,
            elapsed: start.elapsed(),
        })
    }
}

/// Outcome of one method's pass, success or failure
pub type PassResult = (MeasurementMethod, Result<MethodReport, ReportError>);

/// Run every configured method one after another
///
/// `on_result` sees each outcome as soon as its pass ends. Unless
/// `continue_on_error` is set, the first failure stops the remaining passes.
pub fn run_sequential<F>(config: &ReportConfig, mut on_result: F) -> Vec<PassResult>
where
    F: FnMut(&PassResult),
{
    let mut outcomes = Vec::with_capacity(config.methods.len());

    for method in &config.methods {
        let runner = ReportRunner::new(config.clone(), *method);
        let outcome = (*method, runner.run());
        on_result(&outcome);

        let failed = outcome.1.is_err();
        outcomes.push(outcome);
        if failed && !config.continue_on_error {
            error!("Stopping after failed pass for {}", method);
            break;
        }
    }

    outcomes
}

/// Run every configured method concurrently, one blocking task per method
///
/// All passes run to completion. Outcomes are returned in configuration
/// order regardless of completion order.
pub async fn run_parallel(config: &ReportConfig) -> Vec<PassResult> {
    run_parallel_with(config, |runner| runner.run()).await
}

/// Spawn `pass` once per method and collect the outcomes in method order
///
/// A pass that panics is reported as a render failure of its own method.
async fn run_parallel_with<F>(config: &ReportConfig, pass: F) -> Vec<PassResult>
where
    F: Fn(ReportRunner) -> Result<MethodReport, ReportError> + Clone + Send + 'static,
{
    let handles: Vec<_> = config
        .methods
        .iter()
        .map(|&method| {
            let runner = ReportRunner::new(config.clone(), method);
            let pass = pass.clone();
            (method, tokio::task::spawn_blocking(move || pass(runner)))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (method, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                error!("[{}] worker task aborted: {}", method, join_error);
                Err(ReportError::Render {
                    method: method.name().to_string(),
                    path: config.artifact_path(method),
                    message: format!("worker task aborted: {}", join_error),
                })
            }
        };
        outcomes.push((method, result));
    }

    outcomes
}

/// Make sure the chart destination exists before any pass starts
pub fn prepare_output_dir(config: &ReportConfig) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))
}
