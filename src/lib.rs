//! # Scaling Report Library
//!
//! Turns the timing tables written by parallel benchmark runs into
//! performance charts. For each measurement method the library reads one
//! benchmark table, groups its rows by problem size, derives speedup and
//! efficiency against the smallest thread count of each group, and draws a
//! three-panel figure (execution time, speedup, efficiency).
//!
//! ## Architecture Overview
//!
//! - `table`: benchmark table loader and validation
//! - `metrics`: grouping and derived scaling metrics
//! - `chart`: three-panel figure rendering with plotters
//! - `report`: per-method Loader → Metrics → Renderer passes, sequential or parallel
//! - `results`: outcome collection and the JSON summary
//! - `cli`: command-line interface
//! - `points`, `inputs`: scatter images of point sets and N-body input files
//! - `logging`, `utils`: ambient helpers
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scaling_report::{analyze, load_table, render_performance_chart, ChartConfig};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let table = load_table("Grid", Path::new("Grid/benchmark_results.csv"))?;
//!     let analysis = analyze(&table)?;
//!     render_performance_chart(
//!         &analysis,
//!         Path::new("Grid_performance_plots.png"),
//!         &ChartConfig::default(),
//!     )?;
//!     Ok(())
//! }
//! ```

/// Three-panel chart rendering
pub mod chart;

/// Command-line interface
///
/// Argument parsing with clap; `charts`, `scatter` and `gen-inputs`
/// subcommands plus the measurement method enumeration.
pub mod cli;

/// Pipeline error taxonomy
pub mod error;

/// Random N-body input files
pub mod inputs;

pub mod logging;

/// Grouping by problem size and speedup/efficiency derivation
pub mod metrics;

/// Scatter rendering of computed point sets
pub mod points;

/// Per-method report passes
///
/// Each pass loads a method's table, derives its metrics and writes its
/// chart. Passes are independent and can run concurrently.
pub mod report;

/// Outcome collection and JSON summary output
pub mod results;

/// Benchmark table loading and validation
pub mod table;

pub mod utils;

pub use chart::{render_performance_chart, ChartConfig, ImageFormat};
pub use cli::{Args, MeasurementMethod};
pub use error::{ReportError, Stage};
pub use metrics::{analyze, ScalingAnalysis};
pub use report::{ReportConfig, ReportRunner};
pub use results::ResultsManager;
pub use table::{load_table, BenchmarkRow, BenchmarkTable};

/// The current version of the scaling report tool
///
/// Written into the JSON summary for reproducibility.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Directory holding one sub-directory per method
    pub const DATA_DIR: &str = ".";

    /// Directory the charts are written to
    pub const OUTPUT_DIR: &str = ".";

    /// File name of a method's benchmark table inside its sub-directory
    pub const TABLE_FILE: &str = "benchmark_results.csv";

    /// Three-panel figure size in pixels
    ///
    /// Wide enough for three square-ish panels side by side.
    pub const CHART_WIDTH: u32 = 2000;
    pub const CHART_HEIGHT: u32 = 600;

    pub const SCATTER_WIDTH: u32 = 1200;
    pub const SCATTER_HEIGHT: u32 = 800;

    /// Output directory of `gen-inputs`
    pub const INPUTS_DIR: &str = "Inputs";

    /// Body counts generated by default
    pub const INPUT_SIZES: [usize; 5] = [1024, 2048, 4096, 8192, 16384];
}
