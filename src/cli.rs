use crate::chart::ImageFormat;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scaling Report - turns parallel benchmark timings into time, speedup and efficiency charts
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Verbose output (debug level logging)
    #[clap(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write an uncoloured copy of the log to this file
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render time, speedup and efficiency charts for each measurement method
    Charts(ChartsArgs),

    /// Draw a computed point set as a scatter image
    Scatter(ScatterArgs),

    /// Generate random N-body input files
    GenInputs(GenInputsArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ChartsArgs {
    /// Measurement methods to chart (space-separated: monte-carlo, grid, or all)
    #[clap(short = 'm', long, value_enum, default_values_t = vec![MeasurementMethod::All], help_heading = "Core Options", num_args = 1..)]
    pub methods: Vec<MeasurementMethod>,

    /// Directory holding one sub-directory per method with its benchmark table
    #[clap(short = 'd', long, default_value = crate::defaults::DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory the chart images are written to
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Image format of the charts
    #[clap(long, value_enum, default_value_t = ImageFormat::Png)]
    pub format: ImageFormat,

    /// Figure width in pixels
    #[clap(long, default_value_t = crate::defaults::CHART_WIDTH)]
    pub width: u32,

    /// Figure height in pixels
    #[clap(long, default_value_t = crate::defaults::CHART_HEIGHT)]
    pub height: u32,

    /// Do not draw grid lines
    #[clap(long, default_value_t = false)]
    pub no_grid: bool,

    /// Process the methods concurrently, one worker task per method
    #[clap(long, default_value_t = false)]
    pub parallel: bool,

    /// Continue with the remaining methods when one fails
    #[clap(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Write a JSON summary of derived metrics and outcomes to this file
    #[clap(long)]
    pub summary_output: Option<PathBuf>,

    /// Print a table of the derived metrics after each successful method
    #[clap(long, default_value_t = false)]
    pub print_table: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScatterArgs {
    /// CSV file with a header whose first two columns are x and y
    #[clap(short = 'i', long)]
    pub input: PathBuf,

    /// Output image (.png or .svg)
    #[clap(short = 'o', long)]
    pub output: PathBuf,

    /// Chart title, the point count is appended
    #[clap(long, default_value = "Mandelbrot Set")]
    pub title: String,

    #[clap(long, default_value_t = -2.1, allow_negative_numbers = true)]
    pub x_min: f64,

    #[clap(long, default_value_t = 1.1, allow_negative_numbers = true)]
    pub x_max: f64,

    #[clap(long, default_value_t = -1.5, allow_negative_numbers = true)]
    pub y_min: f64,

    #[clap(long, default_value_t = 1.5, allow_negative_numbers = true)]
    pub y_max: f64,

    /// Image width in pixels
    #[clap(long, default_value_t = crate::defaults::SCATTER_WIDTH)]
    pub width: u32,

    /// Image height in pixels
    #[clap(long, default_value_t = crate::defaults::SCATTER_HEIGHT)]
    pub height: u32,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenInputsArgs {
    /// Directory the input files are written to (created if missing)
    #[clap(short = 'o', long, default_value = crate::defaults::INPUTS_DIR)]
    pub output_dir: PathBuf,

    /// Body counts, one file per value
    #[clap(short = 'n', long, default_values_t = crate::defaults::INPUT_SIZES.to_vec(), num_args = 1..)]
    pub sizes: Vec<usize>,

    /// Seed for reproducible output
    #[clap(long)]
    pub seed: Option<u64>,
}

/// Measurement methods whose benchmark tables can be charted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum MeasurementMethod {
    /// Random sampling of the domain
    #[value(name = "monte-carlo")]
    MonteCarlo,

    /// Regular grid over the domain
    #[value(name = "grid")]
    Grid,

    /// All available methods
    #[value(name = "all")]
    All,
}

impl std::fmt::Display for MeasurementMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl MeasurementMethod {
    /// Name used for the data sub-directory and the chart file prefix
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementMethod::MonteCarlo => "Monte-Carlo",
            MeasurementMethod::Grid => "Grid",
            MeasurementMethod::All => "All",
        }
    }

    /// Expand the "All" variant to all available methods, dropping repeats
    pub fn expand_all(methods: Vec<MeasurementMethod>) -> Vec<MeasurementMethod> {
        if methods.contains(&MeasurementMethod::All) {
            return vec![MeasurementMethod::MonteCarlo, MeasurementMethod::Grid];
        }

        let mut expanded = Vec::with_capacity(methods.len());
        for method in methods {
            if !expanded.contains(&method) {
                expanded.push(method);
            }
        }
        expanded
    }
}
