//! # Scaling Report - Main Entry Point
//!
//! The `charts` command performs these steps:
//! 1. **Initialize logging**: console formatter plus optional log file
//! 2. **Create report config**: converts CLI args to the internal config
//! 3. **Run passes**: one Loader → Metrics → Renderer pass per method,
//!    sequentially or as concurrent worker tasks
//! 4. **Summarize**: optional console tables and JSON summary
//!
//! ## Error Handling
//!
//! Every failed pass is logged with its method, stage and cause. Depending on
//! `--continue-on-error` the remaining methods still run or are skipped; in
//! parallel mode all of them always run. The process exits non-zero when any
//! method failed.

use anyhow::Result;
use clap::Parser;
use scaling_report::{
    cli::{Args, ChartsArgs, Command, GenInputsArgs, ScatterArgs},
    inputs::generate_inputs,
    logging::init_logging,
    points::{load_point_set, render_scatter, ScatterConfig},
    report::{prepare_output_dir, run_parallel, run_sequential, PassResult, ReportConfig},
    results::ResultsManager,
    utils::{format_duration, print_scaling_table},
};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Guard flushes the log file on drop
    let _log_guard = init_logging(args.verbose, args.log_file.as_deref())?;

    debug!("Configuration: {:?}", args);

    match args.command {
        Command::Charts(charts) => run_charts(&charts).await,
        Command::Scatter(scatter) => run_scatter(&scatter),
        Command::GenInputs(gen_args) => run_gen_inputs(&gen_args),
    }
}

async fn run_charts(args: &ChartsArgs) -> Result<()> {
    let config = ReportConfig::from_args(args)?;
    info!(
        "Charting {} method(s): {:?}",
        config.methods.len(),
        config.methods
    );

    prepare_output_dir(&config)?;

    let outcomes = if config.parallel {
        let outcomes = run_parallel(&config).await;
        outcomes
            .iter()
            .for_each(|pass| log_outcome(pass, args.print_table));
        outcomes
    } else {
        run_sequential(&config, |pass| log_outcome(pass, args.print_table))
    };

    let mut results_manager = ResultsManager::new(args.summary_output.as_deref());
    for pass in &outcomes {
        results_manager.add_outcome(pass);
    }
    results_manager.finalize()?;

    let failed = results_manager.failed_count();
    let skipped = config.methods.len() - outcomes.len();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} method(s) failed{}",
            failed,
            config.methods.len(),
            if skipped > 0 {
                format!(", {} skipped", skipped)
            } else {
                String::new()
            }
        );
    }

    info!("All charts written");
    Ok(())
}

fn log_outcome(pass: &PassResult, print_table: bool) {
    let (method, result) = pass;
    match result {
        Ok(report) => {
            info!(
                "{} completed in {} ({} rows) -> {:?}",
                method,
                format_duration(report.elapsed),
                report.rows,
                report.artifact
            );
            if print_table {
                print_scaling_table(&report.analysis);
            }
        }
        Err(e) => error!("{} failed during {} stage: {}", method, e.stage(), e),
    }
}

fn run_scatter(args: &ScatterArgs) -> Result<()> {
    let points = load_point_set(&args.input)?;
    let config = ScatterConfig {
        width: args.width,
        height: args.height,
        title: args.title.clone(),
        x_range: args.x_min..args.x_max,
        y_range: args.y_min..args.y_max,
    };
    render_scatter(&points, &args.output, &config)
}

fn run_gen_inputs(args: &GenInputsArgs) -> Result<()> {
    let paths = generate_inputs(&args.output_dir, &args.sizes, args.seed)?;
    info!("{} input file(s) ready in {:?}", paths.len(), args.output_dir);
    Ok(())
}
