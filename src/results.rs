use crate::{
    error::{ReportError, Stage},
    metrics::GroupSeries,
    report::{MethodReport, PassResult},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one method's pass as recorded in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodOutcome {
    pub method: String,
    pub status: OutcomeStatus,
    pub source: Option<PathBuf>,
    pub artifact: Option<PathBuf>,
    pub rows: usize,
    pub elapsed_ms: f64,
    pub groups: Vec<GroupSummary>,
    pub failure: Option<FailureInfo>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
}

/// Where and why a pass failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub stage: Stage,
    pub message: String,
}

/// Derived series of one problem size plus its headline numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub points: u64,
    pub baseline_threads: u32,
    pub best_speedup: Option<f64>,
    pub best_speedup_threads: Option<u32>,
    pub efficiency_at_max_threads: Option<f64>,
    pub series: GroupSeries,
}

impl From<&GroupSeries> for GroupSummary {
    fn from(group: &GroupSeries) -> Self {
        let best = group.best_speedup();
        Self {
            points: group.points,
            baseline_threads: group.baseline_threads,
            best_speedup: best.map(|p| p.speedup),
            best_speedup_threads: best.map(|p| p.threads),
            efficiency_at_max_threads: group.efficiency_at_max_threads(),
            series: group.clone(),
        }
    }
}

impl MethodOutcome {
    pub fn succeeded(report: &MethodReport) -> Self {
        Self {
            method: report.method.name().to_string(),
            status: OutcomeStatus::Succeeded,
            source: Some(report.source.clone()),
            artifact: Some(report.artifact.clone()),
            rows: report.rows,
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
            groups: report.analysis.groups.iter().map(GroupSummary::from).collect(),
            failure: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn failed(error: &ReportError) -> Self {
        Self {
            method: error.method().to_string(),
            status: OutcomeStatus::Failed,
            source: None,
            artifact: None,
            rows: 0,
            elapsed_ms: 0.0,
            groups: Vec::new(),
            failure: Some(FailureInfo {
                stage: error.stage(),
                message: error.to_string(),
            }),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn from_pass(pass: &PassResult) -> Self {
        match &pass.1 {
            Ok(report) => Self::succeeded(report),
            Err(error) => Self::failed(error),
        }
    }
}

/// System information for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub report_version: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
            report_version: crate::VERSION.to_string(),
        }
    }
}

/// Final summary document
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalReport {
    pub metadata: ReportMetadata,
    pub methods: Vec<MethodOutcome>,
    pub summary: OverallSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub total_methods: usize,
    pub system_info: SystemInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverallSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub artifacts: Vec<PathBuf>,
    pub failed_methods: Vec<String>,
}

/// Collects per-method outcomes and writes the JSON summary
pub struct ResultsManager {
    output_file: Option<PathBuf>,
    outcomes: Vec<MethodOutcome>,
}

impl ResultsManager {
    /// Create a results manager; `None` keeps outcomes in memory only
    pub fn new(output_file: Option<&Path>) -> Self {
        Self {
            output_file: output_file.map(Path::to_path_buf),
            outcomes: Vec::new(),
        }
    }

    /// Record the outcome of one pass
    pub fn add_outcome(&mut self, pass: &PassResult) {
        let outcome = MethodOutcome::from_pass(pass);
        debug!("Recording {:?} outcome for {}", outcome.status, outcome.method);
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[MethodOutcome] {
        &self.outcomes
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .count()
    }

    /// Write the summary file, if one was requested
    pub fn finalize(&self) -> Result<()> {
        let Some(ref output_file) = self.output_file else {
            return Ok(());
        };

        info!("Finalizing report summary");
        let report = FinalReport {
            metadata: ReportMetadata {
                version: crate::VERSION.to_string(),
                timestamp: chrono::Utc::now(),
                total_methods: self.outcomes.len(),
                system_info: SystemInfo::default(),
            },
            methods: self.outcomes.clone(),
            summary: self.calculate_overall_summary(),
        };

        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output_file, json)
            .with_context(|| format!("Failed to write summary to {:?}", output_file))?;

        info!("Summary written to: {:?}", output_file);
        Ok(())
    }

    fn calculate_overall_summary(&self) -> OverallSummary {
        let failed_methods: Vec<String> = self
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .map(|o| o.method.clone())
            .collect();

        OverallSummary {
            succeeded: self.outcomes.len() - failed_methods.len(),
            failed: failed_methods.len(),
            artifacts: self
                .outcomes
                .iter()
                .filter_map(|o| o.artifact.clone())
                .collect(),
            failed_methods,
        }
    }
}
