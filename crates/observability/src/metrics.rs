//! Pipeline metrics
//!
//! Per-stage and per-run metrics recorded through the `metrics` facade, plus
//! an in-memory aggregator used to summarize repeated runs.

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{RunReport, StagePhase, StageStatus};
use metrics::{counter, gauge, histogram};

fn phase_label(phase: StagePhase) -> &'static str {
    match phase {
        StagePhase::Main => "main",
        StagePhase::Cleanup => "cleanup",
    }
}

/// Record that a stage process is about to start
pub fn record_stage_started(stage: &str, phase: StagePhase) {
    counter!(
        "renderchain_stage_started_total",
        "stage" => stage.to_string(),
        "phase" => phase_label(phase)
    )
    .increment(1);
}

/// Record the outcome of a stage
///
/// # Example
///
/// ```ignore
/// let status = executor.execute(stage).await;
/// record_stage_completed(&stage.name, StagePhase::Main, &status, started.elapsed());
/// ```
pub fn record_stage_completed(
    stage: &str,
    phase: StagePhase,
    status: &StageStatus,
    duration: Duration,
) {
    counter!(
        "renderchain_stage_runs_total",
        "stage" => stage.to_string(),
        "phase" => phase_label(phase),
        "status" => status.label()
    )
    .increment(1);

    histogram!(
        "renderchain_stage_duration_ms",
        "stage" => stage.to_string()
    )
    .record(duration.as_secs_f64() * 1000.0);
}

/// Record the outcome of a whole run
pub fn record_run_completed(report: &RunReport) {
    let status = if report.is_success() {
        "succeeded"
    } else {
        "failed"
    };
    counter!("renderchain_runs_total", "status" => status).increment(1);
    histogram!("renderchain_run_duration_ms").record(report.duration.as_secs_f64() * 1000.0);
    gauge!("renderchain_last_exit_code").set(f64::from(report.exit_code()));
}

/// Run metrics aggregator
///
/// Aggregates stage timings in memory across repeated runs.
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    /// Total runs observed
    pub total_runs: u64,

    /// Runs that ended with a non-zero exit code
    pub failed_runs: u64,

    /// Whole-run duration statistics (ms)
    pub run_stats: RunningStats,

    /// Per-stage duration statistics (ms), keyed by stage name
    pub stage_stats: BTreeMap<String, RunningStats>,

    /// Per-stage failure counts
    pub stage_failures: BTreeMap<String, u64>,
}

impl RunMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one run report into the aggregate
    pub fn update(&mut self, report: &RunReport) {
        self.total_runs += 1;
        if !report.is_success() {
            self.failed_runs += 1;
        }
        self.run_stats.push(report.duration.as_secs_f64() * 1000.0);

        for stage in &report.stages {
            self.stage_stats
                .entry(stage.name.clone())
                .or_default()
                .push(stage.duration.as_secs_f64() * 1000.0);

            if !stage.status.is_success() {
                *self.stage_failures.entry(stage.name.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Build a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_runs: self.total_runs,
            failed_runs: self.failed_runs,
            failure_rate: if self.total_runs > 0 {
                self.failed_runs as f64 / self.total_runs as f64 * 100.0
            } else {
                0.0
            },
            run_duration_ms: StatsSummary::from(&self.run_stats),
            stage_duration_ms: self
                .stage_stats
                .iter()
                .map(|(name, stats)| (name.clone(), StatsSummary::from(stats)))
                .collect(),
            stage_failures: self.stage_failures.clone(),
        }
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_runs: u64,
    pub failed_runs: u64,
    pub failure_rate: f64,
    pub run_duration_ms: StatsSummary,
    pub stage_duration_ms: BTreeMap<String, StatsSummary>,
    pub stage_failures: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Run Metrics Summary ===")?;
        writeln!(
            f,
            "Runs: {} ({} failed, {:.2}%)",
            self.total_runs, self.failed_runs, self.failure_rate
        )?;
        writeln!(f, "Run duration (ms): {}", self.run_duration_ms)?;

        if !self.stage_duration_ms.is_empty() {
            writeln!(f, "Stage duration (ms):")?;
            for (stage, stats) in &self.stage_duration_ms {
                writeln!(f, "  {}: {}", stage, stats)?;
            }
        }

        if !self.stage_failures.is_empty() {
            writeln!(f, "Stage failures:")?;
            for (stage, count) in &self.stage_failures {
                writeln!(f, "  {}: {}", stage, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
