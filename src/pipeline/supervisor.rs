//! Scheduled pipeline loop

use super::{run_once, Clock, PipelineContext, RunSummary};
use crate::config::ScheduleConfig;
use crate::data::run_timestamp;
use crate::telemetry::{increment, set_gauge, CounterMetric, GaugeMetric};
use std::sync::Arc;
use std::time::Duration;

/// Outcome counts of a bounded supervisor loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub runs: u64,
    pub failures: u64,
}

/// Runs the pipeline, sleeps, repeats.
///
/// A failed run is logged with its cause chain and the loop carries on
/// after the usual interval.
pub struct Supervisor {
    ctx: PipelineContext,
    clock: Arc<dyn Clock>,
    interval: Duration,
    max_runs: Option<u64>,
}

impl Supervisor {
    pub fn new(ctx: PipelineContext, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            ctx,
            clock,
            interval,
            max_runs: None,
        }
    }

    pub fn from_config(
        ctx: PipelineContext,
        clock: Arc<dyn Clock>,
        schedule: &ScheduleConfig,
    ) -> Self {
        Self::new(ctx, clock, Duration::from_secs(schedule.interval_secs))
            .with_max_runs(schedule.max_runs)
    }

    /// Stop after `max_runs` runs; `None` loops forever
    pub fn with_max_runs(mut self, max_runs: Option<u64>) -> Self {
        self.max_runs = max_runs;
        self
    }

    /// Run once, logging instead of returning the error
    pub async fn run_iteration(&self) -> Option<RunSummary> {
        let now = self.clock.now();
        let timestamp = run_timestamp(now);

        match run_once(&self.ctx, &timestamp).await {
            Ok(summary) => {
                increment(CounterMetric::RunsSucceeded, 1);
                set_gauge(GaugeMetric::LastSuccessTimestamp, now.timestamp() as f64);
                Some(summary)
            }
            Err(e) => {
                increment(CounterMetric::RunsFailed, 1);
                tracing::error!(timestamp = %timestamp, error = ?e, "Pipeline run failed");
                None
            }
        }
    }

    /// Loop until `max_runs` is reached (forever when unset)
    pub async fn run(&self) -> SupervisorReport {
        let mut report = SupervisorReport::default();
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_runs = ?self.max_runs,
            "Supervisor started"
        );

        loop {
            report.runs += 1;
            if self.run_iteration().await.is_none() {
                report.failures += 1;
            }

            if self.max_runs.is_some_and(|max| report.runs >= max) {
                break;
            }

            tracing::info!(sleep_secs = self.interval.as_secs(), "Sleeping until next run");
            self.clock.sleep(self.interval).await;
        }

        tracing::info!(runs = report.runs, failures = report.failures, "Supervisor stopped");
        report
    }
}
