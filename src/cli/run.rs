//! Run and once command implementations

use crate::config::Config;
use crate::data::run_timestamp;
use crate::pipeline::{run_once, PipelineContext, Supervisor, SystemClock};
use chrono::Local;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stop after this many runs (overrides `schedule.max_runs`)
    #[arg(long)]
    pub max_runs: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ctx = PipelineContext::from_config(config)?;

        let mut schedule = config.schedule.clone();
        if self.max_runs.is_some() {
            schedule.max_runs = self.max_runs;
        }

        let report = Supervisor::from_config(ctx, Arc::new(SystemClock), &schedule)
            .run()
            .await;
        println!(
            "Finished {} runs ({} failed)",
            report.runs, report.failures
        );
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OnceArgs {}

impl OnceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ctx = PipelineContext::from_config(config)?;
        let summary = run_once(&ctx, &run_timestamp(Local::now())).await?;

        println!("Run {}", summary.timestamp);
        println!("  Listed markets:     {}", summary.listed);
        println!("  Books found:        {}", summary.results);
        println!("  Two-sided markets:  {}", summary.processed);
        println!("  Ranked markets:     {}", summary.ranked);
        println!("  Low volatility:     {}", summary.low_volatility);
        println!("  Worksheets updated: {}", summary.sheets_updated);
        for path in &summary.snapshots {
            println!("  Wrote {}", path.display());
        }
        if summary.snapshot_failures > 0 {
            println!("  Snapshot failures:  {}", summary.snapshot_failures);
        }
        Ok(())
    }
}
