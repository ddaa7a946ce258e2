//! Long-lived handles shared by every run

use crate::config::{Config, RankingStrategy, Thresholds};
use crate::data::SnapshotWriter;
use crate::market::{ClobClient, ClobConfig, MarketSource};
use crate::sheets::SheetMirror;
use std::sync::Arc;
use std::time::Duration;

/// Everything a pipeline run needs, built once at startup
pub struct PipelineContext {
    pub source: Arc<dyn MarketSource>,
    pub snapshots: SnapshotWriter,
    /// `None` when spreadsheet mirroring is off
    pub mirror: Option<SheetMirror>,
    pub thresholds: Thresholds,
    pub low_volatility_strategy: RankingStrategy,
}

impl PipelineContext {
    /// Context with default thresholds and no mirror
    pub fn new(source: Arc<dyn MarketSource>, snapshots: SnapshotWriter) -> Self {
        Self {
            source,
            snapshots,
            mirror: None,
            thresholds: Thresholds::default(),
            low_volatility_strategy: RankingStrategy::default(),
        }
    }

    pub fn with_mirror(mut self, mirror: SheetMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_strategy(mut self, strategy: RankingStrategy) -> Self {
        self.low_volatility_strategy = strategy;
        self
    }

    /// Production context: CLOB client, CSV snapshots and the optional mirror
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = ClobClient::with_config(ClobConfig::from(&config.api))?;
        let mirror =
            SheetMirror::from_config(&config.sheets, Duration::from_secs(config.api.timeout_secs))?;

        tracing::info!(
            clob_url = %source.config().base_url,
            output_dir = %config.data.output_dir.display(),
            mirror = mirror.is_some(),
            strategy = ?config.ranking.low_volatility_strategy,
            "Pipeline context ready"
        );

        Ok(Self {
            source: Arc::new(source),
            snapshots: SnapshotWriter::new(&config.data.output_dir),
            mirror,
            thresholds: config.thresholds.clone(),
            low_volatility_strategy: config.ranking.low_volatility_strategy,
        })
    }
}
