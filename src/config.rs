//! Configuration types for market-scanner

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Trading API (CLOB REST) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Lookback requested from `/prices-history` (e.g. "1m" = one month)
    #[serde(default = "default_history_interval")]
    pub history_interval: String,
    /// Minutes between price-history samples
    #[serde(default = "default_history_fidelity")]
    pub history_fidelity: u32,
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_history_interval() -> String {
    "1m".to_string()
}
fn default_history_fidelity() -> u32 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            clob_url: default_clob_url(),
            timeout_secs: default_timeout_secs(),
            history_interval: default_history_interval(),
            history_fidelity: default_history_fidelity(),
        }
    }
}

/// Inclusive price band used by the composite proximity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Band {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl Band {
    pub fn new(lower: Decimal, upper: Decimal) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> Decimal {
        self.upper - self.lower
    }
}

/// Every tunable constant of the pipeline in one place
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thresholds {
    /// Share of the daily reward rate attributed to makers
    #[serde(default = "default_maker_reward_share")]
    pub maker_reward_share: f64,

    /// Rows with `volatility_sum` strictly below this land in the low-volatility view
    #[serde(default = "default_volatility_cutoff")]
    pub volatility_cutoff: f64,

    /// Cheap-side sweet spot; scores 1.0 at `lower` falling to 0.0 at `upper`
    #[serde(default = "default_low_band")]
    pub low_band: Band,

    /// Expensive-side sweet spot; scores 0.0 at `lower` rising to 1.0 at `upper`
    #[serde(default = "default_high_band")]
    pub high_band: Band,

    /// The spreadsheet is only mirrored when the full view has more rows than this
    #[serde(default = "default_mirror_min_rows")]
    pub mirror_min_rows: usize,
}

fn default_maker_reward_share() -> f64 {
    0.75
}
fn default_volatility_cutoff() -> f64 {
    20.0
}
fn default_low_band() -> Band {
    Band::new(Decimal::new(10, 2), Decimal::new(25, 2)) // 0.10 - 0.25
}
fn default_high_band() -> Band {
    Band::new(Decimal::new(75, 2), Decimal::new(90, 2)) // 0.75 - 0.90
}
fn default_mirror_min_rows() -> usize {
    50
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            maker_reward_share: default_maker_reward_share(),
            volatility_cutoff: default_volatility_cutoff(),
            low_band: default_low_band(),
            high_band: default_high_band(),
            mirror_min_rows: default_mirror_min_rows(),
        }
    }
}

/// Ordering applied to a ranked view
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    /// Descending `gm_reward_per_100`
    #[default]
    Reward,
    /// Descending composite of standardized reward, volatility and bid/ask proximity
    Composite,
}

/// Ranking configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Strategy used to order the low-volatility view
    #[serde(default)]
    pub low_volatility_strategy: RankingStrategy,
}

/// Snapshot output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Spreadsheet mirror configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_sheets_url")]
    pub api_url: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Environment variable holding the OAuth bearer token
    #[serde(default = "default_token_env")]
    pub access_token_env: String,
    /// Worksheet receiving the full view
    #[serde(default = "default_all_markets")]
    pub all_markets: Option<String>,
    /// Worksheet receiving the low-volatility view
    #[serde(default = "default_volatility_markets")]
    pub volatility_markets: Option<String>,
    /// Worksheet receiving the processed markets
    #[serde(default = "default_full_markets")]
    pub full_markets: Option<String>,
}

fn default_sheets_url() -> String {
    "https://sheets.googleapis.com".to_string()
}
fn default_token_env() -> String {
    "GOOGLE_SHEETS_TOKEN".to_string()
}
fn default_all_markets() -> Option<String> {
    Some("All Markets".to_string())
}
fn default_volatility_markets() -> Option<String> {
    Some("Volatility Markets".to_string())
}
fn default_full_markets() -> Option<String> {
    Some("Full Markets".to_string())
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_sheets_url(),
            spreadsheet_id: String::new(),
            access_token_env: default_token_env(),
            all_markets: default_all_markets(),
            volatility_markets: default_volatility_markets(),
            full_markets: default_full_markets(),
        }
    }
}

/// Polling loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Sleep between pipeline runs
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Stop after this many runs; unset means run forever
    #[serde(default)]
    pub max_runs: Option<u64>,
}

fn default_interval_secs() -> u64 {
    60 * 60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_runs: None,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
