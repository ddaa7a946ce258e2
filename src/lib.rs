//! market-scanner: reward/volatility scanner for Polymarket liquidity rewards
//!
//! This library provides the core components for:
//! - Market discovery via the CLOB API
//! - Order book reward-per-100 estimates
//! - Realized volatility over fixed lookbacks
//! - Ranked full and low-volatility views
//! - CSV snapshots and an optional spreadsheet mirror
//! - A scheduled pipeline loop with logging and metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod market;
pub mod model;
pub mod orderbook;
pub mod pipeline;
pub mod ranking;
pub mod sheets;
pub mod telemetry;
