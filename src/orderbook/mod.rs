//! Order book module
//!
//! Per-token book snapshots fetched from the CLOB REST API

mod book;

pub use book::OrderBook;

use rust_decimal::Decimal;

/// A price level in the order book
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Total size available
    pub size: Decimal,
}
