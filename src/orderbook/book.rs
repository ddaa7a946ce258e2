//! Order book snapshot

use super::PriceLevel;
use rust_decimal::Decimal;

/// L2 snapshot of one token's book as returned by the REST API
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBook {
    /// Token identifier
    pub token_id: String,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<PriceLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            bids: vec![],
            asks: vec![],
        }
    }

    /// Build a book from levels in any order.
    ///
    /// The CLOB lists bids ascending and asks descending (best last); levels
    /// are re-sorted here so the best price is always first.
    pub fn from_levels(
        token_id: impl Into<String>,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            token_id: token_id.into(),
            bids,
            asks,
        }
    }

    /// True when neither side has a level
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Resting bid size at exactly `price`
    pub fn bid_size_at(&self, price: Decimal) -> Decimal {
        size_at(&self.bids, price)
    }

    /// Resting ask size at exactly `price`
    pub fn ask_size_at(&self, price: Decimal) -> Decimal {
        size_at(&self.asks, price)
    }
}

fn size_at(levels: &[PriceLevel], price: Decimal) -> Decimal {
    levels
        .iter()
        .filter(|l| l.price == price)
        .map(|l| l.size)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Decimal, size: Decimal) -> PriceLevel {
        PriceLevel { price, size }
    }

    #[test]
    fn test_order_book_best_prices() {
        let book = OrderBook::from_levels(
            "test",
            vec![level(dec!(0.50), dec!(100))],
            vec![level(dec!(0.52), dec!(100))],
        );

        assert_eq!(book.best_bid(), Some(dec!(0.50)));
        assert_eq!(book.best_ask(), Some(dec!(0.52)));
    }

    #[test]
    fn test_order_book_new() {
        let book = OrderBook::new("test-token");
        assert_eq!(book.token_id, "test-token");
        assert!(book.is_empty());
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_from_levels_sorts_clob_order() {
        // CLOB wire order: bids ascending, asks descending
        let book = OrderBook::from_levels(
            "test",
            vec![level(dec!(0.40), dec!(10)), level(dec!(0.45), dec!(20))],
            vec![level(dec!(0.60), dec!(10)), level(dec!(0.55), dec!(5))],
        );
        assert_eq!(book.best_bid(), Some(dec!(0.45)));
        assert_eq!(book.best_ask(), Some(dec!(0.55)));
        assert_eq!(book.bids[1].price, dec!(0.40));
        assert_eq!(book.asks[1].price, dec!(0.60));
    }

    #[test]
    fn test_one_sided_book() {
        let book = OrderBook::from_levels("test", vec![], vec![level(dec!(0.56), dec!(100))]);
        assert!(!book.is_empty());
        assert!(book.best_bid().is_none());
        assert_eq!(book.best_ask(), Some(dec!(0.56)));
    }

    #[test]
    fn test_size_at() {
        let book = OrderBook::from_levels(
            "test",
            vec![level(dec!(0.45), dec!(20)), level(dec!(0.44), dec!(7))],
            vec![level(dec!(0.55), dec!(5))],
        );
        assert_eq!(book.bid_size_at(dec!(0.45)), dec!(20));
        assert_eq!(book.bid_size_at(dec!(0.450)), dec!(20));
        assert_eq!(book.bid_size_at(dec!(0.43)), dec!(0));
        assert_eq!(book.ask_size_at(dec!(0.55)), dec!(5));
    }
}
