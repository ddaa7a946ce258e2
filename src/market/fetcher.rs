//! Full market listing

use super::{Market, MarketSource};

/// Page through the whole listing and return every market.
///
/// Errors from the API are returned as-is; retrying is the caller's job.
pub async fn fetch_all_markets(source: &dyn MarketSource) -> anyhow::Result<Vec<Market>> {
    let mut markets = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.fetch_markets_page(cursor.as_deref()).await?;
        pages += 1;
        markets.extend(page.markets);

        match page.next_cursor {
            Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            _ => break,
        }
    }

    tracing::info!(market_count = markets.len(), pages, "Fetched all markets");
    Ok(markets)
}
