//! Writes views into their worksheets

use super::{GoogleSheets, Worksheet};
use crate::config::SheetsConfig;
use crate::data::{to_grid, Tabular};
use crate::market::MarketResult;
use crate::ranking::RankedRow;
use std::sync::Arc;

/// Which view a worksheet receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetTarget {
    /// The full ranked view
    AllMarkets,
    /// The low-volatility view
    VolatilityMarkets,
    /// Processed markets before volatility was attached
    FullMarkets,
}

impl std::fmt::Display for SheetTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetTarget::AllMarkets => write!(f, "all_markets"),
            SheetTarget::VolatilityMarkets => write!(f, "volatility_markets"),
            SheetTarget::FullMarkets => write!(f, "full_markets"),
        }
    }
}

/// Header plus data rows, padded with empty cells so the write covers at
/// least the area `existing` occupies.
///
/// `existing` is the sheet's current contents including its header row.
pub fn pad_grid(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    existing: &[Vec<String>],
) -> Vec<Vec<String>> {
    let existing_cols = existing.iter().map(Vec::len).max().unwrap_or(0);
    let num_rows = rows.len().max(existing.len());
    let num_cols = headers.len().max(existing_cols);

    let pad = |mut row: Vec<String>| {
        row.resize(num_cols, String::new());
        row
    };

    let mut grid = Vec::with_capacity(num_rows + 1);
    grid.push(pad(headers));
    grid.extend(rows.into_iter().map(pad));
    grid.resize(num_rows + 1, vec![String::new(); num_cols]);
    grid
}

/// The configured worksheets, each optional
#[derive(Default)]
pub struct SheetMirror {
    sheets: Vec<(SheetTarget, Box<dyn Worksheet>)>,
}

impl SheetMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `target` to `sheet`
    pub fn with_sheet(mut self, target: SheetTarget, sheet: Box<dyn Worksheet>) -> Self {
        self.sheets.push((target, sheet));
        self
    }

    /// Build the mirror described by `config`; `None` when mirroring is off
    pub fn from_config(
        config: &SheetsConfig,
        timeout: std::time::Duration,
    ) -> anyhow::Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let client = Arc::new(GoogleSheets::from_config(config, timeout)?);
        let mut mirror = Self::new();
        let targets = [
            (SheetTarget::AllMarkets, &config.all_markets),
            (SheetTarget::VolatilityMarkets, &config.volatility_markets),
            (SheetTarget::FullMarkets, &config.full_markets),
        ];
        for (target, title) in targets {
            match title.as_deref() {
                Some(title) if !title.is_empty() => {
                    mirror = mirror.with_sheet(target, Box::new(client.worksheet(title)));
                }
                _ => tracing::debug!(view = %target, "Worksheet not configured"),
            }
        }
        Ok(Some(mirror))
    }

    /// Write each view to its worksheet; returns the number of sheets written
    pub async fn publish(
        &self,
        full: &[RankedRow],
        low_volatility: &[RankedRow],
        processed: &[MarketResult],
    ) -> anyhow::Result<usize> {
        for (target, sheet) in &self.sheets {
            match target {
                SheetTarget::AllMarkets => write_sheet(sheet.as_ref(), full).await?,
                SheetTarget::VolatilityMarkets => {
                    write_sheet(sheet.as_ref(), low_volatility).await?
                }
                SheetTarget::FullMarkets => write_sheet(sheet.as_ref(), processed).await?,
            }
            tracing::info!(view = %target, sheet = sheet.title(), "Updated worksheet");
        }
        Ok(self.sheets.len())
    }
}

async fn write_sheet<T: Tabular>(sheet: &dyn Worksheet, rows: &[T]) -> anyhow::Result<()> {
    let existing = sheet.get_all_values().await?;
    let (headers, records) = to_grid(rows);
    let grid = pad_grid(headers, records, &existing);

    // Values writes are clipped to the sheet's grid, which starts at 26 columns
    let cols = grid.first().map_or(0, Vec::len);
    sheet.resize(grid.len(), cols).await?;
    sheet.update(grid).await
}
