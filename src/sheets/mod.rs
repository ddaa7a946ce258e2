//! Spreadsheet mirror module
//!
//! Copies the final views into worksheets, overwriting previous contents

mod google;
mod mirror;
pub mod mock;

pub use google::{GoogleSheets, GoogleWorksheet, SheetsError};
pub use mirror::{pad_grid, SheetMirror, SheetTarget};

use async_trait::async_trait;

/// A worksheet that can be read whole and overwritten in bulk
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Worksheet title
    fn title(&self) -> &str;

    /// Every non-empty row currently on the sheet, header included
    async fn get_all_values(&self) -> anyhow::Result<Vec<Vec<String>>>;

    /// Set the grid to exactly `rows` by `cols` cells
    async fn resize(&self, rows: usize, cols: usize) -> anyhow::Result<()>;

    /// Overwrite the sheet from `A1` with `grid`
    async fn update(&self, grid: Vec<Vec<String>>) -> anyhow::Result<()>;
}
