//! In-memory worksheet that records every write
//!
//! Like a real worksheet, writes outside the current grid are rejected.

use super::Worksheet;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SheetState {
    values: Vec<Vec<String>>,
    grid: (usize, usize),
    writes: Vec<Vec<Vec<String>>>,
    resizes: Vec<(usize, usize)>,
    fail_updates: bool,
}

/// Mock worksheet; clones share state so a test can keep a handle
#[derive(Debug, Clone)]
pub struct RecordingWorksheet {
    title: String,
    state: Arc<Mutex<SheetState>>,
}

impl RecordingWorksheet {
    pub fn new(title: &str) -> Self {
        Self::with_values(title, Vec::new())
    }

    /// A sheet that already holds `values`, its grid fitted to them
    pub fn with_values(title: &str, values: Vec<Vec<String>>) -> Self {
        let cols = values.iter().map(Vec::len).max().unwrap_or(0);
        let grid = (values.len(), cols);
        Self::build(title, values, grid)
    }

    /// An empty sheet with a `rows` by `cols` grid
    pub fn with_grid(title: &str, rows: usize, cols: usize) -> Self {
        Self::build(title, Vec::new(), (rows, cols))
    }

    fn build(title: &str, values: Vec<Vec<String>>, grid: (usize, usize)) -> Self {
        Self {
            title: title.to_string(),
            state: Arc::new(Mutex::new(SheetState {
                values,
                grid,
                ..SheetState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SheetState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every later update fail
    pub fn fail_updates(&self) {
        self.state().fail_updates = true;
    }

    /// Every grid written so far, oldest first
    pub fn writes(&self) -> Vec<Vec<Vec<String>>> {
        self.state().writes.clone()
    }

    pub fn last_write(&self) -> Option<Vec<Vec<String>>> {
        self.state().writes.last().cloned()
    }

    /// Every `(rows, cols)` resize so far
    pub fn resizes(&self) -> Vec<(usize, usize)> {
        self.state().resizes.clone()
    }

    /// Current `(rows, cols)` grid
    pub fn grid_size(&self) -> (usize, usize) {
        self.state().grid
    }
}

#[async_trait]
impl Worksheet for RecordingWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn get_all_values(&self) -> anyhow::Result<Vec<Vec<String>>> {
        Ok(self.state().values.clone())
    }

    async fn resize(&self, rows: usize, cols: usize) -> anyhow::Result<()> {
        let mut state = self.state();
        state.grid = (rows, cols);
        state.resizes.push((rows, cols));
        Ok(())
    }

    async fn update(&self, grid: Vec<Vec<String>>) -> anyhow::Result<()> {
        let mut state = self.state();
        if state.fail_updates {
            anyhow::bail!("mock update error for {}", self.title);
        }
        let (max_rows, max_cols) = state.grid;
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if grid.len() > max_rows || cols > max_cols {
            anyhow::bail!(
                "{}x{} write exceeds {} grid of {}x{}",
                grid.len(),
                cols,
                self.title,
                max_rows,
                max_cols
            );
        }
        state.values = grid.clone();
        state.writes.push(grid);
        Ok(())
    }
}
