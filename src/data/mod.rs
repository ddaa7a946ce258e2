//! Snapshot output module
//!
//! Flat CSV snapshots of every pipeline stage

mod snapshot;

pub use snapshot::{run_timestamp, SnapshotWriter, TIMESTAMP_FORMAT};

/// A row type with a fixed column layout
pub trait Tabular {
    /// Column names, in output order
    const HEADERS: &'static [&'static str];

    /// Cell values in [`HEADERS`](Self::HEADERS) order
    fn record(&self) -> Vec<String>;
}

/// Header row plus records, ready for a spreadsheet
pub fn to_grid<T: Tabular>(rows: &[T]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = T::HEADERS.iter().map(|h| h.to_string()).collect();
    let records = rows.iter().map(Tabular::record).collect();
    (headers, records)
}
