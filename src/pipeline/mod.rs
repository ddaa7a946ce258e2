//! Pipeline module
//!
//! The scan itself, the context it runs in and the loop that schedules it

mod clock;
mod context;
mod run;
mod supervisor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::PipelineContext;
pub use run::{
    run_once, RunSummary, ALL_MARKETS_RAW, ALL_RESULTS_ORDERBOOK, FINAL_PROCESSED_MARKETS,
    LOW_VOLATILITY_MARKETS, PROCESSED_MARKETS,
};
pub use supervisor::{Supervisor, SupervisorReport};
