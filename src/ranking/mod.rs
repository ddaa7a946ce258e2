//! Ranking module
//!
//! Joins processed markets with their volatility and orders the final views

mod row;
mod strategy;

pub use row::{derive_rows, volatility_reward_text, RankedRow, RATIO_UNDEFINED};
pub use strategy::{
    composite_rank, composite_scores, full_view, low_volatility_view, proximity_score,
    sort_by_reward, z_scores,
};
