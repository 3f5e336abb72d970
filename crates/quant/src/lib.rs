//! Pure quantitative functions for the advisor pipeline. No state, no IO.

pub mod classifier;
pub mod engine;

pub use classifier::{rsi_state, trend_state};
pub use engine::{dte_alert, efficiency_ratio, expected_move, DteStatus, EfficiencyCheck};
