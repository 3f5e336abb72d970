//! The decision pipeline: regime read, strategy table, contract selection,
//! risk gates, and the assembler that ties them into one `TradeReport` per
//! ticker.

pub mod assembler;
pub mod contracts;
pub mod gates;
pub mod regime;
pub mod strategy;

pub use assembler::AdvisorPipeline;
pub use contracts::{select_contract, SelectedContract};
pub use gates::{evaluate_gates, GateContext, GateReport};
pub use regime::{market_regime, RegimeRead};
pub use strategy::{apply_trend_override, select_strategy};
