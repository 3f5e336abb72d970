//! Batch orchestration: universe loading, the outbound call-rate budget,
//! and the sequential batch runner over the decision pipeline.

pub mod batch;
pub mod rate_limit;
pub mod universe;

pub use batch::BatchOrchestrator;
pub use rate_limit::SlidingWindowLimiter;
pub use universe::{liquidity_filter, load_universe, LiquidityMetrics};
