//! The watchman: supervision of open premium-selling positions.
//!
//! `monitor` holds the per-cycle trigger rules, `service` the polling loop,
//! `sink` the alert delivery boundary, and `market_hours` the session
//! clock that picks the poll cadence.

pub mod market_hours;
pub mod monitor;
pub mod service;
pub mod sink;

pub use market_hours::is_market_hours;
pub use monitor::Watchman;
pub use service::WatchmanService;
pub use sink::{AlertEvent, AlertSink, BoundedRetrySink, LogSink};
