//! Core types, ports, and configuration for the premium-selling advisor.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod market;
pub mod narrative;
pub mod position;
pub mod report;
pub mod traits;

pub use config::{
    AppConfig, OrchestratorConfig, ProviderConfig, ProviderMode, ThresholdConfig, WatchmanConfig,
};
pub use config_loader::ConfigLoader;
pub use error::ProviderError;
pub use market::{MacroEvent, MarketSnapshot, OptionChain, OptionQuote, Quote};
pub use position::{
    AlertRecord, Freshness, LastObserved, LifecycleStage, Position, RiskRules, TriggerKind,
    TriggeredAlert,
};
pub use report::{
    Analysis, ContractSource, GateOutcome, Recommendation, RecordStatus, Regime, RsiState,
    TradeRecord, TradeReport, Trend, Verdict,
};
pub use traits::{MacroCalendarProvider, MarketDataProvider, NarrativeGenerator, Store};
