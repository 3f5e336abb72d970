//! Concrete implementations of the advisor's provider ports, plus the
//! config-driven factories that pick one at process start.

pub mod macro_calendar;
pub mod market_data;
pub mod narrative;

pub use macro_calendar::{
    macro_calendar_from_config, LiveMacroCalendarProvider, MockMacroCalendarProvider,
};
pub use market_data::{market_data_from_config, LiveMarketDataProvider, MockMarketDataProvider};
pub use narrative::{LlmNarrativeGenerator, TemplateNarrativeGenerator};
