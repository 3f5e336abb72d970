//! Macro-economic calendar providers (CPI, NFP, FOMC and similar).

use std::sync::Arc;

use async_trait::async_trait;

use advisor_core::config::{ProviderConfig, ProviderMode};
use advisor_core::error::ProviderError;
use advisor_core::market::MacroEvent;
use advisor_core::traits::MacroCalendarProvider;

/// Mock calendar: no events, so the macro gate always passes.
#[derive(Debug, Default, Clone)]
pub struct MockMacroCalendarProvider;

#[async_trait]
impl MacroCalendarProvider for MockMacroCalendarProvider {
    async fn high_impact_events(
        &self,
        _within_hours: i64,
    ) -> Result<Vec<MacroEvent>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Live calendar stub keyed for an economic-calendar API. The upstream call
/// is not wired yet; without it the provider reports an empty calendar,
/// which fails open; the gate only ever blocks on positive signal.
#[derive(Debug, Clone)]
pub struct LiveMacroCalendarProvider {
    api_key: String,
}

impl LiveMacroCalendarProvider {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MacroCalendarProvider for LiveMacroCalendarProvider {
    async fn high_impact_events(
        &self,
        _within_hours: i64,
    ) -> Result<Vec<MacroEvent>, ProviderError> {
        if self.api_key.is_empty() {
            return Ok(Vec::new());
        }
        // TODO: wire the economic-calendar HTTP client once an API key is
        // provisioned for this environment.
        Ok(Vec::new())
    }
}

/// Constructs the configured macro calendar provider.
#[must_use]
pub fn macro_calendar_from_config(config: &ProviderConfig) -> Arc<dyn MacroCalendarProvider> {
    match config.mode {
        ProviderMode::Live if !config.macro_calendar_api_key.is_empty() => Arc::new(
            LiveMacroCalendarProvider::new(config.macro_calendar_api_key.clone()),
        ),
        _ => Arc::new(MockMacroCalendarProvider),
    }
}
