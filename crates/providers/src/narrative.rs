//! Narrative generators.

use async_trait::async_trait;

use advisor_core::narrative::template_narrative;
use advisor_core::report::{Analysis, Recommendation};
use advisor_core::traits::NarrativeGenerator;

/// Deterministic generator: renders the template sentence from the numbers
/// it is given. Always available.
#[derive(Debug, Default, Clone)]
pub struct TemplateNarrativeGenerator;

#[async_trait]
impl NarrativeGenerator for TemplateNarrativeGenerator {
    async fn synthesize(
        &self,
        ticker: &str,
        analysis: &Analysis,
        recommendation: &Recommendation,
    ) -> anyhow::Result<String> {
        Ok(template_narrative(ticker, analysis, recommendation))
    }
}

/// AI-backed generator stub. Errors until an LLM client is configured; the
/// assembler falls back to the template on any error, so an unavailable
/// generator never blocks a recommendation.
#[derive(Debug, Clone)]
pub struct LlmNarrativeGenerator {
    api_key: String,
}

impl LlmNarrativeGenerator {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn synthesize(
        &self,
        ticker: &str,
        _analysis: &Analysis,
        _recommendation: &Recommendation,
    ) -> anyhow::Result<String> {
        let _ = &self.api_key;
        anyhow::bail!("LLM narrative synthesis not configured (ticker {ticker})")
    }
}
