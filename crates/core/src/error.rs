//! Error types for the data-provider boundary.
//!
//! Degenerate numeric inputs are not errors; the quant engine returns
//! neutral values for those. `ProviderError` covers the genuinely
//! recoverable failures: a fetch that failed, timed out, or hit an
//! operation the provider does not support.

use thiserror::Error;

/// Errors raised by market data and macro calendar providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not implement this operation. Callers must treat
    /// this as a fetch failure, never fabricate a value in its place.
    #[error("operation not implemented: {0}")]
    NotImplemented(String),

    /// The fetch itself failed (network, upstream, decode).
    #[error("data fetch failed: {0}")]
    Fetch(String),

    /// The fetch did not return within its timeout.
    #[error("data fetch timed out: {0}")]
    Timeout(String),
}
