//! Error types for fund data providers.

use thiserror::Error;

/// Errors produced while fetching fund data from an external source.
///
/// The transient/terminal split drives the synchronizer's retry policy:
/// transient errors are retried with backoff, terminal errors fail the
/// attempt immediately and wait for the next scheduled window.
#[derive(Error, Debug)]
pub enum FundDataError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout contacting provider {provider}")]
    Timeout { provider: String },

    #[error("Rate limited by provider {provider}")]
    RateLimited { provider: String },

    #[error("Unknown fund code: {0}")]
    FundNotFound(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("No data for requested range")]
    NoData,

    #[error("Provider {provider} error: {message}")]
    Provider { provider: String, message: String },
}

impl FundDataError {
    /// Returns true if the error is transient and a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FundDataError::Network(_)
                | FundDataError::Timeout { .. }
                | FundDataError::RateLimited { .. }
        )
    }

    /// Returns true if the error is terminal and retrying won't help.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FundDataError::FundNotFound(_) | FundDataError::InvalidResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint_for_known_variants() {
        let terminal = FundDataError::FundNotFound("000001".to_string());
        assert!(terminal.is_terminal());
        assert!(!terminal.is_transient());

        let transient = FundDataError::Timeout {
            provider: "eastmoney".to_string(),
        };
        assert!(transient.is_transient());
        assert!(!transient.is_terminal());

        // NoData is neither: the range may simply predate the fund.
        assert!(!FundDataError::NoData.is_transient());
        assert!(!FundDataError::NoData.is_terminal());
    }
}
