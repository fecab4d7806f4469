//! Error types for source resolution.

use thiserror::Error;

/// Errors produced by a single provider attempt.
///
/// Provider errors are recovered locally by the orchestrator: they are
/// recorded in the resolution diagnostic and never surfaced individually.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network communication with the provider endpoint failed.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The provider did not answer within the bounded timeout.
    #[error("Timed out after {seconds}s")]
    Timeout {
        /// The timeout that was exceeded, in seconds
        seconds: u64,
    },

    /// The provider response could not be parsed for stream URLs.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// The provider answered but yielded no usable candidates.
    #[error("No sources found")]
    NoCandidates,
}

/// Errors from the orchestrator itself.
///
/// Unlike provider errors these indicate misconfiguration, not runtime
/// conditions.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The orchestrator was constructed without any providers.
    #[error("No source providers configured")]
    NoProviders,
}
