//! Provider implementations for stream discovery.

use async_trait::async_trait;
use slipstream_core::types::{CandidateStream, MediaIdentity};

use crate::errors::ProviderError;

pub mod mock;
pub mod pagescrape;
pub mod superembed;
pub mod vidsrc;

pub use pagescrape::PageScrapeProvider;
pub use superembed::SuperEmbedProvider;
pub use vidsrc::VidSrcProvider;
#[cfg(test)]
pub use mock::MockProvider;

/// Trait for candidate stream providers.
///
/// Each implementation encapsulates one external discovery strategy
/// (probe a known embed-URL pattern, scan an HTML page for stream URLs).
/// The orchestrator holds providers behind this trait and never inspects
/// the concrete type.
#[async_trait]
pub trait SourceProvider: Send + Sync + std::fmt::Debug {
    /// Short human-readable provider name used in diagnostics.
    fn name(&self) -> &str;

    /// Discovers candidate streams for the given media identity.
    ///
    /// # Errors
    /// - `ProviderError::Network` - Communication with the provider endpoint failed
    /// - `ProviderError::Parse` - Response could not be scanned for streams
    /// - `ProviderError::NoCandidates` - Provider answered but found nothing
    async fn scrape(&self, identity: &MediaIdentity)
    -> Result<Vec<CandidateStream>, ProviderError>;
}
