//! Slipstream Sources - stream discovery and resolution orchestration
//!
//! Resolves a media identity into playable candidate streams by querying
//! an ordered set of independent providers, with first-success-wins and
//! fan-out resolution modes.

pub mod errors;
pub mod extract;
pub mod orchestrator;
pub mod providers;

// Re-export main types
pub use errors::{ProviderError, SourceError};
pub use orchestrator::SourceOrchestrator;
pub use providers::{PageScrapeProvider, SourceProvider, SuperEmbedProvider, VidSrcProvider};
