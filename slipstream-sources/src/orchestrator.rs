//! Resolution orchestration across an ordered provider list.
//!
//! Sequential mode stops at the first provider that yields usable
//! candidates; fan-out mode queries every provider and merges the results.
//! Provider order is static configuration decided at startup.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use slipstream_core::types::{CandidateStream, MediaIdentity, ResolutionOutcome, dedup_by_url};
use tracing::{debug, info, warn};

use crate::errors::{ProviderError, SourceError};
use crate::providers::SourceProvider;

/// Holds the ordered provider list and resolves media identities into
/// candidate streams.
///
/// Every provider invocation is isolated: a provider that fails, times
/// out, or panics never aborts the surrounding resolution.
#[derive(Debug, Clone)]
pub struct SourceOrchestrator {
    providers: Vec<Arc<dyn SourceProvider>>,
    provider_timeout: Duration,
}

impl SourceOrchestrator {
    /// Creates an orchestrator over providers in priority order.
    ///
    /// # Errors
    /// - `SourceError::NoProviders` - The provider list is empty; this is a
    ///   wiring mistake, caught at startup rather than per request
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        provider_timeout: Duration,
    ) -> Result<Self, SourceError> {
        if providers.is_empty() {
            return Err(SourceError::NoProviders);
        }
        Ok(Self {
            providers,
            provider_timeout,
        })
    }

    /// Resolves with first-success-wins semantics.
    ///
    /// Providers are tried one at a time in priority order; the first one
    /// returning at least one candidate supplies the whole result. When
    /// every provider fails, the outcome aggregates each provider's
    /// failure reason in order.
    pub async fn resolve_sequential(&self, identity: &MediaIdentity) -> ResolutionOutcome {
        let mut reasons = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name().to_string();
            match self.invoke(provider.clone(), identity.clone()).await {
                Ok(candidates) if !candidates.is_empty() => {
                    let unique = dedup_by_url(candidates);
                    info!(
                        provider = %name,
                        count = unique.len(),
                        title = %identity.title,
                        "resolved candidate streams"
                    );
                    return ResolutionOutcome::resolved(unique);
                }
                Ok(_) => {
                    debug!(provider = %name, "provider succeeded with no candidates");
                    reasons.push(format!("{name}: {}", ProviderError::NoCandidates));
                }
                Err(error) => {
                    debug!(provider = %name, %error, "provider failed");
                    reasons.push(format!("{name}: {error}"));
                }
            }
        }

        warn!(title = %identity.title, "all providers exhausted");
        ResolutionOutcome::exhausted(reasons.join("; "))
    }

    /// Resolves by fanning out to every provider concurrently.
    ///
    /// Failed or timed-out providers contribute nothing. Results are
    /// concatenated in provider-priority order and deduplicated by URL, so
    /// a higher-priority provider's copy of a duplicate URL wins.
    pub async fn resolve_all(&self, identity: &MediaIdentity) -> Vec<CandidateStream> {
        let attempts = self
            .providers
            .iter()
            .map(|provider| self.invoke(provider.clone(), identity.clone()));
        let results = join_all(attempts).await;

        let mut merged = Vec::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(candidates) => merged.extend(candidates),
                Err(error) => {
                    debug!(provider = %provider.name(), %error, "fan-out attempt failed");
                }
            }
        }
        dedup_by_url(merged)
    }

    /// Names of the configured providers, in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Invokes one provider on its own task with a bounded timeout.
    ///
    /// The task boundary keeps a panicking provider from tearing down the
    /// resolution; a timed-out provider's eventual result is discarded.
    async fn invoke(
        &self,
        provider: Arc<dyn SourceProvider>,
        identity: MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        let timeout = self.provider_timeout;
        let seconds = timeout.as_secs();

        let task = tokio::spawn(async move {
            tokio::time::timeout(timeout, provider.scrape(&identity)).await
        });

        match task.await {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(ProviderError::Timeout { seconds }),
            Err(join_error) => Err(ProviderError::Network {
                reason: format!("provider task failed: {join_error}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use slipstream_core::types::TransportKind;

    use super::*;
    use crate::providers::MockProvider;
    use crate::providers::mock::MockOutcome;

    fn candidate(url: &str) -> CandidateStream {
        CandidateStream::new(url)
    }

    fn orchestrator(providers: Vec<Arc<MockProvider>>) -> SourceOrchestrator {
        let dyns: Vec<Arc<dyn SourceProvider>> = providers
            .into_iter()
            .map(|p| p as Arc<dyn SourceProvider>)
            .collect();
        SourceOrchestrator::new(dyns, Duration::from_millis(500)).unwrap()
    }

    fn identity() -> MediaIdentity {
        MediaIdentity::movie(603, "The Matrix", Some(1999))
    }

    #[test]
    fn empty_provider_list_is_rejected_at_construction() {
        let result = SourceOrchestrator::new(Vec::new(), Duration::from_secs(10));
        assert!(matches!(result, Err(SourceError::NoProviders)));
    }

    #[tokio::test]
    async fn sequential_stops_at_first_provider_with_candidates() {
        let p1 = Arc::new(MockProvider::new(
            "P1",
            MockOutcome::Fail("timeout".into()),
        ));
        let p2 = Arc::new(MockProvider::new(
            "P2",
            MockOutcome::Candidates(vec![candidate("https://x/a.m3u8")]),
        ));
        let p3 = Arc::new(MockProvider::new(
            "P3",
            MockOutcome::Candidates(vec![candidate("https://y/b.m3u8")]),
        ));
        let orchestrator = orchestrator(vec![p1.clone(), p2.clone(), p3.clone()]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;

        assert!(outcome.success);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].url, "https://x/a.m3u8");
        assert_eq!(outcome.candidates[0].transport, TransportKind::Hls);
        assert_eq!(p1.call_count(), 1);
        assert_eq!(p2.call_count(), 1);
        assert_eq!(p3.call_count(), 0, "later providers must not be invoked");
    }

    #[tokio::test]
    async fn sequential_treats_empty_success_as_failure() {
        let p1 = Arc::new(MockProvider::new("P1", MockOutcome::Empty));
        let p2 = Arc::new(MockProvider::new(
            "P2",
            MockOutcome::Candidates(vec![candidate("https://x/a.mp4")]),
        ));
        let orchestrator = orchestrator(vec![p1, p2]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;
        assert!(outcome.success);
        assert_eq!(outcome.candidates[0].url, "https://x/a.mp4");
    }

    #[tokio::test]
    async fn sequential_aggregates_all_failure_reasons_in_order() {
        let p1 = Arc::new(MockProvider::new("P1", MockOutcome::Fail("boom".into())));
        let p2 = Arc::new(MockProvider::new("P2", MockOutcome::Empty));
        let orchestrator = orchestrator(vec![p1, p2]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;

        assert!(!outcome.success);
        assert!(outcome.candidates.is_empty());
        let diagnostic = outcome.diagnostic.unwrap();
        assert_eq!(
            diagnostic,
            "P1: Network error: boom; P2: No sources found"
        );
    }

    #[tokio::test]
    async fn hanging_provider_times_out_and_is_skipped() {
        let p1 = Arc::new(MockProvider::new("Slow", MockOutcome::Hang));
        let p2 = Arc::new(MockProvider::new(
            "Fast",
            MockOutcome::Candidates(vec![candidate("https://x/a.m3u8")]),
        ));
        let orchestrator = orchestrator(vec![p1, p2]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;

        assert!(outcome.success);
        assert_eq!(outcome.candidates[0].url, "https://x/a.m3u8");
    }

    #[tokio::test]
    async fn timeout_reason_appears_in_diagnostic() {
        let p1 = Arc::new(MockProvider::new("Slow", MockOutcome::Hang));
        let orchestrator = orchestrator(vec![p1]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;
        assert!(!outcome.success);
        assert!(outcome.diagnostic.unwrap().starts_with("Slow: Timed out"));
    }

    #[tokio::test]
    async fn sequential_dedups_within_winning_provider() {
        let p1 = Arc::new(MockProvider::new(
            "P1",
            MockOutcome::Candidates(vec![
                candidate("https://x/a.m3u8"),
                candidate("https://x/a.m3u8"),
                candidate("https://x/b.mp4"),
            ]),
        ));
        let orchestrator = orchestrator(vec![p1]);

        let outcome = orchestrator.resolve_sequential(&identity()).await;
        assert_eq!(outcome.candidates.len(), 2);
    }

    #[tokio::test]
    async fn sequential_is_idempotent() {
        let p1 = Arc::new(MockProvider::new(
            "P1",
            MockOutcome::Candidates(vec![
                candidate("https://x/a.m3u8"),
                candidate("https://x/b.mp4"),
            ]),
        ));
        let orchestrator = orchestrator(vec![p1]);

        let first = orchestrator.resolve_sequential(&identity()).await;
        let second = orchestrator.resolve_sequential(&identity()).await;
        assert_eq!(first.candidates, second.candidates);
    }

    #[tokio::test]
    async fn fan_out_dedups_and_higher_priority_metadata_wins() {
        let shared = "https://cdn/shared.m3u8";
        let a = Arc::new(MockProvider::new(
            "A",
            MockOutcome::Candidates(vec![candidate(shared).labeled("from A")]),
        ));
        let b = Arc::new(MockProvider::new(
            "B",
            MockOutcome::Candidates(vec![
                candidate(shared).labeled("from B"),
                candidate("https://cdn/only-b.mp4"),
            ]),
        ));
        let orchestrator = orchestrator(vec![a, b]);

        let merged = orchestrator.resolve_all(&identity()).await;

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].url, shared);
        assert_eq!(merged[0].label.as_deref(), Some("from A"));
        assert_eq!(merged[1].url, "https://cdn/only-b.mp4");

        let urls: std::collections::HashSet<_> = merged.iter().map(|c| &c.url).collect();
        assert_eq!(urls.len(), merged.len(), "no duplicate URLs in fan-out");
    }

    #[tokio::test]
    async fn fan_out_survives_failing_and_hanging_providers() {
        let a = Arc::new(MockProvider::new("A", MockOutcome::Fail("down".into())));
        let b = Arc::new(MockProvider::new("B", MockOutcome::Hang));
        let c = Arc::new(MockProvider::new(
            "C",
            MockOutcome::Candidates(vec![candidate("https://x/c.m3u8")]),
        ));
        let orchestrator = orchestrator(vec![a, b, c]);

        let merged = orchestrator.resolve_all(&identity()).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://x/c.m3u8");
    }
}
