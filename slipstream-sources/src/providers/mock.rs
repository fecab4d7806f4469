//! Mock provider implementation for testing.

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use slipstream_core::types::{CandidateStream, MediaIdentity};

#[cfg(test)]
use super::SourceProvider;
#[cfg(test)]
use crate::errors::ProviderError;

/// Scripted outcome for one mock provider.
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Succeed with the given candidates.
    Candidates(Vec<CandidateStream>),
    /// Succeed with an empty list.
    Empty,
    /// Fail with the given reason.
    Fail(String),
    /// Never answer, so the orchestrator timeout fires.
    Hang,
}

/// Mock provider with a scripted outcome and an invocation counter.
#[cfg(test)]
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    outcome: MockOutcome,
    calls: AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    /// Creates a mock provider replaying the given outcome.
    pub fn new(name: impl Into<String>, outcome: MockOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the orchestrator invoked this provider.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl SourceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scrape(
        &self,
        _identity: &MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Candidates(candidates) => Ok(candidates.clone()),
            MockOutcome::Empty => Ok(Vec::new()),
            MockOutcome::Fail(reason) => Err(ProviderError::Network {
                reason: reason.clone(),
            }),
            MockOutcome::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
