//! VidSrc embed-probe provider.
//!
//! VidSrc is an aggregator addressed by catalog id through a fixed
//! embed-URL pattern. The embed page is fetched and scanned for direct
//! stream URLs; when none are visible server-side the embed page itself
//! is returned as an opaque candidate, since the iframe may still play
//! in the client even when the fetch is blocked.

use std::time::Duration;

use async_trait::async_trait;
use slipstream_core::config::SourcesConfig;
use slipstream_core::types::{CandidateStream, MediaIdentity, TransportKind};
use tracing::debug;

use super::SourceProvider;
use crate::errors::ProviderError;
use crate::extract;

const DEFAULT_BASE_URL: &str = "https://vidsrc.me";

/// Embed-probe provider for the VidSrc aggregator.
#[derive(Debug)]
pub struct VidSrcProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl VidSrcProvider {
    /// Creates a provider against the production VidSrc endpoint.
    pub fn new(config: &SourcesConfig) -> Self {
        Self::with_config(DEFAULT_BASE_URL, config)
    }

    /// Creates a provider with a custom endpoint.
    pub fn with_config(base_url: impl Into<String>, config: &SourcesConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout: config.provider_timeout,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Embed URL for the identity: `/embed/{type}/{id}` for movies and
    /// whole series, `/embed/tv/{id}/{season}-{episode}` for episodes.
    fn embed_url(&self, identity: &MediaIdentity) -> String {
        let kind = identity.kind.as_path_segment();
        let id = identity.catalog_id;
        match identity.episode_numbers() {
            Some((season, episode)) => {
                format!("{}/embed/{kind}/{id}/{season}-{episode}", self.base_url)
            }
            None => format!("{}/embed/{kind}/{id}", self.base_url),
        }
    }

    /// Candidates for a fetched embed page: direct streams when visible,
    /// the embed page itself labeled `Embed` when only an iframe player is
    /// present, the plain embed fallback otherwise.
    fn page_candidates(&self, html: &str, embed_url: String) -> Vec<CandidateStream> {
        let streams = extract::extract_streams(html);
        if !streams.is_empty() {
            return streams;
        }

        if extract::has_iframe(html) {
            debug!(url = %embed_url, "iframe player found, returning embed page");
            return vec![
                CandidateStream::with_transport(embed_url, TransportKind::Opaque)
                    .labeled("Embed"),
            ];
        }

        self.opaque_fallback(embed_url)
    }

    fn opaque_fallback(&self, embed_url: String) -> Vec<CandidateStream> {
        vec![
            CandidateStream::with_transport(embed_url, TransportKind::Opaque)
                .labeled("VidSrc Embed"),
        ]
    }
}

impl Default for VidSrcProvider {
    fn default() -> Self {
        Self::new(&SourcesConfig::default())
    }
}

#[async_trait]
impl SourceProvider for VidSrcProvider {
    fn name(&self) -> &str {
        "VidSrc"
    }

    async fn scrape(
        &self,
        identity: &MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        let embed_url = self.embed_url(identity);

        let response = self
            .client
            .get(&embed_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::REFERER, format!("{}/", self.base_url))
            .timeout(self.timeout)
            .send()
            .await;

        let html = match response {
            Ok(response) => match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    debug!(url = %embed_url, "embed page body unreadable: {e}");
                    return Ok(self.opaque_fallback(embed_url));
                }
            },
            Err(e) => {
                // The embed may still work inside an iframe even when the
                // server-side fetch is rejected.
                debug!(url = %embed_url, "embed page fetch failed: {e}");
                return Ok(self.opaque_fallback(embed_url));
            }
        };

        Ok(self.page_candidates(&html, embed_url))
    }
}
