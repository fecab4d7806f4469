//! SuperEmbed embed-probe provider.
//!
//! Same strategy as VidSrc with a different aggregator: fixed embed-URL
//! pattern keyed by catalog id, stream extraction from the fetched page,
//! opaque embed fallback when nothing is directly visible.

use std::time::Duration;

use async_trait::async_trait;
use slipstream_core::config::SourcesConfig;
use slipstream_core::types::{CandidateStream, MediaIdentity, TransportKind};
use tracing::debug;

use super::SourceProvider;
use crate::errors::ProviderError;
use crate::extract;

const DEFAULT_BASE_URL: &str = "https://www.2embed.to";

/// Embed-probe provider for the SuperEmbed aggregator.
#[derive(Debug)]
pub struct SuperEmbedProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl SuperEmbedProvider {
    /// Creates a provider against the production SuperEmbed endpoint.
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

    /// Embed URL for the identity; episodes use `/{season}/{episode}`
    /// path segments, unlike VidSrc's hyphen form.
    fn embed_url(&self, identity: &MediaIdentity) -> String {
        let kind = identity.kind.as_path_segment();
        let id = identity.catalog_id;
        match identity.episode_numbers() {
            Some((season, episode)) => {
                format!("{}/embed/{kind}/{id}/{season}/{episode}", self.base_url)
            }
            None => format!("{}/embed/{kind}/{id}", self.base_url),
        }
    }

    fn opaque_fallback(&self, embed_url: String) -> Vec<CandidateStream> {
        vec![
            CandidateStream::with_transport(embed_url, TransportKind::Opaque)
                .labeled("SuperEmbed"),
        ]
    }
}

impl Default for SuperEmbedProvider {
    fn default() -> Self {
        Self::new(&SourcesConfig::default())
    }
}

#[async_trait]
impl SourceProvider for SuperEmbedProvider {
    fn name(&self) -> &str {
        "SuperEmbed"
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
                debug!(url = %embed_url, "embed page fetch failed: {e}");
                return Ok(self.opaque_fallback(embed_url));
            }
        };

        let streams = extract::extract_streams(&html);
        if !streams.is_empty() {
            return Ok(streams);
        }

        Ok(self.opaque_fallback(embed_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_embed_url_uses_path_segments() {
        let provider = SuperEmbedProvider::default();
        let identity = MediaIdentity::episode(1396, "Breaking Bad", Some(2008), 2, 5);
        assert_eq!(
            provider.embed_url(&identity),
            "https://www.2embed.to/embed/tv/1396/2/5"
        );
    }

    #[test]
    fn movie_embed_url_uses_catalog_id() {
        let provider = SuperEmbedProvider::default();
        let identity = MediaIdentity::movie(603, "The Matrix", Some(1999));
        assert_eq!(
            provider.embed_url(&identity),
            "https://www.2embed.to/embed/movie/603"
        );
    }

    #[test]
    fn request_settings_come_from_config() {
        let config = SourcesConfig {
            provider_timeout: Duration::from_secs(5),
            user_agent: "slipstream-test/1".to_string(),
        };
        let provider = SuperEmbedProvider::with_config("https://embed.example", &config);
        assert_eq!(provider.timeout, Duration::from_secs(5));
        assert_eq!(provider.user_agent, "slipstream-test/1");
    }
}
