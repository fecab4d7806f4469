//! Generic page-scan provider.
//!
//! For sites addressed by a title slug rather than a catalog id: build the
//! watch-page URL from the title (and year when known), fetch it, and scan
//! the body for direct stream URLs. There is no opaque fallback here — an
//! arbitrary watch page is not embeddable, so finding nothing is a plain
//! failure.

use std::time::Duration;

use async_trait::async_trait;
use slipstream_core::config::SourcesConfig;
use slipstream_core::types::{CandidateStream, MediaIdentity};
use tracing::debug;

use super::SourceProvider;
use crate::errors::ProviderError;
use crate::extract;

/// Title-slug page scanner, configurable per site so several instances
/// can be registered with different priorities.
#[derive(Debug)]
pub struct PageScrapeProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl PageScrapeProvider {
    /// Creates a scanner for one site.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        config: &SourcesConfig,
    ) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout: config.provider_timeout,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Watch-page URL: `{base}/watch/{slug}`, slug carrying the year when
    /// known so remakes resolve to the right page.
    fn watch_url(&self, identity: &MediaIdentity) -> String {
        let mut slug = extract::title_slug(&identity.title);
        if let Some(year) = identity.year {
            slug = format!("{slug}-{year}");
        }
        format!("{}/watch/{}", self.base_url, urlencoding::encode(&slug))
    }
}

#[async_trait]
impl SourceProvider for PageScrapeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scrape(
        &self,
        identity: &MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        let url = self.watch_url(identity);
        debug!(provider = %self.name, %url, "scanning watch page");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Network {
                reason: format!("HTTP {status}"),
            });
        }

        let html = response.text().await.map_err(|e| ProviderError::Parse {
            reason: format!("body unreadable: {e}"),
        })?;

        let streams = extract::extract_streams(&html);
        if streams.is_empty() {
            return Err(ProviderError::NoCandidates);
        }
        Ok(streams)
    }
}
