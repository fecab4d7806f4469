//! Thin catalog client resolving a catalog id to a title and year.
//!
//! The catalog is an external collaborator: resolution only needs the
//! title/year tuple for providers that are addressed by title. Catalog
//! unavailability therefore never fails a request; callers fall back to a
//! generic title.

use std::time::Duration;

use serde::Deserialize;
use slipstream_core::types::MediaKind;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No API key configured; lookups are disabled.
    #[error("Catalog lookups disabled: no API key configured")]
    Disabled,

    /// Communication with the catalog API failed.
    #[error("Catalog network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The catalog response could not be decoded.
    #[error("Catalog decode error: {reason}")]
    Decode {
        /// The reason for the decode error
        reason: String,
    },
}

/// Title and release year for one catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogTitle {
    pub title: String,
    pub year: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    title: String,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvDetails {
    name: String,
    first_air_date: Option<String>,
}

/// TMDB-backed catalog client.
#[derive(Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl CatalogClient {
    /// Creates a client against the production TMDB endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_config(DEFAULT_BASE_URL, api_key, Duration::from_secs(10))
    }

    /// Creates a client with a custom endpoint and timeout.
    pub fn with_config(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            timeout,
        }
    }

    /// Looks up the title and year for a catalog id.
    ///
    /// # Errors
    /// - `CatalogError::Disabled` - No API key is configured
    /// - `CatalogError::Network` - Request failed or returned a non-success status
    /// - `CatalogError::Decode` - Response body was not the expected shape
    pub async fn lookup(&self, kind: MediaKind, id: u32) -> Result<CatalogTitle, CatalogError> {
        let api_key = self.api_key.as_ref().ok_or(CatalogError::Disabled)?;

        let url = format!("{}/{}/{id}", self.base_url, kind.as_path_segment());
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CatalogError::Network {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Network {
                reason: format!("HTTP {status}"),
            });
        }

        match kind {
            MediaKind::Movie => {
                let details: MovieDetails =
                    response.json().await.map_err(|e| CatalogError::Decode {
                        reason: format!("movie details: {e}"),
                    })?;
                Ok(CatalogTitle {
                    title: details.title,
                    year: parse_year(details.release_date.as_deref()),
                })
            }
            MediaKind::Tv => {
                let details: TvDetails =
                    response.json().await.map_err(|e| CatalogError::Decode {
                        reason: format!("tv details: {e}"),
                    })?;
                Ok(CatalogTitle {
                    title: details.name,
                    year: parse_year(details.first_air_date.as_deref()),
                })
            }
        }
    }
}

/// Year from an ISO `YYYY-MM-DD` date string.
fn parse_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}
