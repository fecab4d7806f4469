//! API handlers for source resolution.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use slipstream_core::types::{CandidateStream, MediaIdentity, MediaKind};
use tracing::warn;

use crate::server::AppState;

/// Response body for `/api/sources`.
///
/// `sources` is always present (empty on failure) so clients never need
/// to null-check the list.
#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub success: bool,
    pub sources: Vec<CandidateStream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request-level failures mapped to HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed query parameters.
    BadRequest(String),
    /// Resolution ran but yielded zero candidates.
    NotFound(String),
    /// Unexpected internal failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        let body = Json(SourcesResponse {
            success: false,
            sources: Vec::new(),
            error: Some(message),
        });
        (status, body).into_response()
    }
}

/// `GET /api/sources?type={movie|tv}&id=..&season=..&episode=..`
///
/// Resolves the identified media into candidate streams. `season` and
/// `episode` are required together and only valid for TV requests.
/// `fanout=true` queries every provider and merges instead of stopping at
/// the first success.
pub async fn api_sources(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SourcesResponse>, ApiError> {
    let identity = build_identity(&state, &params).await?;
    let fanout = params
        .get("fanout")
        .is_some_and(|v| v == "true" || v == "1");

    if fanout {
        let sources = tokio::time::timeout(
            state.request_deadline,
            state.orchestrator.resolve_all(&identity),
        )
        .await
        .map_err(|_| ApiError::Internal("resolution deadline exceeded".to_string()))?;

        if sources.is_empty() {
            return Err(ApiError::NotFound(
                "All providers failed to find video sources".to_string(),
            ));
        }
        return Ok(Json(SourcesResponse {
            success: true,
            sources,
            error: None,
        }));
    }

    let outcome = tokio::time::timeout(
        state.request_deadline,
        state.orchestrator.resolve_sequential(&identity),
    )
    .await
    .map_err(|_| ApiError::Internal("resolution deadline exceeded".to_string()))?;

    if !outcome.success {
        let diagnostic = outcome
            .diagnostic
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Failed to find video sources".to_string());
        return Err(ApiError::NotFound(format!(
            "All providers failed. Errors: {diagnostic}"
        )));
    }

    Ok(Json(SourcesResponse {
        success: true,
        sources: outcome.candidates,
        error: None,
    }))
}

/// Validates query parameters and assembles the media identity, filling
/// in the title and year from the catalog when available.
async fn build_identity(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<MediaIdentity, ApiError> {
    let kind: MediaKind = params
        .get("type")
        .ok_or_else(|| ApiError::BadRequest("Type and id parameters are required".to_string()))?
        .parse()
        .map_err(ApiError::BadRequest)?;

    let catalog_id: u32 = params
        .get("id")
        .ok_or_else(|| ApiError::BadRequest("Type and id parameters are required".to_string()))?
        .parse()
        .map_err(|_| ApiError::BadRequest("id must be a positive integer".to_string()))?;

    let season = parse_number(params, "season")?;
    let episode = parse_number(params, "episode")?;

    match kind {
        MediaKind::Movie if season.is_some() || episode.is_some() => {
            return Err(ApiError::BadRequest(
                "season and episode are only valid for tv requests".to_string(),
            ));
        }
        MediaKind::Tv if season.is_some() != episode.is_some() => {
            return Err(ApiError::BadRequest(
                "season and episode are required together".to_string(),
            ));
        }
        _ => {}
    }

    let (title, year) = match state.catalog.lookup(kind, catalog_id).await {
        Ok(entry) => (entry.title, entry.year),
        Err(error) => {
            // Resolution still works with a generic title; most providers
            // are addressed by catalog id anyway.
            warn!(%error, catalog_id, "catalog lookup failed, using generic title");
            (format!("Media {catalog_id}"), None)
        }
    };

    Ok(MediaIdentity {
        kind,
        catalog_id,
        title,
        year,
        season,
        episode,
    })
}

fn parse_number(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<u32>, ApiError> {
    params
        .get(name)
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| ApiError::BadRequest(format!("{name} must be a positive integer")))
        })
        .transpose()
}
