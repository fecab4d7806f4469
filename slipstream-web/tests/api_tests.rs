//! HTTP contract tests for the sources API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use slipstream_core::SlipstreamError;
use slipstream_core::config::HttpConfig;
use slipstream_core::types::{CandidateStream, MediaIdentity};
use slipstream_sources::errors::ProviderError;
use slipstream_sources::{SourceOrchestrator, SourceProvider};
use slipstream_web::catalog::CatalogClient;
use slipstream_web::{AppState, router, run_server};
use tower::ServiceExt;

#[derive(Debug)]
struct FixedProvider {
    name: &'static str,
    streams: Vec<CandidateStream>,
}

#[async_trait]
impl SourceProvider for FixedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn scrape(
        &self,
        _identity: &MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        Ok(self.streams.clone())
    }
}

#[derive(Debug)]
struct FailingProvider {
    name: &'static str,
    reason: &'static str,
}

#[async_trait]
impl SourceProvider for FailingProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn scrape(
        &self,
        _identity: &MediaIdentity,
    ) -> Result<Vec<CandidateStream>, ProviderError> {
        Err(ProviderError::Network {
            reason: self.reason.to_string(),
        })
    }
}

fn state(providers: Vec<Arc<dyn SourceProvider>>) -> AppState {
    let orchestrator = SourceOrchestrator::new(providers, Duration::from_secs(2))
        .expect("providers configured");
    AppState::new(
        orchestrator,
        CatalogClient::new(None),
        &HttpConfig::default(),
    )
}

fn app(providers: Vec<Arc<dyn SourceProvider>>) -> Router {
    router(state(providers))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn missing_parameters_return_400() {
    let app = app(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![],
    })]);

    let (status, body) = get_json(app, "/api/sources?type=movie").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("id"));
}

#[tokio::test]
async fn invalid_type_returns_400() {
    let app = app(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![],
    })]);

    let (status, _) = get_json(app, "/api/sources?type=podcast&id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tv_with_only_season_returns_400() {
    let app = app(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![],
    })]);

    let (status, body) = get_json(app, "/api/sources?type=tv&id=1396&season=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("required together")
    );
}

#[tokio::test]
async fn season_on_movie_returns_400() {
    let app = app(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![],
    })]);

    let (status, _) = get_json(app, "/api/sources?type=movie&id=603&season=1&episode=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn all_failing_providers_return_404_with_empty_sources() {
    let app = app(vec![
        Arc::new(FailingProvider {
            name: "P1",
            reason: "timeout",
        }),
        Arc::new(FailingProvider {
            name: "P2",
            reason: "blocked",
        }),
    ]);

    let (status, body) = get_json(app, "/api/sources?type=movie&id=603").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["sources"].as_array().unwrap().len(), 0);
    let error = body["error"].as_str().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("P1"));
    assert!(error.contains("P2"));
}

#[tokio::test]
async fn first_successful_provider_supplies_sources() {
    // Matrix scenario: P1 fails, P2 finds one HLS stream.
    let app = app(vec![
        Arc::new(FailingProvider {
            name: "P1",
            reason: "timeout",
        }),
        Arc::new(FixedProvider {
            name: "P2",
            streams: vec![CandidateStream::new("https://x/a.m3u8")],
        }),
    ]);

    let (status, body) = get_json(app, "/api/sources?type=movie&id=603").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["url"], "https://x/a.m3u8");
    assert_eq!(sources[0]["transport"], "hls");
}

#[tokio::test]
async fn fanout_merges_providers_and_dedups_urls() {
    let shared = "https://cdn/shared.m3u8";
    let app = app(vec![
        Arc::new(FixedProvider {
            name: "A",
            streams: vec![CandidateStream::new(shared)],
        }),
        Arc::new(FixedProvider {
            name: "B",
            streams: vec![
                CandidateStream::new(shared),
                CandidateStream::new("https://cdn/only-b.mp4"),
            ],
        }),
    ]);

    let (status, body) = get_json(app, "/api/sources?type=movie&id=603&fanout=true").await;
    assert_eq!(status, StatusCode::OK);
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["url"], shared);
}

#[tokio::test]
async fn malformed_bind_address_is_a_configuration_error() {
    let state = state(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![],
    })]);
    let config = HttpConfig {
        host: "definitely not a host".to_string(),
        port: 0,
        ..HttpConfig::default()
    };

    let error = run_server(&config, state).await.unwrap_err();
    assert!(matches!(error, SlipstreamError::Configuration { .. }));
}

#[tokio::test]
async fn tv_episode_request_resolves() {
    let app = app(vec![Arc::new(FixedProvider {
        name: "P",
        streams: vec![CandidateStream::new("https://x/e.m3u8")],
    })]);

    let (status, body) =
        get_json(app, "/api/sources?type=tv&id=1396&season=2&episode=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
