//! Centralized configuration for Slipstream.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Slipstream components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct SlipstreamConfig {
    pub sources: SourcesConfig,
    pub playback: PlaybackConfig,
    pub http: HttpConfig,
}

/// Source resolution configuration.
///
/// Controls per-provider timeouts and the request headers providers send
/// to external embed/scrape endpoints.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// Bounded timeout applied to each provider invocation
    pub provider_timeout: Duration,
    /// User agent sent with outbound provider requests
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

/// Playback controller configuration.
///
/// Controls the recoverable-retry budget that bounds in-place retries
/// before a stream is declared fatal.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Consecutive recoverable retries allowed per candidate
    pub recoverable_retry_limit: u32,
    /// Window in which the retry limit applies; the counter resets when
    /// the window expires
    pub recoverable_retry_window: Duration,
    /// Timeout for transport attach and probe requests
    pub transport_timeout: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            recoverable_retry_limit: 3,
            recoverable_retry_window: Duration::from_secs(30),
            transport_timeout: Duration::from_secs(15),
        }
    }
}

/// HTTP API server configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind the API server to
    pub host: String,
    /// Port to bind the API server to
    pub port: u16,
    /// Outer deadline for a whole resolution request
    pub request_deadline: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_deadline: Duration::from_secs(60),
        }
    }
}

impl SlipstreamConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("SLIPSTREAM_PROVIDER_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.sources.provider_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(agent) = std::env::var("SLIPSTREAM_USER_AGENT") {
            if !agent.is_empty() {
                config.sources.user_agent = agent;
            }
        }

        if let Ok(limit) = std::env::var("SLIPSTREAM_RETRY_LIMIT") {
            if let Ok(count) = limit.parse::<u32>() {
                config.playback.recoverable_retry_limit = count;
            }
        }

        if let Ok(port) = std::env::var("SLIPSTREAM_PORT") {
            if let Ok(value) = port.parse::<u16>() {
                config.http.port = value;
            }
        }

        config
    }
}
