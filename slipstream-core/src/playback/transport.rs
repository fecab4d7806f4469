//! Stream transport abstraction and concrete transports.
//!
//! A transport binds one candidate stream to an actual delivery mechanism.
//! The playback controller selects a transport purely from the candidate's
//! `TransportKind` and holds at most one live transport at a time.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::PlaybackConfig;
use crate::types::{CandidateStream, TransportKind};

/// Errors emitted by a stream transport.
///
/// The split between recoverable and fatal drives the controller's
/// retry-in-place versus advance-to-next-candidate decision.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transient problem; the transport may recover in place.
    #[error("Recoverable transport error: {reason}")]
    Recoverable {
        /// The reason for the transient failure
        reason: String,
    },

    /// The candidate cannot continue; playback must advance.
    #[error("Fatal transport error: {reason}")]
    Fatal {
        /// The reason the candidate is unusable
        reason: String,
    },
}

impl TransportError {
    /// Shorthand for a recoverable error.
    pub fn recoverable(reason: impl Into<String>) -> Self {
        Self::Recoverable {
            reason: reason.into(),
        }
    }

    /// Shorthand for a fatal error.
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Whether this error terminates the current candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// Events a transport delivers to the playback controller.
///
/// Delivery must be serialized: the controller processes one event at a
/// time, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// First data accepted; playback is underway.
    Started,
    /// Transient failure; retry in place without changing candidates.
    Recoverable {
        /// Human-readable cause
        reason: String,
    },
    /// Unrecoverable failure of the current candidate.
    Fatal {
        /// Human-readable cause
        reason: String,
    },
}

/// A playback transport bound to a single candidate stream.
///
/// Exactly one transport is live at any time. `release` must free every
/// held resource and is safe to call more than once; a released transport
/// is never re-attached.
#[async_trait]
pub trait StreamTransport: Send + std::fmt::Debug {
    /// Attaches to the candidate and accepts first data.
    ///
    /// # Errors
    /// - `TransportError::Recoverable` - Transient network failure, retry in place
    /// - `TransportError::Fatal` - Candidate is unusable, advance to the next
    async fn attach(&mut self) -> Result<(), TransportError>;

    /// Recovers in place after a recoverable failure (reload manifest,
    /// re-probe the file).
    ///
    /// # Errors
    /// - `TransportError::Recoverable` - Recovery attempt itself failed transiently
    /// - `TransportError::Fatal` - Recovery is impossible for this candidate
    async fn retry(&mut self) -> Result<(), TransportError>;

    /// Releases all resources held by this transport. Idempotent.
    async fn release(&mut self);
}

/// Creates transports for candidates based on their transport kind.
pub trait TransportFactory: Send + Sync {
    /// Builds the transport for one candidate stream.
    fn create(&self, candidate: &CandidateStream) -> Box<dyn StreamTransport>;
}

/// Default factory selecting HLS, progressive, or opaque transports over
/// a shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransportFactory {
    /// Creates a factory using the configured attach/probe timeout.
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: config.transport_timeout,
        }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, candidate: &CandidateStream) -> Box<dyn StreamTransport> {
        match candidate.transport {
            TransportKind::Hls => Box::new(HlsTransport::new(
                self.client.clone(),
                candidate.url.clone(),
                self.timeout,
            )),
            TransportKind::Progressive => Box::new(ProgressiveTransport::new(
                self.client.clone(),
                candidate.url.clone(),
                self.timeout,
            )),
            TransportKind::Opaque => Box::new(OpaqueTransport::new(candidate.url.clone())),
        }
    }
}

/// Classifies a reqwest failure: connectivity problems are recoverable,
/// everything else about the request itself is fatal.
fn classify_request_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        TransportError::recoverable(format!("network error: {error}"))
    } else {
        TransportError::fatal(format!("request failed: {error}"))
    }
}

/// Classifies a manifest fetch status. Fetch failures are network-level,
/// so a reload may succeed.
fn classify_manifest_status(status: StatusCode) -> Result<(), TransportError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(TransportError::recoverable(format!(
            "manifest HTTP {status}"
        )))
    }
}

/// Validates fetched manifest content. Broken content cannot be recovered
/// in place, no reload will fix it.
fn validate_manifest_body(body: &str) -> Result<(), TransportError> {
    if body.trim_start().starts_with("#EXTM3U") {
        Ok(())
    } else {
        Err(TransportError::fatal("response is not an HLS manifest"))
    }
}

/// Classifies a progressive-media probe status. Server errors may clear
/// up on retry; 4xx means the file is gone or forbidden.
fn classify_media_status(status: StatusCode) -> Result<(), TransportError> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() {
        Err(TransportError::recoverable(format!("media HTTP {status}")))
    } else {
        Err(TransportError::fatal(format!("media HTTP {status}")))
    }
}

/// Adaptive streaming transport for HLS candidates.
///
/// Attach fetches and validates the manifest; `retry` reloads it, which is
/// the in-place recovery for network-level failures. Manifest content that
/// cannot be played is fatal since no reload will fix it.
#[derive(Debug)]
pub struct HlsTransport {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    released: bool,
}

impl HlsTransport {
    /// Creates a transport for one HLS manifest URL.
    pub fn new(client: reqwest::Client, url: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
            released: false,
        }
    }

    async fn load_manifest(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        classify_manifest_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::recoverable(format!("manifest read failed: {e}")))?;

        validate_manifest_body(&body)
    }
}

#[async_trait]
impl StreamTransport for HlsTransport {
    async fn attach(&mut self) -> Result<(), TransportError> {
        debug!(url = %self.url, "attaching HLS transport");
        self.load_manifest().await
    }

    async fn retry(&mut self) -> Result<(), TransportError> {
        debug!(url = %self.url, "reloading HLS manifest");
        self.load_manifest().await
    }

    async fn release(&mut self) {
        if !self.released {
            debug!(url = %self.url, "releasing HLS transport");
            self.released = true;
        }
    }
}

/// Direct playback transport for progressive-file candidates.
///
/// Attach probes the first bytes of the file with a ranged request.
#[derive(Debug)]
pub struct ProgressiveTransport {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    released: bool,
}

impl ProgressiveTransport {
    /// Creates a transport for one progressive media URL.
    pub fn new(client: reqwest::Client, url: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
            released: false,
        }
    }

    async fn probe(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::RANGE, "bytes=0-1023")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        classify_media_status(response.status())
    }
}

#[async_trait]
impl StreamTransport for ProgressiveTransport {
    async fn attach(&mut self) -> Result<(), TransportError> {
        debug!(url = %self.url, "attaching progressive transport");
        self.probe().await
    }

    async fn retry(&mut self) -> Result<(), TransportError> {
        debug!(url = %self.url, "re-probing progressive media");
        self.probe().await
    }

    async fn release(&mut self) {
        if !self.released {
            debug!(url = %self.url, "releasing progressive transport");
            self.released = true;
        }
    }
}

/// Embedding surface for opaque candidates.
///
/// An opaque candidate's failures are not observable, so attach always
/// succeeds and the transport never emits failure events.
#[derive(Debug)]
pub struct OpaqueTransport {
    url: String,
    released: bool,
}

impl OpaqueTransport {
    /// Creates a transport for one embed page URL.
    pub fn new(url: String) -> Self {
        Self {
            url,
            released: false,
        }
    }
}

#[async_trait]
impl StreamTransport for OpaqueTransport {
    async fn attach(&mut self) -> Result<(), TransportError> {
        debug!(url = %self.url, "attaching opaque embed surface");
        Ok(())
    }

    async fn retry(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn release(&mut self) {
        self.released = true;
    }
}
