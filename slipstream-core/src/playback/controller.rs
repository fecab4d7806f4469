//! Playback controller with automatic candidate fallback.
//!
//! Owns the current-index state machine over an ordered candidate list:
//! recoverable transport failures are retried in place, fatal failures
//! advance to the next candidate, and exhaustion of the list surfaces a
//! terminal error exactly once.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::playback::transport::{
    StreamTransport, TransportError, TransportEvent, TransportFactory,
};
use crate::types::CandidateStream;

/// Message surfaced when every candidate has failed.
const EXHAUSTED_MESSAGE: &str = "All video sources failed to load";

/// Playback controller states.
///
/// The index refers to the position in the ordered candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No candidate loaded; freshly constructed or cancelled.
    Idle,
    /// Transport for the indexed candidate is being attached.
    Loading(usize),
    /// Active playback of the indexed candidate.
    Playing(usize),
    /// Every candidate failed; only an external restart with a freshly
    /// resolved list leaves this state.
    Exhausted,
}

type ErrorCallback = Box<dyn FnOnce(String) + Send>;

/// Presentation hints handed through to the render surface.
///
/// The controller does not interpret these; they ride along so the
/// presentation layer can configure the surface it renders into.
#[derive(Debug, Clone, Default)]
pub struct SurfaceOptions {
    /// Poster image shown before first data arrives.
    pub poster: Option<String>,
    /// Whether playback starts without user interaction.
    pub autoplay: bool,
}

/// Drives playback across an ordered candidate list with fallback.
///
/// The controller is single-threaded with respect to its own state: every
/// method takes `&mut self`, so transitions are processed one at a time.
/// Transports delivering events from internal threads should funnel them
/// through [`PlaybackController::run_events`].
pub struct PlaybackController {
    candidates: Vec<CandidateStream>,
    factory: Arc<dyn TransportFactory>,
    config: PlaybackConfig,
    state: PlaybackState,
    transport: Option<Box<dyn StreamTransport>>,
    retry_window_start: Option<Instant>,
    retries_in_window: u32,
    on_exhausted: Option<ErrorCallback>,
    surface: SurfaceOptions,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("candidates", &self.candidates.len())
            .field("state", &self.state)
            .finish()
    }
}

impl PlaybackController {
    /// Creates a controller over an ordered candidate list.
    pub fn new(
        candidates: Vec<CandidateStream>,
        factory: Arc<dyn TransportFactory>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            candidates,
            factory,
            config,
            state: PlaybackState::Idle,
            transport: None,
            retry_window_start: None,
            retries_in_window: 0,
            on_exhausted: None,
            surface: SurfaceOptions::default(),
        }
    }

    /// Sets presentation hints for the render surface.
    pub fn with_surface_options(mut self, surface: SurfaceOptions) -> Self {
        self.surface = surface;
        self
    }

    /// Presentation hints for the render surface.
    pub fn surface_options(&self) -> &SurfaceOptions {
        &self.surface
    }

    /// Registers the callback invoked exactly once when playback is
    /// exhausted.
    pub fn with_error_callback(mut self, callback: impl FnOnce(String) + Send + 'static) -> Self {
        self.on_exhausted = Some(Box::new(callback));
        self
    }

    /// Current state of the controller.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Candidate currently loading or playing, if any.
    pub fn current_candidate(&self) -> Option<&CandidateStream> {
        match self.state {
            PlaybackState::Loading(i) | PlaybackState::Playing(i) => self.candidates.get(i),
            PlaybackState::Idle | PlaybackState::Exhausted => None,
        }
    }

    /// Begins playback at the first candidate.
    pub async fn start(&mut self) {
        self.release_transport().await;
        self.load_from(0).await;
    }

    /// Processes one transport event.
    ///
    /// Events must be delivered one at a time, in arrival order. Events
    /// arriving outside active playback (after cancellation or exhaustion)
    /// are dropped.
    pub async fn handle_event(&mut self, event: TransportEvent) {
        match (self.state, event) {
            (PlaybackState::Loading(i), TransportEvent::Started) => {
                debug!(candidate = i, "playback started");
                self.state = PlaybackState::Playing(i);
                self.reset_retry_budget();
            }
            (PlaybackState::Playing(_), TransportEvent::Started) => {}
            (
                PlaybackState::Loading(i) | PlaybackState::Playing(i),
                TransportEvent::Recoverable { reason },
            ) => {
                self.recover_in_place(i, reason).await;
            }
            (
                PlaybackState::Loading(i) | PlaybackState::Playing(i),
                TransportEvent::Fatal { reason },
            ) => {
                self.advance_from(i, reason).await;
            }
            (PlaybackState::Idle | PlaybackState::Exhausted, event) => {
                debug!(?event, "ignoring transport event outside active playback");
            }
        }
    }

    /// Consumes transport events from a channel until the session ends.
    ///
    /// Serializes event delivery even when the underlying transport emits
    /// from multiple internal threads.
    pub async fn run_events(&mut self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
            if self.state == PlaybackState::Exhausted {
                break;
            }
        }
    }

    /// Ends the session: releases the live transport immediately and
    /// returns to `Idle`.
    ///
    /// Cancellation never triggers the advance-to-next-candidate path.
    pub async fn cancel(&mut self) {
        self.release_transport().await;
        self.state = PlaybackState::Idle;
        self.reset_retry_budget();
    }

    /// Restarts the whole session with a freshly resolved candidate list.
    ///
    /// This is the only way out of `Exhausted`; the original list may be
    /// stale, so callers re-invoke resolution first.
    pub async fn restart(&mut self, candidates: Vec<CandidateStream>) {
        self.cancel().await;
        self.candidates = candidates;
        self.load_from(0).await;
    }

    /// Attaches candidates starting at `start`, falling through fatally
    /// failing ones, until one plays or the list is exhausted.
    async fn load_from(&mut self, start: usize) {
        let mut index = start;
        loop {
            let Some(candidate) = self.candidates.get(index).cloned() else {
                self.exhaust();
                return;
            };

            self.reset_retry_budget();
            self.state = PlaybackState::Loading(index);
            info!(candidate = index, url = %candidate.url, "loading candidate");

            let mut transport = self.factory.create(&candidate);
            match self.attach_with_recovery(transport.as_mut()).await {
                Ok(()) => {
                    self.transport = Some(transport);
                    self.state = PlaybackState::Playing(index);
                    self.reset_retry_budget();
                    return;
                }
                Err(reason) => {
                    warn!(candidate = index, %reason, "candidate failed during attach");
                    // The failed transport is fully released before the
                    // next one is constructed.
                    transport.release().await;
                    index += 1;
                }
            }
        }
    }

    /// Attaches a transport, retrying in place within the recoverable
    /// budget. Returns the fatal reason once the candidate is unusable.
    async fn attach_with_recovery(
        &mut self,
        transport: &mut dyn StreamTransport,
    ) -> Result<(), String> {
        let mut result = transport.attach().await;
        loop {
            match result {
                Ok(()) => return Ok(()),
                Err(TransportError::Fatal { reason }) => return Err(reason),
                Err(TransportError::Recoverable { reason }) => {
                    if !self.consume_retry_budget() {
                        return Err(format!("recoverable retry budget exhausted: {reason}"));
                    }
                    debug!(%reason, "recoverable attach failure, retrying in place");
                    result = transport.retry().await;
                }
            }
        }
    }

    /// Handles a recoverable event: retry in place without changing the
    /// candidate index or releasing the transport. Escalates to fatal once
    /// the retry budget is exhausted.
    async fn recover_in_place(&mut self, index: usize, reason: String) {
        let mut reason = reason;
        loop {
            if !self.consume_retry_budget() {
                self.advance_from(
                    index,
                    format!("recoverable retry budget exhausted: {reason}"),
                )
                .await;
                return;
            }

            debug!(candidate = index, %reason, "recoverable failure, retrying in place");
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            match transport.retry().await {
                Ok(()) => {
                    // Recovery accepted data, which counts as playback.
                    self.state = PlaybackState::Playing(index);
                    return;
                }
                Err(TransportError::Recoverable { reason: next }) => {
                    reason = next;
                }
                Err(TransportError::Fatal { reason }) => {
                    self.advance_from(index, reason).await;
                    return;
                }
            }
        }
    }

    /// Fatal failure of the indexed candidate: release its transport and
    /// continue at the next one.
    async fn advance_from(&mut self, index: usize, reason: String) {
        warn!(candidate = index, %reason, "candidate failed, advancing");
        self.release_transport().await;
        self.load_from(index + 1).await;
    }

    /// Terminal failure: every candidate exhausted.
    fn exhaust(&mut self) {
        self.state = PlaybackState::Exhausted;
        warn!("playback exhausted, no candidates left");
        if let Some(callback) = self.on_exhausted.take() {
            callback(EXHAUSTED_MESSAGE.to_string());
        }
    }

    async fn release_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.release().await;
        }
    }

    /// Consumes one unit of the recoverable-retry budget. The counter
    /// resets when the window has expired.
    fn consume_retry_budget(&mut self) -> bool {
        let now = Instant::now();
        let window_active = self
            .retry_window_start
            .is_some_and(|start| now.duration_since(start) <= self.config.recoverable_retry_window);
        if !window_active {
            self.retry_window_start = Some(now);
            self.retries_in_window = 0;
        }

        if self.retries_in_window >= self.config.recoverable_retry_limit {
            false
        } else {
            self.retries_in_window += 1;
            true
        }
    }

    fn reset_retry_budget(&mut self) {
        self.retry_window_start = None;
        self.retries_in_window = 0;
    }
}
