//! Slipstream Core - media data model and resilient playback
//!
//! This crate provides the fundamental building blocks for resolving and
//! playing media streams: the media identity and candidate stream data
//! model, central configuration, and the playback controller with its
//! pluggable stream transports.

pub mod config;
pub mod playback;
pub mod tracing_setup;
pub mod types;

// Re-export main types for convenient access
pub use config::SlipstreamConfig;
pub use playback::{
    PlaybackController, PlaybackState, StreamTransport, TransportError, TransportEvent,
    TransportFactory,
};
pub use types::{CandidateStream, MediaIdentity, MediaKind, ResolutionOutcome, TransportKind};

/// Core errors that can bubble up from any Slipstream subsystem.
#[derive(Debug, thiserror::Error)]
pub enum SlipstreamError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Server error: {reason}")]
    Server { reason: String },
}

impl SlipstreamError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            SlipstreamError::Transport(TransportError::Recoverable { .. }) => {
                "Playback interrupted, retrying".to_string()
            }
            SlipstreamError::Transport(TransportError::Fatal { .. }) => {
                "This source cannot be played".to_string()
            }
            SlipstreamError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
            SlipstreamError::Server { reason } => {
                format!("Server error: {reason}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SlipstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_convert_and_keep_severity() {
        let error: SlipstreamError = TransportError::recoverable("segment stall").into();
        assert_eq!(error.user_message(), "Playback interrupted, retrying");

        let error: SlipstreamError = TransportError::fatal("bad manifest").into();
        assert_eq!(error.user_message(), "This source cannot be played");
    }

    #[test]
    fn configuration_message_carries_the_reason() {
        let error = SlipstreamError::Configuration {
            reason: "no providers".to_string(),
        };
        assert_eq!(error.user_message(), "Configuration error: no providers");
    }
}
