//! Resilient playback: controller state machine and stream transports.

pub mod controller;
pub mod transport;

pub use controller::{PlaybackController, PlaybackState, SurfaceOptions};
pub use transport::{
    HlsTransport, HttpTransportFactory, OpaqueTransport, ProgressiveTransport, StreamTransport,
    TransportError, TransportEvent, TransportFactory,
};
