//! Engine-facing transport seams
//!
//! This module provides the `SmartSubtransport` and `SubtransportStream` traits
//! that form the interface between a smart protocol engine and a concrete
//! transport implementation.

use async_trait::async_trait;

use super::types::{Service, TransportError};

/// One logical request/response channel for a single protocol phase
///
/// The engine drives a stream strictly sequentially: discovery streams are
/// read until end of stream, exchange streams are written and then read. A
/// stream that has failed or completed is discarded, never reused; a new
/// service request gets a new stream.
#[async_trait]
pub trait SubtransportStream: Send {
    /// Read up to `buf.len()` bytes, returning how many were produced.
    /// Zero means end of stream.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Send `data` as request body bytes. Either wholly accepted or failed;
    /// response bytes are retrieved through `read` per the engine's pairing
    /// convention.
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

/// Pluggable network layer beneath the smart protocol engine
///
/// A subtransport is created once per protocol session and hands out streams
/// on demand. Ownership of each stream transfers to the caller; the
/// subtransport keeps no record of it.
pub trait SmartSubtransport: Send + Sync {
    type Stream: SubtransportStream;

    /// Create a fresh unconnected stream for `service` against the repository
    /// at `url`
    fn action(&self, url: &str, service: Service) -> Result<Self::Stream, TransportError>;

    /// Release transport-wide resources. Streams already handed out are
    /// unaffected and remain usable until their owners drop them.
    fn close(&mut self) -> Result<(), TransportError>;
}
