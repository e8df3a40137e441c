//! Host substrate boundary: the asynchronous HTTP client this subtransport
//! delegates real network I/O to.
//!
//! The subtransport decides *what* request to issue and *how* reads and writes
//! are sequenced; the substrate performs the actual exchange. Hosts implement
//! [`HttpSubstrate`] once per environment (browser fetch, native client, test
//! double) and hand it to the subtransport behind an `Arc`.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use super::types::{ConnectionHandle, HttpMethod, TransportError};

/// Parameters for opening one request-response exchange
#[derive(Debug)]
pub struct ConnectRequest<'a> {
    /// Full service URL, already composed by the subtransport
    pub url: &'a str,
    pub method: HttpMethod,
    /// Response buffer size hint for the host
    pub init_buffer_size: usize,
    /// Request headers, including the derived Content-Type for POST exchanges
    pub headers: HashMap<String, String>,
}

/// Result of one substrate read
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes copied into the caller's buffer; zero means end of stream.
    /// Reads past end of stream are substrate-defined and normally keep
    /// yielding zero.
    Data(usize),
    /// The host cancelled the exchange
    Aborted,
}

/// Asynchronous HTTP client provided by the host environment
///
/// Every method suspends the calling task until the host completes the
/// operation. Implementations are shared across streams (`&self` everywhere)
/// and must synchronize internally; each [`ConnectionHandle`] they hand out is
/// used by exactly one stream.
#[async_trait]
pub trait HttpSubstrate: Send + Sync {
    /// Open an exchange; resolves once the host has accepted the request and
    /// is ready to stream response bytes.
    async fn connect(
        &self,
        request: ConnectRequest<'_>,
    ) -> Result<ConnectionHandle, TransportError>;

    /// Read up to `buf.len()` response bytes from an open exchange
    async fn read(
        &self,
        conn: &ConnectionHandle,
        buf: &mut [u8],
    ) -> Result<ReadOutcome, TransportError>;

    /// Send request body bytes on an open exchange. Fire-and-forget from the
    /// transport's perspective: the host buffers or sends, and response bytes
    /// are retrieved through `read`.
    async fn write(&self, conn: &ConnectionHandle, data: Bytes) -> Result<(), TransportError>;

    /// Reclaim an exchange once the owning stream is dropped.
    ///
    /// The default does nothing, for hosts that garbage-collect exchanges on
    /// their own.
    fn release(&self, conn: ConnectionHandle) {
        let _ = conn;
    }
}
