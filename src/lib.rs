//! Git-Smart-HTTP: a client-side Git smart protocol subtransport over HTTP—service routing,
//! lazily connected per-operation streams, and a blocking bridge over an async substrate.
//!
//! Goals
//! - Decide which URL and HTTP method each smart protocol service uses.
//! - Sequence reads and writes of one protocol phase over a single connection.
//! - Expose blocking-looking stream calls while the host performs asynchronous I/O.
//!
//! Core Capabilities
//! - Routing: the four smart services (`info/refs` discovery and pack exchange,
//!   for fetch and push) mapped to their fixed suffix, method, and content type.
//! - Streams: lazy connect on first read (GET) or first write (POST with the
//!   content type derived from the URL's pack direction), one exchange per
//!   stream lifetime, abort surfaced as a terminal failure.
//! - Substrate seam: `HttpSubstrate` trait for the host's async HTTP client;
//!   connection handles are exclusively owned and released on stream drop.
//! - Bridge: `BlockingStream` parks a calling thread on a channel while the
//!   stream runs on a tokio runtime, implementing `std::io::Read`/`Write`.
//!
//! Modules
//! - `transport::service`: service-to-route table.
//! - `transport::substrate`: host HTTP client boundary.
//! - `transport::core`: engine-facing `SmartSubtransport`/`SubtransportStream` traits.
//! - `transport::stream` / `transport::subtransport`: the state machine and its factory.
//! - `transport::bridge`: blocking facade over an async stream.
//! - `config`: per-transport tunables (initial buffer size, extra headers).
//!
//! Typical Usage
//! - Implement `HttpSubstrate` for the host environment, build a
//!   `SmartHttpSubtransport`, and request a stream per protocol phase with
//!   `action(url, service)`.
//! - Synchronous engines wrap each stream in `BlockingStream::spawn` and use
//!   plain `Read`/`Write`.

pub mod config;
pub mod transport;

// Core traits and types that external users need to implement/use
pub use config::HttpTransportConfig;
pub use transport::bridge::BlockingStream;
pub use transport::stream::SmartHttpStream;
pub use transport::substrate::{ConnectRequest, HttpSubstrate, ReadOutcome};
pub use transport::subtransport::SmartHttpSubtransport;
pub use transport::{
    ConnectionHandle, HttpMethod, Service, SmartSubtransport, SubtransportStream, TransportError,
};
