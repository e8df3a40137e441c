/// Smart HTTP Subtransport Module
///
/// This module adapts the transport-agnostic stream interface expected by a Git
/// smart protocol engine onto an asynchronous HTTP substrate supplied by the
/// host environment. The subtransport routes each protocol service to its URL
/// and method, streams sequence reads and writes over a single lazily opened
/// exchange, and the bridge exposes the whole thing behind blocking calls.
pub mod bridge;
pub mod core;
pub mod service;
pub mod stream;
pub mod substrate;
pub mod subtransport;
pub mod types;

// Re-export main interfaces
pub use core::{SmartSubtransport, SubtransportStream};
pub use types::*;
