//! Subtransport factory: composes service URLs and hands out fresh unconnected
//! streams, one per protocol phase.

use std::sync::Arc;

use super::core::SmartSubtransport;
use super::service;
use super::stream::SmartHttpStream;
use super::substrate::HttpSubstrate;
use super::types::{Service, TransportError};
use crate::config::HttpTransportConfig;

/// Smart HTTP subtransport
///
/// Long-lived adapter owned by the protocol engine. Holds the shared substrate
/// and the transport configuration; everything per-operation lives in the
/// streams it creates. Streams are independent of the subtransport and of each
/// other once handed out.
pub struct SmartHttpSubtransport<S: HttpSubstrate> {
    substrate: Arc<S>,
    config: HttpTransportConfig,
}

impl<S: HttpSubstrate> SmartHttpSubtransport<S> {
    /// Create a subtransport with default configuration
    pub fn new(substrate: Arc<S>) -> Self {
        Self::with_config(substrate, HttpTransportConfig::default())
    }

    /// Create a subtransport with an explicit configuration
    pub fn with_config(substrate: Arc<S>, config: HttpTransportConfig) -> Self {
        Self { substrate, config }
    }
}

impl<S: HttpSubstrate> SmartSubtransport for SmartHttpSubtransport<S> {
    type Stream = SmartHttpStream<S>;

    fn action(&self, url: &str, service: Service) -> Result<Self::Stream, TransportError> {
        let route = service::route(service);
        let service_url = format!("{url}{}", route.suffix);
        tracing::debug!("new {} stream for {}", service, service_url);
        Ok(SmartHttpStream::new(
            self.substrate.clone(),
            service_url,
            &self.config,
        ))
    }

    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
