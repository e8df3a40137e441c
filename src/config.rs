use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transport::types::DEFAULT_INIT_BUFFER_SIZE;

/// Tunables applied to every exchange a subtransport opens
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HttpTransportConfig {
    /// Initial response buffer size passed to the substrate on connect
    pub init_buffer_size: usize,
    /// Headers added to every connect request, e.g. authorization or agent
    pub extra_headers: HashMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            init_buffer_size: DEFAULT_INIT_BUFFER_SIZE,
            extra_headers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_transport_buffer_size() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.init_buffer_size, 65536);
        assert!(config.extra_headers.is_empty());
    }
}
