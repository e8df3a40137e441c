use std::fmt;

/// Transport error types
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to {0}: {1}")]
    Connect(String, String),

    #[error("request aborted by user")]
    Aborted,

    #[error("Substrate error: {0}")]
    Substrate(String),

    #[error("Transport bridge task has shut down")]
    BridgeClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn connect(url: &str, reason: impl fmt::Display) -> Self {
        TransportError::Connect(url.to_string(), reason.to_string())
    }

    pub fn substrate(msg: impl fmt::Display) -> Self {
        TransportError::Substrate(msg.to_string())
    }
}

impl From<TransportError> for std::io::Error {
    fn from(err: TransportError) -> Self {
        let kind = match &err {
            TransportError::Connect(..) => std::io::ErrorKind::ConnectionRefused,
            TransportError::Aborted => std::io::ErrorKind::Interrupted,
            TransportError::BridgeClosed => std::io::ErrorKind::BrokenPipe,
            TransportError::Io(inner) => inner.kind(),
            TransportError::Substrate(_) => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

/// Smart protocol services routed by the subtransport
///
/// Each protocol phase is its own variant, so an unrecognized service is
/// unrepresentable rather than a runtime failure.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Service {
    /// Ref discovery preceding a fetch
    UploadPackLs,
    /// Pack exchange for a fetch
    UploadPack,
    /// Ref discovery preceding a push
    ReceivePackLs,
    /// Pack exchange for a push
    ReceivePack,
}

impl Service {
    /// Wire name of the pack service this phase belongs to
    pub fn pack_service(self) -> &'static str {
        match self {
            Service::UploadPackLs | Service::UploadPack => "git-upload-pack",
            Service::ReceivePackLs | Service::ReceivePack => "git-receive-pack",
        }
    }

    /// Whether this is the ref discovery phase
    pub fn is_discovery(self) -> bool {
        matches!(self, Service::UploadPackLs | Service::ReceivePackLs)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_discovery() {
            write!(f, "{} (discovery)", self.pack_service())
        } else {
            write!(f, "{}", self.pack_service())
        }
    }
}

/// HTTP methods the subtransport issues
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Opaque token for one open request-response exchange on the substrate.
///
/// Deliberately not `Clone`: a handle belongs to exactly one stream for its
/// whole lifetime and is moved into [`release`] when the stream is done.
///
/// [`release`]: super::substrate::HttpSubstrate::release
#[derive(Debug, PartialEq, Eq)]
pub struct ConnectionHandle(u32);

impl ConnectionHandle {
    /// Wrap a raw substrate connection number
    pub fn from_raw(raw: u32) -> Self {
        ConnectionHandle(raw)
    }

    /// Raw connection number, for substrate implementations
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

/// Initial response buffer size requested from the substrate when a stream
/// connects without an explicit configuration.
pub const DEFAULT_INIT_BUFFER_SIZE: usize = 65536;
