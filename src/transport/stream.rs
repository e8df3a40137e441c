//! Per-operation stream state machine: lazy connection establishment, reads and
//! writes sequenced over a single substrate exchange, and release on drop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::core::SubtransportStream;
use super::service::request_content_type;
use super::substrate::{ConnectRequest, HttpSubstrate, ReadOutcome};
use super::types::{ConnectionHandle, HttpMethod, TransportError};
use crate::config::HttpTransportConfig;

/// Stream for one smart protocol phase over HTTP
///
/// Holds the composed service URL and at most one substrate exchange, opened
/// lazily on the first read or write. Read-first streams (ref discovery)
/// connect with GET; write-first streams (pack exchange) connect with POST and
/// the content type implied by the URL's pack direction. Once connected, every
/// subsequent call reuses the same exchange.
pub struct SmartHttpStream<S: HttpSubstrate> {
    substrate: Arc<S>,
    service_url: String,
    init_buffer_size: usize,
    extra_headers: HashMap<String, String>,
    connection: Option<ConnectionHandle>,
}

impl<S: HttpSubstrate> SmartHttpStream<S> {
    pub(crate) fn new(
        substrate: Arc<S>,
        service_url: String,
        config: &HttpTransportConfig,
    ) -> Self {
        Self {
            substrate,
            service_url,
            init_buffer_size: config.init_buffer_size,
            extra_headers: config.extra_headers.clone(),
            connection: None,
        }
    }

    /// Target URL of this stream
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Whether the first read or write has opened the underlying exchange
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the exchange for this stream. Called at most once per lifetime;
    /// a connect failure leaves the stream unconnected.
    async fn open(&self, method: HttpMethod) -> Result<ConnectionHandle, TransportError> {
        let mut headers = self.extra_headers.clone();
        if method == HttpMethod::Post {
            headers.insert(
                "Content-Type".to_string(),
                request_content_type(&self.service_url).to_string(),
            );
        }
        tracing::debug!("opening {} exchange to {}", method, self.service_url);
        self.substrate
            .connect(ConnectRequest {
                url: &self.service_url,
                method,
                init_buffer_size: self.init_buffer_size,
                headers,
            })
            .await
    }
}

#[async_trait]
impl<S: HttpSubstrate> SubtransportStream for SmartHttpStream<S> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => self.open(HttpMethod::Get).await?,
        };
        let outcome = self.substrate.read(&conn, buf).await;
        self.connection = Some(conn);

        match outcome? {
            ReadOutcome::Data(n) => Ok(n),
            ReadOutcome::Aborted => {
                tracing::warn!("exchange to {} aborted by host", self.service_url);
                Err(TransportError::Aborted)
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => self.open(HttpMethod::Post).await?,
        };
        let result = self
            .substrate
            .write(&conn, Bytes::copy_from_slice(data))
            .await;
        self.connection = Some(conn);
        result
    }
}

impl<S: HttpSubstrate> Drop for SmartHttpStream<S> {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            self.substrate.release(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    struct RecordedConnect {
        url: String,
        method: HttpMethod,
        init_buffer_size: usize,
        headers: HashMap<String, String>,
    }

    enum ScriptedRead {
        Data(Vec<u8>),
        Aborted,
    }

    /// Test substrate that records every call and serves scripted reads
    #[derive(Default)]
    struct FakeSubstrate {
        fail_connect: bool,
        connects: Mutex<Vec<RecordedConnect>>,
        reads: Mutex<VecDeque<ScriptedRead>>,
        writes: Mutex<Vec<(u32, Vec<u8>)>>,
        released: Mutex<Vec<u32>>,
        next_handle: Mutex<u32>,
    }

    impl FakeSubstrate {
        fn with_reads(reads: Vec<ScriptedRead>) -> Arc<Self> {
            Arc::new(Self {
                reads: Mutex::new(reads.into()),
                ..Self::default()
            })
        }

        fn refusing_connects() -> Arc<Self> {
            Arc::new(Self {
                fail_connect: true,
                ..Self::default()
            })
        }

        fn connects(&self) -> Vec<RecordedConnect> {
            self.connects.lock().unwrap().clone()
        }

        fn writes(&self) -> Vec<(u32, Vec<u8>)> {
            self.writes.lock().unwrap().clone()
        }

        fn released(&self) -> Vec<u32> {
            self.released.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpSubstrate for FakeSubstrate {
        async fn connect(
            &self,
            request: ConnectRequest<'_>,
        ) -> Result<ConnectionHandle, TransportError> {
            if self.fail_connect {
                return Err(TransportError::connect(request.url, "connection refused"));
            }
            self.connects.lock().unwrap().push(RecordedConnect {
                url: request.url.to_string(),
                method: request.method,
                init_buffer_size: request.init_buffer_size,
                headers: request.headers,
            });
            let mut next = self.next_handle.lock().unwrap();
            *next += 1;
            Ok(ConnectionHandle::from_raw(*next))
        }

        async fn read(
            &self,
            _conn: &ConnectionHandle,
            buf: &mut [u8],
        ) -> Result<ReadOutcome, TransportError> {
            match self.reads.lock().unwrap().pop_front() {
                Some(ScriptedRead::Data(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(ReadOutcome::Data(n))
                }
                Some(ScriptedRead::Aborted) => Ok(ReadOutcome::Aborted),
                None => Ok(ReadOutcome::Data(0)),
            }
        }

        async fn write(
            &self,
            conn: &ConnectionHandle,
            data: Bytes,
        ) -> Result<(), TransportError> {
            self.writes
                .lock()
                .unwrap()
                .push((conn.as_raw(), data.to_vec()));
            Ok(())
        }

        fn release(&self, conn: ConnectionHandle) {
            self.released.lock().unwrap().push(conn.as_raw());
        }
    }

    fn stream_for(substrate: &Arc<FakeSubstrate>, url: &str) -> SmartHttpStream<FakeSubstrate> {
        SmartHttpStream::new(
            substrate.clone(),
            url.to_string(),
            &HttpTransportConfig::default(),
        )
    }

    /// A discovery stream connects exactly once with GET, then reuses the handle.
    #[tokio::test]
    async fn read_connects_once_with_get() {
        let substrate = FakeSubstrate::with_reads(vec![
            ScriptedRead::Data(b"0018# service".to_vec()),
            ScriptedRead::Data(b"more".to_vec()),
        ]);
        let url = "https://example.com/repo.git/info/refs?service=git-upload-pack";
        let mut stream = stream_for(&substrate, url);

        let mut buf = [0u8; 64];
        assert!(!stream.is_connected());
        stream.read(&mut buf).await.unwrap();
        assert!(stream.is_connected());
        stream.read(&mut buf).await.unwrap();
        stream.read(&mut buf).await.unwrap();

        let connects = substrate.connects();
        assert_eq!(connects.len(), 1, "handle must be reused across reads");
        assert_eq!(connects[0].url, url);
        assert_eq!(connects[0].method, HttpMethod::Get);
        assert_eq!(connects[0].init_buffer_size, 65536);
        assert!(connects[0].headers.is_empty());
    }

    /// Fixed bytes come back verbatim, followed by a zero-byte end-of-stream read.
    #[tokio::test]
    async fn round_trip_fixed_bytes_then_eof() {
        let payload = b"001e# service=git-upload-pack\n".to_vec();
        let substrate = FakeSubstrate::with_reads(vec![ScriptedRead::Data(payload.clone())]);
        let mut stream = stream_for(
            &substrate,
            "https://example.com/repo.git/info/refs?service=git-upload-pack",
        );

        let mut buf = [0u8; 128];
        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], payload.as_slice());

        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 0, "end of stream is a zero-byte read");
        assert_eq!(substrate.connects().len(), 1);
    }

    /// An abort from the substrate is a failure, never a partial byte count.
    #[tokio::test]
    async fn abort_maps_to_failure() {
        let substrate = FakeSubstrate::with_reads(vec![ScriptedRead::Aborted]);
        let mut stream = stream_for(
            &substrate,
            "https://example.com/repo.git/info/refs?service=git-upload-pack",
        );

        let mut buf = [0u8; 16];
        let err = stream.read(&mut buf).await.unwrap_err();
        assert!(matches!(err, TransportError::Aborted));
        assert_eq!(err.to_string(), "request aborted by user");
    }

    /// A write-first stream connects with POST and the upload-pack content type.
    #[tokio::test]
    async fn write_first_sends_upload_pack_content_type() {
        let substrate = FakeSubstrate::with_reads(vec![]);
        let mut stream = stream_for(&substrate, "https://example.com/repo.git/git-upload-pack");

        stream.write(b"0032want ").await.unwrap();

        let connects = substrate.connects();
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0].method, HttpMethod::Post);
        assert_eq!(
            connects[0].headers.get("Content-Type").map(String::as_str),
            Some("application/x-git-upload-pack-request")
        );
        assert_eq!(substrate.writes()[0].1, b"0032want ".to_vec());
    }

    /// Same for the receive-pack direction, including the payload bytes.
    #[tokio::test]
    async fn write_first_sends_receive_pack_content_type() {
        let substrate = FakeSubstrate::with_reads(vec![]);
        let mut stream = stream_for(&substrate, "https://example.com/repo.git/git-receive-pack");

        stream.write(b"PACK\x00\x00\x00\x02").await.unwrap();

        let connects = substrate.connects();
        assert_eq!(connects[0].method, HttpMethod::Post);
        assert_eq!(
            connects[0].headers.get("Content-Type").map(String::as_str),
            Some("application/x-git-receive-pack-request")
        );
        assert_eq!(substrate.writes()[0].1, b"PACK\x00\x00\x00\x02".to_vec());
    }

    /// Writing then reading on one stream stays on a single exchange.
    #[tokio::test]
    async fn write_then_read_reuses_the_exchange() {
        let substrate = FakeSubstrate::with_reads(vec![ScriptedRead::Data(b"0008NAK\n".to_vec())]);
        let mut stream = stream_for(&substrate, "https://example.com/repo.git/git-upload-pack");

        stream.write(b"0009done\n").await.unwrap();
        let mut buf = [0u8; 32];
        let n = stream.read(&mut buf).await.unwrap();

        assert_eq!(&buf[..n], b"0008NAK\n");
        assert_eq!(substrate.connects().len(), 1);
    }

    /// A refused connect surfaces on the first read and leaves no partial state.
    #[tokio::test]
    async fn connect_failure_leaves_stream_unconnected() {
        let substrate = FakeSubstrate::refusing_connects();
        let mut stream = stream_for(
            &substrate,
            "https://example.com/repo.git/info/refs?service=git-upload-pack",
        );

        let mut buf = [0u8; 16];
        let err = stream.read(&mut buf).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(..)));
        assert!(!stream.is_connected());
        drop(stream);
        assert!(
            substrate.released().is_empty(),
            "nothing to release after a failed connect"
        );
    }

    /// Dropping a connected stream moves its handle into the substrate release.
    #[tokio::test]
    async fn drop_releases_the_connection() {
        let substrate = FakeSubstrate::with_reads(vec![ScriptedRead::Data(b"x".to_vec())]);
        let mut stream = stream_for(
            &substrate,
            "https://example.com/repo.git/info/refs?service=git-upload-pack",
        );

        let mut buf = [0u8; 4];
        stream.read(&mut buf).await.unwrap();
        drop(stream);

        assert_eq!(substrate.released(), vec![1]);
    }

    /// Extra configured headers ride along on connect without displacing the
    /// derived content type.
    #[tokio::test]
    async fn extra_headers_forwarded_on_connect() {
        let substrate = FakeSubstrate::with_reads(vec![]);
        let mut config = HttpTransportConfig::default();
        config
            .extra_headers
            .insert("Authorization".to_string(), "Basic Zm9v".to_string());
        let mut stream = SmartHttpStream::new(
            substrate.clone(),
            "https://example.com/repo.git/git-receive-pack".to_string(),
            &config,
        );

        stream.write(b"0000").await.unwrap();

        let headers = &substrate.connects()[0].headers;
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Basic Zm9v")
        );
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/x-git-receive-pack-request")
        );
    }
}
