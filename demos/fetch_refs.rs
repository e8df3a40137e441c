//! Ref discovery demo driving the smart HTTP subtransport against an
//! in-memory substrate with a canned server response.
//!
//! Run with:
//! ```bash
//! cargo run --example fetch_refs
//! ```
//! The demo opens a discovery stream for `git-upload-pack`, reads the pkt-line
//! ref advertisement a server would return for
//! `GET {base}/info/refs?service=git-upload-pack`, and prints it. Swap
//! `CannedSubstrate` for a real `HttpSubstrate` implementation (browser fetch,
//! reqwest, ...) to talk to an actual server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use git_smart_http::{
    ConnectRequest, ConnectionHandle, HttpSubstrate, ReadOutcome, Service, SmartHttpSubtransport,
    SmartSubtransport, SubtransportStream, TransportError,
};

const ADVERTISEMENT: &[u8] = b"001e# service=git-upload-pack\n\
    00000052aa7dbb92e5a4f3dcb37ccff4ecb2d42c4b4a5ae5 HEAD\0side-band-64k agent=demo\n\
    003faa7dbb92e5a4f3dcb37ccff4ecb2d42c4b4a5ae5 refs/heads/main\n0000";

/// Substrate that answers every exchange with the canned advertisement
struct CannedSubstrate {
    remaining: Mutex<Vec<u8>>,
}

impl CannedSubstrate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(ADVERTISEMENT.to_vec()),
        })
    }
}

#[async_trait]
impl HttpSubstrate for CannedSubstrate {
    async fn connect(
        &self,
        request: ConnectRequest<'_>,
    ) -> Result<ConnectionHandle, TransportError> {
        tracing::info!("{} {}", request.method, request.url);
        Ok(ConnectionHandle::from_raw(1))
    }

    async fn read(
        &self,
        _conn: &ConnectionHandle,
        buf: &mut [u8],
    ) -> Result<ReadOutcome, TransportError> {
        let mut remaining = self.remaining.lock().unwrap();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        remaining.drain(..n);
        Ok(ReadOutcome::Data(n))
    }

    async fn write(&self, _conn: &ConnectionHandle, _data: Bytes) -> Result<(), TransportError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), TransportError> {
    tracing_subscriber::fmt().init();

    let transport = SmartHttpSubtransport::new(CannedSubstrate::new());
    let mut stream = transport.action("https://git.example.com/demo.git", Service::UploadPackLs)?;

    let mut advertisement = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        advertisement.extend_from_slice(&buf[..n]);
    }

    println!("{}", String::from_utf8_lossy(&advertisement));
    Ok(())
}
