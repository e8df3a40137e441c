//! Blocking facade over an asynchronous subtransport stream.
//!
//! The protocol engine above this crate drives streams through a
//! call-and-return interface, while the substrate below is asynchronous. This
//! module hands each stream to a worker task on a tokio runtime and funnels
//! blocking calls through a command channel: the calling thread parks until
//! the matching async operation resolves, then resumes with its result.

use std::io;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use super::core::SubtransportStream;
use super::types::TransportError;

enum BridgeCommand {
    Read {
        len: usize,
        reply: oneshot::Sender<Result<Vec<u8>, TransportError>>,
    },
    Write {
        data: Vec<u8>,
        reply: oneshot::Sender<Result<(), TransportError>>,
    },
}

/// Blocking handle to a stream running on a tokio runtime
///
/// Implements [`std::io::Read`] and [`std::io::Write`], so a synchronous
/// protocol engine can consume the stream directly.
pub struct BlockingStream {
    commands: mpsc::Sender<BridgeCommand>,
}

impl BlockingStream {
    /// Move `stream` onto `runtime` and return a blocking facade for it.
    ///
    /// The worker task exits when the facade is dropped; the stream, and with
    /// it any open exchange, is then released on the runtime.
    pub fn spawn<T>(runtime: &Handle, stream: T) -> Self
    where
        T: SubtransportStream + 'static,
    {
        let (tx, rx) = mpsc::channel::<BridgeCommand>(1);
        runtime.spawn(async move {
            let mut stream = stream;
            let mut commands = ReceiverStream::new(rx);
            while let Some(command) = commands.next().await {
                match command {
                    BridgeCommand::Read { len, reply } => {
                        let mut buf = vec![0u8; len];
                        let result = stream.read(&mut buf).await.map(|n| {
                            buf.truncate(n);
                            buf
                        });
                        let _ = reply.send(result);
                    }
                    BridgeCommand::Write { data, reply } => {
                        let _ = reply.send(stream.write(&data).await);
                    }
                }
            }
        });
        Self { commands: tx }
    }

    /// Blocking read; parks the calling thread until the stream produces
    /// data, end of stream, or a failure.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .blocking_send(BridgeCommand::Read {
                len: buf.len(),
                reply,
            })
            .map_err(|_| TransportError::BridgeClosed)?;
        let data = response
            .blocking_recv()
            .map_err(|_| TransportError::BridgeClosed)??;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    /// Blocking write; parks until the substrate has accepted the bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .blocking_send(BridgeCommand::Write {
                data: data.to_vec(),
                reply,
            })
            .map_err(|_| TransportError::BridgeClosed)?;
        response
            .blocking_recv()
            .map_err(|_| TransportError::BridgeClosed)?
    }
}

impl io::Read for BlockingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        BlockingStream::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for BlockingStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BlockingStream::write(self, buf)
            .map(|_| buf.len())
            .map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
