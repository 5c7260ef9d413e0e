//! Backpressured byte channel over a split transport.
//!
//! The read half of the transport is owned by a small pump task. The pump only
//! touches the socket when a read has been requested: each [`ChannelReader`]
//! read hands the pump a one-shot reply slot, the pump performs exactly one
//! socket read into it, then waits for the next request. While nobody asks for
//! data the socket is not read at all, so the kernel's receive window fills up
//! and the peer is slowed down.
//!
//! At most one read is outstanding per channel. End of stream resolves a read
//! with empty bytes and is permanent. A transport error fails the read in
//! flight and every later read or write on both halves.

use std::fmt;
use std::future::poll_fn;
use std::io;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use futures::channel::{mpsc, oneshot};
use futures::{FutureExt, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::ensure;
use crate::protocol::ChannelError;

/// Default capacity of a single socket read.
pub const DEFAULT_READ_SIZE: usize = 8 * 1024;

type ReadReply = oneshot::Sender<io::Result<Bytes>>;

/// Both halves of a backpressured channel.
#[derive(Debug)]
pub struct Channel<W> {
    reader: ChannelReader,
    writer: ChannelWriter<W>,
}

impl<W> Channel<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps a split transport. Must be called inside a tokio runtime; the read
    /// half is moved into a pump task.
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::with_read_size(reader, writer, DEFAULT_READ_SIZE)
    }

    pub fn with_read_size<R>(reader: R, writer: W, read_size: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let failure = Arc::new(OnceLock::new());
        // a zero sized buffer: a request is only accepted once the pump took the previous one
        let (requests, pending_requests) = mpsc::channel(0);
        let pump = tokio::spawn(pump(reader, pending_requests, read_size.max(1)));

        Self {
            reader: ChannelReader { requests, pending: None, eof: false, failure: Arc::clone(&failure), pump },
            writer: ChannelWriter { writer, failure },
        }
    }

    pub fn reader(&mut self) -> &mut ChannelReader {
        &mut self.reader
    }

    pub fn writer(&mut self) -> &mut ChannelWriter<W> {
        &mut self.writer
    }

    pub fn into_split(self) -> (ChannelReader, ChannelWriter<W>) {
        (self.reader, self.writer)
    }
}

/// The sticky transport failure shared by both halves.
#[derive(Debug)]
struct Failure {
    kind: io::ErrorKind,
    message: String,
}

impl Failure {
    fn to_error(&self) -> ChannelError {
        ChannelError::Transport { source: io::Error::new(self.kind, self.message.clone()) }
    }
}

fn record_failure(failure: &OnceLock<Failure>, error: io::Error) -> ChannelError {
    let _ = failure.set(Failure { kind: error.kind(), message: error.to_string() });
    ChannelError::Transport { source: error }
}

/// The read half: one suspending `read()` at a time.
pub struct ChannelReader {
    requests: mpsc::Sender<ReadReply>,
    pending: Option<oneshot::Receiver<io::Result<Bytes>>>,
    eof: bool,
    failure: Arc<OnceLock<Failure>>,
    pump: JoinHandle<()>,
}

impl fmt::Debug for ChannelReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelReader")
            .field("in_flight", &self.pending.is_some())
            .field("eof", &self.eof)
            .field("failure", &self.failure.get())
            .finish_non_exhaustive()
    }
}

impl ChannelReader {
    /// Asks the pump for the next chunk of bytes without waiting for it.
    ///
    /// # Errors
    ///
    /// `ChannelError::ReadInFlight` if a read has been started and not yet
    /// resolved; the sticky transport error if the channel has failed.
    pub fn begin_read(&mut self) -> Result<(), ChannelError> {
        ensure!(self.pending.is_none(), ChannelError::ReadInFlight);
        if let Some(failure) = self.failure.get() {
            return Err(failure.to_error());
        }

        let (reply, receiver) = oneshot::channel();
        if let Err(e) = self.requests.try_send(reply) {
            debug!(disconnected = e.is_disconnected(), "read request rejected by pump");
            return Err(ChannelError::Closed);
        }
        self.pending = Some(receiver);
        Ok(())
    }

    /// True while a read has been started but not resolved.
    pub fn is_reading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Polls the read in flight, starting one if none is.
    ///
    /// Resolves to empty bytes at end of stream.
    pub fn poll_read(&mut self, cx: &mut Context<'_>) -> Poll<Result<Bytes, ChannelError>> {
        if let Some(failure) = self.failure.get() {
            self.pending = None;
            return Poll::Ready(Err(failure.to_error()));
        }
        if self.eof {
            return Poll::Ready(Ok(Bytes::new()));
        }

        if self.pending.is_none() {
            self.begin_read()?;
        }
        let Some(pending) = self.pending.as_mut() else {
            return Poll::Ready(Err(ChannelError::Closed));
        };

        let result = ready!(pending.poll_unpin(cx));
        self.pending = None;

        match result {
            Ok(Ok(bytes)) => {
                if bytes.is_empty() {
                    trace!("channel reached end of stream");
                    self.eof = true;
                }
                Poll::Ready(Ok(bytes))
            }
            Ok(Err(e)) => Poll::Ready(Err(record_failure(&self.failure, e))),
            Err(oneshot::Canceled) => {
                Poll::Ready(Err(self.failure.get().map_or(ChannelError::Closed, Failure::to_error)))
            }
        }
    }

    /// Reads the next chunk of bytes; empty at end of stream.
    ///
    /// Dropping the returned future does not lose data: the read stays in
    /// flight and the next call picks up its result.
    pub async fn read(&mut self) -> Result<Bytes, ChannelError> {
        poll_fn(|cx| self.poll_read(cx)).await
    }

    /// Closes the channel. Any read in flight and every later read or write
    /// fails.
    pub fn close(&mut self) {
        let _ = self.failure.set(Failure { kind: io::ErrorKind::ConnectionAborted, message: "channel closed".into() });
        self.pump.abort();
        self.requests.close_channel();
    }
}

impl Drop for ChannelReader {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump<R>(mut reader: R, mut requests: mpsc::Receiver<ReadReply>, read_size: usize)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(read_size);

    while let Some(reply) = requests.next().await {
        buf.reserve(read_size);
        let result = reader.read_buf(&mut buf).await.map(|_| buf.split().freeze());

        let finished = !matches!(&result, Ok(bytes) if !bytes.is_empty());
        if let Ok(bytes) = &result {
            trace!(len = bytes.len(), "pumped bytes from transport");
        }

        if reply.send(result).is_err() {
            trace!("read abandoned by reader");
            break;
        }
        if finished {
            break;
        }
    }
}

/// The write half: every `write` is flushed before it resolves.
#[derive(Debug)]
pub struct ChannelWriter<W> {
    writer: W,
    failure: Arc<OnceLock<Failure>>,
}

impl<W> ChannelWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Writes and flushes `data`.
    ///
    /// # Errors
    ///
    /// The sticky transport error if the channel has failed before or fails now.
    pub async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if let Some(failure) = self.failure.get() {
            return Err(failure.to_error());
        }

        let result = async {
            self.writer.write_all(data).await?;
            self.writer.flush().await
        }
        .await;

        result.map_err(|e| record_failure(&self.failure, e))
    }

    /// Shuts down the write side of the transport.
    pub async fn shutdown(&mut self) -> Result<(), ChannelError> {
        self.writer.shutdown().await.map_err(ChannelError::from)
    }

    pub fn is_failed(&self) -> bool {
        self.failure.get().is_some()
    }
}
