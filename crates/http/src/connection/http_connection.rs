use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body::Body;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::connection::channel::Channel;
use crate::connection::message_writer::MessageWriter;
use crate::connection::options::ServerOptions;
use crate::connection::request_reader::RequestReader;
use crate::handler::Handler;
use crate::protocol::body::{ReadBody, ReqBody, RespBody};
use crate::protocol::{ErrorKind, HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHeader, Response, SendError};

/// An HTTP connection that frames requests and streams responses
///
/// `HttpConnection` runs the per-connection loop:
/// - frame the next request head from the shared buffer, reading more bytes
///   from the channel only when needed
/// - hand the head and a streaming body to the [`Handler`]
/// - send the response head and stream its body
/// - drain whatever the handler left of the request body, so the buffer sits
///   exactly at the next request's boundary
///
/// The loop repeats until the peer closes the stream, a request declares
/// `HTTP/1.0`, or an error tears the connection down.
///
/// # Type Parameters
///
/// * `W`: The async writable half of the transport. The readable half is moved
///   into the channel's pump task.
#[derive(Debug)]
pub struct HttpConnection<W> {
    reader: RequestReader,
    writer: MessageWriter<W>,
    options: ServerOptions,
}

impl<W> HttpConnection<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::with_options(reader, writer, ServerOptions::default())
    }

    pub fn with_options<R>(reader: R, writer: W, options: ServerOptions) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (channel_reader, channel_writer) = Channel::with_read_size(reader, writer, options.read_chunk_size).into_split();
        Self {
            reader: RequestReader::new(channel_reader, options.max_header_bytes),
            writer: MessageWriter::with_capacity(channel_writer, 8 * 1024),
            options,
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        loop {
            let next_request = match self.options.header_timeout {
                Some(limit) => {
                    if let Ok(next_request) = timeout(limit, self.reader.read_request()).await {
                        next_request
                    } else {
                        info!(?limit, "no request head before timeout, break this connection down");
                        self.shutdown().await;
                        return Ok(());
                    }
                }
                None => self.reader.read_request().await,
            };

            let (header, payload_size) = match next_request {
                Ok(Some(request)) => request,
                Ok(None) => {
                    info!("cant read more request, break this connection down");
                    self.shutdown().await;
                    return Ok(());
                }
                Err(e) => {
                    error!(cause = %e, "can't receive next request");
                    return self.fail(e).await;
                }
            };

            let keep_alive = header.keep_alive();
            if !self.do_process(header, payload_size, handler.as_ref()).await? {
                self.shutdown().await;
                return Ok(());
            }

            if !keep_alive {
                info!("http/1.0 request served, break this connection down");
                self.shutdown().await;
                return Ok(());
            }
        }
    }

    /// Runs one request through the handler and sends its response.
    ///
    /// Returns `Ok(false)` when the connection must be closed quietly.
    async fn do_process<H>(&mut self, header: RequestHeader, payload_size: PayloadSize, handler: &H) -> Result<bool, HttpError>
    where
        H: Handler + ?Sized,
    {
        debug!(method = %header.method(), path = %String::from_utf8_lossy(header.path()), ?payload_size, "dispatch request");

        let handled = {
            let body = ReqBody::new(&mut self.reader, payload_size);
            match handler.call(header, body).await {
                Ok(response) => Ok(Self::send_response(&mut self.writer, response).await),
                Err(e) => Err(e),
            }
        };

        match handled {
            Ok(Ok(())) => {}
            Ok(Err(HttpError::RequestError { source })) if !self.writer.has_flushed() => {
                error!(cause = %source, "request body failed before the response was sent");
                return self.fail(source).await;
            }
            Ok(Err(e)) => {
                error!(cause = %e, "failed to send response");
                self.shutdown().await;
                return Err(e);
            }
            Err(e) => match e.downcast::<ParseError>() {
                Ok(source) => {
                    error!(cause = %source, "handler failed to read request body");
                    return self.fail(*source).await;
                }
                Err(e) => {
                    error!(cause = %e, "handle response error");
                    self.writer.clear_buf();
                    let response = Response::new(StatusCode::INTERNAL_SERVER_ERROR, RespBody::empty());
                    if let Err(e) = Self::send_response(&mut self.writer, response).await {
                        self.shutdown().await;
                        return Err(e);
                    }
                }
            },
        }

        if self.reader.is_broken() {
            info!("request body is no longer readable, break this connection down");
            return Ok(false);
        }

        // skip body if request handler don't read body
        if let Err(e) = self.reader.skip_body().await {
            error!(cause = %e, "can't drain request body");
            return self.fail(e).await;
        }

        Ok(true)
    }

    async fn send_response(writer: &mut MessageWriter<W>, response: Response<RespBody<'_>>) -> Result<(), HttpError> {
        let (head, mut body) = response.into_parts();
        let payload_size = PayloadSize::from(&body.size_hint());

        writer.write(Message::<_, Bytes>::Header((head, payload_size)))?;
        if payload_size.is_empty() {
            writer.flush().await?;
            return Ok(());
        }

        loop {
            let data = body.read().await.map_err(|e| match e.downcast::<ParseError>() {
                Ok(parse_error) => HttpError::from(*parse_error),
                Err(e) => SendError::invalid_body(format!("resolve response body error: {e}")).into(),
            })?;

            if data.is_empty() {
                writer.write(Message::Payload(PayloadItem::<Bytes>::Eof))?;
                writer.flush().await?;
                return Ok(());
            }

            writer.write(Message::Payload(PayloadItem::Chunk(data)))?;
            // the last unit is flushed together with the terminator
            if !body.is_end_stream() {
                writer.flush().await?;
            }
        }
    }

    /// Answers a framing error with a best-effort error response, then closes.
    async fn fail<T>(&mut self, e: ParseError) -> Result<T, HttpError> {
        // a half encoded response would otherwise prefix the error response
        if !self.writer.is_idle() {
            self.writer.clear_buf();
        }

        if e.kind() != ErrorKind::Io {
            let response = Response::new(e.status_code(), RespBody::from(e.to_string())).with_header("Connection", "close");
            if let Err(send_error) = Self::send_response(&mut self.writer, response).await {
                error!(cause = %send_error, "failed to send error response");
            }
        }

        self.shutdown().await;
        Err(e.into())
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.writer.get_mut().shutdown().await {
            debug!(cause = %e, "shutdown connection error");
        }
        self.reader.close();
    }
}
