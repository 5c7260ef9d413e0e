//! The demo HTTP routes.
//!
//! - `/echo` streams the request body straight back, chunked
//! - `/counter` emits `1\n` to `5\n` with a pause between lines, chunked
//! - everything else gets a fixed HTML page sent with `Content-Length`

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ebb_http::handler::{Handler, HandlerError};
use ebb_http::protocol::body::{ReqBody, RespBody};
use ebb_http::protocol::{RequestHeader, Response};
use futures::stream;
use http::{Method, StatusCode};
use http_body::Frame;
use http_body_util::StreamBody;
use tracing::info;

pub const DEFAULT_PAGE: &str = "<html><body><h1>ebb</h1><p>try /echo or /counter</p></body></html>\n";

const COUNTER_LINES: u32 = 5;

#[derive(Debug, Clone)]
pub struct Router {
    counter_delay: Duration,
}

impl Default for Router {
    fn default() -> Self {
        Self { counter_delay: Duration::from_millis(500) }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pause between two `/counter` lines.
    #[must_use]
    pub fn with_counter_delay(mut self, counter_delay: Duration) -> Self {
        self.counter_delay = counter_delay;
        self
    }

    fn counter(&self) -> Response<RespBody<'static>> {
        let delay = self.counter_delay;
        let lines = stream::unfold(1, move |n| async move {
            if n > COUNTER_LINES {
                return None;
            }
            if n > 1 {
                tokio::time::sleep(delay).await;
            }
            let line = Frame::data(Bytes::from(format!("{n}\n")));
            Some((Ok::<_, Infallible>(line), n + 1))
        });

        Response::new(StatusCode::OK, RespBody::new(StreamBody::new(lines))).with_header("Content-Type", "text/plain")
    }
}

fn default_page() -> Response<RespBody<'static>> {
    Response::new(StatusCode::OK, RespBody::from(DEFAULT_PAGE)).with_header("Content-Type", "text/html; charset=utf-8")
}

#[async_trait]
impl Handler for Router {
    async fn call<'conn>(&self, request: RequestHeader, body: ReqBody<'conn>) -> Result<Response<RespBody<'conn>>, HandlerError> {
        info!(method = %request.method(), path = %String::from_utf8_lossy(request.path()), "receive request");

        let response = match (request.method(), request.path()) {
            (_, b"/echo") => Response::new(StatusCode::OK, RespBody::from(body)),
            (&Method::GET, b"/counter") => self.counter(),
            _ => default_page(),
        };
        Ok(response)
    }
}
