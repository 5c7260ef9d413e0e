//! HTTP body handling implementation.
//!
//! Every body, whatever its wire encoding, is an `http_body::Body<Data = Bytes>`:
//!
//! - [`ReqBody`]: the request body, pulled on demand from the connection
//!   (Content-Length, chunked, or until end of stream)
//! - [`RespBody`]: a type-erased response body, built from in-memory bytes, from
//!   a request body, or from any streaming `Body`
//!
//! [`ReadBody`] adds a single suspending pull on top of `Body`: `read()` returns
//! the next non-empty unit of data, and empty bytes once the body is exhausted.

mod req_body;
mod resp_body;

use bytes::Bytes;
use http_body::Body;
use http_body_util::BodyExt;

pub use req_body::ReqBody;
pub use resp_body::{BoxError, RespBody};

/// Pull-style access to a body.
pub trait ReadBody: Body<Data = Bytes> + Unpin {
    /// Returns the next unit of data, or empty bytes at the end of the body.
    ///
    /// Empty data frames and trailers are skipped.
    fn read(&mut self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send + '_
    where
        Self: Send,
        Self::Error: Send,
    {
        async move {
            loop {
                match self.frame().await {
                    None => return Ok(Bytes::new()),
                    Some(Err(e)) => return Err(e),
                    Some(Ok(frame)) => {
                        if let Ok(data) = frame.into_data()
                            && !data.is_empty()
                        {
                            return Ok(data);
                        }
                    }
                }
            }
        }
    }

    /// The exact body length if it is known, `None` when it is not.
    fn declared_length(&self) -> Option<u64> {
        self.size_hint().exact()
    }
}

impl<B> ReadBody for B where B: Body<Data = Bytes> + Unpin {}
