//! Request handler seam.
//!
//! The connection hands every framed request to a [`Handler`] together with a
//! body that streams straight from the connection. The response body may
//! borrow the request body for the same `'conn` lifetime, which is how an echo
//! handler sends the request back without buffering it.

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::body::{ReqBody, RespBody};
use crate::protocol::{RequestHeader, Response};

/// Error returned by a handler. The connection answers it with a 500, unless
/// it is a request framing error raised while reading the body.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call<'conn>(&self, request: RequestHeader, body: ReqBody<'conn>) -> Result<Response<RespBody<'conn>>, HandlerError>;
}

/// A handler built from an async function that only looks at the request head.
///
/// The request body is left unread; the connection drains it after the
/// response has been sent.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut, B, E> Handler for HandlerFn<F>
where
    F: Fn(RequestHeader) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<B>, E>> + Send,
    B: Into<RespBody<'static>>,
    E: Into<HandlerError>,
{
    async fn call<'conn>(&self, request: RequestHeader, _body: ReqBody<'conn>) -> Result<Response<RespBody<'conn>>, HandlerError> {
        let response = match (self.f)(request).await {
            Ok(response) => response,
            Err(e) => return Err(e.into()),
        };

        let response: Response<RespBody<'static>> = response.map(Into::into);
        Ok(response)
    }
}

pub fn make_handler<F, Fut, B, E>(f: F) -> HandlerFn<F>
where
    F: Fn(RequestHeader) -> Fut,
    Fut: Future<Output = Result<Response<B>, E>>,
    B: Into<RespBody<'static>>,
    E: Into<HandlerError>,
{
    HandlerFn { f }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::protocol::Headers;

    async fn hello(request: RequestHeader) -> Result<Response<String>, HandlerError> {
        let path = String::from_utf8_lossy(request.path()).into_owned();
        Ok(Response::new(StatusCode::OK, format!("hello {path}")))
    }

    #[tokio::test]
    async fn function_handler() {
        let handler = make_handler(hello);
        let request = RequestHeader::new(Method::GET, "/world", "1.1", Headers::new());

        let response = handler.call(request, ReqBody::empty()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello /world");
    }

    #[tokio::test]
    async fn function_handler_error() {
        let handler = make_handler(|_request: RequestHeader| async { Err::<Response<()>, _>("boom") });
        let request = RequestHeader::new(Method::GET, "/", "1.1", Headers::new());

        let error = handler.call(request, ReqBody::empty()).await.unwrap_err();
        assert_eq!(error.to_string(), "boom");
    }
}
