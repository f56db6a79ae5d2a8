use async_trait::async_trait;

use crate::protocol::{Request, Response};

/// A blocking request/response exchange.
///
/// Any `Fn(Request) -> Response` closure is a transport.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Response;
}

impl<F> Transport for F
where
    F: Fn(Request) -> Response + Send + Sync,
{
    fn send(&self, request: Request) -> Response {
        (self)(request)
    }
}

/// An asynchronous request/response exchange.
///
/// Independent of [`Transport`]: a client never bridges one style into the
/// other by blocking.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: Request) -> Response;
}

/// Adapts an async closure into an [`AsyncTransport`], see [`async_transport_fn`].
#[derive(Debug)]
pub struct AsyncTransportFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> AsyncTransport for AsyncTransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn send(&self, request: Request) -> Response {
        (self.f)(request).await
    }
}

pub fn async_transport_fn<F, Fut>(f: F) -> AsyncTransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    AsyncTransportFn { f }
}
