//! The contract between the executor and the application that handles requests.
//!
//! A [`Host`] is handed a request adapter and a response adapter per attempt
//! and reports what happened as a [`Dispatch`]. [`AsyncHost`] is the async
//! flavor; every `Host` is also an `AsyncHost`.

use async_trait::async_trait;

use crate::request::RequestAdapter;
use crate::response::ResponseAdapter;

/// Outcome of handing one request to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran and the response is final.
    Dispatched,
    /// No handler matched; never retried.
    NotFound,
    /// A handler ran and asks for the request to be executed again.
    RetryRequested,
}

impl From<bool> for Dispatch {
    /// `true` means a handler ran, `false` means none was found.
    fn from(handled: bool) -> Self {
        if handled { Dispatch::Dispatched } else { Dispatch::NotFound }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Host: Send + Sync {
    fn handle(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch;
}

#[async_trait]
pub trait AsyncHost: Send + Sync {
    async fn handle_async(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch;
}

#[async_trait]
impl<H: Host + ?Sized> AsyncHost for H {
    async fn handle_async(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
        self.handle(request, response)
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn handle(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
        (**self).handle(request, response)
    }
}

impl<H: Host + ?Sized> Host for std::sync::Arc<H> {
    fn handle(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
        (**self).handle(request, response)
    }
}

/// A [`Host`] backed by a closure, see [`host_fn`].
#[derive(Debug)]
pub struct HostFn<F> {
    f: F,
}

impl<F> Host for HostFn<F>
where
    F: Fn(&mut RequestAdapter, &mut ResponseAdapter) -> Dispatch + Send + Sync,
{
    fn handle(&self, request: &mut RequestAdapter, response: &mut ResponseAdapter) -> Dispatch {
        (self.f)(request, response)
    }
}

/// Wraps a closure into a [`Host`].
///
/// ```
/// use local_web::host::{host_fn, Dispatch};
///
/// let host = host_fn(|request, response| {
///     response.write_str(request.path_info());
///     Dispatch::Dispatched
/// });
/// # let _ = host;
/// ```
pub fn host_fn<F>(f: F) -> HostFn<F>
where
    F: Fn(&mut RequestAdapter, &mut ResponseAdapter) -> Dispatch + Send + Sync,
{
    HostFn { f }
}
