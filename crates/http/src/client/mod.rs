//! The in-process HTTP client.
//!
//! [`Client`] turns typed calls into wire [`Request`]s, hands them to a
//! pluggable transport and turns the wire [`Response`] back into a typed value.
//! Body formats come from a [`BodyCodec`], transports from [`Transport`]
//! (blocking) and [`AsyncTransport`] (async); both are composed in, never
//! inherited.
//!
//! Before every send the client:
//!
//! 1. defaults `Accept` and `Content-Type` to the codec's media type,
//! 2. sets `Content-Length` to the body length,
//! 3. merges its default headers into the request (request headers win),
//! 4. appends a fresh `X-Request-Id`.
//!
//! # Example
//!
//! ```
//! use local_http::client::Client;
//! use local_http::protocol::{Request, Response};
//!
//! let client = Client::builder()
//!     .transport(|_request: Request| Response::new(200).with_body(r#"{"pong":true}"#))
//!     .build()
//!     .unwrap();
//!
//! let reply: serde_json::Value = client.get("/api/ping").unwrap();
//! assert_eq!(reply["pong"], true);
//! ```

mod transport;

pub use transport::AsyncTransport;
pub use transport::AsyncTransportFn;
pub use transport::Transport;
pub use transport::async_transport_fn;

#[cfg(test)]
pub use transport::MockTransport;

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::{Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::codec::{BodyCodec, JsonCodec};
use crate::dump::Dump;
use crate::ensure;
use crate::protocol::{ClientBuildError, ClientError, HeaderSet, HttpHeader, Request, Response};
use crate::{REQUEST_ID_HEADER, new_request_id};

pub struct Client<C = JsonCodec> {
    codec: C,
    transport: Option<Arc<dyn Transport>>,
    async_transport: Option<Arc<dyn AsyncTransport>>,
    default_headers: ArcSwap<HeaderSet>,
    url_prefix: String,
    log_requests: bool,
}

impl Client<JsonCodec> {
    pub fn builder() -> ClientBuilder<JsonCodec> {
        ClientBuilder::new()
    }
}

impl<C: BodyCodec> Client<C> {
    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// A snapshot of the default headers merged into every request.
    pub fn default_headers(&self) -> Arc<HeaderSet> {
        self.default_headers.load_full()
    }

    /// Sets a default header. Sends already in flight keep the set they started with.
    pub fn set_default_header(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.default_headers.rcu(|current| {
            let mut next = HeaderSet::clone(current);
            next.set(key.as_str(), value.as_str());
            next
        });
    }

    pub fn remove_default_header(&self, key: &str) {
        self.default_headers.rcu(|current| {
            let mut next = HeaderSet::clone(current);
            next.remove(key);
            next
        });
    }

    /// Applies default headers, `Content-Length` and a fresh request id to `request`.
    ///
    /// Returns the request id that was attached.
    pub fn prepare(&self, request: &mut Request) -> String {
        let media_type = self.codec.media_type();

        let mut headers = HeaderSet::clone(&self.default_headers.load());
        if !headers.contains_key(header::ACCEPT.as_str()) {
            headers.set(header::ACCEPT.as_str(), media_type.as_str());
        }
        if !headers.contains_key(header::CONTENT_TYPE.as_str()) {
            headers.set(header::CONTENT_TYPE.as_str(), media_type.as_str());
        }
        headers.merge(&mut request.headers);

        // Content-Length always matches the final body
        request.headers.retain(|h| !h.is(header::CONTENT_LENGTH.as_str()));
        request.headers.push(HttpHeader::new(header::CONTENT_LENGTH.as_str(), request.body.len().to_string()));

        let request_id = new_request_id();
        request.headers.push(HttpHeader::new(REQUEST_ID_HEADER, request_id.as_str()));
        request_id
    }

    /// Prepares `request` and sends it through the blocking transport.
    pub fn send(&self, mut request: Request) -> Result<Response, ClientError> {
        let transport = self.transport.as_ref().ok_or(ClientError::TransportUnavailable { style: "blocking" })?;

        let request_id = self.prepare(&mut request);
        if self.log_requests {
            debug!(request_id = %request_id, "sending request\n{}", request.dump());
        }

        let response = transport.send(request);

        if self.log_requests {
            debug!(request_id = %request_id, "got response\n{}", response.dump());
        }
        Ok(response)
    }

    /// Prepares `request` and sends it through the async transport.
    pub async fn send_async(&self, mut request: Request) -> Result<Response, ClientError> {
        let transport = self.async_transport.as_ref().ok_or(ClientError::TransportUnavailable { style: "async" })?;

        let request_id = self.prepare(&mut request);
        if self.log_requests {
            debug!(request_id = %request_id, "sending request\n{}", request.dump());
        }

        let response = transport.send(request).await;

        if self.log_requests {
            debug!(request_id = %request_id, "got response\n{}", response.dump());
        }
        Ok(response)
    }

    /// Sends `body` with `method` to `url`, fails on `>= 400` and decodes the answer.
    pub fn call<B, R>(&self, method: &str, url: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, url, body)?;
        let response = assert_response(self.send(request)?)?;
        self.codec.decode(&response.body)
    }

    pub async fn call_async<B, R>(&self, method: &str, url: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, url, body)?;
        let response = assert_response(self.send_async(request).await?)?;
        self.codec.decode(&response.body)
    }

    /// Like [`Client::call`] for calls whose answer carries nothing to decode.
    pub fn call_void<B>(&self, method: &str, url: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, url, body)?;
        assert_response(self.send(request)?)
    }

    pub async fn call_void_async<B>(&self, method: &str, url: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, url, body)?;
        assert_response(self.send_async(request).await?)
    }

    pub fn get<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        self.call::<(), R>(Method::GET.as_str(), url, None)
    }

    pub fn delete<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        self.call::<(), R>(Method::DELETE.as_str(), url, None)
    }

    pub fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R, ClientError> {
        self.call(Method::POST.as_str(), url, Some(body))
    }

    pub fn put<B: Serialize + ?Sized, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R, ClientError> {
        self.call(Method::PUT.as_str(), url, Some(body))
    }

    pub fn patch<B: Serialize + ?Sized, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R, ClientError> {
        self.call(Method::PATCH.as_str(), url, Some(body))
    }

    /// Calls `url` with a method that has no dedicated helper, e.g. `OPTIONS`.
    pub fn custom<B, R>(&self, method: &str, url: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call(method, url, body)
    }

    pub async fn custom_async<B, R>(&self, method: &str, url: &str, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call_async(method, url, body).await
    }

    pub async fn get_async<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        self.call_async::<(), R>(Method::GET.as_str(), url, None).await
    }

    pub async fn delete_async<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        self.call_async::<(), R>(Method::DELETE.as_str(), url, None).await
    }

    pub async fn post_async<B, R>(&self, url: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call_async(Method::POST.as_str(), url, Some(body)).await
    }

    pub async fn put_async<B, R>(&self, url: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call_async(Method::PUT.as_str(), url, Some(body)).await
    }

    pub async fn patch_async<B, R>(&self, url: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call_async(Method::PATCH.as_str(), url, Some(body)).await
    }

    fn build_request<B>(&self, method: &str, url: &str, body: Option<&B>) -> Result<Request, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let method = method.to_ascii_uppercase();
        let body = match body {
            Some(body) if method != Method::GET.as_str() => self.codec.encode(body)?,
            _ => bytes::Bytes::new(),
        };

        Ok(Request::new(method, format!("{}{}", self.url_prefix, url)).with_body(body))
    }
}

/// Turns a `>= 400` response into [`ClientError::Remote`].
pub fn assert_response(response: Response) -> Result<Response, ClientError> {
    if response.is_error() {
        return Err(ClientError::remote(response.status_code, response.body_text()));
    }
    Ok(response)
}

impl<C: fmt::Debug> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("codec", &self.codec)
            .field("blocking", &self.transport.is_some())
            .field("async", &self.async_transport.is_some())
            .field("default_headers", &self.default_headers.load_full())
            .field("url_prefix", &self.url_prefix)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

pub struct ClientBuilder<C> {
    codec: C,
    transport: Option<Arc<dyn Transport>>,
    async_transport: Option<Arc<dyn AsyncTransport>>,
    headers: HeaderSet,
    url_prefix: String,
    log_requests: bool,
}

impl ClientBuilder<JsonCodec> {
    fn new() -> Self {
        Self {
            codec: JsonCodec,
            transport: None,
            async_transport: None,
            headers: HeaderSet::new(),
            url_prefix: String::new(),
            log_requests: false,
        }
    }
}

impl<C: BodyCodec> ClientBuilder<C> {
    pub fn codec<NewC: BodyCodec>(self, codec: NewC) -> ClientBuilder<NewC> {
        ClientBuilder {
            codec,
            transport: self.transport,
            async_transport: self.async_transport,
            headers: self.headers,
            url_prefix: self.url_prefix,
            log_requests: self.log_requests,
        }
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn async_transport(mut self, transport: impl AsyncTransport + 'static) -> Self {
        self.async_transport = Some(Arc::new(transport));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    /// Prefix prepended to every URL passed to the verb helpers.
    pub fn url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.url_prefix = url_prefix.into();
        self
    }

    pub fn log_requests(mut self, log_requests: bool) -> Self {
        self.log_requests = log_requests;
        self
    }

    pub fn build(self) -> Result<Client<C>, ClientBuildError> {
        ensure!(self.transport.is_some() || self.async_transport.is_some(), ClientBuildError::MissingTransport);
        ensure!(!self.codec.format().is_empty(), ClientBuildError::EmptyFormat);

        Ok(Client {
            codec: self.codec,
            transport: self.transport,
            async_transport: self.async_transport,
            default_headers: ArcSwap::from_pointee(self.headers),
            url_prefix: self.url_prefix,
            log_requests: self.log_requests,
        })
    }
}

impl<C: fmt::Debug> fmt::Debug for ClientBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("codec", &self.codec)
            .field("headers", &self.headers)
            .field("url_prefix", &self.url_prefix)
            .finish_non_exhaustive()
    }
}
