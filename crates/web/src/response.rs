//! The handler-facing response writer.
//!
//! A [`ResponseAdapter`] buffers everything a handler does (status, headers,
//! cookies, body writes) and only copies it onto the wire [`Response`] when it
//! is closed. Closing is idempotent; a status left at `0` becomes `200`.

use std::io;
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use http::{StatusCode, header};
use local_http::protocol::{HeaderSet, HttpHeader, Response};
use tracing::warn;

use crate::cookie::{Cookie, PERMANENT_COOKIE_LIFETIME};

const ROOT_PATH: &str = "/";
const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Default)]
pub struct ResponseAdapter {
    response: Response,
    status_code: u16,
    headers: HeaderSet,
    cookies: Vec<Cookie>,
    body: BytesMut,
    redirect_location: Option<String>,
    closed: bool,
}

impl ResponseAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffered status; `0` until a handler sets one.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = status_code;
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Sets a header, replacing any value under the same key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    /// Same as [`set_header`](Self::set_header): a key holds a single value.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        self.headers.remove(key)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.headers.set(header::CONTENT_TYPE.as_str(), content_type);
    }

    pub fn set_content_length(&mut self, content_length: u64) {
        self.headers.set(header::CONTENT_LENGTH.as_str(), content_length.to_string());
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Adds `cookie`, replacing a buffered cookie of the same name in place.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.name() == cookie.name()) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// Adds a cookie that lives as long as the client session.
    pub fn add_session_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add_cookie(Cookie::new(name, value).with_path(ROOT_PATH));
    }

    /// Adds a cookie expiring [`PERMANENT_COOKIE_LIFETIME`] from now.
    pub fn add_permanent_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let expires = SystemTime::now() + PERMANENT_COOKIE_LIFETIME;
        self.add_cookie(Cookie::new(name, value).with_path(ROOT_PATH).with_expires(expires));
    }

    /// Asks the client to drop a cookie by sending it already expired.
    ///
    /// A cookie of that name added earlier on this response is discarded.
    pub fn delete_cookie(&mut self, name: impl Into<String>) {
        let now = SystemTime::now();
        let expires = now.checked_sub(ONE_DAY).unwrap_or(SystemTime::UNIX_EPOCH);
        self.add_cookie(Cookie::new(name, "").with_path(ROOT_PATH).with_expires(expires));
    }

    /// Appends `data` to the body buffer. Writes after [`close`](Self::close) are dropped.
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        if self.closed {
            warn!(len = data.as_ref().len(), "drop body write on a closed response");
            return;
        }
        self.body.extend_from_slice(data.as_ref());
    }

    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    /// The buffered body; empty after close.
    pub fn buffered_body(&self) -> &[u8] {
        &self.body
    }

    /// Records `url` as the redirect target. No status or `Location` header is written.
    pub fn redirect(&mut self, url: impl Into<String>) {
        self.redirect_location = Some(url.into());
    }

    pub fn redirect_location(&self) -> Option<&str> {
        self.redirect_location.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Copies the buffered state onto the wire response. Only the first call has an effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.response.status_code = if self.status_code == 0 { StatusCode::OK.as_u16() } else { self.status_code };
        self.response.body = self.body.split().freeze();

        let mut headers = self.headers.clone().into_vec();
        headers.extend(
            self.cookies.iter().map(|cookie| HttpHeader::new(header::SET_COOKIE.as_str(), cookie.to_set_cookie())),
        );
        self.response.headers = headers;
    }

    pub fn end(&mut self) {
        self.close();
    }

    /// The wire response; populated once the adapter is closed.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Closes the adapter if needed and returns the wire response.
    pub fn into_response(mut self) -> Response {
        self.close();
        self.response
    }

    /// Returns the wire response as it is, closed or not.
    pub(crate) fn into_inner(self) -> Response {
        self.response
    }
}

impl io::Write for ResponseAdapter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ResponseAdapter::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<ResponseAdapter> for Bytes {
    fn from(adapter: ResponseAdapter) -> Self {
        adapter.into_response().body
    }
}
