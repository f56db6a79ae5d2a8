//! The wire response message.

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::protocol::header::{HttpHeader, find_header};
use crate::protocol::payload::Payload;

/// A transport-agnostic HTTP response.
///
/// A `status_code` of 0 means "not set yet"; finalizing a response turns it
/// into 200.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    #[serde(default)]
    pub headers: Vec<HttpHeader>,
    #[serde(default)]
    pub body: Bytes,
    #[serde(skip)]
    pub payload: Option<Payload>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self { status_code, ..Default::default() }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(key, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key).map(|header| header.value.as_str())
    }

    /// All values of headers matching `key`, in wire order.
    pub fn header_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers.iter().filter(move |header| header.is(key)).map(|header| header.value.as_str())
    }

    /// The status as a typed [`StatusCode`], if it is a valid one.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    /// Returns true for any status the client reports as a failure (`>= 400`).
    #[inline]
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
